//! Arguments and Flags
//!
//! The typed argument processor, the flag block, and the stock validator
//! and transformer constructors.

pub mod argument;
pub mod flag;
pub mod transform;
pub mod validate;

pub use argument::{Arg, CompleteForExecute, Transformer, Validator};
pub use flag::{BoolFlag, BoolValueFlag, FlagDef, FlagSet, ValueFlag};
