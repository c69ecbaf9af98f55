//! Value Module
//!
//! The closed set of primitive value types shared by arguments and flags,
//! per-type token conversions, and the name-to-value data bag.

pub mod bag;
pub mod operator;
pub mod types;

pub use bag::DataBag;
pub use operator::{ArgValue, ParseFailure};
pub use types::Value;
