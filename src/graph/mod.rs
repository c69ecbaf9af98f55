//! Processor Graph
//!
//! The processor trait every node implements and the closed set of
//! combinators: serial sequencing, branch dispatch, node repetition, and
//! the terminal executor.

pub mod branch;
pub mod executor;
pub mod processor;
pub mod repeater;
pub mod serial;

pub use branch::Branch;
pub use executor::{executor, Executor};
pub use processor::Processor;
pub use repeater::NodeRepeater;
pub use serial::{serial, Serial};
