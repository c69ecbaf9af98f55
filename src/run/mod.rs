//! Traversal Driver
//!
//! Execute, complete, and usage entry points over a processor graph.

pub mod driver;
pub mod usage;

pub use driver::{complete_line, execute, usage, ExecOutcome};
pub use usage::Usage;
