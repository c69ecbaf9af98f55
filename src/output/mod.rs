//! Output Module
//!
//! The split stdout/stderr accumulator and the execute buffer holding
//! script lines the host shell sources after the command returns.

pub mod script;
pub mod sink;

pub use script::ScriptBuffer;
pub use sink::OutputSink;
