//! Completion Module
//!
//! The completion record processors hand back when the cursor is reached,
//! the post-processing that turns it into shell-ready suggestion lines,
//! and the completers shipped with the framework.

pub mod engine;
pub mod file;

pub use engine::{process, Completer, Completion, ListCompleter};
pub use file::FileCompleter;
