//! cmdgraph - typed, composable command-line interfaces
//!
//! A command is a graph of processors sharing an input tape, a typed data
//! bag, and an output sink. One declarative graph yields three coordinated
//! behaviors: validated execution, shell tab-completion, and usage text.

pub mod args;
pub mod complete;
pub mod error;
pub mod fsys;
pub mod graph;
pub mod input;
pub mod output;
pub mod run;
pub mod value;
pub mod wrap;

pub use args::{Arg, BoolFlag, BoolValueFlag, FlagDef, FlagSet, ValueFlag};
pub use complete::{Completer, Completion, FileCompleter, ListCompleter};
pub use error::CmdError;
pub use fsys::{DirEntry, FileSystem, MemFs, OsFs};
pub use graph::{executor, serial, Branch, Executor, NodeRepeater, Processor, Serial};
pub use input::{tokenize, Delimiter, InputTape, ListBreaker};
pub use output::{OutputSink, ScriptBuffer};
pub use run::{complete_line, execute, usage, ExecOutcome, Usage};
pub use value::{ArgValue, DataBag, Value};
pub use wrap::{CacheStore, CacheWrapper, JsonFileStore, MemStore, ShortcutStore, ShortcutWrapper};
