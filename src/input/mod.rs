//! Input Module
//!
//! Shell-like tokenization of a raw command line and the input tape the
//! processor graph consumes from.

pub mod lexer;
pub mod tape;

pub use lexer::{tokenize, Delimiter, TokenizedLine};
pub use tape::{InputTape, ListBreaker, PopResult};
