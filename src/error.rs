//! Error taxonomy
//!
//! Every failure a traversal can produce lives in one enum. The message
//! text is part of the contract: drivers print errors verbatim to stderr
//! with a trailing newline and terminate the invocation.

use thiserror::Error;

/// Unified error for parsing, validation, flag resolution, branching,
/// wrapper management, and store I/O.
#[derive(Debug, Error)]
pub enum CmdError {
    /// An argument's minimum cardinality was not met.
    #[error("Argument \"{name}\" requires at least {min} argument{}, got {got}", plural(.min))]
    NotEnoughArgs { name: String, min: usize, got: usize },

    /// Tokens remained on the tape after the graph terminated.
    #[error("Unprocessed extra args: [{}]", .0.join(" "))]
    UnprocessedExtraArgs(Vec<String>),

    /// A value operator failed; wraps the stdlib parse message verbatim.
    #[error("parsing \"{token}\": {message}")]
    Parse { token: String, message: String },

    /// A validator predicate rejected the parsed value.
    #[error("validation for \"{name}\" failed: [{kind}] {message}")]
    Validation { name: String, kind: String, message: String },

    /// A transformer returned an error.
    #[error("transformer for \"{name}\" failed: {message}")]
    Transform { name: String, message: String },

    /// Branch dispatch found no token to dispatch on.
    #[error("Branching argument required, must be one of [{}]", .0.join(" "))]
    BranchArgMissing(Vec<String>),

    /// Branch dispatch token matched no key, no synonym, and no default.
    #[error("Branching argument must be one of [{}]", .0.join(" "))]
    BranchArgInvalid(Vec<String>),

    /// A multi-flag run contained a character with no short code.
    #[error("Unknown flag code \"{0}\" used in multi-flag")]
    UnknownMultiFlag(char),

    /// A multi-flag run referenced a flag that is not boolean-like.
    #[error("Flag \"--{0}\" is not combinable in a multi-flag")]
    NonCombinableMultiFlag(String),

    /// Complete-for-execute produced no suggestion in strict mode.
    #[error("complete-for-execute for \"{0}\" returned no suggestions")]
    CompleteNoSuggestion(String),

    /// Complete-for-execute produced several suggestions in strict mode.
    #[error("complete-for-execute for \"{name}\" returned {count} suggestions, expected exactly 1")]
    CompleteMultiple { name: String, count: usize },

    /// Complete-for-execute was declared on an argument without a completer.
    #[error("complete-for-execute for \"{0}\" has no completer")]
    CompleteNilCompletion(String),

    /// The completer itself failed during the complete-for-execute pre-step.
    #[error("complete-for-execute for \"{name}\" failed: {message}")]
    CompleteFetch { name: String, message: String },

    /// Shortcut add collided with an existing name.
    #[error("Shortcut \"{0}\" already exists")]
    ShortcutExists(String),

    /// Shortcut add/set was given an empty token payload.
    #[error("Shortcut must contain at least one token")]
    ShortcutGroupEmpty,

    /// Shortcut get/delete named a shortcut that is not in the store.
    #[error("Shortcut \"{0}\" does not exist")]
    ShortcutMissing(String),

    /// A default supplier failed for an unset argument or flag.
    #[error("default for \"{name}\" failed: {message}")]
    DefaultFn { name: String, message: String },

    /// A completer failed outside the complete-for-execute pre-step.
    #[error("completer failed: {0}")]
    Completer(String),

    /// Store or setup-file I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn plural(n: &usize) -> &'static str {
    if *n == 1 {
        ""
    } else {
        "s"
    }
}
