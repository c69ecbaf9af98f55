//! Processor Trait
//!
//! Every node of a command graph implements this trait. A processor
//! participates in all three modes: execute consumes tokens and mutates the
//! data bag, complete performs the same consumption but halts with a
//! completion record when it reaches the cursor token, and usage
//! contributes entries to the static usage tree.
//!
//! The consumption step of execute and complete must be the same code path
//! inside each processor; reimplementing it per mode is how the two passes
//! drift apart.

use crate::complete::Completion;
use crate::error::CmdError;
use crate::input::InputTape;
use crate::output::{OutputSink, ScriptBuffer};
use crate::run::Usage;
use crate::value::DataBag;

pub trait Processor: Send + Sync {
    /// Name for diagnostics and logging.
    fn name(&self) -> &str;

    /// Consume tokens, validate, and record values; append any host-shell
    /// lines to the script buffer.
    fn execute(
        &self,
        input: &mut InputTape,
        data: &mut DataBag,
        out: &mut OutputSink,
        script: &mut ScriptBuffer,
    ) -> Result<(), CmdError>;

    /// Same consumption as execute. Returns `Some` when the cursor token
    /// was reached; traversal halts there. The cursor token itself never
    /// reaches the data bag.
    fn complete(
        &self,
        input: &mut InputTape,
        data: &mut DataBag,
    ) -> Result<Option<Completion>, CmdError>;

    /// Contribute entries to the usage tree.
    fn usage(&self, usage: &mut Usage);
}
