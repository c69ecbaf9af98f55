//! Executor Node
//!
//! Terminal processor running the command's actual work. Consumes no
//! tokens, so it is a no-op in complete mode and invisible in usage.

use std::sync::Arc;

use crate::complete::Completion;
use crate::error::CmdError;
use crate::graph::processor::Processor;
use crate::input::InputTape;
use crate::output::{OutputSink, ScriptBuffer};
use crate::run::Usage;
use crate::value::DataBag;

pub type ExecFn =
    dyn Fn(&DataBag, &mut OutputSink, &mut ScriptBuffer) -> Result<(), CmdError> + Send + Sync;

pub struct Executor {
    name: String,
    run: Box<ExecFn>,
}

impl Executor {
    pub fn new<F>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn(&DataBag, &mut OutputSink, &mut ScriptBuffer) -> Result<(), CmdError>
            + Send
            + Sync
            + 'static,
    {
        Self { name: name.into(), run: Box::new(run) }
    }
}

/// Convenience constructor returning a shareable node.
pub fn executor<F>(name: impl Into<String>, run: F) -> Arc<dyn Processor>
where
    F: Fn(&DataBag, &mut OutputSink, &mut ScriptBuffer) -> Result<(), CmdError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(Executor::new(name, run))
}

impl Processor for Executor {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(
        &self,
        _input: &mut InputTape,
        data: &mut DataBag,
        out: &mut OutputSink,
        script: &mut ScriptBuffer,
    ) -> Result<(), CmdError> {
        (self.run)(data, out, script)
    }

    fn complete(
        &self,
        _input: &mut InputTape,
        _data: &mut DataBag,
    ) -> Result<Option<Completion>, CmdError> {
        Ok(None)
    }

    fn usage(&self, _usage: &mut Usage) {}
}
