//! Serial Combinator
//!
//! Runs a fixed sequence of processors left to right. In complete mode the
//! first processor that reaches the cursor short-circuits the rest.

use std::sync::Arc;

use crate::complete::Completion;
use crate::error::CmdError;
use crate::graph::processor::Processor;
use crate::input::InputTape;
use crate::output::{OutputSink, ScriptBuffer};
use crate::run::Usage;
use crate::value::DataBag;

pub struct Serial {
    name: String,
    items: Vec<Arc<dyn Processor>>,
}

impl Serial {
    pub fn new(items: Vec<Arc<dyn Processor>>) -> Self {
        Self { name: "serial".to_string(), items }
    }

    pub fn named(name: impl Into<String>, items: Vec<Arc<dyn Processor>>) -> Self {
        Self { name: name.into(), items }
    }
}

/// Convenience constructor for the common case.
pub fn serial(items: Vec<Arc<dyn Processor>>) -> Arc<dyn Processor> {
    Arc::new(Serial::new(items))
}

impl Processor for Serial {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(
        &self,
        input: &mut InputTape,
        data: &mut DataBag,
        out: &mut OutputSink,
        script: &mut ScriptBuffer,
    ) -> Result<(), CmdError> {
        for item in &self.items {
            log::trace!("serial {}: entering {}", self.name, item.name());
            item.execute(input, data, out, script)?;
        }
        Ok(())
    }

    fn complete(
        &self,
        input: &mut InputTape,
        data: &mut DataBag,
    ) -> Result<Option<Completion>, CmdError> {
        for item in &self.items {
            if let Some(completion) = item.complete(input, data)? {
                return Ok(Some(completion));
            }
        }
        Ok(None)
    }

    fn usage(&self, usage: &mut Usage) {
        for item in &self.items {
            item.usage(usage);
        }
    }
}
