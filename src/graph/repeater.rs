//! Node Repeater
//!
//! Runs an inner sequence a required number of times plus an optional tail
//! (bounded or unbounded). An optional iteration only starts if at least
//! one token remains; completion inside the optional tail works and stops
//! suggesting past the declared maximum.

use std::sync::Arc;

use crate::complete::Completion;
use crate::error::CmdError;
use crate::graph::processor::Processor;
use crate::input::InputTape;
use crate::output::{OutputSink, ScriptBuffer};
use crate::run::Usage;
use crate::value::DataBag;

pub struct NodeRepeater {
    name: String,
    inner: Vec<Arc<dyn Processor>>,
    min_iter: usize,
    /// Extra iterations; `None` is unbounded.
    optional_iter: Option<usize>,
}

impl NodeRepeater {
    pub fn new(inner: Vec<Arc<dyn Processor>>, min_iter: usize) -> Self {
        Self {
            name: "repeater".to_string(),
            inner,
            min_iter,
            optional_iter: Some(0),
        }
    }

    pub fn optional(mut self, extra: usize) -> Self {
        self.optional_iter = Some(extra);
        self
    }

    pub fn unbounded(mut self) -> Self {
        self.optional_iter = None;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn run_inner_execute(
        &self,
        input: &mut InputTape,
        data: &mut DataBag,
        out: &mut OutputSink,
        script: &mut ScriptBuffer,
    ) -> Result<(), CmdError> {
        for item in &self.inner {
            item.execute(input, data, out, script)?;
        }
        Ok(())
    }

    fn run_inner_complete(
        &self,
        input: &mut InputTape,
        data: &mut DataBag,
    ) -> Result<Option<Completion>, CmdError> {
        for item in &self.inner {
            if let Some(completion) = item.complete(input, data)? {
                return Ok(Some(completion));
            }
        }
        Ok(None)
    }
}

impl Processor for NodeRepeater {
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
        for _ in 0..self.min_iter {
            self.run_inner_execute(input, data, out, script)?;
        }
        let mut extra = 0;
        loop {
            if let Some(max) = self.optional_iter {
                if extra >= max {
                    break;
                }
            }
            // An optional iteration starts only if its first sub-processor
            // has a token to consume.
            if input.peek().is_none() {
                break;
            }
            self.run_inner_execute(input, data, out, script)?;
            extra += 1;
        }
        Ok(())
    }

    fn complete(
        &self,
        input: &mut InputTape,
        data: &mut DataBag,
    ) -> Result<Option<Completion>, CmdError> {
        for _ in 0..self.min_iter {
            if let Some(completion) = self.run_inner_complete(input, data)? {
                return Ok(Some(completion));
            }
        }
        let mut extra = 0;
        loop {
            if let Some(max) = self.optional_iter {
                if extra >= max {
                    break;
                }
            }
            if input.peek().is_none() {
                break;
            }
            if let Some(completion) = self.run_inner_complete(input, data)? {
                return Ok(Some(completion));
            }
            extra += 1;
        }
        Ok(None)
    }

    fn usage(&self, usage: &mut Usage) {
        for item in &self.inner {
            item.usage(usage);
        }
    }
}
