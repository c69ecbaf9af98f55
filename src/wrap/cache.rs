//! Cache Wrapper
//!
//! Captures the tokens a child consumed so an argument-less invocation can
//! replay the last run. Capture happens whether the child succeeds or
//! fails: the consumed tokens are recorded and the child's error is then
//! re-raised.

use std::sync::{Arc, Mutex};

use crate::complete::Completion;
use crate::error::CmdError;
use crate::graph::processor::Processor;
use crate::input::InputTape;
use crate::output::{OutputSink, ScriptBuffer};
use crate::run::Usage;
use crate::value::DataBag;
use crate::wrap::store::CacheStore;

pub struct CacheWrapper {
    namespace: String,
    child: Arc<dyn Processor>,
    store: Arc<Mutex<dyn CacheStore>>,
}

impl CacheWrapper {
    pub fn new(
        namespace: impl Into<String>,
        child: Arc<dyn Processor>,
        store: Arc<Mutex<dyn CacheStore>>,
    ) -> Self {
        Self { namespace: namespace.into(), child, store }
    }

    pub fn node(self) -> Arc<dyn Processor> {
        Arc::new(self)
    }
}

impl Processor for CacheWrapper {
    fn execute(
        &self,
        input: &mut InputTape,
        data: &mut DataBag,
        out: &mut OutputSink,
        script: &mut ScriptBuffer,
    ) -> Result<(), CmdError> {
        if input.fully_processed() {
            // Replay the last run; replays are not re-recorded.
            let cached = self.store.lock().unwrap().get(&self.namespace);
            if let Some(tokens) = cached {
                log::debug!("cache {}: replaying {} tokens", self.namespace, tokens.len());
                input.push_front(&tokens);
            }
            return self.child.execute(input, data, out, script);
        }

        let id = input.snapshot();
        let result = self.child.execute(input, data, out, script);
        // Commit even on failure, then re-raise.
        let consumed = input.consumed_since(id);
        if !consumed.is_empty() {
            let mut store = self.store.lock().unwrap();
            store.put(&self.namespace, consumed);
            store.mark_changed();
        }
        result
    }

    fn complete(
        &self,
        input: &mut InputTape,
        data: &mut DataBag,
    ) -> Result<Option<Completion>, CmdError> {
        self.child.complete(input, data)
    }

    fn usage(&self, usage: &mut Usage) {
        self.child.usage(usage);
    }

    fn name(&self) -> &str {
        &self.namespace
    }
}
