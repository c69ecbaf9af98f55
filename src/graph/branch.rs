//! Branch Processor
//!
//! Sub-command dispatch. Branch keys may carry synonyms declared as a
//! space-separated key string (`"b bee B"` is key `b` with synonyms `bee`
//! and `B`). An optional default child takes over when the dispatch token
//! matches nothing; with no default the dispatch fails.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::complete::Completion;
use crate::error::CmdError;
use crate::graph::processor::Processor;
use crate::input::InputTape;
use crate::output::{OutputSink, ScriptBuffer};
use crate::run::Usage;
use crate::value::DataBag;

pub struct Branch {
    name: String,
    children: IndexMap<String, Arc<dyn Processor>>,
    /// Alias token to canonical key.
    synonyms: IndexMap<String, String>,
    default: Option<Arc<dyn Processor>>,
    complete_subcommands: bool,
}

impl Branch {
    /// Build from (key string, child) pairs. The first word of a key
    /// string is the canonical key; the remaining words are synonyms.
    pub fn new(pairs: Vec<(&str, Arc<dyn Processor>)>) -> Self {
        let mut children = IndexMap::new();
        let mut synonyms = IndexMap::new();
        for (key_string, child) in pairs {
            let mut words = key_string.split_whitespace();
            let canonical = words.next().expect("branch key string must not be empty");
            children.insert(canonical.to_string(), child);
            for alias in words {
                synonyms.insert(alias.to_string(), canonical.to_string());
            }
        }
        Self {
            name: "branch".to_string(),
            children,
            synonyms,
            default: None,
            complete_subcommands: true,
        }
    }

    pub fn with_default(mut self, child: Arc<dyn Processor>) -> Self {
        self.default = Some(child);
        self
    }

    pub fn complete_subcommands(mut self, yes: bool) -> Self {
        self.complete_subcommands = yes;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn sorted_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.children.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn resolve(&self, token: &str) -> Option<&Arc<dyn Processor>> {
        if let Some(child) = self.children.get(token) {
            return Some(child);
        }
        self.synonyms.get(token).and_then(|key| self.children.get(key))
    }
}

impl Processor for Branch {
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
        let Some((token, index)) = input.pop_with_index() else {
            return match &self.default {
                Some(child) => child.execute(input, data, out, script),
                None => Err(CmdError::BranchArgMissing(self.sorted_keys())),
            };
        };
        if let Some(child) = self.resolve(&token) {
            log::debug!("branch {}: dispatching \"{}\"", self.name, token);
            return child.execute(input, data, out, script);
        }
        match &self.default {
            Some(child) => {
                input.unpop(index);
                child.execute(input, data, out, script)
            }
            None => Err(CmdError::BranchArgInvalid(self.sorted_keys())),
        }
    }

    fn complete(
        &self,
        input: &mut InputTape,
        data: &mut DataBag,
    ) -> Result<Option<Completion>, CmdError> {
        if input.front_is_cursor() {
            // Cursor sits on the dispatch token itself.
            return match &self.default {
                None => Ok(Some(Completion::new(self.sorted_keys()))),
                Some(child) => {
                    let mut completion =
                        child.complete(input, data)?.unwrap_or_else(Completion::empty);
                    if self.complete_subcommands {
                        completion.suggestions.extend(self.sorted_keys());
                    }
                    Ok(Some(completion))
                }
            };
        }
        let Some((token, index)) = input.pop_with_index() else {
            return Ok(None);
        };
        if let Some(child) = self.resolve(&token) {
            return child.complete(input, data);
        }
        match &self.default {
            Some(child) => {
                input.unpop(index);
                child.complete(input, data)
            }
            None => Err(CmdError::BranchArgInvalid(self.sorted_keys())),
        }
    }

    fn usage(&self, usage: &mut Usage) {
        for (key, child) in &self.children {
            child.usage(usage.branch(key));
        }
        if let Some(child) = &self.default {
            child.usage(usage);
        }
    }
}
