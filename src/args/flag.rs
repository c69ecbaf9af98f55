//! Flag Processor
//!
//! A flag block is a sibling-scanner: it repeatedly rescans the remaining
//! tokens for `--long` or `-x` markers before downstream positional
//! processors run. On a hit the marker leaves the remaining set and the
//! flag's declared shape is consumed from the marker's position, so the
//! surviving positional stream is unaffected.
//!
//! A token of shape `-xyz` is a multi-flag: every character must resolve
//! to a combinable (boolean-like) flag or the whole token fails.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex_lite::Regex;

use crate::args::argument::{Arg, ArgCore};
use crate::complete::engine::{Completer, Completion};
use crate::error::CmdError;
use crate::graph::processor::Processor;
use crate::input::InputTape;
use crate::output::{OutputSink, ScriptBuffer};
use crate::run::Usage;
use crate::value::{ArgValue, DataBag, Value};

lazy_static! {
    static ref MULTI_FLAG: Regex = Regex::new(r"^-[a-zA-Z]{2,}$").unwrap();
}

/// One flag definition inside a flag block.
pub trait FlagDef: Send + Sync {
    fn long(&self) -> &str;
    fn short(&self) -> Option<char>;
    /// True iff the flag may appear inside a multi-flag run.
    fn combinable(&self) -> bool {
        false
    }
    /// Consume the flag's declared shape starting at the marker's position.
    fn consume_execute(
        &self,
        input: &mut InputTape,
        start: usize,
        data: &mut DataBag,
    ) -> Result<(), CmdError>;
    /// Same consumption in complete mode; `Some` when the cursor sits in
    /// this flag's value position.
    fn consume_complete(
        &self,
        input: &mut InputTape,
        start: usize,
        data: &mut DataBag,
    ) -> Result<Option<Completion>, CmdError>;
    /// Record the flag's presence inside a multi-flag run.
    fn apply_combined(&self, data: &mut DataBag);
    /// Run the default supplier for a flag that never appeared.
    fn apply_default(&self, data: &mut DataBag) -> Result<(), CmdError>;
    /// Usage entry, or `None` for hidden flags.
    fn usage_entry(&self) -> Option<String>;
}

/// Boolean flag: presence stores `true`.
pub struct BoolFlag {
    long: String,
    short: Option<char>,
    hidden: bool,
}

impl BoolFlag {
    pub fn new(long: impl Into<String>, short: char) -> Self {
        Self { long: long.into(), short: Some(short), hidden: false }
    }

    pub fn long_only(long: impl Into<String>) -> Self {
        Self { long: long.into(), short: None, hidden: false }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn def(self) -> Arc<dyn FlagDef> {
        Arc::new(self)
    }
}

impl FlagDef for BoolFlag {
    fn long(&self) -> &str {
        &self.long
    }

    fn short(&self) -> Option<char> {
        self.short
    }

    fn combinable(&self) -> bool {
        true
    }

    fn consume_execute(
        &self,
        _input: &mut InputTape,
        _start: usize,
        data: &mut DataBag,
    ) -> Result<(), CmdError> {
        data.insert(self.long.clone(), Value::Bool(true));
        Ok(())
    }

    fn consume_complete(
        &self,
        _input: &mut InputTape,
        _start: usize,
        data: &mut DataBag,
    ) -> Result<Option<Completion>, CmdError> {
        data.insert(self.long.clone(), Value::Bool(true));
        Ok(None)
    }

    fn apply_combined(&self, data: &mut DataBag) {
        data.insert(self.long.clone(), Value::Bool(true));
    }

    fn apply_default(&self, _data: &mut DataBag) -> Result<(), CmdError> {
        Ok(())
    }

    fn usage_entry(&self) -> Option<String> {
        if self.hidden {
            return None;
        }
        Some(flag_names(&self.long, self.short))
    }
}

/// Boolean-like flag storing a configured value on presence, and the
/// optional false-value when absent.
pub struct BoolValueFlag<T: ArgValue> {
    long: String,
    short: Option<char>,
    true_value: T,
    false_value: Option<T>,
    hidden: bool,
}

impl<T: ArgValue> BoolValueFlag<T> {
    pub fn new(long: impl Into<String>, short: char, true_value: T) -> Self {
        Self {
            long: long.into(),
            short: Some(short),
            true_value,
            false_value: None,
            hidden: false,
        }
    }

    pub fn false_value(mut self, value: T) -> Self {
        self.false_value = Some(value);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn def(self) -> Arc<dyn FlagDef> {
        Arc::new(self)
    }
}

impl<T: ArgValue> FlagDef for BoolValueFlag<T> {
    fn long(&self) -> &str {
        &self.long
    }

    fn short(&self) -> Option<char> {
        self.short
    }

    fn combinable(&self) -> bool {
        true
    }

    fn consume_execute(
        &self,
        _input: &mut InputTape,
        _start: usize,
        data: &mut DataBag,
    ) -> Result<(), CmdError> {
        data.insert(self.long.clone(), self.true_value.clone().into_value());
        Ok(())
    }

    fn consume_complete(
        &self,
        _input: &mut InputTape,
        _start: usize,
        data: &mut DataBag,
    ) -> Result<Option<Completion>, CmdError> {
        data.insert(self.long.clone(), self.true_value.clone().into_value());
        Ok(None)
    }

    fn apply_combined(&self, data: &mut DataBag) {
        data.insert(self.long.clone(), self.true_value.clone().into_value());
    }

    fn apply_default(&self, data: &mut DataBag) -> Result<(), CmdError> {
        if let Some(false_value) = &self.false_value {
            data.insert(self.long.clone(), false_value.clone().into_value());
        }
        Ok(())
    }

    fn usage_entry(&self) -> Option<String> {
        if self.hidden {
            return None;
        }
        Some(flag_names(&self.long, self.short))
    }
}

/// Flag taking a typed value, with the full argument machinery
/// (cardinality, validators, transformers, default, completer).
pub struct ValueFlag<T: ArgValue> {
    core: ArgCore<T>,
    long: String,
    short: Option<char>,
    hidden: bool,
}

impl<T: ArgValue> ValueFlag<T> {
    /// Single-token value flag. The bag entry is keyed by the long name.
    pub fn new(long: impl Into<String>, short: char) -> Self {
        let long = long.into();
        Self {
            core: Arg::<T>::new(long.clone()).into_core(),
            long,
            short: Some(short),
            hidden: false,
        }
    }

    pub fn long_only(long: impl Into<String>) -> Self {
        let long = long.into();
        Self {
            core: Arg::<T>::new(long.clone()).into_core(),
            long,
            short: None,
            hidden: false,
        }
    }

    /// Build around a fully configured argument (list cardinality,
    /// validators, default, completer).
    pub fn from_arg(arg: Arg<T>, short: Option<char>) -> Self {
        let core = arg.into_core();
        let long = core.name.clone();
        Self { core, long, short, hidden: false }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn def(self) -> Arc<dyn FlagDef> {
        Arc::new(self)
    }
}

impl<T: ArgValue> FlagDef for ValueFlag<T> {
    fn long(&self) -> &str {
        &self.long
    }

    fn short(&self) -> Option<char> {
        self.short
    }

    fn consume_execute(
        &self,
        input: &mut InputTape,
        start: usize,
        data: &mut DataBag,
    ) -> Result<(), CmdError> {
        self.core.execute_at(input, data, start)
    }

    fn consume_complete(
        &self,
        input: &mut InputTape,
        start: usize,
        data: &mut DataBag,
    ) -> Result<Option<Completion>, CmdError> {
        self.core.complete_at(input, data, start)
    }

    fn apply_combined(&self, _data: &mut DataBag) {
        unreachable!("value flags are not combinable");
    }

    fn apply_default(&self, data: &mut DataBag) -> Result<(), CmdError> {
        self.core.apply_default(data)
    }

    fn usage_entry(&self) -> Option<String> {
        if self.hidden {
            return None;
        }
        let type_name = T::type_name().to_uppercase().replace(' ', "_");
        Some(format!("{} {}", flag_names(&self.long, self.short), type_name))
    }
}

fn flag_names(long: &str, short: Option<char>) -> String {
    match short {
        Some(s) => format!("--{long}|-{s}"),
        None => format!("--{long}"),
    }
}

enum Hit {
    Single(usize),
    Multi(Vec<usize>),
}

/// The flag block processor.
pub struct FlagSet {
    name: String,
    flags: Vec<Arc<dyn FlagDef>>,
}

impl FlagSet {
    pub fn new(flags: Vec<Arc<dyn FlagDef>>) -> Self {
        Self { name: "flags".to_string(), flags }
    }

    pub fn node(self) -> Arc<dyn Processor> {
        Arc::new(self)
    }

    fn by_long(&self, name: &str) -> Option<usize> {
        self.flags.iter().position(|f| f.long() == name)
    }

    fn by_short(&self, code: char) -> Option<usize> {
        self.flags.iter().position(|f| f.short() == Some(code))
    }

    /// Resolve a multi-flag run; every character must name a combinable
    /// flag.
    fn resolve_multi(&self, token: &str) -> Result<Vec<usize>, CmdError> {
        let mut hits = Vec::new();
        for code in token.chars().skip(1) {
            let Some(index) = self.by_short(code) else {
                return Err(CmdError::UnknownMultiFlag(code));
            };
            if !self.flags[index].combinable() {
                return Err(CmdError::NonCombinableMultiFlag(
                    self.flags[index].long().to_string(),
                ));
            }
            hits.push(index);
        }
        Ok(hits)
    }

    /// Find the leftmost marker in the remaining tokens, optionally
    /// skipping the cursor token (complete mode: the token being typed is
    /// completed, not consumed).
    fn scan(&self, input: &InputTape, skip_cursor: bool) -> Result<Option<(usize, Hit)>, CmdError> {
        for offset in 0..input.remaining_len() {
            let Some(text) = input.peek_at(offset) else { break };
            if skip_cursor && input.cursor_remaining() && offset == input.remaining_len() - 1 {
                break;
            }
            if let Some(long) = text.strip_prefix("--") {
                if let Some(index) = self.by_long(long) {
                    return Ok(Some((offset, Hit::Single(index))));
                }
                continue;
            }
            let mut chars = text.chars();
            if chars.next() == Some('-') {
                let rest: Vec<char> = chars.collect();
                if rest.len() == 1 {
                    if let Some(index) = self.by_short(rest[0]) {
                        return Ok(Some((offset, Hit::Single(index))));
                    }
                } else if MULTI_FLAG.is_match(text) {
                    return Ok(Some((offset, Hit::Multi(self.resolve_multi(text)?))));
                }
            }
        }
        Ok(None)
    }

    fn flag_name_suggestions(&self) -> Vec<String> {
        let mut names = Vec::new();
        for flag in &self.flags {
            if flag.usage_entry().is_none() {
                continue;
            }
            names.push(format!("--{}", flag.long()));
            if let Some(short) = flag.short() {
                names.push(format!("-{short}"));
            }
        }
        names
    }
}

impl Processor for FlagSet {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(
        &self,
        input: &mut InputTape,
        data: &mut DataBag,
        _out: &mut OutputSink,
        _script: &mut ScriptBuffer,
    ) -> Result<(), CmdError> {
        loop {
            match self.scan(input, false)? {
                None => break,
                Some((offset, Hit::Single(index))) => {
                    let (marker, _) = input.pop_at(offset).expect("scanned marker must pop");
                    log::debug!("flags: hit {marker}");
                    self.flags[index].consume_execute(input, offset, data)?;
                }
                Some((offset, Hit::Multi(indices))) => {
                    input.pop_at(offset);
                    for index in indices {
                        self.flags[index].apply_combined(data);
                    }
                }
            }
        }
        // Defaults run only for flags that never appeared.
        for flag in &self.flags {
            if !data.has(flag.long()) {
                flag.apply_default(data)?;
            }
        }
        Ok(())
    }

    fn complete(
        &self,
        input: &mut InputTape,
        data: &mut DataBag,
    ) -> Result<Option<Completion>, CmdError> {
        loop {
            match self.scan(input, true)? {
                None => break,
                Some((offset, Hit::Single(index))) => {
                    input.pop_at(offset);
                    if let Some(completion) =
                        self.flags[index].consume_complete(input, offset, data)?
                    {
                        return Ok(Some(completion));
                    }
                }
                Some((offset, Hit::Multi(indices))) => {
                    input.pop_at(offset);
                    for index in indices {
                        self.flags[index].apply_combined(data);
                    }
                }
            }
        }
        // A cursor token that looks like a flag suggests flag names.
        if input.cursor_remaining() && input.cursor_text().starts_with('-') {
            let offset = input.remaining_len() - 1;
            input.pop_at(offset);
            return Ok(Some(Completion::new(self.flag_name_suggestions())));
        }
        Ok(None)
    }

    fn usage(&self, usage: &mut Usage) {
        for flag in &self.flags {
            if let Some(entry) = flag.usage_entry() {
                usage.add_flag(entry);
            }
        }
    }
}
