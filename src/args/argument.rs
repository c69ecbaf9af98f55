//! Argument Processor
//!
//! A typed positional argument with cardinality (min required plus a
//! bounded or unbounded optional tail), ordered validators and
//! transformers, an optional default supplier, an optional custom setter,
//! an optional list breaker, and an optional completer.
//!
//! The consumption step is shared between execute and complete
//! (`ArgCore`); flags reuse the same core at a mid-stream offset, which is
//! what keeps the two passes and the two processor kinds in lockstep.

use std::sync::Arc;

use crate::complete::engine::{filter_matches, Completer, Completion};
use crate::error::CmdError;
use crate::graph::processor::Processor;
use crate::input::{InputTape, ListBreaker};
use crate::output::{OutputSink, ScriptBuffer};
use crate::run::Usage;
use crate::value::{ArgValue, DataBag};

/// Named predicate over a parsed value. The kind appears in the error
/// message, e.g. `validation for "N" failed: [IntPositive] ...`.
pub struct Validator<T> {
    kind: String,
    check: Box<dyn Fn(&T) -> Result<(), String> + Send + Sync>,
}

impl<T> Validator<T> {
    pub fn new<F>(kind: impl Into<String>, check: F) -> Self
    where
        F: Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    {
        Self { kind: kind.into(), check: Box::new(check) }
    }
}

/// Value rewrite applied after parsing. Transformers marked for-complete
/// also run in complete mode, where their output feeds the completer
/// prefix.
pub struct Transformer<T> {
    apply: Box<dyn Fn(T, &DataBag) -> Result<T, String> + Send + Sync>,
    for_complete: bool,
}

impl<T> Transformer<T> {
    pub fn new<F>(apply: F) -> Self
    where
        F: Fn(T, &DataBag) -> Result<T, String> + Send + Sync + 'static,
    {
        Self { apply: Box::new(apply), for_complete: false }
    }

    pub fn for_complete(mut self) -> Self {
        self.for_complete = true;
        self
    }
}

/// Complete-for-execute behavior for the terminal token.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompleteForExecute {
    /// Zero or several suggestions leave the token unchanged instead of
    /// failing.
    pub best_effort: bool,
    /// A token equal to one suggestion is accepted even when other
    /// suggestions share it as a prefix.
    pub exact_match: bool,
}

type DefaultFn<T> = dyn Fn(&DataBag) -> Result<T, String> + Send + Sync;
type SetterFn<T> = dyn Fn(T, &mut DataBag) + Send + Sync;

/// The mode-shared argument machinery, reused by flags at a mid-stream
/// offset.
pub(crate) struct ArgCore<T: ArgValue> {
    pub(crate) name: String,
    min: usize,
    optional: Option<usize>,
    validators: Vec<Validator<T>>,
    transformers: Vec<Transformer<T>>,
    default: Option<Box<DefaultFn<T>>>,
    setter: Option<Box<SetterFn<T>>>,
    breaker: Option<ListBreaker>,
    completer: Option<Arc<dyn Completer>>,
    cfe: Option<CompleteForExecute>,
}

impl<T: ArgValue> ArgCore<T> {
    pub(crate) fn new(name: impl Into<String>, min: usize, optional: Option<usize>) -> Self {
        Self {
            name: name.into(),
            min,
            optional,
            validators: Vec::new(),
            transformers: Vec::new(),
            default: None,
            setter: None,
            breaker: None,
            completer: None,
            cfe: None,
        }
    }

    fn store(&self, value: T, data: &mut DataBag) {
        match &self.setter {
            Some(setter) => setter(value, data),
            None => data.insert(self.name.clone(), value.into_value()),
        }
    }

    /// Apply the default supplier if the argument is still unset. Used on
    /// the zero-token path and by flag defaults.
    pub(crate) fn apply_default(&self, data: &mut DataBag) -> Result<(), CmdError> {
        if let Some(default) = &self.default {
            let value = default(data).map_err(|message| CmdError::DefaultFn {
                name: self.name.clone(),
                message,
            })?;
            self.store(value, data);
        }
        Ok(())
    }

    /// Resolve the complete-for-execute pre-step for the terminal token.
    /// Returns a replacement token when the completer yields exactly one
    /// suggestion.
    fn resolve_cfe(
        &self,
        cfe: &CompleteForExecute,
        token: &str,
        data: &DataBag,
    ) -> Result<Option<String>, CmdError> {
        let Some(completer) = &self.completer else {
            if cfe.best_effort {
                log::warn!(
                    "complete-for-execute for \"{}\" has no completer; token left unchanged",
                    self.name
                );
                return Ok(None);
            }
            return Err(CmdError::CompleteNilCompletion(self.name.clone()));
        };
        let completion = completer.complete(token, data).map_err(|e| CmdError::CompleteFetch {
            name: self.name.clone(),
            message: e.to_string(),
        })?;
        let matches = filter_matches(&completion, token);
        if cfe.exact_match && matches.iter().any(|m| m == token) {
            return Ok(None);
        }
        match matches.len() {
            1 => Ok(matches.into_iter().next()),
            0 => {
                if cfe.best_effort {
                    log::warn!(
                        "complete-for-execute for \"{}\" returned no suggestions; token left unchanged",
                        self.name
                    );
                    Ok(None)
                } else {
                    Err(CmdError::CompleteNoSuggestion(self.name.clone()))
                }
            }
            count => {
                if cfe.best_effort {
                    log::warn!(
                        "complete-for-execute for \"{}\" returned {} suggestions; token left unchanged",
                        self.name,
                        count
                    );
                    Ok(None)
                } else {
                    Err(CmdError::CompleteMultiple { name: self.name.clone(), count })
                }
            }
        }
    }

    fn run_complete_transformers(&self, value: T, data: &DataBag) -> T {
        let mut value = value;
        for t in &self.transformers {
            if !t.for_complete {
                continue;
            }
            match (t.apply)(value.clone(), data) {
                Ok(next) => value = next,
                Err(_) => return value,
            }
        }
        value
    }

    pub(crate) fn execute_at(
        &self,
        input: &mut InputTape,
        data: &mut DataBag,
        start: usize,
    ) -> Result<(), CmdError> {
        let res = input.pop_n_at(start, self.min, self.optional, self.breaker.as_ref());
        if !res.enough {
            return Err(CmdError::NotEnoughArgs {
                name: self.name.clone(),
                min: self.min,
                got: res.tokens.len(),
            });
        }
        if res.tokens.is_empty() {
            return self.apply_default(data);
        }

        let mut tokens = res.tokens.clone();
        if let Some(cfe) = &self.cfe {
            // The pre-step runs only when consumption reached the end of
            // the tape, so the terminal token is the one being resolved.
            if input.fully_processed() {
                if let Some(replacement) = self.resolve_cfe(cfe, tokens.last().unwrap(), data)? {
                    let index = *res.indices.last().unwrap();
                    input.rewrite(index, replacement.clone());
                    *tokens.last_mut().unwrap() = replacement;
                }
            }
        }

        let mut value = T::from_tokens(&tokens).map_err(|failure| {
            input.unpop_all(&res.indices[failure.index..]);
            failure.error
        })?;

        for transformer in &self.transformers {
            value = (transformer.apply)(value, data).map_err(|message| CmdError::Transform {
                name: self.name.clone(),
                message,
            })?;
            for (index, text) in res.indices.iter().zip(value.to_tokens()) {
                input.rewrite(*index, text);
            }
        }

        for validator in &self.validators {
            (validator.check)(&value).map_err(|message| CmdError::Validation {
                name: self.name.clone(),
                kind: validator.kind.clone(),
                message,
            })?;
        }

        self.store(value, data);
        Ok(())
    }

    pub(crate) fn complete_at(
        &self,
        input: &mut InputTape,
        data: &mut DataBag,
        start: usize,
    ) -> Result<Option<Completion>, CmdError> {
        let res = input.pop_n_at(start, self.min, self.optional, self.breaker.as_ref());
        if !res.took_cursor(input) {
            // All consumed tokens precede the cursor; record their value so
            // downstream processors and the distinct filter can see it.
            if !res.tokens.is_empty() {
                if let Ok(value) = T::from_tokens(&res.tokens) {
                    let value = self.run_complete_transformers(value, data);
                    self.store(value, data);
                }
            }
            return Ok(None);
        }

        let mut prefix = res.tokens.last().cloned().unwrap_or_default();
        if self.transformers.iter().any(|t| t.for_complete) {
            if let Ok(value) = T::from_tokens(&res.tokens) {
                let transformed = self.run_complete_transformers(value, data);
                if let Some(last) = transformed.to_tokens().into_iter().last() {
                    prefix = last;
                }
            }
        }

        let mut completion = match &self.completer {
            Some(completer) => completer.complete(&prefix, data)?,
            None => Completion::empty(),
        };
        // Earlier elements of this argument feed the distinct filter.
        let earlier = res.tokens.len().saturating_sub(1);
        completion.exclude.extend(res.tokens[..earlier].iter().cloned());
        Ok(Some(completion))
    }

    fn usage_symbol(&self) -> String {
        match (self.min, self.optional) {
            (0, Some(1)) => format!("[{}]", self.name),
            (0, _) => format!("[{} ...]", self.name),
            (_, Some(0)) => self.name.clone(),
            _ => format!("{} [{} ...]", self.name, self.name),
        }
    }
}

/// A typed positional argument node.
pub struct Arg<T: ArgValue> {
    core: ArgCore<T>,
    hidden: bool,
}

impl<T: ArgValue> Arg<T> {
    /// Required single-token argument.
    pub fn new(name: impl Into<String>) -> Self {
        Self { core: ArgCore::new(name, 1, Some(0)), hidden: false }
    }

    /// Optional single-token argument.
    pub fn optional(name: impl Into<String>) -> Self {
        Self { core: ArgCore::new(name, 0, Some(1)), hidden: false }
    }

    /// List argument taking `min` required tokens plus an optional tail
    /// (`None` is unbounded).
    pub fn list(name: impl Into<String>, min: usize, optional: Option<usize>) -> Self {
        Self { core: ArgCore::new(name, min, optional), hidden: false }
    }

    pub fn validate(mut self, validator: Validator<T>) -> Self {
        self.core.validators.push(validator);
        self
    }

    pub fn transform(mut self, transformer: Transformer<T>) -> Self {
        self.core.transformers.push(transformer);
        self
    }

    pub fn default_fn<F>(mut self, default: F) -> Self
    where
        F: Fn(&DataBag) -> Result<T, String> + Send + Sync + 'static,
    {
        self.core.default = Some(Box::new(default));
        self
    }

    /// Store through a custom setter instead of direct assignment.
    pub fn setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(T, &mut DataBag) + Send + Sync + 'static,
    {
        self.core.setter = Some(Box::new(setter));
        self
    }

    /// Stop list consumption before `token`; with discard the breaker
    /// itself is popped and dropped.
    pub fn breaker(mut self, token: impl Into<String>, discard: bool) -> Self {
        self.core.breaker = Some(ListBreaker::new(token, discard));
        self
    }

    pub fn completer(mut self, completer: impl Completer + 'static) -> Self {
        self.core.completer = Some(Arc::new(completer));
        self
    }

    pub fn completer_arc(mut self, completer: Arc<dyn Completer>) -> Self {
        self.core.completer = Some(completer);
        self
    }

    pub fn hide_usage(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Resolve the terminal token through the completer before execution.
    pub fn complete_for_execute(mut self) -> Self {
        self.core.cfe = Some(CompleteForExecute::default());
        self
    }

    pub fn best_effort(mut self) -> Self {
        let cfe = self.core.cfe.get_or_insert_with(CompleteForExecute::default);
        cfe.best_effort = true;
        self
    }

    pub fn exact_match(mut self) -> Self {
        let cfe = self.core.cfe.get_or_insert_with(CompleteForExecute::default);
        cfe.exact_match = true;
        self
    }

    /// Finish the builder as a shareable graph node.
    pub fn node(self) -> Arc<dyn Processor> {
        Arc::new(self)
    }

    pub(crate) fn into_core(self) -> ArgCore<T> {
        self.core
    }
}

impl<T: ArgValue> Processor for Arg<T> {
    fn name(&self) -> &str {
        &self.core.name
    }

    fn execute(
        &self,
        input: &mut InputTape,
        data: &mut DataBag,
        _out: &mut OutputSink,
        _script: &mut ScriptBuffer,
    ) -> Result<(), CmdError> {
        self.core.execute_at(input, data, 0)
    }

    fn complete(
        &self,
        input: &mut InputTape,
        data: &mut DataBag,
    ) -> Result<Option<Completion>, CmdError> {
        self.core.complete_at(input, data, 0)
    }

    fn usage(&self, usage: &mut Usage) {
        if !self.hidden {
            usage.add_arg(self.core.usage_symbol());
        }
    }
}
