//! Shortcut Wrapper
//!
//! Wraps a child graph with a shortcut namespace. A keyword at the top of
//! the tape switches into management mode (`a` add, `d` delete, `g` get,
//! `s` set, `l` list); without a keyword the first token is looked up in
//! the store and, on a hit, replaced by the stored token sequence.
//!
//! Add commits to the store before delegating to the child, because the
//! alias payload is the remaining tape; the store keeps the entry even if
//! the child then rejects the payload.

use std::sync::{Arc, Mutex};

use crate::complete::Completion;
use crate::error::CmdError;
use crate::graph::processor::Processor;
use crate::input::InputTape;
use crate::output::{OutputSink, ScriptBuffer};
use crate::run::Usage;
use crate::value::DataBag;
use crate::wrap::store::ShortcutStore;

pub struct ShortcutWrapper {
    namespace: String,
    child: Arc<dyn Processor>,
    store: Arc<Mutex<dyn ShortcutStore>>,
}

impl ShortcutWrapper {
    pub fn new(
        namespace: impl Into<String>,
        child: Arc<dyn Processor>,
        store: Arc<Mutex<dyn ShortcutStore>>,
    ) -> Self {
        Self { namespace: namespace.into(), child, store }
    }

    pub fn node(self) -> Arc<dyn Processor> {
        Arc::new(self)
    }

    fn add(
        &self,
        overwrite: bool,
        input: &mut InputTape,
        data: &mut DataBag,
        out: &mut OutputSink,
        script: &mut ScriptBuffer,
    ) -> Result<(), CmdError> {
        let Some(name) = input.pop() else {
            return Err(CmdError::NotEnoughArgs {
                name: "SHORTCUT".to_string(),
                min: 1,
                got: 0,
            });
        };
        let payload = input.remaining_slice();
        if payload.is_empty() {
            return Err(CmdError::ShortcutGroupEmpty);
        }
        {
            let mut store = self.store.lock().unwrap();
            if !overwrite && store.lookup(&self.namespace, &name).is_some() {
                return Err(CmdError::ShortcutExists(name));
            }
            store.set(&self.namespace, &name, payload);
            store.mark_changed();
        }
        // The child validates (and runs on) the stored payload.
        self.child.execute(input, data, out, script)
    }

    fn delete(&self, input: &mut InputTape, out: &mut OutputSink) -> Result<(), CmdError> {
        let names = input.pop_n(1, None, None);
        if !names.enough {
            return Err(CmdError::NotEnoughArgs {
                name: "SHORTCUT".to_string(),
                min: 1,
                got: 0,
            });
        }
        let mut store = self.store.lock().unwrap();
        for name in &names.tokens {
            if store.remove(&self.namespace, name) {
                store.mark_changed();
                out.stdoutln(format!("Deleted shortcut \"{name}\""));
            } else {
                out.stderrln(CmdError::ShortcutMissing(name.clone()));
            }
        }
        Ok(())
    }

    fn get(&self, input: &mut InputTape, out: &mut OutputSink) -> Result<(), CmdError> {
        let names = input.pop_n(1, None, None);
        if !names.enough {
            return Err(CmdError::NotEnoughArgs {
                name: "SHORTCUT".to_string(),
                min: 1,
                got: 0,
            });
        }
        let mut store = self.store.lock().unwrap();
        for name in &names.tokens {
            match store.lookup(&self.namespace, name) {
                Some(tokens) => out.stdoutln(format!("{name}: {}", tokens.join(" "))),
                None => out.stderrln(CmdError::ShortcutMissing(name.clone())),
            }
        }
        Ok(())
    }

    fn list(&self, out: &mut OutputSink) -> Result<(), CmdError> {
        let mut entries = self.store.lock().unwrap().entries(&self.namespace);
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, tokens) in entries {
            out.stdoutln(format!("{name}: {}", tokens.join(" ")));
        }
        Ok(())
    }

    /// Replace a leading shortcut name with its stored expansion.
    fn expand(&self, input: &mut InputTape) {
        let Some(first) = input.peek().map(|t| t.to_string()) else { return };
        let expansion = self.store.lock().unwrap().lookup(&self.namespace, &first);
        if let Some(tokens) = expansion {
            log::debug!("shortcut {}: expanding \"{}\"", self.namespace, first);
            input.pop();
            input.push_front(&tokens);
        }
    }
}

impl Processor for ShortcutWrapper {
    fn name(&self) -> &str {
        &self.namespace
    }

    fn execute(
        &self,
        input: &mut InputTape,
        data: &mut DataBag,
        out: &mut OutputSink,
        script: &mut ScriptBuffer,
    ) -> Result<(), CmdError> {
        match input.peek() {
            Some("a") => {
                input.pop();
                self.add(false, input, data, out, script)
            }
            Some("s") => {
                input.pop();
                self.add(true, input, data, out, script)
            }
            Some("d") => {
                input.pop();
                self.delete(input, out)
            }
            Some("g") => {
                input.pop();
                self.get(input, out)
            }
            Some("l") => {
                input.pop();
                self.list(out)
            }
            _ => {
                self.expand(input);
                self.child.execute(input, data, out, script)
            }
        }
    }

    fn complete(
        &self,
        input: &mut InputTape,
        data: &mut DataBag,
    ) -> Result<Option<Completion>, CmdError> {
        // Management mode is execute-only; expansion still applies so
        // downstream completion sees the expanded arguments, but never for
        // the token still being typed.
        if !input.front_is_cursor() {
            self.expand(input);
        }
        self.child.complete(input, data)
    }

    fn usage(&self, usage: &mut Usage) {
        self.child.usage(usage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Arg;
    use crate::graph::serial;
    use crate::value::DataBag;
    use crate::wrap::store::MemStore;

    fn child() -> Arc<dyn Processor> {
        serial(vec![Arg::<Vec<String>>::list("ARGS", 0, None).node()])
    }

    fn store() -> Arc<Mutex<MemStore>> {
        Arc::new(Mutex::new(MemStore::new()))
    }

    fn run(
        wrapper: &ShortcutWrapper,
        args: &[&str],
    ) -> (Result<(), CmdError>, OutputSink, DataBag) {
        let mut input = InputTape::new(&args.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        let mut data = DataBag::new();
        let mut out = OutputSink::new();
        let mut script = ScriptBuffer::new();
        let res = wrapper.execute(&mut input, &mut data, &mut out, &mut script);
        (res, out, data)
    }

    #[test]
    fn test_add_then_expand() {
        let store = store();
        let wrapper = ShortcutWrapper::new("demo", child(), store.clone());
        let (res, _, _) = run(&wrapper, &["a", "hey", "hello", "there"]);
        res.unwrap();

        let (res, _, data) = run(&wrapper, &["hey"]);
        res.unwrap();
        assert_eq!(
            data.string_list("ARGS"),
            Some(vec!["hello".to_string(), "there".to_string()])
        );
    }

    #[test]
    fn test_add_existing_fails() {
        let store = store();
        let wrapper = ShortcutWrapper::new("demo", child(), store.clone());
        run(&wrapper, &["a", "x", "one"]).0.unwrap();
        let (res, _, _) = run(&wrapper, &["a", "x", "two"]);
        assert_eq!(res.unwrap_err().to_string(), "Shortcut \"x\" already exists");
    }

    #[test]
    fn test_set_overwrites() {
        let store = store();
        let wrapper = ShortcutWrapper::new("demo", child(), store.clone());
        run(&wrapper, &["a", "x", "one"]).0.unwrap();
        run(&wrapper, &["s", "x", "two"]).0.unwrap();
        let (res, _, data) = run(&wrapper, &["x"]);
        res.unwrap();
        assert_eq!(data.string_list("ARGS"), Some(vec!["two".to_string()]));
    }

    #[test]
    fn test_add_empty_payload_fails() {
        let wrapper = ShortcutWrapper::new("demo", child(), store());
        let (res, _, _) = run(&wrapper, &["a", "x"]);
        assert_eq!(res.unwrap_err().to_string(), "Shortcut must contain at least one token");
    }

    #[test]
    fn test_add_commits_before_child_failure() {
        let store = store();
        let strict_child = serial(vec![Arg::<i64>::new("N").node()]);
        let wrapper = ShortcutWrapper::new("demo", strict_child, store.clone());
        // "oops" fails int parsing in the child, but the shortcut stays.
        let (res, _, _) = run(&wrapper, &["a", "bad", "oops"]);
        assert!(res.is_err());
        assert_eq!(
            store.lock().unwrap().lookup("demo", "bad"),
            Some(vec!["oops".to_string()])
        );
        assert!(ShortcutStore::changed(&*store.lock().unwrap()));
    }

    #[test]
    fn test_delete_reports_per_item() {
        let store = store();
        let wrapper = ShortcutWrapper::new("demo", child(), store.clone());
        run(&wrapper, &["a", "x", "one"]).0.unwrap();
        let (res, out, _) = run(&wrapper, &["d", "x", "missing"]);
        res.unwrap();
        assert_eq!(out.stdout_str(), "Deleted shortcut \"x\"\n");
        assert_eq!(out.stderr_str(), "Shortcut \"missing\" does not exist\n");
    }

    #[test]
    fn test_get_and_list() {
        let store = store();
        let wrapper = ShortcutWrapper::new("demo", child(), store.clone());
        run(&wrapper, &["a", "b", "two", "tokens"]).0.unwrap();
        run(&wrapper, &["a", "a", "one"]).0.unwrap();

        let (res, out, _) = run(&wrapper, &["g", "b"]);
        res.unwrap();
        assert_eq!(out.stdout_str(), "b: two tokens\n");

        let (res, out, _) = run(&wrapper, &["l"]);
        res.unwrap();
        assert_eq!(out.stdout_str(), "a: one\nb: two tokens\n");
    }

    #[test]
    fn test_no_expansion_for_unknown_first_token() {
        let wrapper = ShortcutWrapper::new("demo", child(), store());
        let (res, _, data) = run(&wrapper, &["plain", "args"]);
        res.unwrap();
        assert_eq!(
            data.string_list("ARGS"),
            Some(vec!["plain".to_string(), "args".to_string()])
        );
    }

    #[test]
    fn test_complete_expands_non_cursor_prefix() {
        use crate::complete::ListCompleter;
        let store = store();
        {
            let mut s = store.lock().unwrap();
            s.set("demo", "hey", vec!["expanded".to_string()]);
        }
        let inner = serial(vec![
            Arg::<String>::new("FIRST").node(),
            Arg::<String>::new("SECOND")
                .completer(ListCompleter::new(["expected", "expanded"]))
                .node(),
        ]);
        let wrapper = ShortcutWrapper::new("demo", inner, store);
        let mut input = InputTape::for_completion("hey exp", None);
        let mut data = DataBag::new();
        let completion = wrapper.complete(&mut input, &mut data).unwrap().unwrap();
        assert_eq!(data.string("FIRST"), Some("expanded".to_string()));
        assert_eq!(completion.suggestions.len(), 2);
    }
}
