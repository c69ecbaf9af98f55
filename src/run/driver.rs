//! Driver
//!
//! Builds the tape for each mode, runs the graph, and turns the result
//! into exit codes, stderr text, and suggestion lines. Errors are printed
//! verbatim with a trailing newline; a successful traversal that leaves
//! tokens on the tape is itself an error.

use std::path::Path;
use std::sync::Arc;

use crate::complete::engine;
use crate::error::CmdError;
use crate::graph::processor::Processor;
use crate::input::InputTape;
use crate::output::{OutputSink, ScriptBuffer};
use crate::value::DataBag;

/// Result of one execute invocation.
#[derive(Debug)]
pub struct ExecOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// The data bag after traversal; failed traversals keep the writes
    /// made before the failure.
    pub data: DataBag,
    /// The script lines the host shell should source.
    pub script: Vec<String>,
}

/// Run the graph in execute mode. Any execute-buffer content is written to
/// `setup_path` for the host shell to source.
pub fn execute(root: &Arc<dyn Processor>, args: &[String], setup_path: Option<&Path>) -> ExecOutcome {
    let mut input = InputTape::new(args);
    let mut data = DataBag::new();
    let mut out = OutputSink::new();
    let mut script = ScriptBuffer::new();

    log::debug!("execute: {} tokens", args.len());
    let result = root.execute(&mut input, &mut data, &mut out, &mut script).and_then(|_| {
        if input.fully_processed() {
            Ok(())
        } else {
            Err(CmdError::UnprocessedExtraArgs(input.remaining_slice()))
        }
    });

    let result = result.and_then(|_| {
        if !script.is_empty() {
            if let Some(path) = setup_path {
                script.write_to(path)?;
            }
        }
        Ok(())
    });

    let exit_code = match result {
        Ok(()) => 0,
        Err(err) => {
            out.stderrln(&err);
            1
        }
    };
    let (stdout, stderr) = out.into_parts();
    ExecOutcome {
        exit_code,
        stdout,
        stderr,
        data,
        script: script.lines().to_vec(),
    }
}

/// Run the graph in complete mode over a raw command line (arguments only,
/// without the program word) and return shell-ready suggestion lines.
pub fn complete_line(
    root: &Arc<dyn Processor>,
    raw_line: &str,
    cursor_char: Option<usize>,
) -> Result<Vec<String>, CmdError> {
    let mut input = InputTape::for_completion(raw_line, cursor_char);
    let cursor_token = input.cursor_text().to_string();
    let open_quote = input.open_quote();
    let mut data = DataBag::new();

    log::debug!("complete: cursor token {:?}", cursor_token);
    let completion = root.complete(&mut input, &mut data)?;
    Ok(match completion {
        Some(completion) => engine::process(&completion, &cursor_token, open_quote),
        None => Vec::new(),
    })
}

/// Render the usage tree. Pure function of the static graph.
pub fn usage(root: &Arc<dyn Processor>) -> String {
    let mut tree = crate::run::usage::Usage::new();
    root.usage(&mut tree);
    tree.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{Arg, BoolFlag, FlagSet};
    use crate::complete::ListCompleter;
    use crate::graph::{executor, serial, Branch, NodeRepeater};
    use crate::value::Value;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn print_node(text: &'static str) -> Arc<dyn Processor> {
        executor(text, move |_, out, _| {
            out.stdoutln(text);
            Ok(())
        })
    }

    #[test]
    fn test_execute_int_arg() {
        let root = serial(vec![Arg::<i64>::new("i").node()]);
        let outcome = execute(&root, &args(&["1_2_3"]), None);
        assert_eq!(outcome.exit_code, 0);
        assert_eq!(outcome.data.int("i"), Some(123));
    }

    #[test]
    fn test_execute_int_arg_parse_error() {
        let root = serial(vec![Arg::<i64>::new("i").node()]);
        let outcome = execute(&root, &args(&["1__23"]), None);
        assert_eq!(outcome.exit_code, 1);
        assert_eq!(outcome.stderr, "parsing \"1__23\": invalid digit found in string\n");
    }

    #[test]
    fn test_unprocessed_extra_args() {
        let root = serial(vec![Arg::<String>::new("s").node()]);
        let outcome = execute(&root, &args(&["ok", "extra", "more"]), None);
        assert_eq!(outcome.exit_code, 1);
        assert_eq!(outcome.stderr, "Unprocessed extra args: [extra more]\n");
    }

    #[test]
    fn test_branch_synonym_dispatch() {
        let root: Arc<dyn Processor> = Arc::new(
            Branch::new(vec![("h", print_node("hello")), ("b bee B", print_node("goodbye"))])
                .with_default(print_node("default")),
        );
        let outcome = execute(&root, &args(&["B"]), None);
        assert_eq!(outcome.stdout, "goodbye\n");

        let outcome = execute(&root, &args(&["uh"]), None);
        // The default node runs (and prints) before the unconsumed token
        // is reported.
        assert_eq!(outcome.stdout, "default\n");
        assert_eq!(outcome.exit_code, 1);
        assert_eq!(outcome.stderr, "Unprocessed extra args: [uh]\n");
    }

    #[test]
    fn test_branch_default_consumes_token() {
        let default = serial(vec![Arg::<String>::new("ANY").node(), print_node("default")]);
        let root: Arc<dyn Processor> = Arc::new(
            Branch::new(vec![("h", print_node("hello"))]).with_default(default),
        );
        let outcome = execute(&root, &args(&["uh"]), None);
        assert_eq!(outcome.exit_code, 0);
        assert_eq!(outcome.stdout, "default\n");
        assert_eq!(outcome.data.string("ANY"), Some("uh".to_string()));
    }

    #[test]
    fn test_branch_no_default_invalid_key() {
        let root: Arc<dyn Processor> = Arc::new(Branch::new(vec![
            ("h", print_node("hello")),
            ("b", print_node("goodbye")),
        ]));
        let outcome = execute(&root, &args(&["uh"]), None);
        assert_eq!(outcome.exit_code, 1);
        assert_eq!(outcome.stderr, "Branching argument must be one of [b h]\n");
    }

    #[test]
    fn test_node_repeater_key_values() {
        let inner = vec![
            Arg::<String>::new("KEY")
                .setter(|v, data| {
                    let mut list = data.string_list("keys").unwrap_or_default();
                    list.push(v);
                    data.insert("keys", Value::StringList(list));
                })
                .node(),
            Arg::<i64>::new("VALUE")
                .setter(|v, data| {
                    let mut list = data.int_list("values").unwrap_or_default();
                    list.push(v);
                    data.insert("values", Value::IntList(list));
                })
                .node(),
        ];
        let root: Arc<dyn Processor> =
            Arc::new(NodeRepeater::new(inner, 2).optional(1));

        let outcome = execute(&root, &args(&["k1", "100", "k2", "200", "k3", "300"]), None);
        assert_eq!(outcome.exit_code, 0);
        assert_eq!(
            outcome.data.string_list("keys"),
            Some(vec!["k1".to_string(), "k2".to_string(), "k3".to_string()])
        );
        assert_eq!(outcome.data.int_list("values"), Some(vec![100, 200, 300]));

        let outcome = execute(&root, &args(&["k1", "100", "k2"]), None);
        assert_eq!(outcome.exit_code, 1);
        assert_eq!(outcome.stderr, "Argument \"VALUE\" requires at least 1 argument, got 0\n");
    }

    #[test]
    fn test_node_repeater_stops_at_max() {
        let inner = vec![Arg::<String>::new("K")
            .setter(|v, data| {
                let mut list = data.string_list("ks").unwrap_or_default();
                list.push(v);
                data.insert("ks", Value::StringList(list));
            })
            .node()];
        let root: Arc<dyn Processor> = Arc::new(NodeRepeater::new(inner, 1).optional(1));
        let outcome = execute(&root, &args(&["a", "b", "c"]), None);
        // Two iterations consume a and b; c is extra.
        assert_eq!(outcome.exit_code, 1);
        assert_eq!(outcome.stderr, "Unprocessed extra args: [c]\n");
    }

    #[test]
    fn test_multi_flag_scenario() {
        use crate::args::BoolValueFlag;
        let root = serial(vec![FlagSet::new(vec![
            BoolFlag::new("quick", 'q').def(),
            BoolFlag::new("where", 'w').def(),
            BoolFlag::new("everyone", 'e').def(),
            BoolValueFlag::new("run", 'r', "hello there".to_string()).def(),
        ])
        .node()]);
        let outcome = execute(&root, &args(&["-qwer"]), None);
        assert_eq!(outcome.exit_code, 0);
        assert_eq!(outcome.data.boolean("quick"), Some(true));
        assert_eq!(outcome.data.boolean("where"), Some(true));
        assert_eq!(outcome.data.boolean("everyone"), Some(true));
        assert_eq!(outcome.data.string("run"), Some("hello there".to_string()));
    }

    #[test]
    fn test_list_breaker_scenario() {
        let root = serial(vec![
            Arg::<Vec<String>>::list("SL", 1, None).breaker("ghi", false).node(),
            Arg::<Vec<String>>::list("SL2", 0, None).node(),
        ]);
        let outcome = execute(&root, &args(&["abc", "def", "ghi", "jkl"]), None);
        assert_eq!(outcome.exit_code, 0);
        assert_eq!(
            outcome.data.string_list("SL"),
            Some(vec!["abc".to_string(), "def".to_string()])
        );
        assert_eq!(
            outcome.data.string_list("SL2"),
            Some(vec!["ghi".to_string(), "jkl".to_string()])
        );
    }

    #[test]
    fn test_setup_file_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setup");
        let root = executor("cd", |_, _, script| {
            script.push_line("cd /somewhere");
            Ok(())
        });
        let outcome = execute(&root, &[], Some(&path));
        assert_eq!(outcome.exit_code, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "cd /somewhere\n");
    }

    #[test]
    fn test_setup_file_not_written_when_buffer_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setup");
        let root = print_node("hi");
        let outcome = execute(&root, &[], Some(&path));
        assert_eq!(outcome.exit_code, 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_complete_line_end_to_end() {
        let root = serial(vec![Arg::<String>::new("s")
            .completer(ListCompleter::new(["alpha", "beta"]))
            .node()]);
        let out = complete_line(&root, "al", None).unwrap();
        assert_eq!(out, vec!["alpha", " "]);
    }

    #[test]
    fn test_complete_second_arg() {
        let root = serial(vec![
            Arg::<String>::new("first").node(),
            Arg::<String>::new("second")
                .completer(ListCompleter::new(["one", "two"]))
                .node(),
        ]);
        let out = complete_line(&root, "x t", None).unwrap();
        assert_eq!(out, vec!["two", " "]);
    }

    #[test]
    fn test_complete_quoted() {
        let root = serial(vec![Arg::<String>::new("s")
            .completer(ListCompleter::new(["First Choice", "Fifth"]))
            .node()]);
        let out = complete_line(&root, "\"Fi", None).unwrap();
        assert_eq!(out, vec!["Fifth", "\"First Choice\""]);
    }

    #[test]
    fn test_complete_branch_keys() {
        let root: Arc<dyn Processor> = Arc::new(Branch::new(vec![
            ("hello", print_node("hello")),
            ("help", print_node("help")),
            ("bye", print_node("bye")),
        ]));
        let out = complete_line(&root, "hel", None).unwrap();
        assert_eq!(out, vec!["hello", "help", " "]);
        let out = complete_line(&root, "he", None).unwrap();
        assert_eq!(out, vec!["hel", "hel_"]);
        let out = complete_line(&root, "b", None).unwrap();
        assert_eq!(out, vec!["bye", " "]);
    }

    #[test]
    fn test_complete_for_execute_matches_typed_suggestion() {
        // Property: resolving through the completer stores the same value
        // as typing the full suggestion.
        let completed = serial(vec![Arg::<String>::new("s")
            .completer(ListCompleter::new(["alpha", "beta"]))
            .complete_for_execute()
            .node()]);
        let typed = serial(vec![Arg::<String>::new("s").node()]);
        let via_cfe = execute(&completed, &args(&["al"]), None);
        let via_typing = execute(&typed, &args(&["alpha"]), None);
        assert_eq!(via_cfe.data.string("s"), via_typing.data.string("s"));
    }

    #[test]
    fn test_usage_rendering() {
        let root = serial(vec![
            Arg::<String>::new("NAME").node(),
            Arg::<Vec<String>>::list("TAG", 0, None).node(),
            FlagSet::new(vec![BoolFlag::new("verbose", 'v').def()]).node(),
        ]);
        assert_eq!(usage(&root), "NAME [TAG ...] --verbose|-v\n");
    }

    #[test]
    fn test_usage_hidden_arg() {
        let root = serial(vec![
            Arg::<String>::new("SHOWN").node(),
            Arg::<String>::new("HIDDEN").hide_usage().node(),
        ]);
        assert_eq!(usage(&root), "SHOWN\n");
    }
}
