//! Completion Engine
//!
//! Turns a completion record plus the cursor token into the ordered
//! suggestion list the host shell presents. The pipeline order is fixed:
//! distinct filter, case policy, prefix match, autofill, sorting, quoting,
//! trailing-space sentinel.
//!
//! Two output shapes are special:
//! - the autofill pair `<prefix>` / `<prefix>_` tells the wrapper to
//!   complete a common prefix without appending a space
//! - a lone `" "` line tells the wrapper to append a trailing space

use crate::error::CmdError;
use crate::input::lexer::Delimiter;
use crate::value::bag::DataBag;

/// Characters that make a suggestion unsafe as a bare shell word.
const SHELL_META: &str = " \t\"'`$&|;<>()*?[]#~";

/// What a processor knows about completing the cursor token.
#[derive(Debug, Default, Clone)]
pub struct Completion {
    pub suggestions: Vec<String>,
    /// Drop suggestions equal to an already-bound value.
    pub distinct: bool,
    pub case_insensitive: bool,
    /// Values already bound for this argument (earlier list elements).
    pub exclude: Vec<String>,
    /// Suggestions are pre-matched and pre-shaped (file completion); the
    /// engine skips the case/prefix/autofill steps.
    pub raw: bool,
}

impl Completion {
    pub fn new<I, S>(suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suggestions: suggestions.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }
}

/// Produces a completion record for a cursor prefix.
pub trait Completer: Send + Sync {
    fn complete(&self, prefix: &str, data: &DataBag) -> Result<Completion, CmdError>;
}

impl<F> Completer for F
where
    F: Fn(&str, &DataBag) -> Result<Completion, CmdError> + Send + Sync,
{
    fn complete(&self, prefix: &str, data: &DataBag) -> Result<Completion, CmdError> {
        self(prefix, data)
    }
}

/// Completes from a fixed suggestion list.
#[derive(Debug, Clone)]
pub struct ListCompleter {
    items: Vec<String>,
    distinct: bool,
    case_insensitive: bool,
}

impl ListCompleter {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            distinct: false,
            case_insensitive: false,
        }
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }
}

impl Completer for ListCompleter {
    fn complete(&self, _prefix: &str, _data: &DataBag) -> Result<Completion, CmdError> {
        let mut c = Completion::new(self.items.clone());
        c.distinct = self.distinct;
        c.case_insensitive = self.case_insensitive;
        Ok(c)
    }
}

/// Longest common prefix of a non-empty slice, on char boundaries.
pub(crate) fn common_prefix(items: &[String]) -> String {
    let first = &items[0];
    let mut end = first.len();
    for item in &items[1..] {
        let shared = first
            .char_indices()
            .zip(item.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map(|((i, a), _)| i + a.len_utf8())
            .unwrap_or(0);
        end = end.min(shared);
    }
    first[..end].to_string()
}

/// Prefix filtering and distinct/exclude filtering, shared with the
/// complete-for-execute pre-step.
pub(crate) fn filter_matches(completion: &Completion, cursor: &str) -> Vec<String> {
    let mut list = completion.suggestions.clone();
    if completion.distinct {
        list.retain(|s| !completion.exclude.contains(s));
    }
    if completion.raw {
        return list;
    }
    if completion.case_insensitive {
        let folded = cursor.to_lowercase();
        list.retain(|s| s.to_lowercase().starts_with(&folded));
        return list;
    }
    let exact: Vec<String> = list.iter().filter(|s| s.starts_with(cursor)).cloned().collect();
    if !exact.is_empty() || cursor.is_empty() {
        return exact;
    }
    // Nothing matched the typed casing; fall back to case-insensitive
    // matching without rewriting suggestion casing.
    let folded = cursor.to_lowercase();
    list.retain(|s| s.to_lowercase().starts_with(&folded));
    list
}

fn needs_quoting(s: &str) -> bool {
    s.chars().any(|c| SHELL_META.contains(c))
}

fn quote_in(s: &str, delim: Delimiter) -> String {
    if !needs_quoting(s) {
        return s.to_string();
    }
    match delim {
        Delimiter::Double => {
            let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
            format!("\"{escaped}\"")
        }
        Delimiter::Single => {
            let escaped = s.replace('\'', "'\\''");
            format!("'{escaped}'")
        }
    }
}

fn escape_bare(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if SHELL_META.contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn is_autofill_pair(list: &[String]) -> bool {
    list.len() == 2 && list[1] == format!("{}_", list[0])
}

/// Post-process a completion record into shell-ready suggestion lines.
pub fn process(completion: &Completion, cursor: &str, open_quote: Option<Delimiter>) -> Vec<String> {
    let mut list = filter_matches(completion, cursor);

    let mut autofilled = completion.raw && is_autofill_pair(&list);
    if !completion.raw && list.len() >= 2 {
        let common = common_prefix(&list);
        if common.len() > cursor.len() {
            list = vec![common.clone(), format!("{common}_")];
            autofilled = true;
        }
    }

    if autofilled {
        return list;
    }

    list.sort_by_key(|s| s.to_lowercase());
    list = match open_quote {
        Some(delim) => list.iter().map(|s| quote_in(s, delim)).collect(),
        None => list.iter().map(|s| escape_bare(s)).collect(),
    };
    if open_quote.is_none() && !list.is_empty() {
        list.push(" ".to_string());
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion(items: &[&str]) -> Completion {
        Completion::new(items.iter().copied())
    }

    #[test]
    fn test_prefix_match_and_space_sentinel() {
        let out = process(&completion(&["alpha", "beta"]), "al", None);
        assert_eq!(out, vec!["alpha", " "]);
    }

    #[test]
    fn test_no_match_is_silent() {
        let out = process(&completion(&["alpha", "beta"]), "zz", None);
        assert!(out.is_empty());
    }

    #[test]
    fn test_autofill_pair_on_common_prefix() {
        let out = process(&completion(&["dir1", "dir2", "dir3"]), "d", None);
        assert_eq!(out, vec!["dir", "dir_"]);
    }

    #[test]
    fn test_no_autofill_when_prefix_not_longer() {
        let out = process(&completion(&["dir1", "dir2"]), "dir", None);
        assert_eq!(out, vec!["dir1", "dir2", " "]);
    }

    #[test]
    fn test_single_match_gets_space() {
        let out = process(&completion(&["alpha", "beta"]), "b", None);
        assert_eq!(out, vec!["beta", " "]);
    }

    #[test]
    fn test_distinct_filter() {
        let mut c = completion(&["a", "b", "c"]).distinct();
        c.exclude = vec!["b".to_string()];
        let out = process(&c, "", None);
        assert_eq!(out, vec!["a", "c", " "]);
    }

    #[test]
    fn test_distinct_filter_idempotent() {
        let mut c = completion(&["a", "b"]).distinct();
        c.exclude = vec!["b".to_string()];
        let once = filter_matches(&c, "");
        let mut again = c.clone();
        again.suggestions = once.clone();
        assert_eq!(filter_matches(&again, ""), once);
    }

    #[test]
    fn test_case_sensitive_prefers_exact_case() {
        let out = process(&completion(&["Apple", "apricot"]), "ap", None);
        assert_eq!(out, vec!["apricot", " "]);
    }

    #[test]
    fn test_case_sensitive_falls_back_to_insensitive() {
        let out = process(&completion(&["Apple", "Avocado"]), "ap", None);
        assert_eq!(out, vec!["Apple", " "]);
    }

    #[test]
    fn test_case_insensitive_record() {
        let out = process(&completion(&["Apple", "apricot"]).case_insensitive(), "AP", None);
        assert_eq!(out, vec!["Apple", "apricot", " "]);
    }

    #[test]
    fn test_empty_cursor_returns_all_sorted() {
        let out = process(&completion(&["bravo", "Alpha", "charlie"]), "", None);
        assert_eq!(out, vec!["Alpha", "bravo", "charlie", " "]);
    }

    #[test]
    fn test_quoted_completion_wraps_only_when_needed() {
        let out = process(
            &completion(&["First Choice", "Fifth"]),
            "Fi",
            Some(Delimiter::Double),
        );
        assert_eq!(out, vec!["Fifth", "\"First Choice\""]);
    }

    #[test]
    fn test_single_quote_wrapping() {
        let out = process(&completion(&["a b"]), "a", Some(Delimiter::Single));
        assert_eq!(out, vec!["'a b'"]);
    }

    #[test]
    fn test_bare_escaping_of_spaces() {
        let out = process(&completion(&["a b"]), "a", None);
        assert_eq!(out, vec!["a\\ b", " "]);
    }

    #[test]
    fn test_no_space_sentinel_inside_quotes() {
        let out = process(&completion(&["Fifth"]), "Fi", Some(Delimiter::Double));
        assert_eq!(out, vec!["Fifth"]);
    }

    #[test]
    fn test_raw_skips_prefix_filter() {
        let mut c = completion(&["dir1/", "dir2/"]);
        c.raw = true;
        let out = process(&c, "testdata/dir", None);
        assert_eq!(out, vec!["dir1/", "dir2/", " "]);
    }

    #[test]
    fn test_raw_autofill_pair_passthrough() {
        let mut c = completion(&["testdata/dir", "testdata/dir_"]);
        c.raw = true;
        let out = process(&c, "testdata/d", None);
        assert_eq!(out, vec!["testdata/dir", "testdata/dir_"]);
    }

    #[test]
    fn test_common_prefix() {
        let items: Vec<String> =
            ["dir1", "dir2", "dir3"].iter().map(|s| s.to_string()).collect();
        assert_eq!(common_prefix(&items), "dir");
        let no_common: Vec<String> = ["abc", "xyz"].iter().map(|s| s.to_string()).collect();
        assert_eq!(common_prefix(&no_common), "");
    }
}
