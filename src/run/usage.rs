//! Usage Rendering
//!
//! Every processor contributes its entries to a usage tree; rendering is a
//! pure function of the static graph and needs no input tape. Hidden
//! arguments and flags simply never contribute.

use indexmap::IndexMap;

/// Usage tree one processor graph contributes to.
#[derive(Debug, Default, Clone)]
pub struct Usage {
    /// Positional symbols in traversal order, e.g. `NAME`, `[TAG ...]`.
    args: Vec<String>,
    /// Rendered flag entries, e.g. `--priority|-p INT`.
    flags: Vec<String>,
    /// Branch key to sub-usage.
    branches: IndexMap<String, Usage>,
}

impl Usage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_arg(&mut self, symbol: impl Into<String>) {
        self.args.push(symbol.into());
    }

    pub fn add_flag(&mut self, entry: impl Into<String>) {
        self.flags.push(entry.into());
    }

    /// Sub-usage for a branch key, created on first access.
    pub fn branch(&mut self, key: impl Into<String>) -> &mut Usage {
        self.branches.entry(key.into()).or_default()
    }

    fn header_line(&self) -> String {
        let mut parts = self.args.clone();
        parts.extend(self.flags.iter().cloned());
        parts.join(" ")
    }

    fn collect(&self, indent: usize, lines: &mut Vec<String>) {
        let header = self.header_line();
        let child_indent = if header.is_empty() { indent } else { indent + 2 };
        if !header.is_empty() {
            lines.push(format!("{}{}", " ".repeat(indent), header));
        }
        self.collect_branches(child_indent, lines);
    }

    fn collect_branches(&self, indent: usize, lines: &mut Vec<String>) {
        for (key, sub) in &self.branches {
            let sub_header = sub.header_line();
            let line = if sub_header.is_empty() {
                key.clone()
            } else {
                format!("{key} {sub_header}")
            };
            lines.push(format!("{}{}", " ".repeat(indent), line));
            sub.collect_branches(indent + 2, lines);
        }
    }

    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        self.collect(0, &mut lines);
        if lines.is_empty() {
            return String::new();
        }
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_and_flags_on_one_line() {
        let mut u = Usage::new();
        u.add_arg("NAME");
        u.add_arg("[TAG ...]");
        u.add_flag("--verbose|-v");
        assert_eq!(u.render(), "NAME [TAG ...] --verbose|-v\n");
    }

    #[test]
    fn test_branches_indent_under_header() {
        let mut u = Usage::new();
        u.add_arg("ROOT");
        u.branch("add").add_arg("KEY");
        u.branch("list");
        assert_eq!(u.render(), "ROOT\n  add KEY\n  list\n");
    }

    #[test]
    fn test_branches_without_header() {
        let mut u = Usage::new();
        u.branch("add").add_arg("KEY");
        u.branch("get").add_arg("KEY");
        assert_eq!(u.render(), "add KEY\nget KEY\n");
    }

    #[test]
    fn test_nested_branches() {
        let mut u = Usage::new();
        let store = u.branch("store");
        store.branch("put").add_arg("K");
        store.branch("del").add_arg("K");
        assert_eq!(u.render(), "store\n  put K\n  del K\n");
    }

    #[test]
    fn test_empty_usage() {
        assert_eq!(Usage::new().render(), "");
    }
}
