//! Execute Buffer
//!
//! Ordered script lines the host shell is expected to run after the
//! command returns. Distinct from stdout: the shell wrapper sources the
//! file this buffer is written to.

use std::io;
use std::path::Path;

#[derive(Debug, Default, Clone)]
pub struct ScriptBuffer {
    lines: Vec<String>,
}

impl ScriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn extend_lines(&mut self, lines: impl IntoIterator<Item = String>) {
        self.lines.extend(lines);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Write the buffered lines to the caller-supplied tmp-file path.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        let mut contents = self.lines.join("\n");
        contents.push('\n');
        std::fs::write(path, contents)
    }
}
