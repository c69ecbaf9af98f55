//! In-memory filesystem.
//!
//! A directory map for hosts that embed the framework without touching the
//! real filesystem, and for completion tests. Directory paths are stored
//! normalized without trailing slashes; `""` and `.` name the root.

use std::collections::BTreeMap;
use std::io;

use super::types::{DirEntry, FileSystem};

#[derive(Debug, Default, Clone)]
pub struct MemFs {
    dirs: BTreeMap<String, Vec<DirEntry>>,
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed {
        "" | "." => String::new(),
        other => other.strip_prefix("./").unwrap_or(other).to_string(),
    }
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a directory. Entry names ending in `/` are subdirectories.
    pub fn with_dir(mut self, path: &str, entries: &[&str]) -> Self {
        let mut listed: Vec<DirEntry> = entries
            .iter()
            .map(|e| match e.strip_suffix('/') {
                Some(name) => DirEntry::dir(name),
                None => DirEntry::file(*e),
            })
            .collect();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        self.dirs.insert(normalize(path), listed);
        self
    }
}

impl FileSystem for MemFs {
    fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        self.dirs
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no such directory: {path}")))
    }

    fn abs_path(&self, path: &str) -> io::Result<String> {
        if path.starts_with('/') {
            Ok(path.to_string())
        } else {
            Ok(format!("/{}", normalize(path)))
        }
    }

    fn is_dir(&self, path: &str) -> bool {
        self.dirs.contains_key(&normalize(path))
    }
}
