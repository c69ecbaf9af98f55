//! File Completion
//!
//! Completes a path-shaped cursor token from a directory listing obtained
//! through the filesystem seam. The cursor token splits into a dir part
//! (listed) and a basename prefix (matched); directories are suggested
//! with a trailing `/` so the user can keep typing into them.

use std::sync::Arc;

use regex_lite::Regex;

use crate::complete::engine::{common_prefix, Completer, Completion};
use crate::error::CmdError;
use crate::fsys::{DirEntry, FileSystem};
use crate::value::bag::DataBag;

type IgnoreFn = dyn Fn(&str, &str, &DataBag) -> bool + Send + Sync;

pub struct FileCompleter {
    fsys: Arc<dyn FileSystem>,
    start_dir: String,
    filter: Option<Regex>,
    ignore: Option<Box<IgnoreFn>>,
    /// Extension filter, applied to files only.
    extensions: Vec<String>,
    ignore_directories: bool,
    ignore_files: bool,
    distinct: bool,
}

impl FileCompleter {
    pub fn new(fsys: Arc<dyn FileSystem>) -> Self {
        Self {
            fsys,
            start_dir: ".".to_string(),
            filter: None,
            ignore: None,
            extensions: Vec::new(),
            ignore_directories: false,
            ignore_files: false,
            distinct: false,
        }
    }

    pub fn start_dir(mut self, dir: impl Into<String>) -> Self {
        self.start_dir = dir.into();
        self
    }

    pub fn filter(mut self, regex: Regex) -> Self {
        self.filter = Some(regex);
        self
    }

    pub fn ignore<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &str, &DataBag) -> bool + Send + Sync + 'static,
    {
        self.ignore = Some(Box::new(f));
        self
    }

    pub fn extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = exts.into_iter().map(Into::into).collect();
        self
    }

    pub fn ignore_directories(mut self) -> Self {
        self.ignore_directories = true;
        self
    }

    pub fn ignore_files(mut self) -> Self {
        self.ignore_files = true;
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    fn keep(&self, full_path: &str, entry: &DirEntry, data: &DataBag) -> bool {
        if entry.is_dir && self.ignore_directories {
            return false;
        }
        if !entry.is_dir && self.ignore_files {
            return false;
        }
        if let Some(re) = &self.filter {
            if !re.is_match(&entry.name) {
                return false;
            }
        }
        if !entry.is_dir && !self.extensions.is_empty() {
            let matched = self
                .extensions
                .iter()
                .any(|ext| entry.name.ends_with(&format!(".{}", ext.trim_start_matches('.'))));
            if !matched {
                return false;
            }
        }
        if let Some(ignore) = &self.ignore {
            if ignore(full_path, &entry.name, data) {
                return false;
            }
        }
        true
    }

    fn raw(&self, suggestions: Vec<String>) -> Completion {
        let mut c = Completion::new(suggestions);
        c.raw = true;
        c.distinct = self.distinct;
        c
    }
}

impl Completer for FileCompleter {
    fn complete(&self, prefix: &str, data: &DataBag) -> Result<Completion, CmdError> {
        // Split the cursor token into the directory to list and the
        // basename prefix to match.
        let (dir_part, base) = match prefix.rfind('/') {
            Some(pos) => (&prefix[..pos + 1], &prefix[pos + 1..]),
            None => ("", prefix),
        };
        let list_path = if dir_part.starts_with('/') {
            dir_part.to_string()
        } else if dir_part.is_empty() {
            self.start_dir.clone()
        } else {
            format!("{}/{}", self.start_dir.trim_end_matches('/'), dir_part)
        };

        let Ok(entries) = self.fsys.read_dir(&list_path) else {
            return Ok(self.raw(Vec::new()));
        };
        let entries: Vec<DirEntry> = entries
            .into_iter()
            .filter(|e| {
                let full = format!("{}/{}", list_path.trim_end_matches('/'), e.name);
                self.keep(&full, e, data)
            })
            .collect();

        // Exact-case matches win; fall back to case-insensitive only when
        // no entry matches the typed casing.
        let exact: Vec<&DirEntry> =
            entries.iter().filter(|e| e.name.starts_with(base)).collect();
        let matches: Vec<&DirEntry> = if !exact.is_empty() || base.is_empty() {
            exact
        } else {
            let folded = base.to_lowercase();
            entries.iter().filter(|e| e.name.to_lowercase().starts_with(&folded)).collect()
        };

        match matches.len() {
            0 => Ok(self.raw(Vec::new())),
            1 => {
                let entry = matches[0];
                let full = format!("{dir_part}{}", entry.name);
                if entry.is_dir {
                    // Complete through the slash without a trailing space.
                    Ok(self.raw(vec![format!("{full}/"), format!("{full}/_")]))
                } else {
                    Ok(self.raw(vec![full]))
                }
            }
            _ => {
                let names: Vec<String> = matches.iter().map(|e| e.name.clone()).collect();
                let common = common_prefix(&names);
                if common.len() > base.len() {
                    let full = format!("{dir_part}{common}");
                    Ok(self.raw(vec![full.clone(), format!("{full}_")]))
                } else {
                    // Divergence right at the cursor: show basenames, with
                    // directories marked by a trailing slash.
                    let shown = matches
                        .iter()
                        .map(|e| {
                            if e.is_dir {
                                format!("{}/", e.name)
                            } else {
                                e.name.clone()
                            }
                        })
                        .collect();
                    Ok(self.raw(shown))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complete::engine::process;
    use crate::fsys::MemFs;

    fn completer(fsys: MemFs) -> FileCompleter {
        FileCompleter::new(Arc::new(fsys))
    }

    fn testdata() -> MemFs {
        MemFs::new()
            .with_dir(".", &["testdata/"])
            .with_dir("testdata", &["dir1/", "dir2/", "dir3/", "dir4/"])
    }

    #[test]
    fn test_divergent_basenames_with_trailing_space() {
        let c = completer(testdata());
        let completion = c.complete("testdata/dir", &DataBag::new()).unwrap();
        let out = process(&completion, "testdata/dir", None);
        assert_eq!(out, vec!["dir1/", "dir2/", "dir3/", "dir4/", " "]);
    }

    #[test]
    fn test_common_prefix_autofill_pair() {
        let c = completer(testdata());
        let completion = c.complete("testdata/d", &DataBag::new()).unwrap();
        let out = process(&completion, "testdata/d", None);
        assert_eq!(out, vec!["testdata/dir", "testdata/dir_"]);
    }

    #[test]
    fn test_single_directory_completes_through_slash() {
        let fsys = MemFs::new().with_dir("testdata", &["dir1/", "file.txt"]);
        let c = completer(fsys);
        let completion = c.complete("testdata/di", &DataBag::new()).unwrap();
        let out = process(&completion, "testdata/di", None);
        assert_eq!(out, vec!["testdata/dir1/", "testdata/dir1/_"]);
    }

    #[test]
    fn test_single_file_completes_with_space() {
        let fsys = MemFs::new().with_dir("testdata", &["dir1/", "file.txt"]);
        let c = completer(fsys);
        let completion = c.complete("testdata/f", &DataBag::new()).unwrap();
        let out = process(&completion, "testdata/f", None);
        assert_eq!(out, vec!["testdata/file.txt", " "]);
    }

    #[test]
    fn test_missing_directory_is_silent() {
        let c = completer(MemFs::new());
        let completion = c.complete("nope/x", &DataBag::new()).unwrap();
        assert!(completion.is_empty());
    }

    #[test]
    fn test_extension_filter_applies_to_files_only() {
        let fsys = MemFs::new().with_dir(".", &["a.txt", "b.log", "sub/"]);
        let c = completer(fsys).extensions(["txt"]);
        let completion = c.complete("", &DataBag::new()).unwrap();
        assert_eq!(completion.suggestions, vec!["a.txt", "sub/"]);
    }

    #[test]
    fn test_ignore_directories() {
        let fsys = MemFs::new().with_dir(".", &["a.txt", "ab.txt", "sub/"]);
        let c = completer(fsys).ignore_directories();
        let completion = c.complete("", &DataBag::new()).unwrap();
        assert_eq!(completion.suggestions, vec!["a.txt", "ab.txt"]);
    }

    #[test]
    fn test_regex_filter() {
        let fsys = MemFs::new().with_dir(".", &["one.rs", "two.rs", "three.txt"]);
        let c = completer(fsys).filter(Regex::new(r"\.rs$").unwrap());
        let completion = c.complete("t", &DataBag::new()).unwrap();
        assert_eq!(completion.suggestions, vec!["two.rs"]);
    }

    #[test]
    fn test_ignore_predicate() {
        let fsys = MemFs::new().with_dir(".", &["keep.txt", "skip.txt"]);
        let c = completer(fsys).ignore(|_full, base, _data| base.starts_with("skip"));
        let completion = c.complete("", &DataBag::new()).unwrap();
        assert_eq!(completion.suggestions, vec!["keep.txt"]);
    }

    #[test]
    fn test_case_insensitive_fallback() {
        let fsys = MemFs::new().with_dir(".", &["README.md", "Makefile"]);
        let c = completer(fsys);
        let completion = c.complete("read", &DataBag::new()).unwrap();
        assert_eq!(completion.suggestions, vec!["README.md"]);
    }

    #[test]
    fn test_exact_case_preferred_over_insensitive() {
        let fsys = MemFs::new().with_dir(".", &["readme.md", "README.md"]);
        let c = completer(fsys);
        let completion = c.complete("read", &DataBag::new()).unwrap();
        assert_eq!(completion.suggestions, vec!["readme.md"]);
    }

    #[test]
    fn test_absolute_dir_part() {
        let fsys = MemFs::new().with_dir("/etc", &["hosts", "hostname"]);
        let c = completer(fsys);
        let completion = c.complete("/etc/hosts", &DataBag::new()).unwrap();
        assert_eq!(completion.suggestions, vec!["/etc/hosts"]);
    }

    #[test]
    fn test_multiple_with_empty_base_lists_all() {
        let c = completer(testdata());
        let completion = c.complete("testdata/", &DataBag::new()).unwrap();
        // All four share the "dir" prefix, longer than the empty base.
        let out = process(&completion, "testdata/", None);
        assert_eq!(out, vec!["testdata/dir", "testdata/dir_"]);
    }
}
