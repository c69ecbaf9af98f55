//! Key/Value Stores
//!
//! The engine never imposes a backing format; it consumes these two store
//! interfaces and the host binds them. `JsonFileStore` is the disk binding
//! the demo binary uses (one JSON document, loaded lazily on first access,
//! persisted only when marked changed). `MemStore` backs tests and
//! embedded hosts.

use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Namespaced shortcut storage: namespace -> name -> token vector.
pub trait ShortcutStore: Send {
    fn lookup(&mut self, namespace: &str, name: &str) -> Option<Vec<String>>;
    fn set(&mut self, namespace: &str, name: &str, tokens: Vec<String>);
    fn remove(&mut self, namespace: &str, name: &str) -> bool;
    fn entries(&mut self, namespace: &str) -> Vec<(String, Vec<String>)>;
    fn mark_changed(&mut self);
    fn changed(&self) -> bool;
}

/// Namespaced last-run storage: namespace -> token vector.
pub trait CacheStore: Send {
    fn get(&mut self, namespace: &str) -> Option<Vec<String>>;
    fn put(&mut self, namespace: &str, tokens: Vec<String>);
    fn mark_changed(&mut self);
    fn changed(&self) -> bool;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDoc {
    #[serde(default)]
    shortcuts: IndexMap<String, IndexMap<String, Vec<String>>>,
    #[serde(default)]
    caches: IndexMap<String, Vec<String>>,
}

/// In-memory store for tests and embedded hosts.
#[derive(Debug, Default)]
pub struct MemStore {
    doc: StoreDoc,
    changed: bool,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShortcutStore for MemStore {
    fn lookup(&mut self, namespace: &str, name: &str) -> Option<Vec<String>> {
        self.doc.shortcuts.get(namespace).and_then(|m| m.get(name)).cloned()
    }

    fn set(&mut self, namespace: &str, name: &str, tokens: Vec<String>) {
        self.doc
            .shortcuts
            .entry(namespace.to_string())
            .or_default()
            .insert(name.to_string(), tokens);
    }

    fn remove(&mut self, namespace: &str, name: &str) -> bool {
        self.doc
            .shortcuts
            .get_mut(namespace)
            .map(|m| m.shift_remove(name).is_some())
            .unwrap_or(false)
    }

    fn entries(&mut self, namespace: &str) -> Vec<(String, Vec<String>)> {
        self.doc
            .shortcuts
            .get(namespace)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    fn mark_changed(&mut self) {
        self.changed = true;
    }

    fn changed(&self) -> bool {
        self.changed
    }
}

impl CacheStore for MemStore {
    fn get(&mut self, namespace: &str) -> Option<Vec<String>> {
        self.doc.caches.get(namespace).cloned()
    }

    fn put(&mut self, namespace: &str, tokens: Vec<String>) {
        self.doc.caches.insert(namespace.to_string(), tokens);
    }

    fn mark_changed(&mut self) {
        self.changed = true;
    }

    fn changed(&self) -> bool {
        self.changed
    }
}

/// Disk-backed store holding shortcuts and caches in one JSON document.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    doc: Option<StoreDoc>,
    changed: bool,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), doc: None, changed: false }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lazy load on first access; a missing or unreadable file starts
    /// empty.
    fn doc(&mut self) -> &mut StoreDoc {
        if self.doc.is_none() {
            let doc = std::fs::read_to_string(&self.path)
                .ok()
                .and_then(|text| serde_json::from_str(&text).ok())
                .unwrap_or_default();
            self.doc = Some(doc);
        }
        self.doc.as_mut().unwrap()
    }

    /// Persist the document if anything was marked changed.
    pub fn save(&mut self) -> io::Result<()> {
        if !self.changed {
            return Ok(());
        }
        let doc = self.doc();
        let text = serde_json::to_string_pretty(doc)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(&self.path, text)?;
        self.changed = false;
        Ok(())
    }
}

impl ShortcutStore for JsonFileStore {
    fn lookup(&mut self, namespace: &str, name: &str) -> Option<Vec<String>> {
        self.doc().shortcuts.get(namespace).and_then(|m| m.get(name)).cloned()
    }

    fn set(&mut self, namespace: &str, name: &str, tokens: Vec<String>) {
        self.doc()
            .shortcuts
            .entry(namespace.to_string())
            .or_default()
            .insert(name.to_string(), tokens);
    }

    fn remove(&mut self, namespace: &str, name: &str) -> bool {
        self.doc()
            .shortcuts
            .get_mut(namespace)
            .map(|m| m.shift_remove(name).is_some())
            .unwrap_or(false)
    }

    fn entries(&mut self, namespace: &str) -> Vec<(String, Vec<String>)> {
        self.doc()
            .shortcuts
            .get(namespace)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    fn mark_changed(&mut self) {
        self.changed = true;
    }

    fn changed(&self) -> bool {
        self.changed
    }
}

impl CacheStore for JsonFileStore {
    fn get(&mut self, namespace: &str) -> Option<Vec<String>> {
        self.doc().caches.get(namespace).cloned()
    }

    fn put(&mut self, namespace: &str, tokens: Vec<String>) {
        self.doc().caches.insert(namespace.to_string(), tokens);
    }

    fn mark_changed(&mut self) {
        self.changed = true;
    }

    fn changed(&self) -> bool {
        self.changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_mem_store_shortcuts() {
        let mut store = MemStore::new();
        assert!(ShortcutStore::lookup(&mut store, "ns", "x").is_none());
        store.set("ns", "x", toks(&["a", "b"]));
        assert_eq!(ShortcutStore::lookup(&mut store, "ns", "x"), Some(toks(&["a", "b"])));
        assert!(store.remove("ns", "x"));
        assert!(!store.remove("ns", "x"));
    }

    #[test]
    fn test_mem_store_namespaces_isolated() {
        let mut store = MemStore::new();
        store.set("one", "x", toks(&["a"]));
        assert!(ShortcutStore::lookup(&mut store, "two", "x").is_none());
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stores.json");
        {
            let mut store = JsonFileStore::new(&path);
            store.set("ns", "gc", toks(&["git", "commit"]));
            CacheStore::put(&mut store, "ns", toks(&["last", "run"]));
            ShortcutStore::mark_changed(&mut store);
            store.save().unwrap();
        }
        let mut store = JsonFileStore::new(&path);
        assert_eq!(
            ShortcutStore::lookup(&mut store, "ns", "gc"),
            Some(toks(&["git", "commit"]))
        );
        assert_eq!(CacheStore::get(&mut store, "ns"), Some(toks(&["last", "run"])));
    }

    #[test]
    fn test_json_store_save_without_changes_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stores.json");
        let mut store = JsonFileStore::new(&path);
        store.set("ns", "x", toks(&["a"]));
        // Never marked changed, so nothing hits the disk.
        store.save().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_json_store_missing_file_starts_empty() {
        let mut store = JsonFileStore::new("/nonexistent/stores.json");
        assert!(ShortcutStore::lookup(&mut store, "ns", "x").is_none());
        assert!(ShortcutStore::entries(&mut store, "ns").is_empty());
    }
}
