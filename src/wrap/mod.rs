//! Wrapper Processors
//!
//! Processors that rewrite the input tape around a child: shortcut
//! expansion/management and last-run caching. Both consume an opaque
//! key/value store the host binds to disk.

pub mod cache;
pub mod shortcut;
pub mod store;

pub use cache::CacheWrapper;
pub use shortcut::ShortcutWrapper;
pub use store::{CacheStore, JsonFileStore, MemStore, ShortcutStore};
