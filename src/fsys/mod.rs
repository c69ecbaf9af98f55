//! Filesystem Seam
//!
//! File completion reads directories through this trait rather than the
//! OS directly, so hosts and tests can substitute their own tree.

pub mod mem_fs;
pub mod os_fs;
pub mod types;

pub use mem_fs::MemFs;
pub use os_fs::OsFs;
pub use types::{DirEntry, FileSystem};
