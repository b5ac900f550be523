//! Blob Storage Module
//!
//! Holds the raw bytes of inserted files. The overlay only tracks names per
//! coordinate key; the bytes live here.
//!
//! ## Core Concepts
//! - **Items shelf**: files this node is responsible for.
//! - **Outbox shelf**: files the local driver staged for an insert, served to
//!   the owner when it pulls them and dropped once the insert completes.
//! - **Backends**: `DiskStore` under a data directory, `MemoryStore` for
//!   in-process clusters and tests.

pub mod disk;
pub mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;

use crate::error::{CanError, Result};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which copy of a file a read refers to. Remote downloads always name one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shelf {
    Items,
    Outbox,
}

impl Shelf {
    pub fn dir_name(self) -> &'static str {
        match self {
            Shelf::Items => "items",
            Shelf::Outbox => "outbox",
        }
    }
}

impl fmt::Display for Shelf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

pub trait BlobStore: Send + Sync {
    fn read<'a>(&'a self, shelf: Shelf, name: &'a str) -> BoxFuture<'a, Result<Vec<u8>>>;

    /// Replaces any previous blob with the same name on that shelf.
    fn write<'a>(&'a self, shelf: Shelf, name: &'a str, bytes: Vec<u8>)
    -> BoxFuture<'a, Result<()>>;

    /// Removing a name that is not stored is not an error.
    fn remove<'a>(&'a self, shelf: Shelf, name: &'a str) -> BoxFuture<'a, Result<()>>;
}

/// File names are flat: no separators, no parent references, not empty.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name == "."
        || name.contains("..")
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(CanError::Storage(format!("Invalid file name: {:?}", name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
