use super::{BlobStore, Shelf, validate_name};
use crate::error::{CanError, Result};

use dashmap::DashMap;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Blobs kept in memory, keyed by shelf and name.
#[derive(Default)]
pub struct MemoryStore {
    blobs: DashMap<(Shelf, String), Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn contains(&self, shelf: Shelf, name: &str) -> bool {
        self.blobs.contains_key(&(shelf, name.to_string()))
    }

    pub fn len(&self, shelf: Shelf) -> usize {
        self.blobs.iter().filter(|entry| entry.key().0 == shelf).count()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl BlobStore for MemoryStore {
    fn read<'a>(&'a self, shelf: Shelf, name: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        Box::pin(async move {
            validate_name(name)?;
            self.blobs
                .get(&(shelf, name.to_string()))
                .map(|entry| entry.value().clone())
                .ok_or_else(|| CanError::NotFound(format!("{} not in {}", name, shelf)))
        })
    }

    fn write<'a>(
        &'a self,
        shelf: Shelf,
        name: &'a str,
        bytes: Vec<u8>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            validate_name(name)?;
            self.blobs.insert((shelf, name.to_string()), bytes);
            Ok(())
        })
    }

    fn remove<'a>(&'a self, shelf: Shelf, name: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            validate_name(name)?;
            self.blobs.remove(&(shelf, name.to_string()));
            Ok(())
        })
    }
}
