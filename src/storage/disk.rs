use super::{BlobStore, Shelf, validate_name};
use crate::error::{CanError, Result};

use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Blobs stored as plain files under `<root>/items` and `<root>/outbox`.
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Creates both shelf directories if they are missing.
    pub async fn open(root: impl AsRef<Path>) -> Result<Arc<Self>> {
        let root = root.as_ref().to_path_buf();
        for shelf in [Shelf::Items, Shelf::Outbox] {
            tokio::fs::create_dir_all(root.join(shelf.dir_name())).await?;
        }
        tracing::info!("Blob store opened at {}", root.display());
        Ok(Arc::new(Self { root }))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, shelf: Shelf, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(shelf.dir_name()).join(name))
    }
}

impl BlobStore for DiskStore {
    fn read<'a>(&'a self, shelf: Shelf, name: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        Box::pin(async move {
            let path = self.path(shelf, name)?;
            tokio::fs::read(&path).await.map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    CanError::NotFound(format!("{} not in {}", name, shelf))
                }
                _ => CanError::from(e),
            })
        })
    }

    fn write<'a>(
        &'a self,
        shelf: Shelf,
        name: &'a str,
        bytes: Vec<u8>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let path = self.path(shelf, name)?;
            // Readers never observe a half-written file
            let staging = self
                .root
                .join(shelf.dir_name())
                .join(format!(".{}.tmp", Uuid::new_v4()));
            tokio::fs::write(&staging, &bytes).await?;
            if let Err(e) = tokio::fs::rename(&staging, &path).await {
                let _ = tokio::fs::remove_file(&staging).await;
                return Err(e.into());
            }
            tracing::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
            Ok(())
        })
    }

    fn remove<'a>(&'a self, shelf: Shelf, name: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let path = self.path(shelf, name)?;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
    }
}
