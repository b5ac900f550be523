//! Storage Module Tests
//!
//! Validates both blob backends against the same expectations.
//!
//! ## Test Scopes
//! - **MemoryStore**: shelf separation, overwrite, idempotent removal.
//! - **DiskStore**: files land under the right shelf directory and survive reopening.
//! - **Names**: separators and parent references are rejected.

#[cfg(test)]
mod tests {
    use crate::error::CanError;
    use crate::storage::{BlobStore, DiskStore, MemoryStore, Shelf, validate_name};
    use std::path::PathBuf;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("can-store-{}", uuid::Uuid::new_v4()))
    }

    // ============================================================
    // MEMORY STORE TESTS
    // ============================================================

    #[tokio::test]
    async fn test_memory_write_then_read() {
        let store = MemoryStore::new();
        store
            .write(Shelf::Items, "report.txt", b"hello".to_vec())
            .await
            .unwrap();

        assert_eq!(store.read(Shelf::Items, "report.txt").await.unwrap(), b"hello");
        assert!(store.contains(Shelf::Items, "report.txt"));
    }

    #[tokio::test]
    async fn test_memory_shelves_are_separate() {
        let store = MemoryStore::new();
        store
            .write(Shelf::Outbox, "staged.bin", vec![1, 2, 3])
            .await
            .unwrap();

        let missing = store.read(Shelf::Items, "staged.bin").await;
        assert!(matches!(missing, Err(CanError::NotFound(_))));
        assert_eq!(store.len(Shelf::Outbox), 1);
        assert_eq!(store.len(Shelf::Items), 0);
    }

    #[tokio::test]
    async fn test_memory_overwrite_and_remove() {
        let store = MemoryStore::new();
        store.write(Shelf::Items, "a", vec![1]).await.unwrap();
        store.write(Shelf::Items, "a", vec![2]).await.unwrap();
        assert_eq!(store.read(Shelf::Items, "a").await.unwrap(), vec![2]);

        store.remove(Shelf::Items, "a").await.unwrap();
        // Removing twice is fine
        store.remove(Shelf::Items, "a").await.unwrap();
        assert!(store.is_empty());
    }

    // ============================================================
    // DISK STORE TESTS
    // ============================================================

    #[tokio::test]
    async fn test_disk_write_lands_in_shelf_directory() {
        let root = scratch_dir();
        let store = DiskStore::open(&root).await.unwrap();

        store
            .write(Shelf::Items, "notes.md", b"# notes".to_vec())
            .await
            .unwrap();

        let on_disk = tokio::fs::read(root.join("items").join("notes.md"))
            .await
            .unwrap();
        assert_eq!(on_disk, b"# notes");
        assert!(root.join("outbox").is_dir());

        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    #[tokio::test]
    async fn test_disk_survives_reopen() {
        let root = scratch_dir();
        {
            let store = DiskStore::open(&root).await.unwrap();
            store
                .write(Shelf::Outbox, "draft.txt", b"v1".to_vec())
                .await
                .unwrap();
        }

        let reopened = DiskStore::open(&root).await.unwrap();
        assert_eq!(reopened.read(Shelf::Outbox, "draft.txt").await.unwrap(), b"v1");

        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    #[tokio::test]
    async fn test_disk_missing_file_and_remove() {
        let root = scratch_dir();
        let store = DiskStore::open(&root).await.unwrap();

        let missing = store.read(Shelf::Items, "ghost").await;
        assert!(matches!(missing, Err(CanError::NotFound(_))));

        store.write(Shelf::Items, "ghost", vec![0]).await.unwrap();
        store.remove(Shelf::Items, "ghost").await.unwrap();
        store.remove(Shelf::Items, "ghost").await.unwrap();
        assert!(!root.join("items").join("ghost").exists());

        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    // ============================================================
    // NAME VALIDATION TESTS
    // ============================================================

    #[test]
    fn test_validate_name() {
        assert!(validate_name("file.txt").is_ok());
        assert!(validate_name("archive.tar.gz").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("../etc/passwd").is_err());
        assert!(validate_name("dir/file").is_err());
        assert!(validate_name("..").is_err());
    }

    #[tokio::test]
    async fn test_disk_rejects_escaping_names() {
        let root = scratch_dir();
        let store = DiskStore::open(&root).await.unwrap();

        let result = store.write(Shelf::Items, "../escape", vec![1]).await;
        assert!(matches!(result, Err(CanError::Storage(_))));
        assert!(!root.join("escape").exists());

        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    #[test]
    fn test_shelf_wire_name_matches_display() {
        for shelf in [Shelf::Items, Shelf::Outbox] {
            let wire = serde_json::to_string(&shelf).unwrap();
            assert_eq!(wire, format!("\"{}\"", shelf));
            assert_eq!(serde_json::from_str::<Shelf>(&wire).unwrap(), shelf);
        }
    }
}
