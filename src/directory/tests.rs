//! Directory Module Tests
//!
//! ## Test Scopes
//! - **Registration**: ids are unique and never reused.
//! - **Bootstrap sample**: bounded size, distinct, only registered peers.
//! - **Lookup / dumps**: unknown ids, info fetched through the transport.

#[cfg(test)]
mod tests {
    use crate::directory::{Directory, DirectoryService, MAX_BOOTSTRAP_PEERS};
    use crate::error::CanError;
    use crate::overlay::{LocalTransport, PeerId, PeerNode};
    use crate::storage::MemoryStore;
    use std::collections::HashSet;
    use std::net::SocketAddr;
    use std::time::Duration;

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    fn service() -> std::sync::Arc<DirectoryService> {
        DirectoryService::new(LocalTransport::new(Duration::from_secs(1)))
    }

    // ============================================================
    // REGISTRATION TESTS
    // ============================================================

    #[tokio::test]
    async fn test_register_assigns_increasing_ids() {
        let directory = service();

        let a = directory.register(addr(5000)).await.unwrap();
        let b = directory.register(addr(5001)).await.unwrap();
        assert_eq!(a, PeerId(0));
        assert_eq!(b, PeerId(1));
        assert_eq!(directory.len(), 2);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_deregister() {
        let directory = service();
        let a = directory.register(addr(5000)).await.unwrap();
        directory.deregister(a).await.unwrap();

        let b = directory.register(addr(5000)).await.unwrap();
        assert_ne!(a, b);
        assert!(directory.lookup(a).await.is_err());
    }

    #[tokio::test]
    async fn test_deregister_unknown_peer_is_not_found() {
        let directory = service();
        let result = directory.deregister(PeerId(42)).await;
        assert!(matches!(result, Err(CanError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_lookup_returns_registered_address() {
        let directory = service();
        let id = directory.register(addr(5003)).await.unwrap();

        let handle = directory.lookup(id).await.unwrap();
        assert_eq!(handle.id, id);
        assert_eq!(handle.addr, addr(5003));
    }

    // ============================================================
    // BOOTSTRAP SAMPLE TESTS
    // ============================================================

    #[tokio::test]
    async fn test_empty_directory_has_no_bootstrap_peers() {
        let directory = service();
        assert!(directory.sample_bootstrap_peers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bootstrap_sample_is_bounded_and_distinct() {
        let directory = service();
        for port in 5000..5010 {
            directory.register(addr(port)).await.unwrap();
        }

        for _ in 0..20 {
            let sample = directory.sample_bootstrap_peers().await.unwrap();
            assert_eq!(sample.len(), MAX_BOOTSTRAP_PEERS);

            let ids: HashSet<PeerId> = sample.iter().map(|handle| handle.id).collect();
            assert_eq!(ids.len(), sample.len());
            assert!(ids.iter().all(|id| id.0 < 10));
        }
    }

    #[tokio::test]
    async fn test_bootstrap_sample_skips_departed_peers() {
        let directory = service();
        let a = directory.register(addr(5000)).await.unwrap();
        let b = directory.register(addr(5001)).await.unwrap();
        directory.deregister(a).await.unwrap();

        let sample = directory.sample_bootstrap_peers().await.unwrap();
        assert_eq!(sample.len(), 1);
        assert_eq!(sample[0].id, b);
    }

    // ============================================================
    // DUMP TESTS
    // ============================================================

    #[tokio::test]
    async fn test_describe_fetches_peer_info() {
        let transport = LocalTransport::new(Duration::from_secs(1));
        let directory = DirectoryService::new(transport.clone());
        let (node, _notices) = PeerNode::new(addr(6000), transport.clone(), MemoryStore::new());
        transport.register(&node);

        let zone = node.join_at(directory.as_ref(), (1.0, 1.0)).await.unwrap();
        let info = directory.describe(node.id().unwrap()).await.unwrap();
        assert!(info.contains(&zone.to_string()));
        assert!(info.contains("127.0.0.1:6000"));
    }

    #[tokio::test]
    async fn test_dump_lists_unreachable_peers() {
        let directory = service();
        directory.register(addr(6100)).await.unwrap();

        let dump = directory.dump_all().await.unwrap();
        assert!(dump.contains("peer-0 at 127.0.0.1:6100: unreachable"));
    }
}
