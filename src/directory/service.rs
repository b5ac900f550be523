use crate::error::{CanError, Result};
use crate::overlay::{PeerHandle, PeerId, PeerTransport};

use dashmap::DashMap;
use futures::future::BoxFuture;
use rand::seq::SliceRandom;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Size of the sample handed to a joining peer.
pub const MAX_BOOTSTRAP_PEERS: usize = 3;

/// What a peer needs from the bootstrap directory.
pub trait Directory: Send + Sync {
    fn register(&self, addr: SocketAddr) -> BoxFuture<'_, Result<PeerId>>;

    fn deregister(&self, id: PeerId) -> BoxFuture<'_, Result<()>>;

    /// Up to `MAX_BOOTSTRAP_PEERS` registered peers, shuffled.
    fn sample_bootstrap_peers(&self) -> BoxFuture<'_, Result<Vec<PeerHandle>>>;

    fn lookup(&self, id: PeerId) -> BoxFuture<'_, Result<PeerHandle>>;

    /// Info text of one registered peer.
    fn describe(&self, id: PeerId) -> BoxFuture<'_, Result<String>>;

    /// Info text of every registered peer, in id order.
    fn dump_all(&self) -> BoxFuture<'_, Result<String>>;
}

/// Authoritative in-process directory.
pub struct DirectoryService {
    peers: DashMap<PeerId, PeerHandle>,
    next_id: AtomicU64,
    transport: Arc<dyn PeerTransport>,
}

impl DirectoryService {
    /// `transport` is only used to fetch info dumps from registered peers.
    pub fn new(transport: Arc<dyn PeerTransport>) -> Arc<Self> {
        Arc::new(Self {
            peers: DashMap::new(),
            next_id: AtomicU64::new(0),
            transport,
        })
    }

    pub fn register_peer(&self, addr: SocketAddr) -> PeerId {
        let id = PeerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.peers.insert(id, PeerHandle::new(id, addr));
        tracing::info!("Registered {} at {}", id, addr);
        id
    }

    pub fn deregister_peer(&self, id: PeerId) -> Result<()> {
        match self.peers.remove(&id) {
            Some((_, handle)) => {
                tracing::info!("Deregistered {} at {}", id, handle.addr);
                Ok(())
            }
            None => Err(CanError::NotFound(format!("{} is not registered", id))),
        }
    }

    pub fn sample(&self) -> Vec<PeerHandle> {
        let mut handles: Vec<PeerHandle> = self.peers.iter().map(|entry| *entry.value()).collect();
        handles.shuffle(&mut rand::thread_rng());
        handles.truncate(MAX_BOOTSTRAP_PEERS);
        handles
    }

    pub fn get(&self, id: PeerId) -> Result<PeerHandle> {
        self.peers
            .get(&id)
            .map(|entry| *entry.value())
            .ok_or_else(|| CanError::NotFound(format!("{} is not registered", id)))
    }

    /// Registered peers sorted by id.
    pub fn members(&self) -> Vec<PeerHandle> {
        let mut handles: Vec<PeerHandle> = self.peers.iter().map(|entry| *entry.value()).collect();
        handles.sort_by_key(|handle| handle.id);
        handles
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub async fn info_of(&self, id: PeerId) -> Result<String> {
        let handle = self.get(id)?;
        self.transport.get_info(handle).await
    }

    pub async fn info_of_all(&self) -> String {
        let mut out = String::new();
        for handle in self.members() {
            match self.transport.get_info(handle).await {
                Ok(info) => out.push_str(&info),
                Err(e) => {
                    out.push_str(&format!("{} at {}: unreachable ({})\n", handle.id, handle.addr, e))
                }
            }
        }
        out
    }
}

impl Directory for DirectoryService {
    fn register(&self, addr: SocketAddr) -> BoxFuture<'_, Result<PeerId>> {
        Box::pin(async move { Ok(self.register_peer(addr)) })
    }

    fn deregister(&self, id: PeerId) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move { self.deregister_peer(id) })
    }

    fn sample_bootstrap_peers(&self) -> BoxFuture<'_, Result<Vec<PeerHandle>>> {
        Box::pin(async move { Ok(self.sample()) })
    }

    fn lookup(&self, id: PeerId) -> BoxFuture<'_, Result<PeerHandle>> {
        Box::pin(async move { self.get(id) })
    }

    fn describe(&self, id: PeerId) -> BoxFuture<'_, Result<String>> {
        Box::pin(self.info_of(id))
    }

    fn dump_all(&self) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move { Ok(self.info_of_all().await) })
    }
}
