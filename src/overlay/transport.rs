//! Remote capability layer
//!
//! A `PeerHandle` is only an id and an address; `PeerTransport` turns it into
//! calls on the peer behind it. Every call is a single attempt bounded by a
//! timeout: routing failures are reported to the originator, never retried.
//! The timeout only bounds how long the caller waits; work the callee must
//! finish (join admission, zone adoption) runs in its own task.

use super::node::PeerNode;
use super::protocol::*;
use super::types::{NeighborUpdate, Notice, PeerHandle, PeerId, RoutingRequest, Status, ZoneTransfer};
use crate::error::{CanError, Result};
use crate::geometry::{Adjacency, PointDistance, Zone};
use crate::storage::Shelf;

use dashmap::DashMap;
use futures::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Remote operations a peer exposes, addressed by handle.
pub trait PeerTransport: Send + Sync {
    fn get_id(&self, peer: PeerHandle) -> BoxFuture<'_, Result<PeerId>>;

    fn get_info(&self, peer: PeerHandle) -> BoxFuture<'_, Result<String>>;

    fn assign_zone(&self, peer: PeerHandle, transfer: ZoneTransfer) -> BoxFuture<'_, Result<()>>;

    fn send_message(&self, peer: PeerHandle, request: RoutingRequest)
    -> BoxFuture<'_, Result<Status>>;

    fn send_update(&self, peer: PeerHandle, update: NeighborUpdate)
    -> BoxFuture<'_, Result<Status>>;

    fn dist_to_point(&self, peer: PeerHandle, x: f64, y: f64)
    -> BoxFuture<'_, Result<PointDistance>>;

    fn is_neighbor(
        &self,
        peer: PeerHandle,
        zone: Zone,
        adjacency: Adjacency,
    ) -> BoxFuture<'_, Result<bool>>;

    /// Bytes of `name` on exactly one shelf of the peer.
    fn download_file(
        &self,
        peer: PeerHandle,
        shelf: Shelf,
        name: String,
    ) -> BoxFuture<'_, Result<Vec<u8>>>;

    fn release_files(&self, peer: PeerHandle, names: Vec<String>) -> BoxFuture<'_, Result<()>>;

    fn notify(&self, peer: PeerHandle, notice: Notice) -> BoxFuture<'_, Result<()>>;
}

// ============================================================
// HTTP
// ============================================================

/// JSON over HTTP, one request per remote call.
pub struct HttpTransport {
    http_client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            http_client: reqwest::Client::new(),
            timeout,
        })
    }

    fn url(peer: &PeerHandle, endpoint: &str) -> String {
        format!("http://{}{}", peer.addr, endpoint)
    }

    async fn post<T: Serialize, R: DeserializeOwned>(&self, url: String, payload: &T) -> Result<R> {
        let response = self
            .http_client
            .post(url)
            .json(payload)
            .timeout(self.timeout)
            .send()
            .await?;
        decode(response).await
    }

    async fn get<R: DeserializeOwned>(&self, url: String) -> Result<R> {
        let response = self
            .http_client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?;
        decode(response).await
    }
}

/// Every peer reply body is a serialized `Result<T, CanError>`.
pub(crate) async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R> {
    let reply: std::result::Result<R, CanError> = response.json().await?;
    reply
}

impl PeerTransport for HttpTransport {
    fn get_id(&self, peer: PeerHandle) -> BoxFuture<'_, Result<PeerId>> {
        Box::pin(async move { self.get(Self::url(&peer, ENDPOINT_ID)).await })
    }

    fn get_info(&self, peer: PeerHandle) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move { self.get(Self::url(&peer, ENDPOINT_INFO)).await })
    }

    fn assign_zone(&self, peer: PeerHandle, transfer: ZoneTransfer) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.post(Self::url(&peer, ENDPOINT_ASSIGN_ZONE), &transfer)
                .await
        })
    }

    fn send_message(
        &self,
        peer: PeerHandle,
        request: RoutingRequest,
    ) -> BoxFuture<'_, Result<Status>> {
        Box::pin(async move { self.post(Self::url(&peer, ENDPOINT_MESSAGE), &request).await })
    }

    fn send_update(
        &self,
        peer: PeerHandle,
        update: NeighborUpdate,
    ) -> BoxFuture<'_, Result<Status>> {
        Box::pin(async move { self.post(Self::url(&peer, ENDPOINT_UPDATE), &update).await })
    }

    fn dist_to_point(
        &self,
        peer: PeerHandle,
        x: f64,
        y: f64,
    ) -> BoxFuture<'_, Result<PointDistance>> {
        Box::pin(async move {
            self.post(Self::url(&peer, ENDPOINT_DISTANCE), &DistanceRequest { x, y })
                .await
        })
    }

    fn is_neighbor(
        &self,
        peer: PeerHandle,
        zone: Zone,
        adjacency: Adjacency,
    ) -> BoxFuture<'_, Result<bool>> {
        Box::pin(async move {
            let payload = IsNeighborRequest { zone, adjacency };
            self.post(Self::url(&peer, ENDPOINT_IS_NEIGHBOR), &payload)
                .await
        })
    }

    fn download_file(
        &self,
        peer: PeerHandle,
        shelf: Shelf,
        name: String,
    ) -> BoxFuture<'_, Result<Vec<u8>>> {
        Box::pin(async move {
            let url = format!(
                "{}/{}/{}",
                Self::url(&peer, ENDPOINT_FILE),
                shelf,
                urlencoding::encode(&name)
            );
            let response = self
                .http_client
                .get(url)
                .timeout(self.timeout)
                .send()
                .await?;

            if !response.status().is_success() {
                let error: CanError = response.json().await?;
                return Err(error);
            }
            Ok(response.bytes().await?.to_vec())
        })
    }

    fn release_files(&self, peer: PeerHandle, names: Vec<String>) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.post(Self::url(&peer, ENDPOINT_RELEASE), &ReleaseRequest { names })
                .await
        })
    }

    fn notify(&self, peer: PeerHandle, notice: Notice) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move { self.post(Self::url(&peer, ENDPOINT_NOTIFY), &notice).await })
    }
}

// ============================================================
// IN-PROCESS
// ============================================================

/// Dispatches calls straight to `PeerNode`s living in the same process.
///
/// Nodes are held weakly: once the last `Arc<PeerNode>` is dropped the peer
/// is unreachable, exactly like a process that went away.
pub struct LocalTransport {
    peers: DashMap<SocketAddr, Weak<PeerNode>>,
    timeout: Duration,
}

impl LocalTransport {
    pub fn new(timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            peers: DashMap::new(),
            timeout,
        })
    }

    pub fn register(&self, node: &Arc<PeerNode>) {
        self.peers.insert(node.addr(), Arc::downgrade(node));
    }

    pub fn unregister(&self, addr: &SocketAddr) {
        self.peers.remove(addr);
    }

    fn resolve(&self, peer: &PeerHandle) -> Result<Arc<PeerNode>> {
        self.peers
            .get(&peer.addr)
            .and_then(|entry| entry.value().upgrade())
            .ok_or_else(|| CanError::RemoteUnavailable(format!("{} at {}", peer.id, peer.addr)))
    }

    async fn call<T, F, Fut>(&self, peer: PeerHandle, op: F) -> Result<T>
    where
        F: FnOnce(Arc<PeerNode>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let node = self.resolve(&peer)?;
        tokio::time::timeout(self.timeout, op(node))
            .await
            .map_err(|_| CanError::Timeout)?
    }
}

impl PeerTransport for LocalTransport {
    fn get_id(&self, peer: PeerHandle) -> BoxFuture<'_, Result<PeerId>> {
        Box::pin(self.call(peer, |node| async move { node.get_id() }))
    }

    fn get_info(&self, peer: PeerHandle) -> BoxFuture<'_, Result<String>> {
        Box::pin(self.call(peer, |node| async move { Ok(node.info().await) }))
    }

    fn assign_zone(&self, peer: PeerHandle, transfer: ZoneTransfer) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.call(peer, |node| async move { node.assign_zone(transfer).await }))
    }

    fn send_message(
        &self,
        peer: PeerHandle,
        request: RoutingRequest,
    ) -> BoxFuture<'_, Result<Status>> {
        Box::pin(self.call(peer, |node| async move { node.send_message(request).await }))
    }

    fn send_update(
        &self,
        peer: PeerHandle,
        update: NeighborUpdate,
    ) -> BoxFuture<'_, Result<Status>> {
        Box::pin(self.call(peer, |node| async move { node.apply_update(update).await }))
    }

    fn dist_to_point(
        &self,
        peer: PeerHandle,
        x: f64,
        y: f64,
    ) -> BoxFuture<'_, Result<PointDistance>> {
        Box::pin(self.call(peer, move |node| async move { node.dist_to_point(x, y).await }))
    }

    fn is_neighbor(
        &self,
        peer: PeerHandle,
        zone: Zone,
        adjacency: Adjacency,
    ) -> BoxFuture<'_, Result<bool>> {
        Box::pin(self.call(peer, move |node| async move {
            node.is_neighbor(&zone, adjacency).await
        }))
    }

    fn download_file(
        &self,
        peer: PeerHandle,
        shelf: Shelf,
        name: String,
    ) -> BoxFuture<'_, Result<Vec<u8>>> {
        Box::pin(self.call(peer, move |node| async move {
            node.download_file(shelf, &name).await
        }))
    }

    fn release_files(&self, peer: PeerHandle, names: Vec<String>) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.call(peer, |node| async move { node.release_files(names).await }))
    }

    fn notify(&self, peer: PeerHandle, notice: Notice) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.call(peer, |node| async move {
            node.notify(notice);
            Ok(())
        }))
    }
}
