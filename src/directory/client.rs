use super::protocol::*;
use super::service::Directory;
use crate::error::Result;
use crate::overlay::transport::decode;
use crate::overlay::{PeerHandle, PeerId};

use futures::future::BoxFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Remote directory reached over HTTP.
pub struct HttpDirectory {
    addr: SocketAddr,
    http_client: reqwest::Client,
    timeout: Duration,
}

impl HttpDirectory {
    pub fn new(addr: SocketAddr, timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            addr,
            http_client: reqwest::Client::new(),
            timeout,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn peer_url(&self, id: PeerId) -> String {
        format!("{}/{}", self.url(ENDPOINT_PEERS), id.0)
    }
}

impl Directory for HttpDirectory {
    fn register(&self, addr: SocketAddr) -> BoxFuture<'_, Result<PeerId>> {
        Box::pin(async move {
            let response = self
                .http_client
                .post(self.url(ENDPOINT_REGISTER))
                .json(&RegisterRequest { addr })
                .timeout(self.timeout)
                .send()
                .await?;
            decode(response).await
        })
    }

    fn deregister(&self, id: PeerId) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let response = self
                .http_client
                .delete(self.peer_url(id))
                .timeout(self.timeout)
                .send()
                .await?;
            decode(response).await
        })
    }

    fn sample_bootstrap_peers(&self) -> BoxFuture<'_, Result<Vec<PeerHandle>>> {
        Box::pin(async move {
            let response = self
                .http_client
                .get(self.url(ENDPOINT_BOOTSTRAP))
                .timeout(self.timeout)
                .send()
                .await?;
            decode(response).await
        })
    }

    fn lookup(&self, id: PeerId) -> BoxFuture<'_, Result<PeerHandle>> {
        Box::pin(async move {
            let response = self
                .http_client
                .get(self.peer_url(id))
                .timeout(self.timeout)
                .send()
                .await?;
            decode(response).await
        })
    }

    fn describe(&self, id: PeerId) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move {
            let response = self
                .http_client
                .get(format!("{}/info", self.peer_url(id)))
                .timeout(self.timeout)
                .send()
                .await?;
            decode(response).await
        })
    }

    fn dump_all(&self) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move {
            // A dump fans out to every peer, so it gets no per-call bound
            let response = self
                .http_client
                .get(self.url(ENDPOINT_DUMP))
                .send()
                .await?;
            decode(response).await
        })
    }
}
