//! Peer Network Protocol
//!
//! Endpoints and payloads of the remote operation surface every peer exposes.
//! Bodies are JSON; replies carry `Result<T, CanError>` so a failure on the
//! remote side arrives as a value the caller can match on.

use crate::geometry::{Adjacency, Zone};
use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Identifier of the peer.
pub const ENDPOINT_ID: &str = "/peer/id";
/// Human-readable dump of zone, neighbors and data items.
pub const ENDPOINT_INFO: &str = "/peer/info";
/// Hand a split-off zone to a joining peer.
pub const ENDPOINT_ASSIGN_ZONE: &str = "/peer/assign_zone";
/// Route a join, insert or search request.
pub const ENDPOINT_MESSAGE: &str = "/peer/message";
/// Push a neighbor update.
pub const ENDPOINT_UPDATE: &str = "/peer/update";
/// Routing distance from the zone to a point.
pub const ENDPOINT_DISTANCE: &str = "/peer/distance";
/// Adjacency query against the peer's current zone.
pub const ENDPOINT_IS_NEIGHBOR: &str = "/peer/is_neighbor";
/// Raw bytes of a file on one shelf (`/peer/file/:shelf/:name`).
pub const ENDPOINT_FILE: &str = "/peer/file";
/// The adopting peer has pulled these files; the old owner may drop them.
pub const ENDPOINT_RELEASE: &str = "/peer/release";
/// Display-only callback (path or error) for the originator of a request.
pub const ENDPOINT_NOTIFY: &str = "/peer/notify";

// --- Data Transfer Objects ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DistanceRequest {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IsNeighborRequest {
    pub zone: Zone,
    pub adjacency: Adjacency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseRequest {
    pub names: Vec<String>,
}
