use crate::geometry::Zone;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;

/// Identifier handed out by the directory when a peer registers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(pub u64);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer-{}", self.0)
    }
}

/// Capability to invoke remote operations on a peer.
///
/// A handle never owns the peer. Two handles are the same neighbor when their
/// ids match, whatever address they were learned with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PeerHandle {
    pub id: PeerId,
    pub addr: SocketAddr,
}

impl PeerHandle {
    pub fn new(id: PeerId, addr: SocketAddr) -> Self {
        Self { id, addr }
    }
}

impl PartialEq for PeerHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PeerHandle {}

impl Hash for PeerHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Canonical `"x,y"` form of the point a file was inserted at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct CoordinateKey(String);

impl CoordinateKey {
    pub fn from_point(x: f64, y: f64) -> Self {
        Self(format!("{},{}", x, y))
    }

    pub fn point(&self) -> Option<(f64, f64)> {
        let (x, y) = self.0.split_once(',')?;
        Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CoordinateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coordinate-key -> file names stored at that point.
pub type DataIndex = BTreeMap<CoordinateKey, Vec<String>>;

/// Per-direction lists of neighbor handles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeighborTable {
    pub left: Vec<PeerHandle>,
    pub bottom: Vec<PeerHandle>,
    pub right: Vec<PeerHandle>,
    pub top: Vec<PeerHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Join,
    Insert,
    Search,
}

/// A join, insert or search request travelling greedily toward its target point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingRequest {
    pub target_x: f64,
    pub target_y: f64,
    pub originator: PeerHandle,
    pub op: Operation,
    /// Peers that handled an insert or search, in hop order.
    pub path: Vec<PeerId>,
    pub key_name: Option<String>,
}

impl RoutingRequest {
    pub fn join(target: (f64, f64), originator: PeerHandle) -> Self {
        Self {
            target_x: target.0,
            target_y: target.1,
            originator,
            op: Operation::Join,
            path: Vec::new(),
            key_name: None,
        }
    }

    pub fn insert(target: (f64, f64), originator: PeerHandle, key_name: &str) -> Self {
        Self {
            op: Operation::Insert,
            key_name: Some(key_name.to_string()),
            ..Self::join(target, originator)
        }
    }

    pub fn search(target: (f64, f64), originator: PeerHandle, key_name: &str) -> Self {
        Self {
            op: Operation::Search,
            key_name: Some(key_name.to_string()),
            ..Self::join(target, originator)
        }
    }

    pub fn coordinate_key(&self) -> CoordinateKey {
        CoordinateKey::from_point(self.target_x, self.target_y)
    }
}

/// Snapshot handed from a splitting peer to the peer it admits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneTransfer {
    pub zone: Zone,
    pub neighbors: NeighborTable,
    pub data_items: DataIndex,
    /// Peer the transferred files are pulled from.
    pub pull_from: PeerHandle,
}

/// "This zone is now owned by this peer", pushed to possibly affected neighbors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborUpdate {
    pub zone: Zone,
    pub handle: PeerHandle,
}

/// Outcome a hop reports back to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// The request reached its owner and the operation completed.
    Delivered,
    /// A search reached the owner of its key but the file is not indexed there.
    NotFound,
    /// The request was dropped; the originator has been told why.
    Dropped,
}

/// Display-only callback delivered to the originator of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notice {
    Path(Vec<PeerId>),
    Error(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Path(path) => {
                let hops: Vec<String> = path.iter().map(|id| id.to_string()).collect();
                write!(f, "Path to destination: {}", hops.join(" => "))?;
                if let Some(last) = path.last() {
                    write!(f, "\nPeer {} stores the file", last)?;
                }
                Ok(())
            }
            Notice::Error(msg) => write!(f, "ERROR: {}", msg),
        }
    }
}
