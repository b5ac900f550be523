//! Content-Addressable Network Overlay
//!
//! Peers partition the coordinate space into zones and route requests
//! greedily toward a target point, one neighbor per hop.
//!
//! ## Core Concepts
//! - **Routing**: a peer that does not own the target forwards to the neighbor
//!   whose zone is closest to it (rectangle distance, centroid as tie-break).
//!   Failures are reported to the originator and the request is dropped.
//! - **Join**: the owner of a random point splits its zone, hands one half to
//!   the newcomer together with the neighbors and files that belong to it, and
//!   tells every affected neighbor. Admission and the newcomer's file pulls
//!   run in their own tasks, so a caller that times out cannot cut them short.
//! - **Data**: files are indexed by the point their keyword maps to. Bytes are
//!   pulled from the originator's outbox on insert and from the old owner's
//!   items on a split; the old owner drops what the newcomer releases.
//! - **Transport**: `PeerTransport` addresses remote peers by handle, over
//!   HTTP (`HttpTransport`) or inside one process (`LocalTransport`).

pub mod handlers;
pub mod neighbors;
pub mod node;
pub mod protocol;
pub mod transport;
pub mod types;

pub use neighbors::UpdateEffect;
pub use node::PeerNode;
pub use transport::{HttpTransport, LocalTransport, PeerTransport};
pub use types::*;
