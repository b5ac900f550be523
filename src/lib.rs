//! Content-Addressable Network Overlay Library
//!
//! Peers split a bounded 2-D coordinate space into rectangular zones, one per
//! peer, and route every request greedily toward the point it is about. Files
//! are placed at the point their keyword maps to and live on the owner of the
//! zone containing it. The library backs two binaries: the peer node
//! (`main.rs`) and the bootstrap directory (`bin/directory.rs`).
//!
//! ## Architecture Modules
//!
//! - **`geometry`**: Zones, adjacency, splitting and keyword placement. Pure values, no I/O.
//! - **`overlay`**: The peer itself. Routing, join admission, neighbor maintenance,
//!   insert/search, the remote transport and its HTTP surface.
//! - **`directory`**: Id assignment and bootstrap sampling for newcomers, in-process
//!   or reached over HTTP.
//! - **`storage`**: Bytes of inserted files, on disk or in memory.
//! - **`config`**: Command-line and environment configuration of both binaries.
//! - **`error`**: The `CanError` taxonomy shared by every remote-facing operation.

pub mod config;
pub mod directory;
pub mod error;
pub mod geometry;
pub mod overlay;
pub mod storage;
