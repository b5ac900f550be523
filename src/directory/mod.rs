//! Bootstrap Directory
//!
//! The one centralized piece of the overlay: it hands out peer ids, keeps the
//! address of every registered peer, and gives newcomers a few entry points.
//! It takes no part in routing.
//!
//! ## Core Concepts
//! - **Registration**: ids are assigned from a counter and never reused.
//! - **Bootstrap sample**: up to `MAX_BOOTSTRAP_PEERS` registered peers in random order.
//! - **Dumps**: the directory can ask any registered peer for its info text.

pub mod client;
pub mod handlers;
pub mod protocol;
pub mod service;

pub use client::HttpDirectory;
pub use service::{Directory, DirectoryService, MAX_BOOTSTRAP_PEERS};

#[cfg(test)]
mod tests;
