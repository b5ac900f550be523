use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

// --- API Endpoints ---

pub const ENDPOINT_REGISTER: &str = "/directory/register";
/// `DELETE` deregisters, `GET` looks up (`/directory/peers/:id`).
pub const ENDPOINT_PEERS: &str = "/directory/peers";
pub const ENDPOINT_BOOTSTRAP: &str = "/directory/bootstrap";
pub const ENDPOINT_DUMP: &str = "/directory/dump";

// --- Data Transfer Objects ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub addr: SocketAddr,
}
