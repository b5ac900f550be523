use super::protocol::*;
use super::service::DirectoryService;
use crate::error::Result;
use crate::overlay::handlers::reply;
use crate::overlay::{PeerHandle, PeerId};

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use std::sync::Arc;

pub async fn handle_register(
    Extension(directory): Extension<Arc<DirectoryService>>,
    Json(req): Json<RegisterRequest>,
) -> (StatusCode, Json<Result<PeerId>>) {
    reply(Ok(directory.register_peer(req.addr)))
}

pub async fn handle_deregister(
    Extension(directory): Extension<Arc<DirectoryService>>,
    Path(id): Path<u64>,
) -> (StatusCode, Json<Result<()>>) {
    reply(directory.deregister_peer(PeerId(id)))
}

pub async fn handle_lookup(
    Extension(directory): Extension<Arc<DirectoryService>>,
    Path(id): Path<u64>,
) -> (StatusCode, Json<Result<PeerHandle>>) {
    reply(directory.get(PeerId(id)))
}

pub async fn handle_describe(
    Extension(directory): Extension<Arc<DirectoryService>>,
    Path(id): Path<u64>,
) -> (StatusCode, Json<Result<String>>) {
    reply(directory.info_of(PeerId(id)).await)
}

pub async fn handle_bootstrap(
    Extension(directory): Extension<Arc<DirectoryService>>,
) -> (StatusCode, Json<Result<Vec<PeerHandle>>>) {
    reply(Ok(directory.sample()))
}

pub async fn handle_dump(
    Extension(directory): Extension<Arc<DirectoryService>>,
) -> (StatusCode, Json<Result<String>>) {
    reply(Ok(directory.info_of_all().await))
}

pub fn router(directory: Arc<DirectoryService>) -> Router {
    Router::new()
        .route(ENDPOINT_REGISTER, post(handle_register))
        .route(
            &format!("{}/:id", ENDPOINT_PEERS),
            get(handle_lookup).delete(handle_deregister),
        )
        .route(&format!("{}/:id/info", ENDPOINT_PEERS), get(handle_describe))
        .route(ENDPOINT_BOOTSTRAP, get(handle_bootstrap))
        .route(ENDPOINT_DUMP, get(handle_dump))
        .layer(Extension(directory))
}
