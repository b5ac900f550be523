use super::node::PeerNode;
use super::protocol::*;
use super::types::*;
use crate::error::Result;
use crate::geometry::PointDistance;
use crate::storage::Shelf;

use axum::body::Bytes;
use axum::extract::Path;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use std::sync::Arc;

/// Status code plus the serialized result, so the caller can decode either arm.
pub(crate) fn reply<T: serde::Serialize>(result: Result<T>) -> (StatusCode, Json<Result<T>>) {
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => e.status_code(),
    };
    (status, Json(result))
}

pub async fn handle_get_id(
    Extension(node): Extension<Arc<PeerNode>>,
) -> (StatusCode, Json<Result<PeerId>>) {
    reply(node.get_id())
}

pub async fn handle_get_info(
    Extension(node): Extension<Arc<PeerNode>>,
) -> (StatusCode, Json<Result<String>>) {
    reply(Ok(node.info().await))
}

pub async fn handle_assign_zone(
    Extension(node): Extension<Arc<PeerNode>>,
    Json(transfer): Json<ZoneTransfer>,
) -> (StatusCode, Json<Result<()>>) {
    reply(node.assign_zone(transfer).await)
}

pub async fn handle_message(
    Extension(node): Extension<Arc<PeerNode>>,
    Json(request): Json<RoutingRequest>,
) -> (StatusCode, Json<Result<Status>>) {
    reply(node.send_message(request).await)
}

pub async fn handle_update(
    Extension(node): Extension<Arc<PeerNode>>,
    Json(update): Json<NeighborUpdate>,
) -> (StatusCode, Json<Result<Status>>) {
    reply(node.apply_update(update).await)
}

pub async fn handle_distance(
    Extension(node): Extension<Arc<PeerNode>>,
    Json(req): Json<DistanceRequest>,
) -> (StatusCode, Json<Result<PointDistance>>) {
    reply(node.dist_to_point(req.x, req.y).await)
}

pub async fn handle_is_neighbor(
    Extension(node): Extension<Arc<PeerNode>>,
    Json(req): Json<IsNeighborRequest>,
) -> (StatusCode, Json<Result<bool>>) {
    reply(node.is_neighbor(&req.zone, req.adjacency).await)
}

/// Raw bytes on success, a JSON `CanError` otherwise.
pub async fn handle_download_file(
    Extension(node): Extension<Arc<PeerNode>>,
    Path((shelf, name)): Path<(Shelf, String)>,
) -> Response {
    match node.download_file(shelf, &name).await {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/octet-stream")],
            Bytes::from(bytes),
        )
            .into_response(),
        Err(e) => {
            tracing::debug!("Download of {}/{} refused: {}", shelf, name, e);
            (e.status_code(), Json(e)).into_response()
        }
    }
}

pub async fn handle_release(
    Extension(node): Extension<Arc<PeerNode>>,
    Json(req): Json<ReleaseRequest>,
) -> (StatusCode, Json<Result<()>>) {
    reply(node.release_files(req.names).await)
}

pub async fn handle_notify(
    Extension(node): Extension<Arc<PeerNode>>,
    Json(notice): Json<Notice>,
) -> (StatusCode, Json<Result<()>>) {
    node.notify(notice);
    reply(Ok(()))
}

/// Every remote operation of a peer, bound to `node`.
pub fn router(node: Arc<PeerNode>) -> Router {
    Router::new()
        .route(ENDPOINT_ID, get(handle_get_id))
        .route(ENDPOINT_INFO, get(handle_get_info))
        .route(ENDPOINT_ASSIGN_ZONE, post(handle_assign_zone))
        .route(ENDPOINT_MESSAGE, post(handle_message))
        .route(ENDPOINT_UPDATE, post(handle_update))
        .route(ENDPOINT_DISTANCE, post(handle_distance))
        .route(ENDPOINT_IS_NEIGHBOR, post(handle_is_neighbor))
        .route(
            &format!("{}/:shelf/:name", ENDPOINT_FILE),
            get(handle_download_file),
        )
        .route(ENDPOINT_RELEASE, post(handle_release))
        .route(ENDPOINT_NOTIFY, post(handle_notify))
        .layer(Extension(node))
}
