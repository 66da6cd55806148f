use crate::{
    error::PortalError,
    resource::{Bookmark, ResourceRecord},
    state::Portal,
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;

pub(super) fn tracking_router(state: Portal) -> Router {
    let router = Router::new()
        .route("/:id/download", post(download))
        .route("/:id/view", post(view))
        .route("/:id/bookmark", post(bookmark))
        .with_state(state);

    Router::new().nest("/resources", router)
}

/// Who performed the action. Anonymous downloads and views are allowed.
#[derive(Debug, Default, Deserialize)]
pub struct TrackRequest {
    pub user_id: Option<uuid::Uuid>,
}

/// An empty body is an anonymous request, anything else has to be a
/// valid `TrackRequest`.
fn user_id(body: &[u8]) -> Result<Option<uuid::Uuid>, PortalError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let request: TrackRequest = serde_json::from_slice(body)?;
    Ok(request.user_id)
}

async fn download(
    state: State<Portal>,
    Path(id): Path<uuid::Uuid>,
    body: Bytes,
) -> Result<Json<ResourceRecord>, PortalError> {
    let resource = state.track_download(id, user_id(&body)?).await?;
    Ok(Json(resource))
}

async fn view(
    state: State<Portal>,
    Path(id): Path<uuid::Uuid>,
    body: Bytes,
) -> Result<Json<ResourceRecord>, PortalError> {
    let resource = state.track_view(id, user_id(&body)?).await?;
    Ok(Json(resource))
}

async fn bookmark(
    state: State<Portal>,
    Path(id): Path<uuid::Uuid>,
    body: Bytes,
) -> Result<(StatusCode, Json<Bookmark>), PortalError> {
    let bookmark = state.bookmark(id, user_id(&body)?).await?;
    Ok((StatusCode::CREATED, Json(bookmark)))
}
