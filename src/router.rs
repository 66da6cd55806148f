use crate::{
    analytics::AnalyticsSummary, error::PortalError, folder::FolderListing,
    resource::{Company, ResourceRecord},
    state::Portal,
};
use axum::{
    extract::{Path, Query, State},
    http::Method,
    routing::get,
    Json, Router,
};
use axum_macros::debug_handler;
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use self::tracking::tracking_router;

mod tracking;

pub fn router(state: Portal) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST]);

    public_router(state.clone())
        .merge(tracking_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn public_router(state: Portal) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/folders", get(folders))
        .route("/analytics", get(analytics))
        .route("/companies", get(companies))
        .route("/companies/:id/resources", get(company_resources))
        .route("/users/:id/bookmarks", get(user_bookmarks))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct FolderQuery {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompanyQuery {
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub top: Option<usize>,
}

async fn health() -> &'static str {
    "ok"
}

#[debug_handler]
pub async fn folders(
    state: State<Portal>,
    Query(query): Query<FolderQuery>,
) -> Result<Json<FolderListing>, PortalError> {
    let tree = state.folder_tree().await?;

    if !tree.contains(&query.path) {
        return Err(PortalError::NotFound(query.path));
    }

    info!("Listing folder '{}'", query.path);
    Ok(Json(tree.listing(&query.path)))
}

#[debug_handler]
pub async fn analytics(
    state: State<Portal>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<AnalyticsSummary>, PortalError> {
    let summary = state.analytics(query.top).await?;
    Ok(Json(summary))
}

pub async fn companies(
    state: State<Portal>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<Vec<Company>>, PortalError> {
    let companies = state.companies(query.search.as_deref()).await?;
    Ok(Json(companies))
}

pub async fn user_bookmarks(
    state: State<Portal>,
    Path(user_id): Path<uuid::Uuid>,
) -> Result<Json<Vec<ResourceRecord>>, PortalError> {
    let resources = state.db.list_user_bookmarks(user_id).await?;
    Ok(Json(resources))
}

pub async fn company_resources(
    state: State<Portal>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<Vec<ResourceRecord>>, PortalError> {
    let resources = state.db.list_company_resources(id).await?;
    Ok(Json(resources))
}
