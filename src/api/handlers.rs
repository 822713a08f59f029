//! HTTP request handlers: CRUD listing/creation for the three entity kinds
//! plus the three aggregate queries.

use std::sync::MutexGuard;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;

use crate::api::server::AppContext;
use crate::database::queries;
use crate::database::repo::{ArtistRecord, ArtworkRecord, CollectionStore, MediumRecord};

type ApiError = (StatusCode, String);

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateArtistRequest {
    name: String,
    #[serde(default)]
    period_style: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMediumRequest {
    name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateArtworkRequest {
    object_id: i64,
    title: String,
    #[serde(default)]
    department: String,
    #[serde(default)]
    end_date_year: Option<i64>,
    #[serde(default)]
    artist_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    id: i64,
}

fn lock(ctx: &AppContext) -> Result<MutexGuard<'_, CollectionStore>, ApiError> {
    ctx.store
        .lock()
        .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "store lock poisoned".to_string()))
}

fn internal(err: anyhow::Error) -> ApiError {
    error!("Request failed: {:#}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// Uniqueness violations map to 409, everything else to 500. The rusqlite
/// error survives the anyhow context chain, so downcasting finds it.
fn insert_error(err: anyhow::Error) -> ApiError {
    let conflict = matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    );
    if conflict {
        (StatusCode::CONFLICT, err.to_string())
    } else {
        internal(err)
    }
}

/// Landing page: status plus clickable navigation, so nobody has to guess
/// the endpoints.
pub async fn api_root() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "navigation_links": {
            "list_all_artworks": "/artworks",
            "list_all_artists": "/artists",
            "list_all_mediums": "/mediums",
            "query_prolific_artists": "/artists/prolific",
            "query_medium_usage": "/mediums/summary",
            "query_recent_collection": "/artworks/recent",
        }
    }))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn list_artworks(State(ctx): State<AppContext>) -> Result<Json<Vec<ArtworkRecord>>, ApiError> {
    let store = lock(&ctx)?;
    store.list_artworks().map(Json).map_err(internal)
}

pub async fn create_artwork(
    State(ctx): State<AppContext>,
    Json(req): Json<CreateArtworkRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let mut store = lock(&ctx)?;
    let record = ArtworkRecord {
        object_id: req.object_id,
        title: req.title,
        department: req.department,
        end_date_year: req.end_date_year,
        artist_id: req.artist_id,
    };
    store.create_artwork(&record).map_err(insert_error)?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: record.object_id })))
}

pub async fn list_artists(State(ctx): State<AppContext>) -> Result<Json<Vec<ArtistRecord>>, ApiError> {
    let store = lock(&ctx)?;
    store.list_artists().map(Json).map_err(internal)
}

pub async fn create_artist(
    State(ctx): State<AppContext>,
    Json(req): Json<CreateArtistRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let mut store = lock(&ctx)?;
    let id = store
        .create_artist(&req.name, req.period_style.as_deref())
        .map_err(insert_error)?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn delete_artist(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let mut store = lock(&ctx)?;
    if store.delete_artist(id).map_err(internal)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, format!("no artist with id {id}")))
    }
}

pub async fn list_mediums(State(ctx): State<AppContext>) -> Result<Json<Vec<MediumRecord>>, ApiError> {
    let store = lock(&ctx)?;
    store.list_mediums().map(Json).map_err(internal)
}

pub async fn create_medium(
    State(ctx): State<AppContext>,
    Json(req): Json<CreateMediumRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let mut store = lock(&ctx)?;
    let id = store.create_medium(&req.name).map_err(insert_error)?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn prolific_artists(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<queries::ArtistUsage>>, ApiError> {
    let store = lock(&ctx)?;
    queries::prolific_artists(&store).map(Json).map_err(internal)
}

pub async fn medium_summary(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<queries::MediumUsage>>, ApiError> {
    let store = lock(&ctx)?;
    queries::medium_summary(&store).map(Json).map_err(internal)
}

pub async fn recent_artworks(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<ArtworkRecord>>, ApiError> {
    let store = lock(&ctx)?;
    queries::recent_artworks(&store).map(Json).map_err(internal)
}
