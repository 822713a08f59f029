//! HTTP server setup and routing.
//!
//! The store is synchronous rusqlite behind a mutex; at this collection's
//! scale a held lock per request is not worth engineering around.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::database::repo::CollectionStore;

/// Shared application context passed to all handlers.
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<Mutex<CollectionStore>>,
}

pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(super::handlers::api_root))
        .route("/health", get(super::handlers::health))
        .route("/artworks", get(super::handlers::list_artworks))
        .route("/artworks", post(super::handlers::create_artwork))
        .route("/artworks/recent", get(super::handlers::recent_artworks))
        .route("/artists", get(super::handlers::list_artists))
        .route("/artists", post(super::handlers::create_artist))
        .route("/artists/:id", delete(super::handlers::delete_artist))
        .route("/artists/prolific", get(super::handlers::prolific_artists))
        .route("/mediums", get(super::handlers::list_mediums))
        .route("/mediums", post(super::handlers::create_medium))
        .route("/mediums/summary", get(super::handlers::medium_summary))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

pub async fn run(store: CollectionStore, port: u16) -> Result<()> {
    let ctx = AppContext {
        store: Arc::new(Mutex::new(store)),
    };
    let app = router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Collection API listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
