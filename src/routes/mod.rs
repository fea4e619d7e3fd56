use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{MetadataResolver, RecommendationService},
};

pub mod metadata;
pub mod movies;
pub mod recommendations;

/// Shared, read-only application state
pub struct AppState {
    pub recommender: Arc<RecommendationService>,
    pub metadata: Arc<dyn MetadataResolver>,
    /// Largest `count` a recommendation request may ask for
    pub max_recommendations: usize,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/catalog", get(movies::catalog_info))
        .route("/genres", get(movies::genres))
        .route("/movies", get(movies::search))
        .route("/recommendations", post(recommendations::recommend))
        .route("/metadata", get(metadata::lookup))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
