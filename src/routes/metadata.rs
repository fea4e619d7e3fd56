use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::MovieMetadata,
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct MetadataQuery {
    title: String,
    link: String,
}

/// Best-effort display metadata for a recommended movie
///
/// Takes the exact (title, link) pair returned by the recommendations endpoint.
pub async fn lookup(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MetadataQuery>,
) -> AppResult<Json<MovieMetadata>> {
    if params.title.trim().is_empty() && params.link.trim().is_empty() {
        return Err(AppError::InvalidArgument(
            "title or link is required".to_string(),
        ));
    }

    let metadata = state.metadata.resolve(&params.title, &params.link).await;
    Ok(Json(metadata))
}
