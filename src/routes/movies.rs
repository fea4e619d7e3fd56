use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    models::{GenreVocabulary, Recommendation},
    routes::AppState,
};

const DEFAULT_SEARCH_LIMIT: usize = 50;

#[derive(Debug, Serialize)]
pub struct CatalogInfo {
    pub size: usize,
    pub feature_len: usize,
    pub genres: GenreVocabulary,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
    limit: Option<usize>,
}

/// Catalog size and schema
pub async fn catalog_info(State(state): State<Arc<AppState>>) -> Json<CatalogInfo> {
    let catalog = state.recommender.catalog();
    Json(CatalogInfo {
        size: catalog.len(),
        feature_len: catalog.feature_len(),
        genres: state.recommender.genres().clone(),
    })
}

/// Genre vocabulary accepted by preference-based requests
pub async fn genres(State(state): State<Arc<AppState>>) -> Json<GenreVocabulary> {
    Json(state.recommender.genres().clone())
}

/// Case-insensitive title search over the catalog, in catalog order
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<Recommendation>> {
    let needle = params.q.trim().to_lowercase();
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);

    let movies = state
        .recommender
        .catalog()
        .entries()
        .iter()
        .filter(|entry| entry.title.to_lowercase().contains(&needle))
        .take(limit)
        .map(Recommendation::from)
        .collect();

    Json(movies)
}
