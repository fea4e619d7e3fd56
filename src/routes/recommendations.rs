use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::Recommendation,
    routes::AppState,
    services::Selection,
};

const ITEM_BASED: &str = "item_based";
const PREFERENCE_BASED: &str = "preference_based";

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    /// `item_based` or `preference_based`
    pub mode: String,
    /// Reference movie title (item-based)
    #[serde(default)]
    pub title: Option<String>,
    /// Selected genres (preference-based)
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    /// Minimum score threshold (preference-based)
    #[serde(default)]
    pub min_score: Option<f64>,
    /// Number of recommendations to return
    pub count: usize,
}

impl RecommendationRequest {
    /// Validates the mode-specific fields and converts them into a [`Selection`]
    pub fn selection(&self) -> AppResult<Selection> {
        match self.mode.as_str() {
            ITEM_BASED => {
                let title = self.title.clone().ok_or_else(|| {
                    AppError::InvalidArgument("item_based mode requires a title".to_string())
                })?;
                Ok(Selection::Item { title })
            }
            PREFERENCE_BASED => {
                let genres = self.genres.clone().unwrap_or_default();
                let min_score = self.min_score.ok_or_else(|| {
                    AppError::InvalidArgument(
                        "preference_based mode requires min_score".to_string(),
                    )
                })?;
                Ok(Selection::Preference { genres, min_score })
            }
            other => Err(AppError::InvalidArgument(format!(
                "Unknown recommendation mode: {}",
                other
            ))),
        }
    }
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<Vec<Recommendation>>> {
    if request.count > state.max_recommendations {
        return Err(AppError::InvalidArgument(format!(
            "count must be at most {}",
            state.max_recommendations
        )));
    }

    let selection = request.selection()?;

    tracing::info!(
        request_id = %request_id,
        mode = %request.mode,
        count = request.count,
        "Processing recommendation request"
    );

    let start = Instant::now();
    let recommendations = state.recommender.recommend(&selection, request.count)?;

    tracing::info!(
        request_id = %request_id,
        results = recommendations.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "Recommendations ranked"
    );

    Ok(Json(recommendations))
}
