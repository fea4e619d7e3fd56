use std::sync::Arc;

use crate::{
    db::Catalog,
    error::{AppError, AppResult},
    models::{GenreVocabulary, Recommendation},
    services::search::nearest_neighbors,
};

/// What a recommendation request is based on
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Movies similar to an existing catalog title
    Item { title: String },
    /// Movies matching a set of genres and a minimum score
    Preference { genres: Vec<String>, min_score: f64 },
}

/// Builds query vectors for each recommendation mode and ranks the catalog against them
///
/// Holds no per-request state; every call is an independent read over the shared catalog.
pub struct RecommendationService {
    catalog: Arc<Catalog>,
    genres: GenreVocabulary,
}

impl RecommendationService {
    pub fn new(catalog: Arc<Catalog>, genres: GenreVocabulary) -> Self {
        Self { catalog, genres }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn genres(&self) -> &GenreVocabulary {
        &self.genres
    }

    /// Returns up to `count` recommendations, nearest first
    pub fn recommend(&self, selection: &Selection, count: usize) -> AppResult<Vec<Recommendation>> {
        if count == 0 {
            return Err(AppError::InvalidArgument(
                "count must be at least 1".to_string(),
            ));
        }

        match selection {
            Selection::Item { title } => self.similar_to(title, count),
            Selection::Preference { genres, min_score } => {
                self.matching_preferences(genres, *min_score, count)
            }
        }
    }

    /// Item-based mode
    ///
    /// The movie is assumed to be its own nearest neighbor, so one extra neighbor is
    /// requested and the first result is dropped by position. If another entry has
    /// identical features and a lower index, that entry is dropped instead.
    fn similar_to(&self, title: &str, count: usize) -> AppResult<Vec<Recommendation>> {
        let entry = self
            .catalog
            .find_by_title(title)
            .ok_or_else(|| AppError::NotFound(format!("Movie not in catalog: {}", title)))?;

        let neighbors =
            nearest_neighbors(&self.catalog, &entry.features, count.saturating_add(1))?;

        tracing::debug!(
            title = %title,
            index = entry.index,
            dropped = ?neighbors.first().map(|n| n.entry.index),
            "Dropping self match"
        );

        Ok(neighbors
            .iter()
            .skip(1)
            .map(|n| Recommendation::from(n.entry))
            .collect())
    }

    /// Preference-based mode
    fn matching_preferences(
        &self,
        genres: &[String],
        min_score: f64,
        count: usize,
    ) -> AppResult<Vec<Recommendation>> {
        let query = self.preference_vector(genres, min_score)?;
        let neighbors = nearest_neighbors(&self.catalog, &query, count)?;

        Ok(neighbors
            .iter()
            .map(|n| Recommendation::from(n.entry))
            .collect())
    }

    /// Genre indicators followed by the score threshold
    pub fn preference_vector(&self, genres: &[String], min_score: f64) -> AppResult<Vec<f64>> {
        if !min_score.is_finite() {
            return Err(AppError::InvalidArgument(
                "min_score must be a finite number".to_string(),
            ));
        }

        let mut query = self.genres.indicators(genres)?;
        query.push(min_score);
        Ok(query)
    }
}
