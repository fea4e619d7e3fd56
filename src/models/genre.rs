use serde::Serialize;

use crate::error::{AppError, AppResult};

/// IMDb genre names, in feature-vector axis order
pub const IMDB_GENRES: [&str; 26] = [
    "Action",
    "Adventure",
    "Animation",
    "Biography",
    "Comedy",
    "Crime",
    "Documentary",
    "Drama",
    "Family",
    "Fantasy",
    "Film-Noir",
    "Game-Show",
    "History",
    "Horror",
    "Music",
    "Musical",
    "Mystery",
    "News",
    "Reality-TV",
    "Romance",
    "Sci-Fi",
    "Short",
    "Sport",
    "Thriller",
    "War",
    "Western",
];

/// Ordered genre vocabulary
///
/// Position `i` in the vocabulary is the position of that genre's indicator in every
/// feature vector, so the vocabulary must match the catalog the service was built with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GenreVocabulary {
    names: Vec<String>,
}

impl Default for GenreVocabulary {
    fn default() -> Self {
        Self::new(IMDB_GENRES)
    }
}

impl GenreVocabulary {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Axis position of a genre, matched case-insensitively
    pub fn position(&self, genre: &str) -> Option<usize> {
        let genre = genre.trim();
        self.names.iter().position(|name| name.eq_ignore_ascii_case(genre))
    }

    /// Builds the binary indicator vector for a genre selection
    ///
    /// Selecting the same genre twice is the same as selecting it once.
    pub fn indicators<S: AsRef<str>>(&self, selected: &[S]) -> AppResult<Vec<f64>> {
        if selected.is_empty() {
            return Err(AppError::InvalidArgument(
                "At least one genre must be selected".to_string(),
            ));
        }

        let mut flags = vec![0.0; self.names.len()];
        for genre in selected {
            let genre = genre.as_ref();
            let position = self
                .position(genre)
                .ok_or_else(|| AppError::InvalidArgument(format!("Unknown genre: {}", genre)))?;
            flags[position] = 1.0;
        }

        Ok(flags)
    }
}
