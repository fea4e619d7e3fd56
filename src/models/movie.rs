use serde::{Deserialize, Serialize};

/// Fixed-length numeric representation of a movie: genre indicators followed by its score
pub type FeatureVector = Vec<f64>;

/// A single recommendable movie held by the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    /// Position in the catalog; stable for the process lifetime
    pub index: usize,
    pub features: FeatureVector,
    pub title: String,
    /// IMDb page link, used as the metadata lookup key together with the title
    pub link: String,
    /// Displayed rating; always the last feature element
    pub score: f64,
}

/// A recommended movie as returned to callers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub title: String,
    pub link: String,
    pub score: f64,
}

impl From<&CatalogEntry> for Recommendation {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            title: entry.title.clone(),
            link: entry.link.clone(),
            score: entry.score,
        }
    }
}
