use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Best-effort display metadata for a movie
///
/// Every text field degrades to an empty string and the poster to `None` when no
/// source could supply it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieMetadata {
    pub title: String,
    pub cast: String,
    pub plot: String,
    pub poster_url: Option<String>,
    pub resolved_at: DateTime<Utc>,
}

impl MovieMetadata {
    /// Metadata with every field absent
    pub fn empty() -> Self {
        Self {
            title: String::new(),
            cast: String::new(),
            plot: String::new(),
            poster_url: None,
            resolved_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.cast.is_empty()
            && self.plot.is_empty()
            && self.poster_url.is_none()
    }
}

/// Partial result produced by a single metadata source or extraction strategy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialMetadata {
    pub title: Option<String>,
    pub cast: Option<String>,
    pub plot: Option<String>,
    pub poster_url: Option<String>,
}

impl PartialMetadata {
    /// Fills the fields still missing in `self` from `other`; present fields are kept
    pub fn merge(mut self, other: PartialMetadata) -> Self {
        fill(&mut self.title, other.title);
        fill(&mut self.cast, other.cast);
        fill(&mut self.plot, other.plot);
        fill(&mut self.poster_url, other.poster_url);
        self
    }

    pub fn is_complete(&self) -> bool {
        self.title.is_some() && self.cast.is_some() && self.plot.is_some() && self.poster_url.is_some()
    }

    pub fn into_metadata(self) -> MovieMetadata {
        MovieMetadata {
            title: self.title.unwrap_or_default(),
            cast: self.cast.unwrap_or_default(),
            plot: self.plot.unwrap_or_default(),
            poster_url: self.poster_url,
            resolved_at: Utc::now(),
        }
    }
}

fn fill(slot: &mut Option<String>, candidate: Option<String>) {
    if slot.is_none() {
        *slot = candidate.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    }
}
