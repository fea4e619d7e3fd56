use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::{CatalogEntry, FeatureVector},
};

/// Column of the title table holding the movie title
const TITLE_COLUMN: usize = 0;
/// Column of the title table holding the IMDb link
const LINK_COLUMN: usize = 2;

/// Display identifiers for one catalog row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleRow {
    pub title: String,
    pub link: String,
}

impl TitleRow {
    fn from_columns(row: usize, columns: &[Value]) -> AppResult<Self> {
        let column = |i: usize, name: &str| -> AppResult<String> {
            columns
                .get(i)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    AppError::SchemaMismatch(format!(
                        "title row {} has no string {} in column {}",
                        row, name, i
                    ))
                })
        };

        Ok(Self {
            title: column(TITLE_COLUMN, "title")?,
            link: column(LINK_COLUMN, "link")?,
        })
    }
}

/// Immutable in-memory movie catalog
///
/// Built once at startup from a feature matrix and a parallel title table, then shared
/// read-only for the life of the process.
#[derive(Debug)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    feature_len: usize,
    /// Title → index of the first entry carrying that title
    by_title: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog from parallel feature and title rows
    pub fn from_rows(features: Vec<FeatureVector>, titles: Vec<TitleRow>) -> AppResult<Self> {
        if features.len() != titles.len() {
            return Err(AppError::SchemaMismatch(format!(
                "feature matrix has {} rows but title table has {}",
                features.len(),
                titles.len()
            )));
        }

        let feature_len = match features.first() {
            Some(first) => first.len(),
            None => return Err(AppError::EmptyCatalog),
        };

        if feature_len == 0 {
            return Err(AppError::SchemaMismatch(
                "feature rows must not be empty".to_string(),
            ));
        }

        let mut entries = Vec::with_capacity(features.len());
        let mut by_title = HashMap::with_capacity(features.len());

        for (index, (features, row)) in features.into_iter().zip(titles).enumerate() {
            if features.len() != feature_len {
                return Err(AppError::SchemaMismatch(format!(
                    "feature row {} has {} values, expected {}",
                    index,
                    features.len(),
                    feature_len
                )));
            }

            if let Some(axis) = features.iter().position(|v| !v.is_finite()) {
                return Err(AppError::SchemaMismatch(format!(
                    "feature row {} has a non-finite value at position {}",
                    index, axis
                )));
            }

            by_title.entry(row.title.clone()).or_insert(index);

            let score = features[feature_len - 1];
            entries.push(CatalogEntry {
                index,
                features,
                title: row.title,
                link: row.link,
                score,
            });
        }

        Ok(Self {
            entries,
            feature_len,
            by_title,
        })
    }

    /// Loads the catalog from its two JSON files
    pub fn load(features_path: impl AsRef<Path>, titles_path: impl AsRef<Path>) -> AppResult<Self> {
        let features_path = features_path.as_ref();
        let titles_path = titles_path.as_ref();

        let features: Vec<FeatureVector> =
            serde_json::from_slice(&std::fs::read(features_path)?)?;
        let raw_titles: Vec<Vec<Value>> = serde_json::from_slice(&std::fs::read(titles_path)?)?;

        let titles = raw_titles
            .iter()
            .enumerate()
            .map(|(row, columns)| TitleRow::from_columns(row, columns))
            .collect::<AppResult<Vec<_>>>()?;

        let catalog = Self::from_rows(features, titles)?;

        tracing::info!(
            entries = catalog.len(),
            feature_len = catalog.feature_len(),
            features_path = %features_path.display(),
            titles_path = %titles_path.display(),
            "Loaded movie catalog"
        );

        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Length L shared by every feature vector in the catalog
    pub fn feature_len(&self) -> usize {
        self.feature_len
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    /// First entry with exactly this title
    pub fn find_by_title(&self, title: &str) -> Option<&CatalogEntry> {
        self.by_title.get(title).map(|&i| &self.entries[i])
    }
}
