use std::cmp::Ordering;

use crate::{
    db::Catalog,
    error::{AppError, AppResult},
    models::CatalogEntry,
    services::distance::squared_euclidean,
};

/// A catalog entry paired with its distance to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<'a> {
    pub entry: &'a CatalogEntry,
    pub distance: f64,
}

/// Finds the `k` catalog entries closest to `query`
///
/// Every entry is scored (exact linear scan). Results are ordered by ascending
/// distance; equal distances are ordered by ascending catalog index, so the output is
/// fully determined by the inputs. Asking for more neighbors than the catalog holds
/// returns the whole catalog.
pub fn nearest_neighbors<'a>(
    catalog: &'a Catalog,
    query: &[f64],
    k: usize,
) -> AppResult<Vec<Neighbor<'a>>> {
    if query.len() != catalog.feature_len() {
        return Err(AppError::SchemaMismatch(format!(
            "query has {} features, catalog expects {}",
            query.len(),
            catalog.feature_len()
        )));
    }
    if k == 0 {
        return Err(AppError::InvalidArgument(
            "number of neighbors must be at least 1".to_string(),
        ));
    }
    if catalog.is_empty() {
        return Err(AppError::EmptyCatalog);
    }

    let mut scored = catalog
        .entries()
        .iter()
        .map(|entry| {
            squared_euclidean(query, &entry.features).map(|distance| Neighbor { entry, distance })
        })
        .collect::<AppResult<Vec<_>>>()?;

    let k = k.min(scored.len());
    if k < scored.len() {
        scored.select_nth_unstable_by(k - 1, rank);
        scored.truncate(k);
    }
    // Indices are unique, so `rank` is a total order and an unstable sort is deterministic.
    scored.sort_unstable_by(rank);

    Ok(scored)
}

fn rank(a: &Neighbor<'_>, b: &Neighbor<'_>) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then_with(|| a.entry.index.cmp(&b.entry.index))
}
