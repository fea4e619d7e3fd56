use crate::error::{AppError, AppResult};

/// Squared Euclidean distance between two feature vectors
///
/// Elements are compared on their raw scale: genre flags and the score axis carry
/// equal weight per unit. Ranking only needs a monotonic distance, so the square
/// root is never taken.
pub fn squared_euclidean(a: &[f64], b: &[f64]) -> AppResult<f64> {
    if a.len() != b.len() {
        return Err(AppError::SchemaMismatch(format!(
            "cannot compare vectors of length {} and {}",
            a.len(),
            b.len()
        )));
    }

    Ok(a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum())
}
