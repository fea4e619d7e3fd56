pub mod genre;
pub mod metadata;
pub mod movie;

pub use genre::{GenreVocabulary, IMDB_GENRES};
pub use metadata::{MovieMetadata, PartialMetadata};
pub use movie::{CatalogEntry, FeatureVector, Recommendation};
