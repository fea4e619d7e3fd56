pub mod distance;
pub mod metadata;
pub mod recommendations;
pub mod search;

pub use metadata::{MetadataResolver, MetadataService};
pub use recommendations::{RecommendationService, Selection};
pub use search::{nearest_neighbors, Neighbor};
