pub mod catalogue;
pub mod feedback;
pub mod features;
pub mod providers;
pub mod recommendations;
pub mod similarity;
pub mod similarity_cache;

pub use catalogue::{Catalogue, CatalogueSnapshot, TitleIndex};
pub use feedback::CommentStore;
pub use similarity_cache::SimilarityCache;
