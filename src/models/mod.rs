use serde::{Deserialize, Serialize};

pub mod feedback;
pub mod movie;

pub use feedback::{Feedback, FeedbackReceipt, MAX_RATING};
pub use movie::{Movie, MovieField, MovieRecord, RecommendedMovie, RowError};

/// Message shown to the user when nothing can be recommended
pub const NO_RECOMMENDATION_MESSAGE: &str = "No recommended movies.";

// ============================================================================
// API Request/Response Types
// ============================================================================

/// Request body for the recommendations endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationRequest {
    /// Titles the user likes; the first one drives the recommendation
    #[serde(default)]
    pub liked_titles: Vec<String>,
}

/// Response body for the recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    /// Title the recommendations were computed for, if any
    pub query: Option<String>,
    pub recommendations: Vec<RecommendedMovie>,
    /// Set when `recommendations` is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RecommendationResponse {
    pub fn new(query: Option<String>, recommendations: Vec<RecommendedMovie>) -> Self {
        let message = recommendations
            .is_empty()
            .then(|| NO_RECOMMENDATION_MESSAGE.to_string());

        Self {
            query,
            recommendations,
            message,
        }
    }
}

/// Query parameters for the title listing endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleQuery {
    /// Case-insensitive substring filter
    #[serde(default)]
    pub q: Option<String>,
}

/// Summary returned after a catalogue (re)load
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogueSummary {
    /// Number of movies kept
    pub rows: usize,
    /// Number of malformed rows skipped
    pub skipped: usize,
    /// Content fingerprint of the catalogue
    pub fingerprint: String,
    /// Whether a new similarity matrix had to be computed
    pub rebuilt: bool,
}
