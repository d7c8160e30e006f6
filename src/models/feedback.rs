use serde::{Deserialize, Serialize};

/// Highest value accepted by the site rating
pub const MAX_RATING: i64 = 5;

/// Visitor feedback on the site: a 0-5 rating and a free-text comment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feedback {
    /// Kept wide so out-of-range values reach validation
    #[serde(default = "default_rating")]
    pub rating: i64,
    pub comment: String,
}

fn default_rating() -> i64 {
    MAX_RATING
}

/// Acknowledgement returned once a comment has been stored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackReceipt {
    /// File name the comment was written to
    pub file_name: String,
    pub rating: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_defaults_to_max() {
        let feedback: Feedback = serde_json::from_str(r#"{"comment":"Super site"}"#).unwrap();
        assert_eq!(feedback.rating, 5);
        assert_eq!(feedback.comment, "Super site");
    }

    #[test]
    fn test_out_of_range_rating_still_parses() {
        let feedback: Feedback =
            serde_json::from_str(r#"{"rating":300,"comment":"x"}"#).unwrap();
        assert_eq!(feedback.rating, 300);

        let feedback: Feedback = serde_json::from_str(r#"{"rating":-1,"comment":"x"}"#).unwrap();
        assert_eq!(feedback.rating, -1);
    }
}
