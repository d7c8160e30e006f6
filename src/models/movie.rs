use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Base URL for the external detail page of a movie
pub const IMDB_TITLE_URL: &str = "https://www.imdb.com/title";

/// A validated catalogue row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    /// Display title, also the lookup key of the title index
    pub title: String,
    /// Content rating (e.g. "PG-13")
    pub rated: String,
    /// Primary genre
    pub genre_1: String,
    /// Secondary genre, may be empty
    pub genre_2: String,
    /// Tertiary genre, may be empty
    pub genre_3: String,
    /// Lead actor
    pub actor_1: String,
    /// Plot summary
    pub plot: String,
    /// Poster image URL
    pub poster: String,
    /// Average user rating
    pub average_rating: f64,
    /// External identifier (e.g. "tt0133093")
    pub title_id: String,
}

impl Movie {
    /// Link to the movie's external detail page
    pub fn imdb_url(&self) -> String {
        format!("{}/{}/", IMDB_TITLE_URL, self.title_id)
    }
}

/// Required column of the catalogue dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieField {
    Title,
    Rated,
    Genre1,
    Actor1,
    Plot,
    Poster,
    AverageRating,
    TitleId,
}

impl Display for MovieField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let column = match self {
            MovieField::Title => "title",
            MovieField::Rated => "rated",
            MovieField::Genre1 => "genre_1",
            MovieField::Actor1 => "actor_1",
            MovieField::Plot => "plot",
            MovieField::Poster => "poster",
            MovieField::AverageRating => "averageRating",
            MovieField::TitleId => "titleId",
        };
        write!(f, "{}", column)
    }
}

/// Reason a raw row could not become a [`Movie`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowError {
    #[error("missing required field `{0}`")]
    Missing(MovieField),

    #[error("invalid value for `{field}`: {value}")]
    Invalid { field: MovieField, value: String },
}

/// Raw row as it appears in the catalogue CSV
///
/// Every column is optional here so that a single bad row can be reported
/// and skipped instead of failing the whole load.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub rated: Option<String>,
    #[serde(default)]
    pub genre_1: Option<String>,
    #[serde(default)]
    pub genre_2: Option<String>,
    #[serde(default)]
    pub genre_3: Option<String>,
    #[serde(default)]
    pub actor_1: Option<String>,
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default, rename = "averageRating")]
    pub average_rating: Option<String>,
    #[serde(default, rename = "titleId")]
    pub title_id: Option<String>,
}

/// Trims a field and treats blank values as absent
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, field: MovieField) -> Result<String, RowError> {
    present(value).ok_or(RowError::Missing(field))
}

impl TryFrom<MovieRecord> for Movie {
    type Error = RowError;

    fn try_from(record: MovieRecord) -> Result<Self, Self::Error> {
        let raw_rating = required(record.average_rating, MovieField::AverageRating)?;
        let average_rating = raw_rating
            .parse::<f64>()
            .ok()
            .filter(|r| r.is_finite())
            .ok_or(RowError::Invalid {
                field: MovieField::AverageRating,
                value: raw_rating,
            })?;

        Ok(Movie {
            title: required(record.title, MovieField::Title)?,
            rated: required(record.rated, MovieField::Rated)?,
            genre_1: required(record.genre_1, MovieField::Genre1)?,
            genre_2: present(record.genre_2).unwrap_or_default(),
            genre_3: present(record.genre_3).unwrap_or_default(),
            actor_1: required(record.actor_1, MovieField::Actor1)?,
            plot: required(record.plot, MovieField::Plot)?,
            poster: required(record.poster, MovieField::Poster)?,
            average_rating,
            title_id: required(record.title_id, MovieField::TitleId)?,
        })
    }
}

/// Display row for a recommended movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedMovie {
    pub title: String,
    pub poster: String,
    pub rated: String,
    pub average_rating: f64,
    pub title_id: String,
    pub imdb_url: String,
}

impl From<&Movie> for RecommendedMovie {
    fn from(movie: &Movie) -> Self {
        Self {
            title: movie.title.clone(),
            poster: movie.poster.clone(),
            rated: movie.rated.clone(),
            average_rating: movie.average_rating,
            title_id: movie.title_id.clone(),
            imdb_url: movie.imdb_url(),
        }
    }
}
