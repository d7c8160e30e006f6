use crate::{
    models::RecommendedMovie,
    services::{
        catalogue::{Catalogue, TitleIndex},
        similarity::SimilarityMatrix,
    },
};

/// Number of titles returned per query
pub const DEFAULT_TOP_K: usize = 5;

/// Recommends up to [`DEFAULT_TOP_K`] titles similar to `title`
///
/// No selection and unknown titles both yield an empty list; neither is
/// treated as an error.
pub fn recommend(
    title: Option<&str>,
    similarity: &SimilarityMatrix,
    index: &TitleIndex,
    catalogue: &Catalogue,
) -> Vec<String> {
    recommend_top_k(title, similarity, index, catalogue, DEFAULT_TOP_K)
}

/// Ranks every movie by its similarity to `title` and keeps the best `k`
///
/// The best-ranked entry is assumed to be the query itself and is skipped.
/// Ties keep catalogue order. Rows sharing the query's title are filtered
/// out of what remains, so the result can be shorter than `k`.
pub fn recommend_top_k(
    title: Option<&str>,
    similarity: &SimilarityMatrix,
    index: &TitleIndex,
    catalogue: &Catalogue,
    k: usize,
) -> Vec<String> {
    let Some(title) = title.filter(|t| !t.trim().is_empty()) else {
        return Vec::new();
    };

    let Some(row) = index.get(title).and_then(|idx| similarity.row(idx)) else {
        tracing::debug!(title = %title, "No recommendation available for unknown title");
        return Vec::new();
    };

    let mut scores: Vec<(usize, f64)> = row.iter().copied().enumerate().collect();
    scores.sort_by(|a, b| b.1.total_cmp(&a.1));

    scores
        .into_iter()
        .skip(1)
        .take(k)
        .filter_map(|(row, _)| catalogue.get(row))
        .filter(|movie| movie.title != title)
        .map(|movie| movie.title.clone())
        .collect()
}

/// Recommends from a multi-selection of liked titles
///
/// Only the first selected title drives the ranking.
pub fn recommend_for_liked(
    liked_titles: &[String],
    similarity: &SimilarityMatrix,
    index: &TitleIndex,
    catalogue: &Catalogue,
) -> Vec<String> {
    recommend(
        liked_titles.first().map(String::as_str),
        similarity,
        index,
        catalogue,
    )
}

/// Display rows for recommended titles, taken from each title's first row
pub fn recommended_movies(
    titles: &[String],
    index: &TitleIndex,
    catalogue: &Catalogue,
) -> Vec<RecommendedMovie> {
    titles
        .iter()
        .filter_map(|title| index.get(title).and_then(|row| catalogue.get(row)))
        .map(RecommendedMovie::from)
        .collect()
}
