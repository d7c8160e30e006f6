//! Catalogue loading and the per-catalogue derived state
//!
//! Duplicate titles are ambiguous: the title index maps a title to its
//! FIRST row only, so later rows with the same title can still show up as
//! recommendations for other movies but can never be queried directly.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{CatalogueSummary, Movie, MovieRecord, RecommendedMovie},
    services::{
        providers::CatalogueSource, recommendations, similarity::SimilarityMatrix,
        similarity_cache::SimilarityCache,
    },
};

/// Columns every catalogue CSV must have
pub const REQUIRED_COLUMNS: &[&str] = &[
    "title",
    "rated",
    "genre_1",
    "genre_2",
    "genre_3",
    "actor_1",
    "plot",
    "poster",
    "averageRating",
    "titleId",
];

/// Content fingerprint of a catalogue
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogueKey(String);

impl CatalogueKey {
    fn of(movies: &[Movie]) -> Self {
        let mut hasher = Sha256::new();
        for movie in movies {
            for field in [
                &movie.title,
                &movie.rated,
                &movie.genre_1,
                &movie.genre_2,
                &movie.genre_3,
                &movie.actor_1,
                &movie.plot,
                &movie.poster,
                &movie.title_id,
            ] {
                hasher.update(field.as_bytes());
                hasher.update(b"\x1f");
            }
            hasher.update(movie.average_rating.to_le_bytes());
            hasher.update(b"\x1e");
        }
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CatalogueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered, immutable collection of movies
#[derive(Debug, Clone, PartialEq)]
pub struct Catalogue {
    movies: Vec<Movie>,
    key: CatalogueKey,
}

impl Catalogue {
    pub fn new(movies: Vec<Movie>) -> Self {
        let key = CatalogueKey::of(&movies);
        Self { movies, key }
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn get(&self, row: usize) -> Option<&Movie> {
        self.movies.get(row)
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn key(&self) -> &CatalogueKey {
        &self.key
    }

    /// Titles in row order, duplicates included
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.movies.iter().map(|movie| movie.title.as_str())
    }
}

/// Title to row lookup; the first occurrence of a title wins
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitleIndex(HashMap<String, usize>);

impl TitleIndex {
    pub fn build(catalogue: &Catalogue) -> Self {
        let mut index = HashMap::with_capacity(catalogue.len());
        for (row, title) in catalogue.titles().enumerate() {
            index.entry(title.to_string()).or_insert(row);
        }
        Self(index)
    }

    pub fn get(&self, title: &str) -> Option<usize> {
        self.0.get(title).copied()
    }

    /// Number of distinct titles
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Outcome of parsing a catalogue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rows: usize,
    pub skipped: usize,
}

/// Parses catalogue CSV text, skipping malformed rows
pub fn parse_catalogue(csv_text: &str) -> AppResult<(Catalogue, LoadReport)> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(csv_text.as_bytes());

    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::CatalogueUnavailable(format!(
            "catalogue is missing columns: {}",
            missing.join(", ")
        )));
    }

    let mut movies = Vec::new();
    let mut skipped = 0;

    for (line, result) in reader.deserialize::<MovieRecord>().enumerate() {
        let movie = result
            .map_err(|e| e.to_string())
            .and_then(|record| Movie::try_from(record).map_err(|e| e.to_string()));

        match movie {
            Ok(movie) => movies.push(movie),
            Err(reason) => {
                skipped += 1;
                tracing::warn!(row = line + 1, reason = %reason, "Skipping malformed catalogue row");
            }
        }
    }

    let report = LoadReport {
        rows: movies.len(),
        skipped,
    };

    Ok((Catalogue::new(movies), report))
}

/// Fetches and parses a catalogue, reporting skipped rows
pub async fn load_catalogue(source: &dyn CatalogueSource) -> AppResult<(Catalogue, LoadReport)> {
    let body = source.fetch().await?;
    let (catalogue, report) = parse_catalogue(&body)?;

    tracing::info!(
        source = %source.name(),
        rows = report.rows,
        skipped = report.skipped,
        fingerprint = %catalogue.key(),
        "Catalogue loaded"
    );

    Ok((catalogue, report))
}

/// Fetches a catalogue and builds its title index
pub async fn load_and_index(source: &dyn CatalogueSource) -> AppResult<(Catalogue, TitleIndex)> {
    let (catalogue, _) = load_catalogue(source).await?;
    let index = TitleIndex::build(&catalogue);
    Ok((catalogue, index))
}

/// Everything derived from one catalogue, shared read-only across requests
#[derive(Debug)]
pub struct CatalogueSnapshot {
    catalogue: Catalogue,
    index: TitleIndex,
    similarity: Arc<SimilarityMatrix>,
    report: LoadReport,
}

impl CatalogueSnapshot {
    pub fn new(catalogue: Catalogue, similarity: Arc<SimilarityMatrix>, report: LoadReport) -> Self {
        let index = TitleIndex::build(&catalogue);
        Self {
            catalogue,
            index,
            similarity,
            report,
        }
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn index(&self) -> &TitleIndex {
        &self.index
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    pub fn report(&self) -> LoadReport {
        self.report
    }

    /// Titles most similar to `title`
    pub fn recommend(&self, title: Option<&str>) -> Vec<String> {
        recommendations::recommend(title, &self.similarity, &self.index, &self.catalogue)
    }

    /// Display rows for the titles most similar to `title`
    pub fn recommend_movies(&self, title: Option<&str>) -> Vec<RecommendedMovie> {
        let titles = self.recommend(title);
        recommendations::recommended_movies(&titles, &self.index, &self.catalogue)
    }

    pub fn summary(&self, rebuilt: bool) -> CatalogueSummary {
        CatalogueSummary {
            rows: self.report.rows,
            skipped: self.report.skipped,
            fingerprint: self.catalogue.key().to_string(),
            rebuilt,
        }
    }
}

/// Loads a catalogue and resolves its similarity matrix through the cache
///
/// Returns the snapshot and whether a new matrix had to be computed.
pub async fn build_snapshot(
    source: &dyn CatalogueSource,
    cache: Arc<SimilarityCache>,
) -> AppResult<(CatalogueSnapshot, bool)> {
    let (catalogue, report) = load_catalogue(source).await?;

    let (catalogue, similarity, rebuilt) = tokio::task::spawn_blocking(move || {
        let (similarity, rebuilt) = cache.get_or_build(&catalogue);
        (catalogue, similarity, rebuilt)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Similarity build failed: {}", e)))?;

    Ok((CatalogueSnapshot::new(catalogue, similarity, report), rebuilt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::MockCatalogueSource;

    const HEADER: &str = "title,rated,genre_1,genre_2,genre_3,actor_1,plot,poster,averageRating,titleId";

    fn csv(rows: &[&str]) -> String {
        let mut text = HEADER.to_string();
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    #[test]
    fn test_parse_valid_rows() {
        let text = csv(&[
            "Heat,R,Crime,Drama,,Al Pacino,A heist goes wrong,http://p/heat.jpg,8.3,tt0113277",
            "Up,PG,Animation,Adventure,Comedy,Ed Asner,A house floats away,http://p/up.jpg,8.3,tt1049413",
        ]);
        let (catalogue, report) = parse_catalogue(&text).unwrap();

        assert_eq!(report, LoadReport { rows: 2, skipped: 0 });
        assert_eq!(catalogue.get(0).unwrap().genre_3, "");
        assert_eq!(catalogue.get(1).unwrap().title_id, "tt1049413");
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let text = csv(&[
            "Heat,R,Crime,Drama,,Al Pacino,A heist goes wrong,http://p/heat.jpg,8.3,tt0113277",
            ",R,Crime,,,Nobody,No title here,http://p/x.jpg,5.0,tt0000000",
            "Up,PG,Animation,,,Ed Asner,A house floats away,http://p/up.jpg,not-a-number,tt1049413",
            "Short,row",
        ]);
        let (catalogue, report) = parse_catalogue(&text).unwrap();

        assert_eq!(report, LoadReport { rows: 1, skipped: 3 });
        assert_eq!(catalogue.titles().collect::<Vec<_>>(), vec!["Heat"]);
    }

    #[test]
    fn test_missing_columns_fail_the_load() {
        let result = parse_catalogue("title,rated\nHeat,R");
        assert!(matches!(result, Err(AppError::CatalogueUnavailable(_))));
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let text = format!(
            ",{}\n0,Heat,R,Crime,,,Al Pacino,A heist,http://p/heat.jpg,8.3,tt0113277",
            HEADER
        );
        let (catalogue, report) = parse_catalogue(&text).unwrap();
        assert_eq!(report.rows, 1);
        assert_eq!(catalogue.get(0).unwrap().title, "Heat");
    }

    #[test]
    fn test_title_index_first_occurrence_wins() {
        let text = csv(&[
            "Solaris,PG,Sci-Fi,,,Donatas Banionis,Ocean planet,http://p/1.jpg,8.0,tt0069293",
            "Heat,R,Crime,,,Al Pacino,A heist,http://p/2.jpg,8.3,tt0113277",
            "Solaris,PG-13,Sci-Fi,,,George Clooney,Ocean planet,http://p/3.jpg,6.2,tt0307479",
        ]);
        let (catalogue, _) = parse_catalogue(&text).unwrap();
        let index = TitleIndex::build(&catalogue);

        assert_eq!(index.len(), 2);
        assert_eq!(index.get("Solaris"), Some(0));
        assert_eq!(index.get("Heat"), Some(1));
        assert!(index.get("Ronin").is_none());
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let row = "Heat,R,Crime,,,Al Pacino,A heist,http://p/heat.jpg,8.3,tt0113277";
        let (first, _) = parse_catalogue(&csv(&[row])).unwrap();
        let (second, _) = parse_catalogue(&csv(&[row])).unwrap();
        let (changed, _) =
            parse_catalogue(&csv(&["Heat,R,Crime,,,Al Pacino,A heist,http://p/heat.jpg,8.4,tt0113277"]))
                .unwrap();

        assert_eq!(first.key(), second.key());
        assert_ne!(first.key(), changed.key());
        assert_eq!(first.key().as_str().len(), 64);
    }

    #[tokio::test]
    async fn test_load_and_index_from_source() {
        let mut source = MockCatalogueSource::new();
        source.expect_fetch().times(1).returning(|| {
            Ok(csv(&[
                "Heat,R,Crime,,,Al Pacino,A heist,http://p/heat.jpg,8.3,tt0113277",
            ]))
        });
        source.expect_name().return_const("mock".to_string());

        let (catalogue, index) = load_and_index(&source).await.unwrap();
        assert_eq!(catalogue.len(), 1);
        assert_eq!(index.get("Heat"), Some(0));
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let mut source = MockCatalogueSource::new();
        source
            .expect_fetch()
            .returning(|| Err(AppError::CatalogueUnavailable("503".to_string())));
        source.expect_name().return_const("mock".to_string());

        let result = load_and_index(&source).await;
        assert!(matches!(result, Err(AppError::CatalogueUnavailable(_))));
    }
}
