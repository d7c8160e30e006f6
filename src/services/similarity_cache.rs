use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Instant;

use crate::{
    error::AppResult,
    services::{
        catalogue::{Catalogue, CatalogueKey},
        features::{build_features, TfidfVectorizer, VectorizerConfig},
        similarity::{compute_similarity, SigmoidKernel, SimilarityMatrix},
    },
};

type Slot = Arc<OnceLock<Arc<SimilarityMatrix>>>;

/// Memoized similarity matrices keyed by catalogue content
///
/// Concurrent requests for the same catalogue wait on a single build;
/// different catalogues build independently.
pub struct SimilarityCache {
    vectorizer: TfidfVectorizer,
    kernel: SigmoidKernel,
    slots: Mutex<HashMap<CatalogueKey, Slot>>,
    builds: AtomicUsize,
}

impl SimilarityCache {
    pub fn new(config: VectorizerConfig, kernel: SigmoidKernel) -> AppResult<Self> {
        Ok(Self {
            vectorizer: TfidfVectorizer::new(config)?,
            kernel,
            slots: Mutex::new(HashMap::new()),
            builds: AtomicUsize::new(0),
        })
    }

    /// Similarity matrix of a catalogue, computed at most once per content
    pub fn get_similarity(&self, catalogue: &Catalogue) -> Arc<SimilarityMatrix> {
        self.get_or_build(catalogue).0
    }

    /// Like [`get_similarity`](Self::get_similarity), also telling whether
    /// this call performed the build
    pub fn get_or_build(&self, catalogue: &Catalogue) -> (Arc<SimilarityMatrix>, bool) {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.entry(catalogue.key().clone()).or_default().clone()
        };

        let mut built = false;
        let matrix = slot
            .get_or_init(|| {
                built = true;
                self.build(catalogue)
            })
            .clone();

        if !built {
            tracing::debug!(fingerprint = %catalogue.key(), "Similarity cache hit");
        }

        (matrix, built)
    }

    fn build(&self, catalogue: &Catalogue) -> Arc<SimilarityMatrix> {
        let start = Instant::now();
        self.builds.fetch_add(1, Ordering::SeqCst);

        let features = build_features(catalogue.movies(), &self.vectorizer);
        let matrix = compute_similarity(&features, &self.kernel);

        tracing::info!(
            fingerprint = %catalogue.key(),
            rows = matrix.len(),
            features = features.n_features(),
            processing_time_ms = start.elapsed().as_millis(),
            "Similarity matrix built"
        );

        Arc::new(matrix)
    }

    /// Number of full matrix computations performed so far
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    /// Number of catalogues currently memoized
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every memoized matrix except the one for `key`
    pub fn retain_only(&self, key: &CatalogueKey) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.retain(|slot_key, _| slot_key == key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Movie;
    use std::thread;

    fn new_cache() -> SimilarityCache {
        SimilarityCache::new(VectorizerConfig::default(), SigmoidKernel::default()).unwrap()
    }

    fn catalogue(genres: &[&str]) -> Catalogue {
        let movies = genres
            .iter()
            .enumerate()
            .map(|(i, genre)| Movie {
                title: format!("Movie {}", i),
                rated: "PG".to_string(),
                genre_1: genre.to_string(),
                genre_2: String::new(),
                genre_3: String::new(),
                actor_1: "Someone".to_string(),
                plot: "Something happens".to_string(),
                poster: String::new(),
                average_rating: 6.5,
                title_id: format!("tt{:07}", i),
            })
            .collect();
        Catalogue::new(movies)
    }

    #[test]
    fn test_second_call_is_memoized() {
        let cache = new_cache();
        let movies = catalogue(&["Drama", "Drama", "Drama", "Comedy"]);

        let (first, built_first) = cache.get_or_build(&movies);
        let (second, built_second) = cache.get_or_build(&movies);

        assert!(built_first);
        assert!(!built_second);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.builds(), 1);
    }

    #[test]
    fn test_equal_content_shares_a_build() {
        let cache = new_cache();
        cache.get_similarity(&catalogue(&["Drama", "Comedy"]));
        cache.get_similarity(&catalogue(&["Drama", "Comedy"]));
        assert_eq!(cache.builds(), 1);

        cache.get_similarity(&catalogue(&["Drama", "Horror"]));
        assert_eq!(cache.builds(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_concurrent_callers_build_once() {
        let cache = Arc::new(new_cache());
        let movies = Arc::new(catalogue(&["Drama"; 50]));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let movies = movies.clone();
                thread::spawn(move || cache.get_similarity(&movies))
            })
            .collect();

        let matrices: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(cache.builds(), 1);
        assert!(matrices.iter().all(|m| Arc::ptr_eq(m, &matrices[0])));
    }

    #[test]
    fn test_retain_only_evicts_other_catalogues() {
        let cache = new_cache();
        let old = catalogue(&["Drama"]);
        let new = catalogue(&["Comedy"]);
        cache.get_similarity(&old);
        cache.get_similarity(&new);

        cache.retain_only(new.key());
        assert_eq!(cache.len(), 1);

        cache.get_similarity(&new);
        assert_eq!(cache.builds(), 2);
    }
}
