//! Text features for movies
//!
//! Each movie is turned into one document, the corpus is fit into a TF-IDF
//! vocabulary of word n-grams, and every document becomes a sparse,
//! L2-normalised vector over that vocabulary. Row order always follows the
//! catalogue order.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::{
    error::{AppError, AppResult},
    models::Movie,
};

/// Number of times the primary genre is repeated in a movie's document
pub const PRIMARY_GENRE_WEIGHT: usize = 8;

/// Terms excluded from the vocabulary.
///
/// The capitalized and punctuation entries can never match once the text is
/// lowercased and tokenized on word characters; they are kept so the list
/// stays identical to the one the dataset was tuned with.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    " ", ".", ",", "and", "the", "a", "an", "in", "of", "to", "is", "it", "that", "A", "An",
    "The", "Of",
];

/// Runs of one or more word characters
pub const DEFAULT_TOKEN_PATTERN: &str = r"\w{1,}";

/// Movie fields a document is built from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureSource {
    /// Primary genre weighted 8x, then secondary and tertiary genres
    #[default]
    Genres,
    /// Content rating, primary genre, lead actor and plot
    Composite,
}

impl FeatureSource {
    /// Builds the text document for one movie
    ///
    /// Parts are joined with spaces so each repetition of the primary genre
    /// stays a separate token; gluing them together would collapse the
    /// weighting into one long token.
    pub fn document(&self, movie: &Movie) -> String {
        let parts: Vec<&str> = match self {
            FeatureSource::Genres => std::iter::repeat(movie.genre_1.as_str())
                .take(PRIMARY_GENRE_WEIGHT)
                .chain([movie.genre_2.as_str(), movie.genre_3.as_str()])
                .collect(),
            FeatureSource::Composite => vec![
                movie.rated.as_str(),
                movie.genre_1.as_str(),
                movie.actor_1.as_str(),
                movie.plot.as_str(),
            ],
        };

        parts
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Vectorizer settings
#[derive(Debug, Clone, PartialEq)]
pub struct VectorizerConfig {
    /// Terms present in fewer documents than this are dropped
    pub min_df: usize,
    /// Keep only the most frequent terms when set
    pub max_features: Option<usize>,
    /// Inclusive n-gram length range
    pub ngram_range: (usize, usize),
    pub lowercase: bool,
    pub strip_accents: bool,
    pub token_pattern: String,
    pub stop_words: Vec<String>,
    pub source: FeatureSource,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            min_df: 3,
            max_features: None,
            ngram_range: (1, 3),
            lowercase: true,
            strip_accents: true,
            token_pattern: DEFAULT_TOKEN_PATTERN.to_string(),
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            source: FeatureSource::default(),
        }
    }
}

/// Sparse vector of `(feature index, weight)` pairs sorted by index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Builds a vector from arbitrary-order entries; zero weights are dropped
    pub fn from_entries(mut entries: Vec<(usize, f64)>) -> Self {
        entries.retain(|(_, weight)| *weight != 0.0);
        entries.sort_by_key(|(index, _)| *index);
        Self { entries }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Number of non-zero features
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    /// Inner product, merging the two sorted index lists
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;

        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_w) = self.entries[i];
            let (b_idx, b_w) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }

        sum
    }

    fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, weight) in &mut self.entries {
                *weight /= norm;
            }
        }
    }
}

/// Fitted vocabulary: terms in lexicographic order with their idf weights
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl Vocabulary {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Feature index of a term
    pub fn get(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// One feature vector per catalogue row, sharing a vocabulary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    rows: Vec<SparseVector>,
    vocabulary: Vocabulary,
}

impl FeatureMatrix {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn row(&self, index: usize) -> Option<&SparseVector> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
}

/// TF-IDF vectorizer over word n-grams
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    token_pattern: Regex,
    stop_words: HashSet<String>,
}

impl TfidfVectorizer {
    /// Creates a vectorizer, validating the token pattern
    pub fn new(config: VectorizerConfig) -> AppResult<Self> {
        let token_pattern = Regex::new(&config.token_pattern).map_err(|e| {
            AppError::InvalidInput(format!(
                "Invalid token pattern `{}`: {}",
                config.token_pattern, e
            ))
        })?;

        if config.ngram_range.0 == 0 || config.ngram_range.0 > config.ngram_range.1 {
            return Err(AppError::InvalidInput(format!(
                "Invalid n-gram range {:?}",
                config.ngram_range
            )));
        }

        let stop_words = config.stop_words.iter().cloned().collect();

        Ok(Self {
            config,
            token_pattern,
            stop_words,
        })
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Splits a document into its n-gram terms
    pub fn analyze(&self, document: &str) -> Vec<String> {
        let mut text = if self.config.strip_accents {
            strip_accents(document)
        } else {
            document.to_string()
        };
        if self.config.lowercase {
            text = text.to_lowercase();
        }

        let tokens: Vec<&str> = self
            .token_pattern
            .find_iter(&text)
            .map(|m| m.as_str())
            .filter(|token| !self.stop_words.contains(*token))
            .collect();

        let (min_n, max_n) = self.config.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    /// Learns the vocabulary and idf weights of a corpus
    pub fn fit<S: AsRef<str>>(&self, documents: &[S]) -> Vocabulary {
        let n_docs = documents.len();
        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for document in documents {
            let terms = self.analyze(document.as_ref());
            let mut seen = HashSet::new();
            for term in terms {
                *term_freq.entry(term.clone()).or_insert(0) += 1;
                if seen.insert(term.clone()) {
                    *doc_freq.entry(term).or_insert(0) += 1;
                }
            }
        }

        let mut kept: Vec<(String, usize)> = term_freq
            .into_iter()
            .filter(|(term, _)| doc_freq.get(term).copied().unwrap_or(0) >= self.config.min_df)
            .collect();

        if let Some(max_features) = self.config.max_features {
            kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            kept.truncate(max_features);
        }

        let mut terms: Vec<String> = kept.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let idf = terms
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0);
                smoothed_idf(n_docs, df)
            })
            .collect();

        let index = terms
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();

        Vocabulary { terms, index, idf }
    }

    /// Weights one document against a fitted vocabulary
    pub fn transform_one(&self, vocabulary: &Vocabulary, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.analyze(document) {
            if let Some(index) = vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let entries = counts
            .into_iter()
            .map(|(index, count)| (index, count * vocabulary.idf[index]))
            .collect();

        let mut vector = SparseVector::from_entries(entries);
        vector.normalize();
        vector
    }

    /// Fits the corpus and returns its feature matrix
    pub fn fit_transform<S: AsRef<str>>(&self, documents: &[S]) -> FeatureMatrix {
        let vocabulary = self.fit(documents);
        let rows = documents
            .iter()
            .map(|document| self.transform_one(&vocabulary, document.as_ref()))
            .collect();

        FeatureMatrix { rows, vocabulary }
    }
}

/// `ln((1 + n) / (1 + df)) + 1`
fn smoothed_idf(n_docs: usize, df: usize) -> f64 {
    ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0
}

/// Decomposes characters (NFKD) and drops combining marks
pub fn strip_accents(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Builds the feature matrix of a catalogue, one row per movie in order
pub fn build_features(movies: &[Movie], vectorizer: &TfidfVectorizer) -> FeatureMatrix {
    let source = vectorizer.config().source;
    let documents: Vec<String> = movies.iter().map(|movie| source.document(movie)).collect();

    let matrix = vectorizer.fit_transform(&documents);

    tracing::debug!(
        rows = matrix.n_rows(),
        features = matrix.n_features(),
        source = ?source,
        "Built feature matrix"
    );

    matrix
}
