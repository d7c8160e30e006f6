use serde::Deserialize;
use std::path::PathBuf;

use crate::services::features::{FeatureSource, VectorizerConfig};
use crate::services::similarity::SigmoidKernel;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Remote CSV catalogue URL
    #[serde(default = "default_catalogue_url")]
    pub catalogue_url: String,

    /// Local CSV catalogue; takes precedence over `catalogue_url` when set
    #[serde(default)]
    pub catalogue_path: Option<PathBuf>,

    /// Directory visitor comments are written to
    #[serde(default = "default_comment_dir")]
    pub comment_dir: PathBuf,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Minimum number of documents a term must appear in
    #[serde(default = "default_min_df")]
    pub min_df: usize,

    /// Vocabulary size cap, unlimited when unset
    #[serde(default)]
    pub max_features: Option<usize>,

    /// Which movie fields feed the feature vectors
    #[serde(default)]
    pub feature_source: FeatureSource,

    /// Kernel scale, `1 / n_features` when unset
    #[serde(default)]
    pub similarity_gamma: Option<f64>,

    /// Kernel offset
    #[serde(default = "default_similarity_coef0")]
    pub similarity_coef0: f64,
}

fn default_catalogue_url() -> String {
    "https://raw.githubusercontent.com/VictoriaGaullier/reco-sigmoide/main/df%20(3).csv".to_string()
}

fn default_comment_dir() -> PathBuf {
    PathBuf::from("comments")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_min_df() -> usize {
    3
}

fn default_similarity_coef0() -> f64 {
    1.0
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Vectorizer settings derived from the configuration
    pub fn vectorizer(&self) -> VectorizerConfig {
        VectorizerConfig {
            min_df: self.min_df,
            max_features: self.max_features,
            source: self.feature_source,
            ..VectorizerConfig::default()
        }
    }

    /// Similarity kernel derived from the configuration
    pub fn kernel(&self) -> SigmoidKernel {
        SigmoidKernel {
            gamma: self.similarity_gamma,
            coef0: self.similarity_coef0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_environment() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.min_df, 3);
        assert_eq!(config.max_features, None);
        assert_eq!(config.feature_source, FeatureSource::Genres);
        assert_eq!(config.similarity_gamma, None);
        assert_eq!(config.similarity_coef0, 1.0);
        assert!(config.catalogue_path.is_none());
        assert!(config.catalogue_url.ends_with(".csv"));
    }

    #[test]
    fn test_overrides() {
        let vars = vec![
            ("PORT".to_string(), "8080".to_string()),
            ("MIN_DF".to_string(), "1".to_string()),
            ("FEATURE_SOURCE".to_string(), "composite".to_string()),
            ("SIMILARITY_GAMMA".to_string(), "0.5".to_string()),
            ("CATALOGUE_PATH".to_string(), "movies.csv".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.vectorizer().min_df, 1);
        assert_eq!(config.vectorizer().source, FeatureSource::Composite);
        assert_eq!(config.kernel().gamma, Some(0.5));
        assert_eq!(config.catalogue_path, Some(PathBuf::from("movies.csv")));
    }
}
