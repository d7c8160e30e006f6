pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use crate::{
    config::Config,
    routes::AppState,
    services::{
        providers::{CatalogueSource, FileCatalogueSource, HttpCatalogueSource},
        CommentStore, SimilarityCache,
    },
};

/// Builds the application state described by `config`
///
/// No catalogue is loaded yet; call [`AppState::reload`] to fetch one.
pub fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let source: Arc<dyn CatalogueSource> = match &config.catalogue_path {
        Some(path) => Arc::new(FileCatalogueSource::new(path.clone())),
        None => Arc::new(HttpCatalogueSource::new(config.catalogue_url.clone())),
    };

    let cache = SimilarityCache::new(config.vectorizer(), config.kernel())
        .map_err(|e| anyhow::anyhow!("Invalid vectorizer configuration: {}", e))?;

    Ok(AppState::new(
        source,
        Arc::new(cache),
        CommentStore::new(config.comment_dir.clone()),
    ))
}
