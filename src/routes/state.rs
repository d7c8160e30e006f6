use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::{
    error::AppResult,
    models::CatalogueSummary,
    services::{
        catalogue::{build_snapshot, CatalogueSnapshot},
        providers::CatalogueSource,
        CommentStore, SimilarityCache,
    },
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    snapshot: Arc<RwLock<Option<Arc<CatalogueSnapshot>>>>,
    reload_lock: Arc<Mutex<()>>,
    pub cache: Arc<SimilarityCache>,
    pub source: Arc<dyn CatalogueSource>,
    pub comments: Arc<CommentStore>,
}

impl AppState {
    /// Creates a state with no catalogue loaded yet
    pub fn new(
        source: Arc<dyn CatalogueSource>,
        cache: Arc<SimilarityCache>,
        comments: CommentStore,
    ) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(None)),
            reload_lock: Arc::new(Mutex::new(())),
            cache,
            source,
            comments: Arc::new(comments),
        }
    }

    /// Current catalogue snapshot, `None` while no catalogue could be loaded
    pub async fn snapshot(&self) -> Option<Arc<CatalogueSnapshot>> {
        self.snapshot.read().await.clone()
    }

    /// Fetches the catalogue again and swaps in the rebuilt snapshot
    ///
    /// The previous snapshot keeps serving while the fetch and build run and
    /// is left in place if either fails. Reloads run one at a time, so the
    /// last one started is the one left serving.
    pub async fn reload(&self) -> AppResult<CatalogueSummary> {
        let _guard = self.reload_lock.lock().await;

        let (snapshot, rebuilt) = build_snapshot(self.source.as_ref(), self.cache.clone()).await?;
        let summary = snapshot.summary(rebuilt);

        self.cache.retain_only(snapshot.catalogue().key());
        *self.snapshot.write().await = Some(Arc::new(snapshot));

        tracing::info!(
            rows = summary.rows,
            skipped = summary.skipped,
            rebuilt = summary.rebuilt,
            fingerprint = %summary.fingerprint,
            "Catalogue snapshot swapped in"
        );

        Ok(summary)
    }
}
