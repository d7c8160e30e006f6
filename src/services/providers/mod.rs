/// Catalogue data sources
///
/// The catalogue is a CSV dataset that can live behind an HTTP URL or on the
/// local filesystem. Loading code only sees the raw CSV text and never cares
/// where it came from.
use crate::error::AppResult;

pub mod file;
pub mod http;

pub use file::FileCatalogueSource;
pub use http::HttpCatalogueSource;

/// Trait for catalogue providers
///
/// A failed fetch must surface as an error rather than an empty body so the
/// caller can keep serving whatever catalogue it already has.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogueSource: Send + Sync {
    /// Fetch the raw CSV text of the catalogue
    async fn fetch(&self) -> AppResult<String>;

    /// Source description for logging and debugging
    fn name(&self) -> String;
}
