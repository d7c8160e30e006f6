use std::path::PathBuf;

use crate::{
    error::{AppError, AppResult},
    services::providers::CatalogueSource,
};

/// Catalogue stored as a local CSV file
#[derive(Debug, Clone)]
pub struct FileCatalogueSource {
    path: PathBuf,
}

impl FileCatalogueSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl CatalogueSource for FileCatalogueSource {
    async fn fetch(&self) -> AppResult<String> {
        let body = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "Catalogue read failed");
            AppError::CatalogueUnavailable(format!("{}: {}", self.path.display(), e))
        })?;

        tracing::info!(
            path = %self.path.display(),
            bytes = body.len(),
            "Catalogue read from disk"
        );

        Ok(body)
    }

    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_file_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "title\nHeat\n").unwrap();

        let source = FileCatalogueSource::new(file.path());
        let body = tokio_test::block_on(source.fetch()).unwrap();
        assert_eq!(body, "title\nHeat\n");
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let source = FileCatalogueSource::new("/nonexistent/movies.csv");
        let result = tokio_test::block_on(source.fetch());
        assert!(matches!(result, Err(AppError::CatalogueUnavailable(_))));
    }
}
