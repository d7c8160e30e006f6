use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    services::providers::CatalogueSource,
};

/// Catalogue served as a CSV file over HTTP
#[derive(Clone)]
pub struct HttpCatalogueSource {
    http_client: HttpClient,
    url: String,
}

impl HttpCatalogueSource {
    pub fn new(url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            url,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl CatalogueSource for HttpCatalogueSource {
    async fn fetch(&self) -> AppResult<String> {
        let response = self.http_client.get(&self.url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(url = %self.url, status = %status, "Catalogue fetch failed");
            return Err(AppError::CatalogueUnavailable(format!(
                "{} returned status {}",
                self.url, status
            )));
        }

        let body = response.text().await?;

        tracing::info!(
            url = %self.url,
            bytes = body.len(),
            "Catalogue downloaded"
        );

        Ok(body)
    }

    fn name(&self) -> String {
        format!("http:{}", self.url)
    }
}
