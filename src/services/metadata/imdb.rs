//! IMDb title page metadata source
//!
//! Downloads the page behind the catalog link and runs the extraction strategies
//! over it.
use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    models::PartialMetadata,
    services::metadata::{extract, MetadataSource},
};

#[derive(Clone)]
pub struct ImdbPageSource {
    http_client: HttpClient,
}

impl ImdbPageSource {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }
}

#[async_trait::async_trait]
impl MetadataSource for ImdbPageSource {
    async fn fetch(&self, _title: &str, link: &str) -> AppResult<PartialMetadata> {
        if !(link.starts_with("http://") || link.starts_with("https://")) {
            return Err(AppError::InvalidArgument(format!(
                "Not an http(s) link: {}",
                link
            )));
        }

        let response = self.http_client.get(link).send().await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "IMDb returned status {} for {}",
                response.status(),
                link
            )));
        }

        let page = response.text().await?;
        let found = extract::extract(&page);

        tracing::debug!(
            link = %link,
            bytes = page.len(),
            complete = found.is_complete(),
            "Extracted metadata from IMDb page"
        );

        Ok(found)
    }

    fn name(&self) -> &'static str {
        "imdb_page"
    }
}
