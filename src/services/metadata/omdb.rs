//! OMDb API metadata source
//!
//! Looks a movie up by the IMDb id embedded in its link, falling back to a title
//! search when the id is missing or unknown to OMDb.
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::PartialMetadata,
    services::metadata::MetadataSource,
};

static IMDB_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"tt\d{7,8}").expect("imdb id regex"));

static YEAR_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(\d{4}\)\s*$").expect("year suffix regex"));

/// OMDb's marker for a missing field
const NOT_AVAILABLE: &str = "N/A";

/// Raw OMDb response; failed lookups carry `"Response": "False"` and an `Error`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbResponse {
    response: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    actors: Option<String>,
    #[serde(default)]
    plot: Option<String>,
    #[serde(default)]
    poster: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl OmdbResponse {
    fn into_partial(self) -> Option<PartialMetadata> {
        if self.response != "True" {
            return None;
        }

        let available = |field: Option<String>| field.filter(|v| v != NOT_AVAILABLE);
        Some(PartialMetadata {
            title: available(self.title),
            cast: available(self.actors),
            plot: available(self.plot),
            poster_url: available(self.poster).filter(|url| url.starts_with("http")),
        })
    }
}

/// Extracts the IMDb id (e.g. `tt0499549`) from an IMDb link
pub fn extract_imdb_id(link: &str) -> Option<&str> {
    IMDB_ID_RE.find(link).map(|m| m.as_str())
}

/// Removes a trailing release year such as `" (2009)"`
pub fn strip_year(title: &str) -> String {
    YEAR_SUFFIX_RE.replace(title, "").trim().to_string()
}

#[derive(Clone)]
pub struct OmdbSource {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl OmdbSource {
    pub fn new(http_client: HttpClient, api_key: String, api_url: String) -> Self {
        Self {
            http_client,
            api_key,
            api_url,
        }
    }

    /// Runs one OMDb query; `None` when OMDb reports no match
    async fn lookup(&self, param: &str, value: &str) -> AppResult<Option<PartialMetadata>> {
        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[("apikey", self.api_key.as_str()), (param, value)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "OMDb returned status {}: {}",
                status, body
            )));
        }

        let body: OmdbResponse = response.json().await?;
        if let Some(error) = &body.error {
            tracing::debug!(param = %param, value = %value, error = %error, "OMDb lookup missed");
        }

        Ok(body.into_partial())
    }
}

#[async_trait::async_trait]
impl MetadataSource for OmdbSource {
    async fn fetch(&self, title: &str, link: &str) -> AppResult<PartialMetadata> {
        if let Some(imdb_id) = extract_imdb_id(link) {
            match self.lookup("i", imdb_id).await {
                Ok(Some(found)) => return Ok(found),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(imdb_id = %imdb_id, error = %e, "OMDb id lookup failed, trying title");
                }
            }
        }

        let title = strip_year(title);
        if title.is_empty() {
            return Ok(PartialMetadata::default());
        }

        Ok(self.lookup("t", &title).await?.unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "omdb"
    }
}
