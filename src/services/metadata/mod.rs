//! Display metadata for recommended movies
//!
//! Ranking never depends on anything in this module. Given the (title, link) pair a
//! recommendation carries, the resolver asks each configured source in turn and merges
//! what they find. Failures only ever cost fields, never the request.
use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::{
    config::Config,
    db::{Cache, CacheKey},
    error::AppResult,
    models::{MovieMetadata, PartialMetadata},
};

pub mod extract;
pub mod imdb;
pub mod omdb;

pub use imdb::ImdbPageSource;
pub use omdb::OmdbSource;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Resolves display metadata for a recommended movie
///
/// Resolution is best-effort and infallible: every field degrades to empty on failure.
#[async_trait::async_trait]
pub trait MetadataResolver: Send + Sync {
    async fn resolve(&self, title: &str, link: &str) -> MovieMetadata;
}

/// One place metadata can come from
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetches whatever fields this source knows about the movie
    async fn fetch(&self, title: &str, link: &str) -> AppResult<PartialMetadata>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}

/// Resolver that merges an ordered list of sources behind an optional Redis cache
pub struct MetadataService {
    sources: Vec<Box<dyn MetadataSource>>,
    cache: Option<Cache>,
    cache_ttl: u64,
}

impl MetadataService {
    pub fn new(sources: Vec<Box<dyn MetadataSource>>, cache: Option<Cache>, cache_ttl: u64) -> Self {
        Self {
            sources,
            cache,
            cache_ttl,
        }
    }

    /// Builds the standard source chain: OMDb (when a key is configured), then the IMDb page
    pub fn from_config(config: &Config, cache: Option<Cache>) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        let mut sources: Vec<Box<dyn MetadataSource>> = Vec::new();
        match &config.omdb_api_key {
            Some(api_key) if !api_key.trim().is_empty() => {
                sources.push(Box::new(OmdbSource::new(
                    http_client.clone(),
                    api_key.clone(),
                    config.omdb_api_url.clone(),
                )));
            }
            _ => tracing::info!("OMDB_API_KEY not set, resolving metadata from IMDb pages only"),
        }
        sources.push(Box::new(ImdbPageSource::new(http_client)));

        Ok(Self::new(sources, cache, config.metadata_cache_ttl_secs))
    }

    /// Queries sources in order until every field is filled or the sources run out
    async fn collect(&self, title: &str, link: &str) -> PartialMetadata {
        let mut merged = PartialMetadata::default();

        for source in &self.sources {
            match source.fetch(title, link).await {
                Ok(found) => merged = merged.merge(found),
                Err(e) => tracing::warn!(
                    source = source.name(),
                    title = %title,
                    error = %e,
                    "Metadata source failed"
                ),
            }

            if merged.is_complete() {
                break;
            }
        }

        merged
    }
}

#[async_trait::async_trait]
impl MetadataResolver for MetadataService {
    async fn resolve(&self, title: &str, link: &str) -> MovieMetadata {
        let key = CacheKey::Metadata {
            title: title.to_string(),
            link: link.to_string(),
        };

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get_or_miss::<MovieMetadata>(&key).await {
                tracing::debug!(title = %title, "Metadata cache hit");
                return cached;
            }
        }

        let metadata = self.collect(title, link).await.into_metadata();

        if metadata.is_empty() {
            tracing::info!(title = %title, link = %link, "No metadata found");
        } else if let Some(cache) = &self.cache {
            cache.set_in_background(&key, &metadata, self.cache_ttl);
        }

        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn source(result: fn() -> AppResult<PartialMetadata>) -> Box<dyn MetadataSource> {
        let mut mock = MockMetadataSource::new();
        mock.expect_fetch().returning(move |_, _| result());
        mock.expect_name().return_const("mock");
        Box::new(mock)
    }

    #[tokio::test]
    async fn test_merges_sources_in_order() {
        let service = MetadataService::new(
            vec![
                source(|| {
                    Ok(PartialMetadata {
                        title: Some("Avatar".to_string()),
                        plot: Some("Pandora.".to_string()),
                        ..Default::default()
                    })
                }),
                source(|| {
                    Ok(PartialMetadata {
                        title: Some("Avatar (2009)".to_string()),
                        cast: Some("Sam Worthington".to_string()),
                        ..Default::default()
                    })
                }),
            ],
            None,
            1800,
        );

        let metadata = service
            .resolve("Avatar", "http://www.imdb.com/title/tt0499549/")
            .await;
        assert_eq!(metadata.title, "Avatar");
        assert_eq!(metadata.cast, "Sam Worthington");
        assert_eq!(metadata.plot, "Pandora.");
        assert_eq!(metadata.poster_url, None);
    }

    #[tokio::test]
    async fn test_failing_source_degrades() {
        let service = MetadataService::new(
            vec![
                source(|| Err(AppError::ExternalApi("OMDb returned status 401".to_string()))),
                source(|| {
                    Ok(PartialMetadata {
                        poster_url: Some("https://m.media-amazon.com/images/M/p.jpg".to_string()),
                        ..Default::default()
                    })
                }),
            ],
            None,
            1800,
        );

        let metadata = service.resolve("Heat", "http://www.imdb.com/title/tt0113277/").await;
        assert_eq!(
            metadata.poster_url.as_deref(),
            Some("https://m.media-amazon.com/images/M/p.jpg")
        );
        assert_eq!(metadata.title, "");
    }

    #[tokio::test]
    async fn test_all_sources_failing_yields_empty() {
        let service = MetadataService::new(
            vec![source(|| Err(AppError::Internal("boom".to_string())))],
            None,
            1800,
        );

        let metadata = service.resolve("Heat", "link").await;
        assert!(metadata.is_empty());
    }

    #[tokio::test]
    async fn test_stops_once_complete() {
        let mut unused = MockMetadataSource::new();
        unused.expect_fetch().never();
        unused.expect_name().return_const("unused");

        let service = MetadataService::new(
            vec![
                source(|| {
                    Ok(PartialMetadata {
                        title: Some("Up".to_string()),
                        cast: Some("Ed Asner".to_string()),
                        plot: Some("Balloons.".to_string()),
                        poster_url: Some("https://example.com/up.jpg".to_string()),
                    })
                }),
                Box::new(unused),
            ],
            None,
            1800,
        );

        let metadata = service.resolve("Up", "http://www.imdb.com/title/tt1049413/").await;
        assert_eq!(metadata.title, "Up");
    }

    #[tokio::test]
    async fn test_from_config_source_chain() {
        let mut config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();

        let service = MetadataService::from_config(&config, None).unwrap();
        let names: Vec<_> = service.sources.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["imdb_page"]);

        config.omdb_api_key = Some("key".to_string());
        let service = MetadataService::from_config(&config, None).unwrap();
        let names: Vec<_> = service.sources.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["omdb", "imdb_page"]);
    }
}
