use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path to the feature matrix (JSON array of numeric rows)
    #[serde(default = "default_movie_data_path")]
    pub movie_data_path: String,

    /// Path to the title table (JSON array of `[title, _, link]` rows)
    #[serde(default = "default_movie_titles_path")]
    pub movie_titles_path: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on the number of recommendations a client may request
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,

    /// OMDb API key; the OMDb metadata source is skipped when unset
    #[serde(default)]
    pub omdb_api_key: Option<String>,

    /// OMDb API base URL
    #[serde(default = "default_omdb_api_url")]
    pub omdb_api_url: String,

    /// Redis connection URL; metadata caching is disabled when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Metadata cache time-to-live in seconds
    #[serde(default = "default_metadata_cache_ttl_secs")]
    pub metadata_cache_ttl_secs: u64,

    /// Timeout for outbound metadata requests in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_movie_data_path() -> String {
    "./data/movie_data.json".to_string()
}

fn default_movie_titles_path() -> String {
    "./data/movie_titles.json".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_recommendations() -> usize {
    20
}

fn default_omdb_api_url() -> String {
    "http://www.omdbapi.com/".to_string()
}

fn default_metadata_cache_ttl_secs() -> u64 {
    1800 // 30 minutes
}

fn default_http_timeout_secs() -> u64 {
    15
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        envy::from_iter(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>(),
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.movie_data_path, "./data/movie_data.json");
        assert_eq!(config.movie_titles_path, "./data/movie_titles.json");
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_recommendations, 20);
        assert_eq!(config.metadata_cache_ttl_secs, 1800);
        assert_eq!(config.omdb_api_key, None);
        assert_eq!(config.redis_url, None);
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("HOST", "0.0.0.0"),
            ("OMDB_API_KEY", "abc123"),
            ("REDIS_URL", "redis://cache:6379"),
            ("MAX_RECOMMENDATIONS", "50"),
        ]);
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.omdb_api_key.as_deref(), Some("abc123"));
        assert_eq!(config.redis_url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(config.max_recommendations, 50);
    }
}
