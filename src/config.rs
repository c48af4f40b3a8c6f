use serde::Deserialize;
use std::time::Duration;

const PLACEHOLDER_API_KEY: &str = "your_tmdb_api_key_here";

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key; absence is reported to the home view as a fatal error
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Base URL of the recommendation backend
    #[serde(default = "default_recommendations_api_url")]
    pub recommendations_api_url: String,

    /// Appwrite endpoint, e.g. https://cloud.appwrite.io/v1
    #[serde(default)]
    pub appwrite_endpoint: Option<String>,

    #[serde(default)]
    pub appwrite_project_id: Option<String>,

    #[serde(default)]
    pub appwrite_database_id: Option<String>,

    #[serde(default)]
    pub appwrite_watchlist_collection_id: Option<String>,

    /// Redis connection URL for the local watchlist fallback
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Quiet period before a search term becomes the effective query
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Interval between featured movie rotations
    #[serde(default = "default_featured_rotation_secs")]
    pub featured_rotation_secs: u64,

    /// Results per page returned by the movie API
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Timeout applied to every outbound HTTP request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_recommendations_api_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_search_debounce_ms() -> u64 {
    450
}

fn default_featured_rotation_secs() -> u64 {
    9
}

fn default_page_size() -> usize {
    20
}

fn default_request_timeout_secs() -> u64 {
    15
}

/// Connection settings for the Appwrite backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppwriteSettings {
    pub endpoint: String,
    pub project_id: String,
    pub database_id: Option<String>,
    pub collection_id: Option<String>,
}

impl AppwriteSettings {
    /// Document operations need both identifiers
    pub fn has_collection(&self) -> bool {
        self.database_id.is_some() && self.collection_id.is_some()
    }
}

/// Which watchlist backend the configuration selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchlistBackend {
    Appwrite(AppwriteSettings),
    Local { redis_url: String },
    Disabled,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Load configuration from explicit key/value pairs
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// The TMDB API key, if one that is not the template placeholder was supplied
    pub fn api_key(&self) -> Option<&str> {
        non_blank(&self.tmdb_api_key).filter(|key| *key != PLACEHOLDER_API_KEY)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn featured_rotation(&self) -> Duration {
        Duration::from_secs(self.featured_rotation_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Selects the watchlist backend.
    ///
    /// Appwrite wins when its endpoint and project are set, even if the collection
    /// identifiers are missing (sessions still work, documents report unavailable).
    /// Otherwise a Redis URL enables the local fallback.
    pub fn watchlist_backend(&self) -> WatchlistBackend {
        if let (Some(endpoint), Some(project_id)) = (
            non_blank(&self.appwrite_endpoint),
            non_blank(&self.appwrite_project_id),
        ) {
            return WatchlistBackend::Appwrite(AppwriteSettings {
                endpoint: endpoint.trim_end_matches('/').to_string(),
                project_id: project_id.to_string(),
                database_id: non_blank(&self.appwrite_database_id).map(str::to_string),
                collection_id: non_blank(&self.appwrite_watchlist_collection_id)
                    .map(str::to_string),
            });
        }

        match non_blank(&self.redis_url) {
            Some(url) => WatchlistBackend::Local {
                redis_url: url.to_string(),
            },
            None => WatchlistBackend::Disabled,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(vars(&[])).unwrap();
        assert_eq!(config.tmdb_api_url, "https://api.themoviedb.org/3");
        assert_eq!(config.search_debounce(), Duration::from_millis(450));
        assert_eq!(config.featured_rotation(), Duration::from_secs(9));
        assert_eq!(config.page_size, 20);
        assert_eq!(config.api_key(), None);
        assert_eq!(config.watchlist_backend(), WatchlistBackend::Disabled);
    }

    #[test]
    fn test_placeholder_api_key_is_absent() {
        let config =
            Config::from_vars(vars(&[("TMDB_API_KEY", "your_tmdb_api_key_here")])).unwrap();
        assert_eq!(config.api_key(), None);

        let config = Config::from_vars(vars(&[("TMDB_API_KEY", "  ")])).unwrap();
        assert_eq!(config.api_key(), None);

        let config = Config::from_vars(vars(&[("TMDB_API_KEY", "abc123")])).unwrap();
        assert_eq!(config.api_key(), Some("abc123"));
    }

    #[test]
    fn test_appwrite_backend_selected() {
        let config = Config::from_vars(vars(&[
            ("APPWRITE_ENDPOINT", "https://cloud.appwrite.io/v1/"),
            ("APPWRITE_PROJECT_ID", "proj"),
            ("APPWRITE_DATABASE_ID", "db"),
            ("APPWRITE_WATCHLIST_COLLECTION_ID", "wishlist"),
            ("REDIS_URL", "redis://localhost:6379"),
        ]))
        .unwrap();

        match config.watchlist_backend() {
            WatchlistBackend::Appwrite(settings) => {
                assert_eq!(settings.endpoint, "https://cloud.appwrite.io/v1");
                assert!(settings.has_collection());
            }
            other => panic!("expected appwrite backend, got {:?}", other),
        }
    }

    #[test]
    fn test_appwrite_without_collection() {
        let config = Config::from_vars(vars(&[
            ("APPWRITE_ENDPOINT", "https://cloud.appwrite.io/v1"),
            ("APPWRITE_PROJECT_ID", "proj"),
        ]))
        .unwrap();

        match config.watchlist_backend() {
            WatchlistBackend::Appwrite(settings) => assert!(!settings.has_collection()),
            other => panic!("expected appwrite backend, got {:?}", other),
        }
    }

    #[test]
    fn test_local_backend_selected() {
        let config =
            Config::from_vars(vars(&[("REDIS_URL", "redis://localhost:6379")])).unwrap();
        assert_eq!(
            config.watchlist_backend(),
            WatchlistBackend::Local {
                redis_url: "redis://localhost:6379".to_string()
            }
        );
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(vars(&[
            ("SEARCH_DEBOUNCE_MS", "500"),
            ("FEATURED_ROTATION_SECS", "0"),
            ("PAGE_SIZE", "10"),
        ]))
        .unwrap();
        assert_eq!(config.search_debounce(), Duration::from_millis(500));
        assert_eq!(config.featured_rotation(), Duration::from_secs(1));
        assert_eq!(config.page_size, 10);
    }
}
