use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub redis: RedisConfig,
    pub store: StoreConfig,
    pub recommendation: RecommendationConfig,
    pub community: CommunityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// Interaction log backend. Disabled means events only go to tracing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub enabled: bool,
    pub url: String,
    pub key_prefix: String,
    pub max_entries: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    pub seed_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    pub model_version: String,
    pub history_limit: usize,
    pub max_items: usize,
    pub ranking_depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityConfig {
    pub cache_ttl_seconds: i64,
    pub temperature_window: f64,
    pub trend_days: i64,
    pub similar_users: usize,
    pub result_limit: usize,
    pub like_scan_limit: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            model_version: "1.0.0".to_string(),
            history_limit: 100,
            max_items: 5,
            ranking_depth: 8,
        }
    }
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: 300,
            temperature_window: 3.0,
            trend_days: 7,
            similar_users: 5,
            result_limit: 20,
            like_scan_limit: 50,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                workers: num_cpus::get(),
            },
            redis: RedisConfig {
                enabled: false,
                url: "redis://localhost:6379".to_string(),
                key_prefix: "stylecast".to_string(),
                max_entries: 1000,
            },
            store: StoreConfig::default(),
            recommendation: RecommendationConfig::default(),
            community: CommunityConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let defaults = config::Config::try_from(&Config::default())?;
        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("STYLECAST").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Loads `path` when it exists, otherwise falls back to defaults.
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        if std::path::Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::info!("Config file {} not found, using default configuration", path);
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.recommendation.history_limit, 100);
        assert_eq!(config.recommendation.max_items, 5);
        assert_eq!(config.community.cache_ttl_seconds, 300);
        assert!(!config.redis.enabled);
        assert!(config.server.socket_addr().is_ok());
        assert!(config.server.workers >= 1);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load_or_default("does/not/exist.toml").unwrap();
        assert_eq!(config.recommendation.model_version, "1.0.0");
    }
}
