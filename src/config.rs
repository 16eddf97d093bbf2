//! Application configuration
//!
//! Loaded from a TOML file (default `~/.config/campus-service/config.toml`).
//! Every section has defaults so a partial file is valid; a missing file is
//! created with the defaults on first start.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("campus-service")
        .join("config.toml")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub admin: AdminConfig,
    pub rate_limit: RateLimitConfig,
    pub cache: CacheConfig,
    pub email: EmailConfig,
    pub storage: StorageConfig,
    pub stream: StreamConfig,
    pub catalogs: CatalogsConfig,
    pub earnings: EarningsConfig,
    pub referral: ReferralConfig,
    pub recommendation: RecommendationConfig,
}

impl AppConfig {
    /// Load configuration from `path`, writing defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let cfg = Self::default();
            cfg.save(path)?;
            return Ok(cfg);
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let body = toml::to_string_pretty(self)?;
        std::fs::write(path, body).map_err(io_err)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for in-flight work on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "sqlite://./campus.db?mode=rwc".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 10,
        }
    }
}

impl DatabaseSection {
    /// `DATABASE_URL` overrides the configured url.
    pub fn connection_url(&self) -> String {
        std::env::var("DATABASE_URL").unwrap_or_else(|_| self.url.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "text" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub bcrypt_cost: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_hours: 24,
            bcrypt_cost: 12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: "admin@campus.local".to_string(),
            username: "admin".to_string(),
            password: "admin12345".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub per_second: u64,
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: 20,
            burst: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub short_ttl_secs: u64,
    pub medium_ttl_secs: u64,
    pub long_ttl_secs: u64,
    pub cleanup_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            short_ttl_secs: 60,
            medium_ttl_secs: 300,
            long_ttl_secs: 3600,
            cleanup_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// "log" (default) or "http"
    pub provider: String,
    pub api_url: String,
    pub api_key: String,
    pub from_address: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: "log".to_string(),
            api_url: String::new(),
            api_key: String::new(),
            from_address: "no-reply@campus.local".to_string(),
        }
    }
}

/// S3-compatible object storage (Cloudflare R2)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub account_id: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    /// Optional public CDN base for READY assets
    pub public_base_url: Option<String>,
    /// Override endpoint (defaults to `https://{account_id}.r2.cloudflarestorage.com`)
    pub endpoint: Option<String>,
}

impl StorageConfig {
    pub fn is_configured(&self) -> bool {
        !self.access_key_id.is_empty() && !self.secret_access_key.is_empty() && !self.bucket.is_empty()
    }
}

/// Cloudflare Stream
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub account_id: String,
    pub api_token: String,
    pub api_base: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            account_id: String::new(),
            api_token: String::new(),
            api_base: "https://api.cloudflare.com/client/v4".to_string(),
        }
    }
}

impl StreamConfig {
    pub fn is_configured(&self) -> bool {
        !self.account_id.is_empty() && !self.api_token.is_empty()
    }
}

/// Third-party course catalogs used by course import
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogsConfig {
    pub udemy_base_url: String,
    pub udemy_client_id: String,
    pub udemy_client_secret: String,
    pub coursera_base_url: String,
    pub coursera_api_key: String,
    pub pluralsight_base_url: String,
    pub pluralsight_api_key: String,
    pub youtube_base_url: String,
    pub youtube_api_key: String,
    pub request_timeout_secs: u64,
}

impl Default for CatalogsConfig {
    fn default() -> Self {
        Self {
            udemy_base_url: "https://www.udemy.com/api-2.0".to_string(),
            udemy_client_id: String::new(),
            udemy_client_secret: String::new(),
            coursera_base_url: "https://api.coursera.org/api".to_string(),
            coursera_api_key: String::new(),
            pluralsight_base_url: "https://api.pluralsight.com".to_string(),
            pluralsight_api_key: String::new(),
            youtube_base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            youtube_api_key: String::new(),
            request_timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EarningsConfig {
    /// Students below this many active days in a period do not count toward payouts
    pub min_active_days: u32,
    /// Teacher share of course and bundle sales, in percent
    pub revenue_share_percent: u32,
    /// Teacher share of individual lesson sales, in percent
    pub lesson_share_percent: u32,
}

impl Default for EarningsConfig {
    fn default() -> Self {
        Self {
            min_active_days: 3,
            revenue_share_percent: 70,
            lesson_share_percent: 80,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferralConfig {
    /// Reward granted to the referrer when the referred user first enrolls
    pub reward_cents: i64,
}

impl Default for ReferralConfig {
    fn default() -> Self {
        Self { reward_cents: 500 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    pub collaborative_weight: f64,
    pub content_weight: f64,
    pub popularity_weight: f64,
    pub limit: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            collaborative_weight: 0.5,
            content_weight: 0.3,
            popularity_weight: 0.2,
            limit: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [server]
            api_port = 9090

            [earnings]
            min_active_days = 5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.api_port, 9090);
        assert_eq!(cfg.server.api_host, "0.0.0.0");
        assert_eq!(cfg.earnings.min_active_days, 5);
        assert_eq!(cfg.earnings.revenue_share_percent, 70);
        assert_eq!(cfg.cache.medium_ttl_secs, 300);
    }

    #[test]
    fn defaults_roundtrip_through_toml() {
        let body = toml::to_string_pretty(&AppConfig::default()).unwrap();
        let parsed = AppConfig::from_toml(&body).unwrap();
        assert_eq!(parsed.logging.level, "info");
        assert_eq!(parsed.recommendation.limit, 10);
    }

    #[test]
    fn storage_requires_credentials() {
        assert!(!StorageConfig::default().is_configured());
    }
}
