//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPFRONT_API_URL` - Base URL of the shop backend
//! - `SHOPFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `SHOPFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `SHOPFRONT_PORT` - Listen port (default: 3000)
//! - `SHOPFRONT_API_TIMEOUT_SECS` - Backend request timeout (default: 10)
//! - `SHOPFRONT_CATALOG_CACHE_TTL_SECS` - Catalog cache TTL, 0 disables (default: 60)
//! - `SHOPFRONT_STATIC_DIR` - Static asset directory (default: crates/storefront/static)
//! - `SHOPFRONT_TRUST_PROXY_HEADERS` - Rate limit by `X-Forwarded-For`/`X-Real-IP`
//!   instead of the peer address; only behind a proxy that sets them (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::api::BackendConfig;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Shop backend connection settings
    pub backend: BackendConfig,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Key the auth rate limiter on proxy headers instead of the peer address
    pub trust_proxy_headers: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url.as_str())
            .field("backend", &self.backend)
            .field("static_dir", &self.static_dir)
            .field("trust_proxy_headers", &self.trust_proxy_headers)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .field("sentry_sample_rate", &self.sentry_sample_rate)
            .field("sentry_traces_sample_rate", &self.sentry_traces_sample_rate)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_source(source: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&source);

        let api_url = env.url("SHOPFRONT_API_URL")?;
        let base_url = env.url("SHOPFRONT_BASE_URL")?;
        let host = env.parsed::<IpAddr>("SHOPFRONT_HOST", "127.0.0.1")?;
        let port = env.parsed::<u16>("SHOPFRONT_PORT", "3000")?;
        let timeout = env.parsed::<u64>("SHOPFRONT_API_TIMEOUT_SECS", "10")?;
        let cache_ttl = env.parsed::<u64>("SHOPFRONT_CATALOG_CACHE_TTL_SECS", "60")?;
        let static_dir = PathBuf::from(
            env.or_default("SHOPFRONT_STATIC_DIR", "crates/storefront/static"),
        );

        Ok(Self {
            host,
            port,
            base_url,
            backend: BackendConfig {
                base_url: api_url,
                timeout: Duration::from_secs(timeout),
                catalog_cache_ttl: Duration::from_secs(cache_ttl),
            },
            static_dir,
            trust_proxy_headers: env.parsed::<bool>("SHOPFRONT_TRUST_PROXY_HEADERS", "false")?,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parsed::<f32>("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: env.parsed::<f32>("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS (drives `Secure` cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable. Empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable with a default value.
    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Parse a required absolute http(s) URL.
    fn url(&self, key: &str) -> Result<Url, ConfigError> {
        let url = Url::parse(self.required(key)?.trim())
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_source(|key| map.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("SHOPFRONT_API_URL", "http://localhost:8000"),
        ("SHOPFRONT_BASE_URL", "http://localhost:3000"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(&REQUIRED).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.backend.timeout, Duration::from_secs(10));
        assert_eq!(config.backend.catalog_cache_ttl, Duration::from_secs(60));
        assert_eq!(config.static_dir, PathBuf::from("crates/storefront/static"));
        assert!(config.sentry_dsn.is_none());
        assert!((config.sentry_sample_rate - 1.0).abs() < f32::EPSILON);
        assert!(!config.is_secure());
        assert!(!config.trust_proxy_headers);
    }

    #[test]
    fn test_trust_proxy_headers() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("SHOPFRONT_TRUST_PROXY_HEADERS", "true"));
        assert!(load(&vars).unwrap().trust_proxy_headers);

        let mut vars = REQUIRED.to_vec();
        vars.push(("SHOPFRONT_TRUST_PROXY_HEADERS", "yes please"));
        let err = load(&vars).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "SHOPFRONT_TRUST_PROXY_HEADERS")
        );
    }

    #[test]
    fn test_missing_api_url() {
        let err = load(&[("SHOPFRONT_BASE_URL", "http://localhost:3000")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "SHOPFRONT_API_URL"));
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("SHOPFRONT_PORT", "not-a-port"));
        let err = load(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "SHOPFRONT_PORT"));
    }

    #[test]
    fn test_rejects_non_http_backend() {
        let err = load(&[
            ("SHOPFRONT_API_URL", "ftp://files.example.com"),
            ("SHOPFRONT_BASE_URL", "http://localhost:3000"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_https_base_url_is_secure() {
        let config = load(&[
            ("SHOPFRONT_API_URL", "http://localhost:8000"),
            ("SHOPFRONT_BASE_URL", "https://shop.example.com"),
            ("SHOPFRONT_CATALOG_CACHE_TTL_SECS", "0"),
        ])
        .unwrap();
        assert!(config.is_secure());
        assert!(config.backend.catalog_cache_ttl.is_zero());
    }

    #[test]
    fn test_debug_redacts_dsn() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("SENTRY_DSN", "https://key@sentry.example.com/1"));
        let config = load(&vars).unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("key@sentry"));
    }
}
