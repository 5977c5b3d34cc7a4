//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `USERBASE_HOST` - Bind address (default: 127.0.0.1)
//! - `USERBASE_PORT` - Listen port (default: 8000)
//! - `USERBASE_DATA_FILE` - JSON file holding the user table (default: var/users.json)
//! - `USERBASE_DEFAULT_PAGE_SIZE` - Page size when `limit` is omitted (default: 10)
//! - `USERBASE_MAX_PAGE_SIZE` - Upper bound on `limit` (default: 100)
//! - `USERBASE_LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Default location of the user table, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "var/users.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One flattened JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'text' or 'json', got '{other}'")),
        }
    }
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Path of the JSON user table
    pub data_file: PathBuf,
    /// Page size applied when the request omits `limit`
    pub default_page_size: usize,
    /// Largest `limit` a request may ask for
    pub max_page_size: usize,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry settings
    pub sentry: SentryConfig,
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    /// Sentry DSN; tracking is disabled when unset
    pub dsn: Option<String>,
    /// Environment tag (e.g. production, staging)
    pub environment: Option<String>,
    /// Error event sample rate
    pub sample_rate: f32,
    /// Performance transaction sample rate
    pub traces_sample_rate: f32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8000,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            default_page_size: 10,
            max_page_size: 100,
            log_format: LogFormat::Text,
            sentry: SentryConfig {
                sample_rate: 1.0,
                ..SentryConfig::default()
            },
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = parse_or("USERBASE_HOST", &lookup, defaults.host)?;
        let port = parse_or("USERBASE_PORT", &lookup, defaults.port)?;
        let data_file = lookup("USERBASE_DATA_FILE")
            .filter(|v| !v.trim().is_empty())
            .map_or(defaults.data_file, PathBuf::from);
        let max_page_size = parse_or("USERBASE_MAX_PAGE_SIZE", &lookup, defaults.max_page_size)?;
        let default_page_size = parse_or(
            "USERBASE_DEFAULT_PAGE_SIZE",
            &lookup,
            defaults.default_page_size,
        )?;
        let log_format = parse_or("USERBASE_LOG_FORMAT", &lookup, defaults.log_format)?;

        if max_page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "USERBASE_MAX_PAGE_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        if default_page_size == 0 || default_page_size > max_page_size {
            return Err(ConfigError::InvalidEnvVar(
                "USERBASE_DEFAULT_PAGE_SIZE".to_string(),
                format!("must be between 1 and {max_page_size}"),
            ));
        }

        let sentry = SentryConfig {
            dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            environment: lookup("SENTRY_ENVIRONMENT"),
            sample_rate: parse_rate("SENTRY_SAMPLE_RATE", &lookup, defaults.sentry.sample_rate)?,
            traces_sample_rate: parse_rate(
                "SENTRY_TRACES_SAMPLE_RATE",
                &lookup,
                defaults.sentry.traces_sample_rate,
            )?,
        };

        Ok(Self {
            host,
            port,
            data_file,
            default_page_size,
            max_page_size,
            log_format,
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or<T>(
    key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse a sample rate and check it lies within 0.0-1.0.
fn parse_rate(
    key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: f32,
) -> Result<f32, ConfigError> {
    let rate = parse_or(key, lookup, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}
