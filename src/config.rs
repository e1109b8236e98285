//! Application configuration loaded from environment variables.
//!
//! External API keys are optional. Without a TMDB key the movie lookup
//! serves its static fallback table; without a Gemini key the AI
//! endpoints report the service as unavailable.

use std::env;
use std::time::Duration;

/// Default number of items in any feed.
pub const DEFAULT_FEED_PAGE_SIZE: usize = 10;
/// Default time to wait for the payment webhook.
pub const DEFAULT_CHECKOUT_TIMEOUT_SECS: u64 = 30;
/// Default interval between checkout session polls.
pub const DEFAULT_CHECKOUT_POLL_INTERVAL_MS: u64 = 1000;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL for CORS and checkout redirects
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Gemini model name
    pub gemini_model: String,
    /// Maximum items per feed
    pub feed_page_size: usize,
    /// How long checkout waits for the payment webhook
    pub checkout_timeout: Duration,
    /// Interval between checkout session polls
    pub checkout_poll_interval: Duration,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// TMDB API key
    pub tmdb_api_key: Option<String>,
    /// Gemini API key
    pub gemini_api_key: Option<String>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:9002".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            gemini_model: "gemini-2.0-flash".to_string(),
            feed_page_size: DEFAULT_FEED_PAGE_SIZE,
            checkout_timeout: Duration::from_secs(DEFAULT_CHECKOUT_TIMEOUT_SECS),
            checkout_poll_interval: Duration::from_millis(DEFAULT_CHECKOUT_POLL_INTERVAL_MS),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            tmdb_api_key: None,
            gemini_api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is read first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let feed_page_size = parse_or("FEED_PAGE_SIZE", DEFAULT_FEED_PAGE_SIZE)?;
        if feed_page_size == 0 {
            return Err(ConfigError::Invalid("FEED_PAGE_SIZE", "0".to_string()));
        }

        let poll_interval_ms =
            parse_or("CHECKOUT_POLL_INTERVAL_MS", DEFAULT_CHECKOUT_POLL_INTERVAL_MS)?;
        if poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "CHECKOUT_POLL_INTERVAL_MS",
                "0".to_string(),
            ));
        }

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:9002".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            feed_page_size,
            checkout_timeout: Duration::from_secs(parse_or(
                "CHECKOUT_TIMEOUT_SECS",
                DEFAULT_CHECKOUT_TIMEOUT_SECS,
            )?),
            checkout_poll_interval: Duration::from_millis(poll_interval_ms),

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            tmdb_api_key: optional_secret("TMDB_API_KEY"),
            gemini_api_key: optional_secret("GEMINI_API_KEY"),
        })
    }
}

/// Read an optional secret, treating blank values as unset.
fn optional_secret(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
