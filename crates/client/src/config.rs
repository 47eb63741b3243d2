//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FRESHBASKET_API_BASE_URL` - Base URL of the storefront REST API
//!
//! ## Optional
//! - `FRESHBASKET_AUTH_MODE` - `bearer`, `csrf-cookie`, or `both`
//!   (default: bearer)
//! - `FRESHBASKET_DATA_DIR` - Directory for locally persisted state
//!   (default: .freshbasket)
//! - `FRESHBASKET_HTTP_TIMEOUT_SECS` - Request timeout (default: 30)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// How the client authenticates against the REST API.
///
/// Deployments differ: some issue JWT bearer tokens, some rely on a session
/// cookie plus a CSRF token header, and some accept both at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// `Authorization: Bearer <token>` only.
    #[default]
    Bearer,
    /// Cookie session with an `X-CSRFToken` header.
    CsrfCookie,
    /// Bearer token and CSRF header on the same request.
    Both,
}

impl AuthMode {
    /// Whether requests should carry a bearer token when one is stored.
    #[must_use]
    pub const fn uses_bearer(self) -> bool {
        matches!(self, Self::Bearer | Self::Both)
    }

    /// Whether requests should carry the CSRF header and a cookie store.
    #[must_use]
    pub const fn uses_csrf(self) -> bool {
        matches!(self, Self::CsrfCookie | Self::Both)
    }
}

impl FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bearer" => Ok(Self::Bearer),
            "csrf-cookie" => Ok(Self::CsrfCookie),
            "both" => Ok(Self::Both),
            other => Err(format!(
                "unknown auth mode '{other}' (expected bearer, csrf-cookie, or both)"
            )),
        }
    }
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the storefront REST API.
    pub base_url: Url,
    /// Authentication mode for API requests.
    pub auth_mode: AuthMode,
    /// Directory holding locally persisted state (tokens, wishlist,
    /// pending checkout).
    pub data_dir: PathBuf,
    /// HTTP request timeout.
    pub timeout: Duration,
}

impl StoreConfig {
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

        let base_url = get_required_env("FRESHBASKET_API_BASE_URL")?;
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("FRESHBASKET_API_BASE_URL".to_string(), e.to_string())
        })?;

        let auth_mode = get_env_or_default("FRESHBASKET_AUTH_MODE", "bearer")
            .parse::<AuthMode>()
            .map_err(|e| ConfigError::InvalidEnvVar("FRESHBASKET_AUTH_MODE".to_string(), e))?;

        let data_dir = PathBuf::from(get_env_or_default("FRESHBASKET_DATA_DIR", ".freshbasket"));

        let timeout_secs = get_env_or_default("FRESHBASKET_HTTP_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "FRESHBASKET_HTTP_TIMEOUT_SECS".to_string(),
                    e.to_string(),
                )
            })?;

        Ok(Self {
            base_url,
            auth_mode,
            data_dir,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Path of the local state file inside the data directory.
    #[must_use]
    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join("state.json")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
