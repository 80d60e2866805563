//! Session configuration for the police API client.
//!
//! [`SessionConfig`] is immutable once built: fields are private and the
//! `with_*` builders consume and return a new value. [`SessionSettings`] is
//! the plain serde form used by configuration files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Base URL of the UK Police public data API.
pub const BASE_URL: &str = "https://data.police.uk/api";

const DEFAULT_TIMEOUT_S: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BACKOFF_S: f64 = 1.0;

/// Errors raised when session settings are invalid.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A setting has a value outside its valid range.
    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        /// Name of the offending setting.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

/// Request, retry and backoff settings for a [`crate::PoliceApiSession`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "SessionSettings")]
pub struct SessionConfig {
    base_url: String,
    timeout: Duration,
    max_retries: u32,
    backoff: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_S),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Duration::from_secs_f64(DEFAULT_BACKOFF_S),
        }
    }
}

impl SessionConfig {
    /// API base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Total number of attempts per fetch. Zero disables fetching: no
    /// request is sent and the fetch yields no data.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Base backoff unit. The wait after attempt `n` is `backoff * n`.
    #[must_use]
    pub const fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Delay to wait after the given (1-based) failed attempt.
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }

    /// Returns a copy with a different base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns a copy with a different per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns a copy with a different attempt count.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Returns a copy with a different backoff unit.
    #[must_use]
    pub const fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Builds the full URL for a path relative to the base URL.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Serializable session settings, as written in configuration files.
///
/// Every field is optional and falls back to the [`SessionConfig`] default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionSettings {
    /// Per-request timeout in seconds.
    pub timeout_s: Option<u64>,
    /// Total attempts per fetch.
    pub max_retries: Option<u32>,
    /// Base backoff unit in seconds.
    pub backoff_s: Option<f64>,
    /// API base URL.
    pub base_url: Option<String>,
}

impl SessionSettings {
    /// Overlays `other` on top of `self`; values set in `other` win.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            timeout_s: other.timeout_s.or(self.timeout_s),
            max_retries: other.max_retries.or(self.max_retries),
            backoff_s: other.backoff_s.or(self.backoff_s),
            base_url: other.base_url.or(self.base_url),
        }
    }
}

impl TryFrom<SessionSettings> for SessionConfig {
    type Error = ConfigError;

    fn try_from(settings: SessionSettings) -> Result<Self, Self::Error> {
        let mut config = Self::default();

        if let Some(timeout_s) = settings.timeout_s {
            config = config.with_timeout(Duration::from_secs(timeout_s));
        }

        if let Some(max_retries) = settings.max_retries {
            config = config.with_max_retries(max_retries);
        }

        if let Some(backoff_s) = settings.backoff_s {
            let backoff =
                Duration::try_from_secs_f64(backoff_s).map_err(|e| ConfigError::InvalidValue {
                    field: "backoff_s",
                    message: format!("{backoff_s} is not a valid duration ({e})"),
                })?;
            config = config.with_backoff(backoff);
        }

        if let Some(base_url) = settings.base_url {
            if base_url.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "base_url",
                    message: "must not be empty".to_string(),
                });
            }
            config = config.with_base_url(base_url);
        }

        Ok(config)
    }
}
