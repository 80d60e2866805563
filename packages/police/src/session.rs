//! Retrying session over an [`HttpTransport`].

use std::sync::Arc;

use crime_grid_crime_models::CrimeTable;

use crate::config::SessionConfig;
use crate::normalize::normalize_crimes;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::PoliceApiError;

/// Resource path of the street-level crimes endpoint (all categories).
pub const ALL_CRIME_PATH: &str = "crimes-street/all-crime";

/// A configured client for the police API.
///
/// Every fetch is attempted up to [`SessionConfig::max_retries`] times. After
/// failed attempt `n` the session waits `backoff * n` before trying again.
/// All failures are treated alike; the error of the final attempt is
/// returned unchanged.
#[derive(Clone)]
pub struct PoliceApiSession {
    config: SessionConfig,
    transport: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for PoliceApiSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoliceApiSession")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for PoliceApiSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl PoliceApiSession {
    /// Creates a session that talks to the network through `reqwest`.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self::with_transport(config, Arc::new(ReqwestTransport::default()))
    }

    /// Creates a session over a caller-provided transport.
    #[must_use]
    pub fn with_transport(config: SessionConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    /// The session's configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Fetches `{base_url}/{path}` and decodes the JSON body, retrying with
    /// linear backoff.
    ///
    /// With `max_retries` set to zero nothing is requested and the result is
    /// [`serde_json::Value::Null`].
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt once every attempt has failed.
    pub async fn get_json(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<serde_json::Value, PoliceApiError> {
        let url = self.config.url_for(path);
        let attempts = self.config.max_retries();

        if attempts == 0 {
            log::warn!("max_retries is 0, not requesting {url}");
            return Ok(serde_json::Value::Null);
        }

        for attempt in 1..attempts {
            log::debug!("GET {url} (attempt {attempt}/{attempts})");
            match self
                .transport
                .get_json(&url, params, self.config.timeout())
                .await
            {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let delay = self.config.backoff_for(attempt);
                    log::warn!("  attempt {attempt}/{attempts} for {url} failed: {e}");
                    log::warn!("  retry in {delay:?}...");
                    tokio::time::sleep(delay).await;
                }
            }
        }

        log::debug!("GET {url} (attempt {attempts}/{attempts})");
        self.transport
            .get_json(&url, params, self.config.timeout())
            .await
            .inspect_err(|e| {
                log::error!("GET {url} failed after {attempts} attempts, giving up: {e}");
            })
    }

    /// Fetches street-level crimes of every category within the API's
    /// standard radius of a point, for one month.
    ///
    /// `date` is the month in `"YYYY-MM"` form. An empty response yields an
    /// empty table.
    ///
    /// # Errors
    ///
    /// Returns [`PoliceApiError`] if every fetch attempt fails.
    pub async fn crimes_all_categories(
        &self,
        latitude: f64,
        longitude: f64,
        date: &str,
    ) -> Result<CrimeTable, PoliceApiError> {
        let params = [
            ("lat", latitude.to_string()),
            ("lng", longitude.to_string()),
            ("date", date.to_string()),
        ];

        let data = self.get_json(ALL_CRIME_PATH, &params).await?;
        let table = normalize_crimes(&data);

        log::info!(
            "Fetched {} crimes around ({latitude}, {longitude}) for {date}",
            table.len()
        );

        Ok(table)
    }
}
