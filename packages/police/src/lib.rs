#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Client for the UK Police street-level crime API.
//!
//! A [`PoliceApiSession`] issues GET requests against
//! <https://data.police.uk/api> with a per-request timeout and linear retry
//! backoff, and [`get_crimes_all_categories`] turns the street-level crimes
//! response into a [`CrimeTable`].
//!
//! See <https://data.police.uk/docs/method/crime-street/>

pub mod config;
pub mod normalize;
pub mod session;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use config::{BASE_URL, ConfigError, SessionConfig, SessionSettings};
pub use session::{ALL_CRIME_PATH, PoliceApiSession};
pub use transport::{HttpTransport, ReqwestTransport};

use crime_grid_crime_models::CrimeTable;

/// Errors from a single fetch attempt against the police API.
///
/// The session retries every variant identically and surfaces the error of
/// the final attempt as-is.
#[derive(Debug, thiserror::Error)]
pub enum PoliceApiError {
    /// The request could not be sent or the response could not be read
    /// (connection failure, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The final request URL, including the query string.
        url: String,
    },

    /// The response body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fetches street-level crimes of every category around a point for one
/// month (`"YYYY-MM"`).
///
/// Uses `session` if given, otherwise a session with default settings.
///
/// # Errors
///
/// Returns [`PoliceApiError`] if every fetch attempt fails.
pub async fn get_crimes_all_categories(
    latitude: f64,
    longitude: f64,
    date: &str,
    session: Option<&PoliceApiSession>,
) -> Result<CrimeTable, PoliceApiError> {
    match session {
        Some(session) => session.crimes_all_categories(latitude, longitude, date).await,
        None => {
            PoliceApiSession::default()
                .crimes_all_categories(latitude, longitude, date)
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crime_grid_crime_models::CrimeColumn;
    use serde_json::json;

    use super::*;
    use crate::test_support::ScriptedTransport;

    fn crime(lat: &str, lng: &str) -> serde_json::Value {
        json!({
            "category": "vehicle-crime",
            "location_type": "Force",
            "location": {
                "latitude": lat,
                "longitude": lng,
                "street": { "id": 964_225, "name": "On or near Supermarket" }
            },
            "outcome_status": null,
            "persistent_id": "d0c5",
            "month": "2024-01"
        })
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_then_rows() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Err(ScriptedTransport::server_error()),
            Ok(json!([crime("51.5", "-0.1"), crime("51.501", "-0.099")])),
        ]));
        let config = SessionConfig::default().with_backoff(Duration::from_millis(1500));
        let session = PoliceApiSession::with_transport(config, transport.clone());

        let table = get_crimes_all_categories(51.5, -0.1, "2024-01", Some(&session))
            .await
            .unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.has_column(CrimeColumn::StreetName));
        assert!(!table.has_column(CrimeColumn::OutcomeCategory));
        assert_eq!(transport.call_count(), 2);
        assert_eq!(transport.gaps(), vec![Duration::from_millis(1500)]);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_propagate_unchanged() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Err(ScriptedTransport::server_error()),
            Err(ScriptedTransport::server_error()),
            Err(PoliceApiError::Status {
                status: 429,
                url: "last".to_string(),
            }),
        ]));
        let session = PoliceApiSession::with_transport(SessionConfig::default(), transport.clone());

        let err = get_crimes_all_categories(51.5, -0.1, "2024-01", Some(&session))
            .await
            .unwrap_err();

        assert_eq!(transport.call_count(), 3);
        assert_eq!(err.to_string(), "HTTP 429 from last");
        assert_eq!(
            transport.gaps(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn null_response_is_empty_table() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(serde_json::Value::Null)]));
        let session = PoliceApiSession::with_transport(SessionConfig::default(), transport);

        let table = get_crimes_all_categories(53.4, -2.2, "2023-06", Some(&session))
            .await
            .unwrap();

        assert_eq!(table.len(), 0);
        assert!(table.columns().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn coordinates_match_coerced_source_values() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(json!([
            crime("52.640961", "-1.126371"),
            crime("not-a-number", "-1.2"),
        ]))]));
        let session = PoliceApiSession::with_transport(SessionConfig::default(), transport);

        let table = get_crimes_all_categories(52.64, -1.13, "2024-01", Some(&session))
            .await
            .unwrap();

        let records = table.records();
        assert_eq!(records[0].latitude, Some(52.640_961));
        assert_eq!(records[0].longitude, Some(-1.126_371));
        assert_eq!(records[1].latitude, None);
        assert_eq!(records[1].longitude, Some(-1.2));
    }
}
