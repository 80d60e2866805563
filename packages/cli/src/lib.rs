#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Command-line front end for crime fetching and grid zoning.
//!
//! The binary wires [`crime_grid_police`] and [`crime_grid_zoning`]
//! together. This library half holds the pieces worth testing on their
//! own: configuration file loading, month validation, and the CSV/JSON
//! readers and writers.

pub mod config;
pub mod output;

use std::sync::Arc;

use chrono::NaiveDate;
use crime_grid_police::{
    ConfigError, PoliceApiError, PoliceApiSession, ReqwestTransport, SessionConfig,
    SessionSettings,
};
use crime_grid_zoning::GridError;

/// User agent sent with every API request.
pub const USER_AGENT: &str = "crime-grid/1.0";

/// Errors surfaced by the command-line front end.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file involved.
        path: String,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`config::CliConfig`].
    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    /// Session settings are out of range.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A `--date` value is not a `YYYY-MM` month.
    #[error("Invalid month {value:?}: expected YYYY-MM")]
    InvalidMonth {
        /// The rejected value.
        value: String,
    },

    /// Building the HTTP client failed.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// Fetching crimes failed.
    #[error(transparent)]
    Police(#[from] PoliceApiError),

    /// Zoning failed.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Reading or writing CSV failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Writing JSON failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validates a `YYYY-MM` month and returns it unchanged.
///
/// # Errors
///
/// Returns [`CliError::InvalidMonth`] if `value` is not a real calendar
/// month in `YYYY-MM` form.
pub fn parse_month(value: &str) -> Result<String, CliError> {
    let well_formed = value.len() == 7
        && value.as_bytes()[4] == b'-'
        && NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").is_ok();

    if well_formed {
        Ok(value.to_string())
    } else {
        Err(CliError::InvalidMonth {
            value: value.to_string(),
        })
    }
}

/// Builds a police API session from merged settings.
///
/// # Errors
///
/// Returns [`CliError`] if the settings are invalid or the HTTP client
/// cannot be built.
pub fn build_session(settings: SessionSettings) -> Result<PoliceApiSession, CliError> {
    let config = SessionConfig::try_from(settings)?;
    let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

    log::debug!("Session config: {config:?}");

    Ok(PoliceApiSession::with_transport(
        config,
        Arc::new(ReqwestTransport::new(client)),
    ))
}
