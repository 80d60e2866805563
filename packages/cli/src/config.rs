//! TOML configuration file for the `crime_grid` binary.
//!
//! ```toml
//! [session]
//! timeout_s = 30
//! max_retries = 3
//! backoff_s = 1.0
//!
//! [grid]
//! grid_size_m = 300.0
//! lat_col = "latitude"
//! lon_col = "longitude"
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use std::path::Path;

use crime_grid_police::SessionSettings;
use crime_grid_zoning::GridOptions;
use serde::Deserialize;

use crate::CliError;

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Police API session settings.
    pub session: SessionSettings,
    /// Default zoning options.
    pub grid: GridOptions,
}

impl CliConfig {
    /// Loads the configuration file at `path`, or the defaults if no path
    /// is given.
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] if the file cannot be read or is not valid.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        log::info!("Loading configuration from {}", path.display());
        let contents = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Toml`] if the text is not valid configuration.
    pub fn from_toml_str(contents: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(contents)?)
    }
}
