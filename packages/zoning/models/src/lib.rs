#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Grid zone output rows and zoning options.

use serde::{Deserialize, Serialize};

/// Default name of the latitude column.
pub const DEFAULT_LAT_COL: &str = "latitude";
/// Default name of the longitude column.
pub const DEFAULT_LON_COL: &str = "longitude";
/// Default grid cell edge length in meters.
pub const DEFAULT_GRID_SIZE_M: f64 = 300.0;

/// One occupied cell of the zoning grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridZone {
    /// `"z_<lat_bin>_<lon_bin>"`.
    pub zone_id: String,
    /// Row index of the cell, counted from the southernmost input point.
    pub lat_bin: i64,
    /// Column index of the cell, counted from the westernmost input point.
    pub lon_bin: i64,
    /// Latitude of the cell center.
    pub centroid_lat: f64,
    /// Longitude of the cell center.
    pub centroid_lon: f64,
    /// Number of input points inside the cell.
    pub crime_count: u64,
}

impl GridZone {
    /// Builds the zone identifier for a pair of bin indices.
    #[must_use]
    pub fn zone_id_for(lat_bin: i64, lon_bin: i64) -> String {
        format!("z_{lat_bin}_{lon_bin}")
    }
}

/// Which columns to read and how large the cells are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridOptions {
    /// Name of the latitude column.
    pub lat_col: String,
    /// Name of the longitude column.
    pub lon_col: String,
    /// Cell edge length in meters.
    pub grid_size_m: f64,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            lat_col: DEFAULT_LAT_COL.to_string(),
            lon_col: DEFAULT_LON_COL.to_string(),
            grid_size_m: DEFAULT_GRID_SIZE_M,
        }
    }
}

impl GridOptions {
    /// Returns a copy with a different cell size.
    #[must_use]
    pub const fn with_grid_size_m(mut self, grid_size_m: f64) -> Self {
        self.grid_size_m = grid_size_m;
        self
    }

    /// Returns a copy reading coordinates from different columns.
    #[must_use]
    pub fn with_columns(mut self, lat_col: impl Into<String>, lon_col: impl Into<String>) -> Self {
        self.lat_col = lat_col.into();
        self.lon_col = lon_col.into();
        self
    }
}
