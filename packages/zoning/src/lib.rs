#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Fixed-size grid zoning of geographic points.
//!
//! Points are binned into square cells of a given edge length in meters,
//! anchored at the minimum latitude/longitude of the input. Meters are
//! converted to degrees with a local equirectangular approximation around
//! the mean latitude, so cells are only approximately square and the
//! approximation degrades toward the poles.

mod geometry;

pub use crime_grid_zoning_models::{GridOptions, GridZone};
pub use geometry::{GridGeometry, METERS_PER_DEGREE};

use std::collections::BTreeMap;

use crime_grid_crime_models::CoordinateTable;

/// Errors that can occur while zoning a point table.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// The table has no column with the requested name.
    #[error("Column not found: {column}")]
    MissingColumn {
        /// The requested column name.
        column: String,
    },

    /// The column exists but holds no usable values, so the grid origin is
    /// undefined.
    #[error("Column {column} has no non-null coordinate values")]
    NoCoordinates {
        /// The empty column's name.
        column: String,
    },

    /// The cell size is zero, negative, or not finite.
    #[error("Invalid grid size: {grid_size_m} m (must be a positive, finite number)")]
    InvalidGridSize {
        /// The rejected cell size.
        grid_size_m: f64,
    },
}

/// Partitions the points of `table` into grid cells and counts the points
/// per occupied cell.
///
/// Rows missing either coordinate are ignored for binning (but a lone
/// latitude still contributes to the mean and minimum latitude). The result
/// has one [`GridZone`] per occupied cell, sorted by `crime_count`
/// descending; ties are in ascending `(lat_bin, lon_bin)` order.
///
/// # Errors
///
/// * [`GridError::InvalidGridSize`] if `options.grid_size_m` is not a
///   positive, finite number
/// * [`GridError::MissingColumn`] if either coordinate column is absent
/// * [`GridError::NoCoordinates`] if either column has no non-null values
pub fn create_grid_zones<T: CoordinateTable + ?Sized>(
    table: &T,
    options: &GridOptions,
) -> Result<Vec<GridZone>, GridError> {
    let lats = read_column(table, &options.lat_col)?;
    let lons = read_column(table, &options.lon_col)?;

    let geometry = GridGeometry::new(&lats, &lons, options)?;
    log::debug!(
        "Grid origin ({}, {}), mean latitude {}, cell {}° x {}°",
        geometry.min_lat,
        geometry.min_lon,
        geometry.mean_lat,
        geometry.dlat,
        geometry.dlon,
    );

    let mut counts: BTreeMap<(i64, i64), u64> = BTreeMap::new();
    for (lat, lon) in lats.iter().zip(&lons) {
        if let (Some(lat), Some(lon)) = (lat, lon) {
            *counts.entry(geometry.bin(*lat, *lon)).or_default() += 1;
        }
    }

    let mut zones: Vec<GridZone> = counts
        .into_iter()
        .map(|((lat_bin, lon_bin), crime_count)| {
            let (centroid_lat, centroid_lon) = geometry.centroid(lat_bin, lon_bin);
            GridZone {
                zone_id: GridZone::zone_id_for(lat_bin, lon_bin),
                lat_bin,
                lon_bin,
                centroid_lat,
                centroid_lon,
                crime_count,
            }
        })
        .collect();

    zones.sort_by(|a, b| b.crime_count.cmp(&a.crime_count));

    log::info!(
        "Binned points into {} zones of {} m",
        zones.len(),
        options.grid_size_m
    );

    Ok(zones)
}

/// Reads a coordinate column, treating non-finite values as null.
fn read_column<T: CoordinateTable + ?Sized>(
    table: &T,
    name: &str,
) -> Result<Vec<Option<f64>>, GridError> {
    let values = table
        .coordinate_column(name)
        .ok_or_else(|| GridError::MissingColumn {
            column: name.to_string(),
        })?;

    Ok(values
        .into_iter()
        .map(|v| v.filter(|v| v.is_finite()))
        .collect())
}
