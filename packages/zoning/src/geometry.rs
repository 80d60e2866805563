//! Degree/meter conversion and binning for the zoning grid.

use crime_grid_zoning_models::GridOptions;

use crate::GridError;

/// Approximate length of one degree of latitude, in meters.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Origin and cell size of a zoning grid, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    /// Mean latitude of the input, where the meter/degree scale is taken.
    pub mean_lat: f64,
    /// Southern edge of the grid.
    pub min_lat: f64,
    /// Western edge of the grid.
    pub min_lon: f64,
    /// Cell height in degrees of latitude.
    pub dlat: f64,
    /// Cell width in degrees of longitude.
    pub dlon: f64,
}

impl GridGeometry {
    /// Derives the grid from nullable coordinate columns.
    ///
    /// Nulls are ignored. The two columns are treated independently: the
    /// mean and minimum latitude use every non-null latitude, even on rows
    /// without a longitude.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidGridSize`] for a non-positive or
    /// non-finite cell size and [`GridError::NoCoordinates`] if either
    /// column has no values.
    pub fn new(
        lats: &[Option<f64>],
        lons: &[Option<f64>],
        options: &GridOptions,
    ) -> Result<Self, GridError> {
        let grid_size_m = options.grid_size_m;
        if !(grid_size_m.is_finite() && grid_size_m > 0.0) {
            return Err(GridError::InvalidGridSize { grid_size_m });
        }

        let (mean_lat, min_lat) = mean_and_min(lats).ok_or_else(|| GridError::NoCoordinates {
            column: options.lat_col.clone(),
        })?;
        let (_, min_lon) = mean_and_min(lons).ok_or_else(|| GridError::NoCoordinates {
            column: options.lon_col.clone(),
        })?;

        let meters_per_degree_lon = METERS_PER_DEGREE * mean_lat.to_radians().cos();

        Ok(Self {
            mean_lat,
            min_lat,
            min_lon,
            dlat: grid_size_m / METERS_PER_DEGREE,
            dlon: grid_size_m / meters_per_degree_lon,
        })
    }

    /// Returns the `(lat_bin, lon_bin)` cell containing a point.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn bin(&self, lat: f64, lon: f64) -> (i64, i64) {
        (
            ((lat - self.min_lat) / self.dlat).floor() as i64,
            ((lon - self.min_lon) / self.dlon).floor() as i64,
        )
    }

    /// Returns the center of a cell as `(lat, lon)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centroid(&self, lat_bin: i64, lon_bin: i64) -> (f64, f64) {
        (
            (lat_bin as f64 + 0.5).mul_add(self.dlat, self.min_lat),
            (lon_bin as f64 + 0.5).mul_add(self.dlon, self.min_lon),
        )
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean_and_min(values: &[Option<f64>]) -> Option<(f64, f64)> {
    let mut count = 0_usize;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;

    for v in values.iter().flatten() {
        count += 1;
        sum += *v;
        min = min.min(*v);
    }

    (count > 0).then(|| (sum / count as f64, min))
}
