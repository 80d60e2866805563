#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Street-level crime record types and the tabular interface shared by the
//! police API client and grid zoning.
//!
//! The police API client produces a [`CrimeTable`] whose schema is the
//! subset of [`CrimeColumn::ALL`] the source actually returned. Grid zoning
//! consumes anything implementing [`CoordinateTable`], so it works equally
//! on crime tables and on arbitrary point files loaded into a
//! [`RecordTable`].

mod record_table;

pub use record_table::RecordTable;

use strum_macros::{AsRefStr, Display, EnumString};

/// A column of the normalized crime schema, in output order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum CrimeColumn {
    /// Offense classification (e.g. `"burglary"`)
    CrimeCategory,
    /// Stable identifier of the underlying incident
    PersistentId,
    /// Reporting period, `"YYYY-MM"`
    Month,
    /// Anonymised latitude (WGS84)
    Latitude,
    /// Anonymised longitude (WGS84)
    Longitude,
    /// Identifier of the street-level location anchor
    StreetId,
    /// Description of the street-level location anchor
    StreetName,
    /// Kind of location anchor (`"Force"` or `"BTP"`)
    LocationType,
    /// Latest outcome category, if any
    OutcomeCategory,
    /// Month of the latest outcome, if any
    OutcomeDate,
}

impl CrimeColumn {
    /// Every column a normalized crime table may carry, in output order.
    pub const ALL: &[Self] = &[
        Self::CrimeCategory,
        Self::PersistentId,
        Self::Month,
        Self::Latitude,
        Self::Longitude,
        Self::StreetId,
        Self::StreetName,
        Self::LocationType,
        Self::OutcomeCategory,
        Self::OutcomeDate,
    ];

    /// Whether values in this column are numeric coordinates rather than
    /// text.
    #[must_use]
    pub const fn is_coordinate(self) -> bool {
        matches!(self, Self::Latitude | Self::Longitude)
    }
}

/// One normalized street-level crime observation.
///
/// Every field is optional: a field is `None` either because the source
/// sent `null` (or, for coordinates, something non-numeric) or because the
/// column is not part of the owning table's schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrimeRecord {
    /// Offense classification as returned by the source.
    pub crime_category: Option<String>,
    /// Stable incident identifier. May be an empty string.
    pub persistent_id: Option<String>,
    /// Reporting period, `"YYYY-MM"`.
    pub month: Option<String>,
    /// Latitude in degrees.
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    pub longitude: Option<f64>,
    /// Street identifier, rendered as text.
    pub street_id: Option<String>,
    /// Street description (e.g. "On or near Parking Area").
    pub street_name: Option<String>,
    /// Location anchor type.
    pub location_type: Option<String>,
    /// Outcome status category.
    pub outcome_category: Option<String>,
    /// Outcome status month.
    pub outcome_date: Option<String>,
}

impl CrimeRecord {
    /// Returns the value of a text column, or `None` for the coordinate
    /// columns.
    #[must_use]
    pub fn text(&self, column: CrimeColumn) -> Option<&str> {
        let value = match column {
            CrimeColumn::CrimeCategory => &self.crime_category,
            CrimeColumn::PersistentId => &self.persistent_id,
            CrimeColumn::Month => &self.month,
            CrimeColumn::StreetId => &self.street_id,
            CrimeColumn::StreetName => &self.street_name,
            CrimeColumn::LocationType => &self.location_type,
            CrimeColumn::OutcomeCategory => &self.outcome_category,
            CrimeColumn::OutcomeDate => &self.outcome_date,
            CrimeColumn::Latitude | CrimeColumn::Longitude => return None,
        };
        value.as_deref()
    }

    /// Returns the value of a column as a number: coordinates directly,
    /// text columns only if they parse as a finite float.
    #[must_use]
    pub fn numeric(&self, column: CrimeColumn) -> Option<f64> {
        match column {
            CrimeColumn::Latitude => self.latitude,
            CrimeColumn::Longitude => self.longitude,
            _ => self.text(column).and_then(parse_coordinate),
        }
    }

    /// Renders a column value for display or CSV output.
    #[must_use]
    pub fn display_value(&self, column: CrimeColumn) -> Option<String> {
        match column {
            CrimeColumn::Latitude => self.latitude.map(|v| v.to_string()),
            CrimeColumn::Longitude => self.longitude.map(|v| v.to_string()),
            _ => self.text(column).map(str::to_owned),
        }
    }

    /// Clears every field whose column is not in `columns`.
    fn restrict_to(&mut self, columns: &[CrimeColumn]) {
        let keep = |column: CrimeColumn| columns.contains(&column);
        if !keep(CrimeColumn::CrimeCategory) {
            self.crime_category = None;
        }
        if !keep(CrimeColumn::PersistentId) {
            self.persistent_id = None;
        }
        if !keep(CrimeColumn::Month) {
            self.month = None;
        }
        if !keep(CrimeColumn::Latitude) {
            self.latitude = None;
        }
        if !keep(CrimeColumn::Longitude) {
            self.longitude = None;
        }
        if !keep(CrimeColumn::StreetId) {
            self.street_id = None;
        }
        if !keep(CrimeColumn::StreetName) {
            self.street_name = None;
        }
        if !keep(CrimeColumn::LocationType) {
            self.location_type = None;
        }
        if !keep(CrimeColumn::OutcomeCategory) {
            self.outcome_category = None;
        }
        if !keep(CrimeColumn::OutcomeDate) {
            self.outcome_date = None;
        }
    }
}

/// A normalized crime result set with an explicit column schema.
///
/// The schema only lists columns the source actually returned; no column is
/// ever filled with placeholders. An empty response is a table with no
/// columns and no rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrimeTable {
    columns: Vec<CrimeColumn>,
    records: Vec<CrimeRecord>,
}

impl CrimeTable {
    /// Creates a table from a schema and its rows.
    ///
    /// Columns are put into canonical order and deduplicated. Record fields
    /// outside the schema are cleared.
    #[must_use]
    pub fn new(columns: impl IntoIterator<Item = CrimeColumn>, records: Vec<CrimeRecord>) -> Self {
        let mut columns: Vec<CrimeColumn> = columns.into_iter().collect();
        columns.sort_unstable();
        columns.dedup();

        let records = records
            .into_iter()
            .map(|mut record| {
                record.restrict_to(&columns);
                record
            })
            .collect();

        Self { columns, records }
    }

    /// The columns present in this table, in canonical order.
    #[must_use]
    pub fn columns(&self) -> &[CrimeColumn] {
        &self.columns
    }

    /// The rows of this table.
    #[must_use]
    pub fn records(&self) -> &[CrimeRecord] {
        &self.records
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether `column` is part of this table's schema.
    #[must_use]
    pub fn has_column(&self, column: CrimeColumn) -> bool {
        self.columns.contains(&column)
    }

    /// Renders the table as a JSON array of objects carrying exactly the
    /// schema columns, with `null` for missing values.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let rows = self
            .records
            .iter()
            .map(|record| {
                let row = self
                    .columns
                    .iter()
                    .map(|&column| {
                        let value = if column.is_coordinate() {
                            record
                                .numeric(column)
                                .and_then(serde_json::Number::from_f64)
                                .map_or(serde_json::Value::Null, serde_json::Value::Number)
                        } else {
                            record
                                .text(column)
                                .map_or(serde_json::Value::Null, |s| {
                                    serde_json::Value::String(s.to_owned())
                                })
                        };
                        (column.to_string(), value)
                    })
                    .collect::<serde_json::Map<_, _>>();
                serde_json::Value::Object(row)
            })
            .collect();

        serde_json::Value::Array(rows)
    }
}

/// A table that can expose named columns as nullable coordinates.
pub trait CoordinateTable {
    /// Returns the named column as nullable floats, one entry per row, or
    /// `None` if the table has no such column.
    fn coordinate_column(&self, name: &str) -> Option<Vec<Option<f64>>>;
}

impl CoordinateTable for CrimeTable {
    fn coordinate_column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let column = name.parse::<CrimeColumn>().ok()?;
        if !self.has_column(column) {
            return None;
        }
        Some(self.records.iter().map(|r| r.numeric(column)).collect())
    }
}

/// Parses a coordinate from text. Returns `None` if the text is not a
/// finite number.
#[must_use]
pub fn parse_coordinate(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
