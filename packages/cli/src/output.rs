//! CSV and JSON readers/writers for crime tables and zone summaries.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crime_grid_crime_models::{CrimeTable, RecordTable};
use crime_grid_zoning::GridZone;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::CliError;

/// Output encoding.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// Comma-separated values with a header row
    #[default]
    Csv,
    /// A pretty-printed JSON array of objects
    Json,
}

/// Opens `path` for writing, or stdout when no path is given.
///
/// # Errors
///
/// Returns [`CliError::Io`] if the file cannot be created.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, CliError> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|source| CliError::Io {
                path: path.display().to_string(),
                source,
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(std::io::stdout().lock())),
    }
}

/// Writes a crime table. Only the table's schema columns are written;
/// missing values are empty CSV cells or JSON `null`.
///
/// # Errors
///
/// Returns [`CliError`] if encoding or writing fails.
pub fn write_crimes<W: Write>(
    table: &CrimeTable,
    format: OutputFormat,
    mut writer: W,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Csv => {
            if table.columns().is_empty() {
                return Ok(());
            }
            let mut csv = csv::Writer::from_writer(writer);
            csv.write_record(table.columns().iter().map(AsRef::<str>::as_ref))?;
            for record in table.records() {
                csv.write_record(
                    table
                        .columns()
                        .iter()
                        .map(|&column| record.display_value(column).unwrap_or_default()),
                )?;
            }
            csv.flush().map_err(|source| CliError::Io {
                path: "output".to_string(),
                source,
            })?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &table.to_json())?;
            finish_json(writer)?;
        }
    }
    Ok(())
}

/// Writes zone summaries in rank order.
///
/// # Errors
///
/// Returns [`CliError`] if encoding or writing fails.
pub fn write_zones<W: Write>(
    zones: &[GridZone],
    format: OutputFormat,
    mut writer: W,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Csv => {
            let mut csv = csv::Writer::from_writer(writer);
            for zone in zones {
                csv.serialize(zone)?;
            }
            csv.flush().map_err(|source| CliError::Io {
                path: "output".to_string(),
                source,
            })?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, zones)?;
            finish_json(writer)?;
        }
    }
    Ok(())
}

fn finish_json<W: Write>(mut writer: W) -> Result<(), CliError> {
    writeln!(writer)
        .and_then(|()| writer.flush())
        .map_err(|source| CliError::Io {
            path: "output".to_string(),
            source,
        })
}

/// Reads a CSV point file (with header row) into a [`RecordTable`].
///
/// Rows may have differing lengths; short rows read as nulls.
///
/// # Errors
///
/// Returns [`CliError::Csv`] if the input is not valid CSV.
pub fn read_point_csv<R: Read>(reader: R) -> Result<RecordTable, CliError> {
    let mut csv = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv.headers()?.iter().map(str::to_owned).collect();
    let rows = csv
        .records()
        .map(|record| record.map(|r| r.iter().map(str::to_owned).collect()))
        .collect::<Result<Vec<Vec<String>>, _>>()?;

    Ok(RecordTable::new(headers, rows))
}

/// Reads a CSV point file from disk.
///
/// # Errors
///
/// Returns [`CliError`] if the file cannot be opened or parsed.
pub fn read_point_file(path: &Path) -> Result<RecordTable, CliError> {
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_point_csv(file)
}
