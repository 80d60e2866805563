#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! CLI entry point: fetch street-level crimes and summarise them on a grid.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use crime_grid_cli::config::CliConfig;
use crime_grid_cli::output::{
    OutputFormat, open_output, read_point_file, write_crimes, write_zones,
};
use crime_grid_cli::{build_session, parse_month};
use crime_grid_police::{SessionSettings, get_crimes_all_categories};
use crime_grid_zoning::{GridOptions, create_grid_zones};

#[derive(Parser)]
#[command(name = "crime_grid", about = "Street-level crime fetching and grid zoning")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Per-request timeout in seconds (default: 30)
    #[arg(long, global = true)]
    timeout_s: Option<u64>,
    /// Total attempts per request (default: 3)
    #[arg(long, global = true)]
    max_retries: Option<u32>,
    /// Base backoff in seconds; attempt n waits n times this (default: 1.0)
    #[arg(long, global = true)]
    backoff_s: Option<f64>,
    #[command(subcommand)]
    command: Commands,
}

/// Point and month to query.
#[derive(Args)]
struct QueryArgs {
    /// Latitude of the search point
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,
    /// Longitude of the search point
    #[arg(long, allow_negative_numbers = true)]
    lng: f64,
    /// Month to query, as YYYY-MM
    #[arg(long, value_parser = parse_month)]
    date: String,
}

/// Where and how to write results.
#[derive(Args)]
struct OutputArgs {
    /// Output encoding
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,
    /// Output file (default: stdout)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all street-level crimes around a point for one month
    Crimes {
        #[command(flatten)]
        query: QueryArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Fetch crimes around a point and count them per grid zone
    Zones {
        #[command(flatten)]
        query: QueryArgs,
        /// Grid cell edge length in meters (default: 300)
        #[arg(long)]
        grid_size_m: Option<f64>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Count the points of a CSV file per grid zone
    ZoneFile {
        /// CSV file with a header row
        input: PathBuf,
        /// Latitude column name (default: "latitude")
        #[arg(long)]
        lat_col: Option<String>,
        /// Longitude column name (default: "longitude")
        #[arg(long)]
        lon_col: Option<String>,
        /// Grid cell edge length in meters (default: 300)
        #[arg(long)]
        grid_size_m: Option<f64>,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref())?;
    let settings = config.session.clone().merge(SessionSettings {
        timeout_s: cli.timeout_s,
        max_retries: cli.max_retries,
        backoff_s: cli.backoff_s,
        base_url: None,
    });

    let start = Instant::now();

    match cli.command {
        Commands::Crimes { query, output } => {
            let session = build_session(settings)?;
            let table =
                get_crimes_all_categories(query.lat, query.lng, &query.date, Some(&session))
                    .await?;
            write_crimes(&table, output.format, open_output(output.output.as_deref())?)?;
        }
        Commands::Zones {
            query,
            grid_size_m,
            output,
        } => {
            let session = build_session(settings)?;
            let table =
                get_crimes_all_categories(query.lat, query.lng, &query.date, Some(&session))
                    .await?;

            let zones = if table.is_empty() {
                log::warn!(
                    "No crimes returned around ({}, {}) for {}; nothing to zone",
                    query.lat,
                    query.lng,
                    query.date
                );
                Vec::new()
            } else {
                // Crime tables always use the canonical coordinate columns.
                let options = GridOptions::default()
                    .with_grid_size_m(grid_size_m.unwrap_or(config.grid.grid_size_m));
                create_grid_zones(&table, &options)?
            };

            write_zones(&zones, output.format, open_output(output.output.as_deref())?)?;
        }
        Commands::ZoneFile {
            input,
            lat_col,
            lon_col,
            grid_size_m,
            output,
        } => {
            let table = read_point_file(&input)?;
            log::info!("Read {} points from {}", table.len(), input.display());

            let options = GridOptions {
                lat_col: lat_col.unwrap_or(config.grid.lat_col),
                lon_col: lon_col.unwrap_or(config.grid.lon_col),
                grid_size_m: grid_size_m.unwrap_or(config.grid.grid_size_m),
            };
            let zones = create_grid_zones(&table, &options)?;

            write_zones(&zones, output.format, open_output(output.output.as_deref())?)?;
        }
    }

    log::info!("Done in {:.1}s", start.elapsed().as_secs_f64());

    Ok(())
}
