// src/main.rs

/*
ARCHITECTURE OVERVIEW

This binary computes the Qibla: the bearing and great-circle distance from any
point on Earth to the Kaaba in Mecca.

Two entry points:
1. `direction` → one origin given on the command line, printed as JSON or text.
   The origin is accepted as --lat/--lng or --latitude/--longitude.
2. `batch`     → a CSV of named origins (name, lat, lon), enriched with the
   Qibla direction, compass label and distance, written to another CSV.

Both follow the same pipeline:
   parse (DD / DMS / DDM) → validate_coordinates → calculate_qibla → output

Key design choices:
- Coordinate notation is global (no mixed notations per file or call).
- Validation happens once, before any calculation; the calculations are
  total over valid points and never fail.
- Values are rounded to 2 decimals for presentation only; JSON output also
  carries the raw doubles.
- Batch errors are handled per-line in permissive mode, or fail-fast in
  strict mode.
- Geometry lives in `qibla`, notation parsing in `geo`, numeric helpers in
  `util`. This module focuses on orchestration and I/O only.
*/

use std::collections::HashSet;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use csv::{ReaderBuilder, Trim, Writer};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod util;
use crate::util::round;

mod qibla;
use crate::qibla::calculate_qibla;
use crate::qibla::validate_coordinates;
use crate::qibla::CoordinateKind;
use crate::qibla::GeoPoint;
use crate::qibla::QiblaResult;
use crate::qibla::KAABA;

mod geo;
use crate::geo::dd_to_dms;
use crate::geo::parse_coordinate;
use crate::geo::Notation;
use crate::geo::NotationError;

/* ---------------- CONSTANTES ---------------- */

// Required CSV headers (order-independent).
const REQUIRED_HEADERS: &[&str] = &["name", "lat", "lon"];

// Decimal places kept for echoed decimal-degree coordinates.
const DD_DECIMALS: u32 = 6;

/* ---------------- CLI ---------------- */

// Command-line interface definition.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Qibla direction from a single location
    Direction(DirectionArgs),
    /// Qibla direction for every row of a CSV file
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct DirectionArgs {
    /// Latitude (-90 to 90)
    #[arg(long = "lat", visible_alias = "latitude", allow_hyphen_values = true)]
    lat: String,

    /// Longitude (-180 to 180)
    #[arg(long = "lng", visible_alias = "longitude", allow_hyphen_values = true)]
    lng: String,

    /// Coordinate input format
    #[arg(short = 'f', long, value_enum, default_value_t = InputFormat::Dd)]
    input_format: InputFormat,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    output_format: OutputFormat,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Input CSV file path (headers: name, lat, lon)
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV file path
    #[arg(short, long)]
    output: PathBuf,

    /// Coordinate input format
    #[arg(short = 'f', long, value_enum, default_value_t = InputFormat::Dd)]
    input_format: InputFormat,

    /// Strict mode: stop on first error
    #[arg(long)]
    strict: bool,
}

// Supported coordinate formats.
#[derive(Copy, Clone, Debug, ValueEnum)]
enum InputFormat {
    Dd,
    Dms,
    Ddm,
}

impl From<InputFormat> for Notation {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Dd => Notation::Dd,
            InputFormat::Dms => Notation::Dms,
            InputFormat::Ddm => Notation::Ddm,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

/* ---------------- MAIN ERROR ---------------- */

// Application-level errors.
#[derive(Error, Debug)]
enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid header (missing or unreadable)")]
    InvalidHeader,

    #[error("Missing header field '{0}'")]
    MissingHeaderField(String),

    #[error("Invalid coordinates [{code}]: {source}", code = .source.code())]
    InvalidCoordinates { source: NotationError },

    #[error("Line {line}: unreadable row ({source})")]
    InvalidRow { line: usize, source: csv::Error },

    #[error("Line {line}: invalid coordinates [{code}]: {source}", code = .source.code())]
    InvalidLine { line: usize, source: NotationError },
}

/* ---------------- CSV STRUCTS ---------------- */

// Input rows are read as text so that "not a number" can be reported
// instead of a generic deserialization failure.
#[derive(Debug, Deserialize)]
struct InputRow {
    name: String,
    lat: String,
    lon: String,
}

// Output CSV record.
#[derive(Debug, Serialize)]
struct OutputRecord {
    id: u64,
    name: String,
    lat_in: String,
    lon_in: String,
    lat_dd: f64,
    lon_dd: f64,
    lat_dms: String,
    lon_dms: String,
    qibla_direction: f64,
    compass_bearing: &'static str,
    distance_km: f64,
    distance_miles: f64,
}

/* ---------------- JSON OUTPUT ---------------- */

#[derive(Debug, Serialize)]
struct DmsPoint {
    latitude: String,
    longitude: String,
}

impl From<GeoPoint> for DmsPoint {
    fn from(point: GeoPoint) -> Self {
        DmsPoint {
            latitude: dd_to_dms(point.latitude, CoordinateKind::Latitude),
            longitude: dd_to_dms(point.longitude, CoordinateKind::Longitude),
        }
    }
}

// Result of `direction`: the Qibla plus the origin in DMS notation.
#[derive(Debug, Serialize)]
struct DirectionReport {
    #[serde(flatten)]
    qibla: QiblaResult,
    location_dms: DmsPoint,
}

/* ---------------- MAIN ---------------- */

fn main() -> ExitCode {
    // Parse CLI arguments.
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!("parsed arguments: {cli:?}");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Direction(args) => run_direction(args),
        Command::Batch(args) => run_batch(args),
    }
}

// Parses and validates one origin.
// Both values are parsed before validation so a non-numeric longitude is
// reported as such even when the latitude is out of range.
fn resolve_origin(lat: &str, lon: &str, notation: Notation) -> Result<GeoPoint, NotationError> {
    let latitude = parse_coordinate(lat, notation, CoordinateKind::Latitude)?;
    let longitude = parse_coordinate(lon, notation, CoordinateKind::Longitude)?;

    Ok(validate_coordinates(latitude, longitude)?)
}

/* ---------------- DIRECTION ---------------- */

fn run_direction(args: DirectionArgs) -> Result<(), AppError> {
    let notation = Notation::from(args.input_format);
    let origin = resolve_origin(&args.lat, &args.lng, notation)
        .map_err(|source| AppError::InvalidCoordinates { source })?;
    debug!("origin ({notation}): {origin:?}");

    let qibla = calculate_qibla(origin);
    debug!(
        "raw bearing {} deg, raw distance {} km",
        qibla.bearing_degrees_raw, qibla.distance_km_raw
    );

    match args.output_format {
        OutputFormat::Json => {
            let report = DirectionReport {
                qibla,
                location_dms: DmsPoint::from(origin),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => print_text(&qibla),
    }

    Ok(())
}

fn print_text(qibla: &QiblaResult) {
    let dms = DmsPoint::from(qibla.location);
    println!(
        "Location:        {}, {} ({}, {})",
        qibla.location.latitude, qibla.location.longitude, dms.latitude, dms.longitude
    );
    println!("Kaaba:           {}, {}", KAABA.latitude, KAABA.longitude);
    println!(
        "Qibla direction: {:.2}° ({})",
        qibla.qibla_direction, qibla.compass_bearing
    );
    println!(
        "Distance:        {:.2} km ({:.2} mi)",
        qibla.distance_km, qibla.distance_miles
    );
}

/* ---------------- BATCH ---------------- */

fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    // CSV reader / writer setup.
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(&args.input)?;
    let mut writer = Writer::from_writer(File::create(&args.output)?);

    // Validate required headers.
    let headers = reader.headers().map_err(|_| AppError::InvalidHeader)?;

    let headers: HashSet<_> = headers.iter().collect();
    for &h in REQUIRED_HEADERS {
        if !headers.contains(h) {
            return Err(AppError::MissingHeaderField(h.to_string()));
        }
    }

    let notation = Notation::from(args.input_format);

    // Processing counters.
    let mut id: u64 = 1;
    let mut invalid: u64 = 0;
    let mut line_no = 1;

    for row in reader.deserialize::<InputRow>() {
        line_no += 1;
        let row = match row {
            Ok(v) => v,
            Err(source) => {
                if args.strict {
                    return Err(AppError::InvalidRow { line: line_no, source });
                }
                warn!("line {line_no}: unreadable row ({source})");
                invalid += 1;
                continue;
            }
        };

        let origin = match resolve_origin(&row.lat, &row.lon, notation) {
            Ok(p) => p,
            Err(source) => {
                if args.strict {
                    return Err(AppError::InvalidLine { line: line_no, source });
                }
                warn!("line {line_no}: skipping '{}' [{}]: {source}", row.name, source.code());
                invalid += 1;
                continue;
            }
        };

        writer.serialize(build_record(id, row, origin))?;
        id += 1;
    }

    writer.flush()?;

    if invalid > 0 {
        warn!("{invalid} ignored line(s)");
    }
    info!("{} row(s) written to {}", id - 1, args.output.display());

    Ok(())
}

// Build one output row from a validated origin.
fn build_record(id: u64, row: InputRow, origin: GeoPoint) -> OutputRecord {
    let qibla = calculate_qibla(origin);
    let dms = DmsPoint::from(origin);

    OutputRecord {
        id,
        name: row.name,
        lat_in: row.lat,
        lon_in: row.lon,
        lat_dd: round(origin.latitude, DD_DECIMALS),
        lon_dd: round(origin.longitude, DD_DECIMALS),
        lat_dms: dms.latitude,
        lon_dms: dms.longitude,
        qibla_direction: qibla.qibla_direction,
        compass_bearing: qibla.compass_bearing,
        distance_km: qibla.distance_km,
        distance_miles: qibla.distance_miles,
    }
}

/* ---------------- TEST ---------------- */
