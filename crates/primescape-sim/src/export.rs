use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use primescape_core::errors::{ErrorInfo, ScapeError};
use primescape_core::{NumericRecord, RunProvenance};
use primescape_palette::PaletteBucketAssignment;
use serde::Serialize;
use walkdir::WalkDir;

use crate::config::GraphMode;
use crate::serde::to_canonical_json_bytes;

/// Column order of the CSV hard copy.
pub const CSV_HEADER: [&str; 10] = [
    "number",
    "is_prime",
    "prime_factors",
    "ideal",
    "deviation",
    "antislope",
    "family_factors",
    "identity_factor",
    "division_family",
    "color_bucket",
];

/// Point colour used when buckets are disabled or empty.
pub const BASE_COLOR: &str = "#3030ff";

const TIMESTAMP_CHUNKS: [&str; 4] = ["%d%m%Y", "_%H", "%M", "%S"];

fn export_error(code: &str, err: impl ToString, path: &Path) -> ScapeError {
    ScapeError::Serde(ErrorInfo::new(code, err.to_string()).with_context("path", path.display()))
}

/// One decorated record as handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotRow {
    pub number: u64,
    pub is_prime: bool,
    pub prime_factors: String,
    pub ideal: f64,
    pub deviation: f64,
    pub antislope: f64,
    pub family_factors: String,
    pub identity_factor: u64,
    pub division_family: u64,
    pub color_bucket: Option<usize>,
    #[serde(skip)]
    antislope_text: String,
}

impl PlotRow {
    /// Decorates a record with its display columns and colour bucket.
    pub fn from_record(record: &NumericRecord, color_bucket: Option<usize>) -> Self {
        let (family_factors, identity_factor) = match record.largest_prime_factor() {
            Some(largest) => (bracketed(record.family_factors()), largest),
            None => ("0".to_string(), 0),
        };
        Self {
            number: record.value,
            is_prime: record.is_prime,
            prime_factors: bracketed(&record.prime_factors),
            ideal: record.ideal_factor,
            deviation: record.mean_deviation,
            antislope: record.antislope,
            family_factors,
            identity_factor,
            division_family: record.division_family,
            color_bucket,
            antislope_text: record.antislope_text(),
        }
    }

    fn csv_fields(&self) -> [String; 10] {
        [
            self.number.to_string(),
            self.is_prime.to_string(),
            self.prime_factors.clone(),
            self.ideal.to_string(),
            self.deviation.to_string(),
            self.antislope_text.clone(),
            self.family_factors.clone(),
            self.identity_factor.to_string(),
            self.division_family.to_string(),
            self.color_bucket
                .map(|bucket| bucket.to_string())
                .unwrap_or_default(),
        ]
    }
}

/// `[ 2, 2, 3 ]` rendering of a factor list.
pub fn bracketed(factors: &[u64]) -> String {
    let joined = factors
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[ {joined} ]")
}

/// Decorated rows sorted by value. Records outside the assignment, such as
/// excluded primes, carry no colour bucket.
pub fn decorate(
    records: &[NumericRecord],
    assignment: Option<&PaletteBucketAssignment>,
) -> Vec<PlotRow> {
    let mut rows: Vec<PlotRow> = records
        .iter()
        .map(|record| {
            let bucket = assignment.and_then(|assignment| assignment.bucket_of(record.value));
            PlotRow::from_record(record, bucket)
        })
        .collect();
    rows.sort_by_key(|row| row.number);
    rows
}

/// Hand-off document for the external renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotPayload {
    pub title: String,
    pub y_axis_label: String,
    pub y_axis_field: String,
    pub palette: String,
    pub coloring: String,
    pub base_color: String,
    pub color_factors: Vec<String>,
    pub bucket_count: usize,
    pub width: u32,
    pub height: u32,
    pub point_size: u32,
    pub rows: Vec<PlotRow>,
    pub provenance: RunProvenance,
}

/// strftime pattern for a granularity between 0 (date) and 3 (seconds).
pub fn timestamp_format(granularity: u8) -> String {
    let chunks = usize::from(granularity.min(3)) + 1;
    TIMESTAMP_CHUNKS[..chunks].concat()
}

/// Timestamp suffix of hard copy file names.
pub fn hard_copy_timestamp(now: DateTime<Utc>, granularity: u8) -> String {
    now.format(&timestamp_format(granularity)).to_string()
}

/// `{lower}_{upper}_{mode}_{primes|no_primes}_{coloring}_{timestamp}`.
pub fn hard_copy_stem(
    lower: u64,
    upper: u64,
    mode: GraphMode,
    include_primes: bool,
    coloring: &str,
    timestamp: &str,
) -> String {
    let primes = if include_primes { "primes" } else { "no_primes" };
    format!(
        "{lower}_{upper}_{}_{primes}_{coloring}_{timestamp}",
        mode.name()
    )
}

/// Creates `dir` if missing; with `reset`, removes every file below it.
pub fn prepare_output_dir(dir: &Path, reset: bool) -> Result<(), ScapeError> {
    if !dir.exists() {
        return fs::create_dir_all(dir).map_err(|err| export_error("sim.output_dir", err, dir));
    }
    if reset {
        for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
            if entry.file_type().is_file() {
                fs::remove_file(entry.path())
                    .map_err(|err| export_error("sim.output_reset", err, entry.path()))?;
            }
        }
    }
    Ok(())
}

/// Writes the CSV hard copy.
pub fn write_csv(path: &Path, rows: &[PlotRow]) -> Result<(), ScapeError> {
    let mut wtr =
        csv::Writer::from_path(path).map_err(|err| export_error("sim.csv_open", err, path))?;
    wtr.write_record(CSV_HEADER)
        .map_err(|err| export_error("sim.csv_write", err, path))?;
    for row in rows {
        wtr.write_record(row.csv_fields())
            .map_err(|err| export_error("sim.csv_write", err, path))?;
    }
    wtr.flush().map_err(|err| export_error("sim.csv_write", err, path))
}

/// Writes the canonical JSON plot payload.
pub fn write_payload(path: &Path, payload: &PlotPayload) -> Result<(), ScapeError> {
    let bytes = to_canonical_json_bytes(payload)?;
    fs::write(path, bytes).map_err(|err| export_error("sim.json_write", err, path))
}
