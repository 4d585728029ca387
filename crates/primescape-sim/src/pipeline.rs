use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use primescape_core::errors::{ErrorInfo, ScapeError};
use primescape_core::{NumericRecord, RunProvenance, SchemaVersion};
use primescape_decomp::{
    continuous_range, decompose_all, family_members, filter_by_families, is_prime,
    DecomposeOpts, FamilyFilterReport,
};
use primescape_palette::{bucket_by_property, color_factors, BucketOpts, PaletteBucketAssignment};
use primescape_store::{decompose_cached, init_schema, CacheStats};
use rusqlite::Connection;

use crate::config::{RangeMode, RunConfig};
use crate::export::{
    decorate, hard_copy_stem, hard_copy_timestamp, prepare_output_dir, write_csv, write_payload,
    PlotPayload, BASE_COLOR,
};
use crate::hash::stable_hash_string;

/// Wall time of one pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTiming {
    pub step: &'static str,
    pub elapsed: Duration,
}

/// Everything the CLI reports after a run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub first_value: u64,
    pub last_value: u64,
    pub record_count: usize,
    pub family_report: Option<FamilyFilterReport>,
    pub cache: Option<CacheStats>,
    /// `None` when the plot is monocolour.
    pub bucket_count: Option<usize>,
    pub coloring: String,
    pub config_hash: String,
    pub written: Vec<PathBuf>,
    pub timings: Vec<StepTiming>,
}

struct Stopwatch {
    timings: Vec<StepTiming>,
    started: Instant,
}

impl Stopwatch {
    fn new() -> Self {
        Self {
            timings: Vec::new(),
            started: Instant::now(),
        }
    }

    fn lap(&mut self, step: &'static str) {
        let now = Instant::now();
        self.timings.push(StepTiming {
            step,
            elapsed: now - self.started,
        });
        self.started = now;
    }
}

/// Generates, decomposes, buckets and exports according to `config`.
pub fn run_pipeline(
    config: &RunConfig,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<RunOutcome, ScapeError> {
    config.validate()?;
    let config_hash = stable_hash_string(config)?;
    let mut watch = Stopwatch::new();

    let (values, family_report) = generate_values(config)?;
    watch.lap("generation");
    if values.is_empty() {
        return Err(ScapeError::InvalidInput(
            ErrorInfo::new("sim.no_values", "configuration selects no values to analyse")
                .with_context("mode", format!("{:?}", config.range.mode)),
        ));
    }

    let opts = DecomposeOpts {
        workers: config.run.workers,
        cancel,
    };
    let (records, cache) = match &config.store.path {
        Some(path) => {
            let conn = Connection::open(path).map_err(|err| {
                ScapeError::Store(
                    ErrorInfo::new("store.open", err.to_string()).with_context("path", path.display()),
                )
            })?;
            init_schema(&conn)?;
            let batch = decompose_cached(&conn, &values, &opts, config.store.batch_limit)?;
            (batch.records, Some(batch.stats))
        }
        None => {
            let mut records = decompose_all(&values, &opts)?;
            records.sort_by_key(|record| record.value);
            (records, None)
        }
    };
    watch.lap("decomposition");

    let assignment = color_buckets(config, &records)?;
    watch.lap("bucketing");

    let palette = config.graph.palette();
    let coloring = match &assignment {
        Some(_) => palette.name().to_lowercase(),
        None => "monocolor".to_string(),
    };
    let first_value = records.first().map_or(0, |record| record.value);
    let last_value = records.last().map_or(0, |record| record.value);
    let (lower, upper) = match config.range.mode {
        RangeMode::Continuous => (config.range.lower_bound, config.range.upper_bound),
        RangeMode::Families => (first_value, last_value),
    };

    let mut written = Vec::new();
    if config.run.create_csv || config.run.create_json {
        let now = Utc::now();
        let stem = hard_copy_stem(
            lower,
            upper,
            config.graph.mode,
            config.run.include_primes,
            &coloring,
            &hard_copy_timestamp(now, config.run.timestamp_granularity),
        );
        let rows = decorate(&records, assignment.as_ref());
        prepare_output_dir(&config.run.output_dir, config.run.reset_output_data)?;
        if config.run.create_csv {
            let path = config.run.output_dir.join(format!("{stem}.csv"));
            write_csv(&path, &rows)?;
            written.push(path);
        }
        if config.run.create_json {
            let bucket_count = assignment
                .as_ref()
                .map_or(0, PaletteBucketAssignment::bucket_count);
            let payload = PlotPayload {
                title: config
                    .graph
                    .mode
                    .title(first_value, last_value, config.run.include_primes),
                y_axis_label: config.graph.mode.y_axis_label().to_string(),
                y_axis_field: config.graph.mode.y_axis_field().to_string(),
                palette: palette.name().to_string(),
                coloring: coloring.clone(),
                base_color: BASE_COLOR.to_string(),
                color_factors: color_factors(bucket_count),
                bucket_count,
                width: config.graph.width,
                height: config.graph.height,
                point_size: config.graph.point_size,
                provenance: RunProvenance {
                    schema_version: SchemaVersion::default(),
                    config_hash: config_hash.clone(),
                    first_value,
                    last_value,
                    record_count: rows.len(),
                    created_at: now.to_rfc3339(),
                    tool_versions: tool_versions(),
                },
                rows,
            };
            let path = config.run.output_dir.join(format!("{stem}.json"));
            write_payload(&path, &payload)?;
            written.push(path);
        }
    }
    watch.lap("export");

    Ok(RunOutcome {
        first_value,
        last_value,
        record_count: records.len(),
        family_report,
        cache,
        bucket_count: assignment.as_ref().map(PaletteBucketAssignment::bucket_count),
        coloring,
        config_hash,
        written,
        timings: watch.timings,
    })
}

/// Value list for the configured range mode, after the family filter.
pub fn generate_values(
    config: &RunConfig,
) -> Result<(Vec<u64>, Option<FamilyFilterReport>), ScapeError> {
    let include_primes = config.run.include_primes;
    let mut values = match config.range.mode {
        RangeMode::Continuous => continuous_range(
            config.range.lower_bound,
            config.range.upper_bound,
            include_primes,
        )?,
        RangeMode::Families => {
            let mut members = family_members(&config.families)?;
            if !include_primes {
                members.retain(|&value| !is_prime(value));
            }
            members
        }
    };
    if config.range.families_filter.is_empty() {
        return Ok((values, None));
    }
    let report = filter_by_families(&values, &config.range.families_filter);
    values.clone_from(&report.values);
    Ok((values, Some(report)))
}

/// Palette assignment, or `None` for a monocolour plot.
///
/// The bucketer sees exactly the generated values, which are never empty
/// here, so aggregation always has at least one key.
fn color_buckets(
    config: &RunConfig,
    records: &[NumericRecord],
) -> Result<Option<PaletteBucketAssignment>, ScapeError> {
    if !config.graph.use_color_buckets {
        return Ok(None);
    }
    let opts = BucketOpts {
        property: config.color_property()?,
        rounding: config.graph.rounding,
        include_primes: config.run.include_primes,
    };
    let buckets = bucket_by_property(records, &opts)?;
    buckets
        .aggregate(config.graph.palette().capacity())
        .map(Some)
}

fn tool_versions() -> BTreeMap<String, String> {
    BTreeMap::from([(
        "primescape".to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    )])
}
