use std::fs;
use std::path::{Path, PathBuf};

use primescape_decomp::IdentityMode;
use primescape_sim::config::{RangeMode, RunConfig};
use primescape_sim::{generate_values, run_pipeline};
use tempfile::tempdir;

fn config_in(dir: &Path, upper_bound: u64) -> RunConfig {
    let mut config = RunConfig::default();
    config.range.upper_bound = upper_bound;
    config.run.output_dir = dir.join("output");
    config.run.workers = Some(3);
    config
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .expect("file name")
        .to_string_lossy()
        .into_owned()
}

fn read_csv(path: &PathBuf) -> (csv::StringRecord, Vec<csv::StringRecord>) {
    let mut reader = csv::Reader::from_path(path).expect("open csv");
    let header = reader.headers().expect("header").clone();
    let rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .expect("rows");
    (header, rows)
}

#[test]
fn continuous_run_writes_csv_and_payload() {
    let dir = tempdir().expect("tempdir");
    let config = config_in(dir.path(), 30);
    let outcome = run_pipeline(&config, None).expect("run");

    assert_eq!(outcome.record_count, 19);
    assert_eq!(outcome.first_value, 4);
    assert_eq!(outcome.last_value, 30);
    assert_eq!(outcome.coloring, "turbo");
    let bucket_count = outcome.bucket_count.expect("coloured");
    assert!(bucket_count >= 1);
    assert_eq!(outcome.written.len(), 2);
    let steps: Vec<&str> = outcome.timings.iter().map(|timing| timing.step).collect();
    assert_eq!(steps, vec!["generation", "decomposition", "bucketing", "export"]);

    let csv_path = &outcome.written[0];
    assert!(file_name(csv_path).starts_with("2_30_antislope_no_primes_turbo_"));
    assert!(file_name(csv_path).ends_with(".csv"));
    let (header, rows) = read_csv(csv_path);
    assert_eq!(
        header.iter().collect::<Vec<_>>(),
        vec![
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
        ]
    );
    assert_eq!(rows.len(), 19);
    assert_eq!(&rows[0][0], "4");
    assert_eq!(&rows[0][1], "false");
    assert_eq!(&rows[0][2], "[ 2, 2 ]");
    assert_eq!(&rows[0][6], "[ 2 ]");
    assert_eq!(&rows[0][7], "2");
    assert_eq!(&rows[0][8], "2");
    assert!(rows.iter().all(|row| !row[9].is_empty()));
    let twelve = rows.iter().find(|row| &row[0] == "12").expect("row for 12");
    assert_eq!(&twelve[2], "[ 2, 2, 3 ]");
    assert_eq!(&twelve[8], "4");

    let payload: serde_json::Value =
        serde_json::from_slice(&fs::read(&outcome.written[1]).expect("read json")).expect("json");
    assert_eq!(payload["title"], "Antislope for numbers 4 to 30. Primes excluded");
    assert_eq!(payload["y_axis_label"], "antislope");
    assert_eq!(payload["bucket_count"], bucket_count);
    assert_eq!(
        payload["color_factors"].as_array().expect("factors").len(),
        bucket_count
    );
    assert_eq!(payload["rows"].as_array().expect("rows").len(), 19);
    assert_eq!(payload["provenance"]["record_count"], 19);
    assert_eq!(payload["provenance"]["config_hash"], outcome.config_hash.as_str());
}

#[test]
fn monocolour_runs_leave_buckets_empty() {
    let dir = tempdir().expect("tempdir");
    let mut config = config_in(dir.path(), 20);
    config.graph.use_color_buckets = false;
    config.run.create_json = false;
    let outcome = run_pipeline(&config, None).expect("run");

    assert_eq!(outcome.bucket_count, None);
    assert_eq!(outcome.coloring, "monocolor");
    assert_eq!(outcome.written.len(), 1);
    assert!(file_name(&outcome.written[0]).contains("_monocolor_"));
    let (_, rows) = read_csv(&outcome.written[0]);
    assert!(rows.iter().all(|row| row[9].is_empty()));
}

#[test]
fn included_primes_are_coloured_too() {
    let dir = tempdir().expect("tempdir");
    let mut config = config_in(dir.path(), 20);
    config.run.include_primes = true;
    config.run.create_json = false;
    let outcome = run_pipeline(&config, None).expect("run");

    assert_eq!(outcome.record_count, 19);
    assert!(file_name(&outcome.written[0]).starts_with("2_20_antislope_primes_turbo_"));
    let (_, rows) = read_csv(&outcome.written[0]);
    let seven = rows.iter().find(|row| &row[0] == "7").expect("row for 7");
    assert_eq!(&seven[1], "true");
    assert_eq!(&seven[6], "[  ]");
    assert!(!seven[9].is_empty());
}

#[test]
fn family_filter_reports_counts() {
    let dir = tempdir().expect("tempdir");
    let mut config = config_in(dir.path(), 30);
    config.range.families_filter = vec![2, 6];
    let (values, report) = generate_values(&config).expect("generate");
    assert_eq!(values, vec![4, 6, 10, 14, 18, 22, 26, 30]);
    let report = report.expect("filter report");
    assert_eq!(report.counts[&2], 6);
    assert_eq!(report.counts[&6], 2);

    let outcome = run_pipeline(&config, None).expect("run");
    assert_eq!(outcome.record_count, 8);
    assert!(outcome.family_report.is_some());
}

#[test]
fn families_mode_uses_member_span_in_file_names() {
    let dir = tempdir().expect("tempdir");
    let mut config = config_in(dir.path(), 10);
    config.range.mode = RangeMode::Families;
    config.families.families = vec![vec![3]];
    config.families.identity_factor.mode = IdentityMode::Count;
    config.families.identity_factor.count = 2;
    config.run.create_json = false;

    let (values, _) = generate_values(&config).expect("generate");
    assert_eq!(values, vec![15, 21, 33]);
    let outcome = run_pipeline(&config, None).expect("run");
    assert!(file_name(&outcome.written[0]).starts_with("15_33_antislope_no_primes_"));
}

#[test]
fn reset_clears_previous_hard_copies() {
    let dir = tempdir().expect("tempdir");
    let mut config = config_in(dir.path(), 12);
    fs::create_dir_all(&config.run.output_dir).expect("mkdir");
    let stale = config.run.output_dir.join("stale.csv");
    fs::write(&stale, "old").expect("write stale");

    run_pipeline(&config, None).expect("first run");
    assert!(stale.exists());

    config.run.reset_output_data = true;
    let outcome = run_pipeline(&config, None).expect("second run");
    assert!(!stale.exists());
    for path in &outcome.written {
        assert!(path.exists());
    }
}

#[test]
fn cached_runs_reuse_stored_records() {
    let dir = tempdir().expect("tempdir");
    let mut config = config_in(dir.path(), 60);
    config.store.path = Some(dir.path().join("records.sqlite"));
    config.run.create_csv = false;
    config.run.create_json = false;

    let first = run_pipeline(&config, None).expect("first run");
    let stats = first.cache.expect("cache stats");
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.computed, first.record_count);
    assert!(first.written.is_empty());

    config.range.upper_bound = 80;
    let second = run_pipeline(&config, None).expect("second run");
    let stats = second.cache.expect("cache stats");
    assert_eq!(stats.hits, first.record_count);
    assert_eq!(stats.hits + stats.computed, second.record_count);
}

#[test]
fn ranges_without_values_are_rejected() {
    let dir = tempdir().expect("tempdir");
    let mut config = config_in(dir.path(), 3);
    config.range.lower_bound = 2;
    let err = run_pipeline(&config, None).expect_err("only primes");
    assert_eq!(err.info().code, "sim.no_values");
}

#[test]
fn a_single_value_still_gets_a_colour_bucket() {
    let dir = tempdir().expect("tempdir");
    let mut config = config_in(dir.path(), 1);
    config.range.lower_bound = 1;
    config.run.create_json = false;
    let outcome = run_pipeline(&config, None).expect("run");

    assert_eq!(outcome.record_count, 1);
    assert_eq!(outcome.bucket_count, Some(1));
    assert_eq!(outcome.coloring, "turbo");
    let (_, rows) = read_csv(&outcome.written[0]);
    assert_eq!(&rows[0][0], "1");
    assert_eq!(&rows[0][6], "0");
    assert_eq!(&rows[0][9], "0");
}
