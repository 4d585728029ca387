use std::error::Error;
use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use primescape_sim::config::{RangeMode, RunConfig};
use primescape_sim::{load_config, run_pipeline, RunOutcome};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML configuration describing the run.
    #[arg(long)]
    pub config: PathBuf,
    /// Print nothing except errors.
    #[arg(long)]
    pub quiet: bool,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args.config)?;
    let start = Utc::now();
    if !args.quiet {
        print_settings(&config, &start.to_rfc3339());
    }
    let outcome = run_pipeline(&config, None)?;
    if !args.quiet {
        print_outcome(&outcome);
        println!("End at {}", Utc::now().to_rfc3339());
        println!("Total time: {}ms", (Utc::now() - start).num_milliseconds());
    }
    Ok(())
}

fn print_settings(config: &RunConfig, start: &str) {
    println!("Start at {start}");
    match config.range.mode {
        RangeMode::Continuous => println!(
            "* Range [{}..{}]",
            config.range.lower_bound, config.range.upper_bound
        ),
        RangeMode::Families => {
            println!("* Families: {:?}", config.families.families);
            println!("* Identity factors: {:?}", config.families.identity_factor);
        }
    }
    if !config.range.families_filter.is_empty() {
        println!("* Family filter: {:?}", config.range.families_filter);
    }
    println!("* Graph mode: {}", config.graph.mode.name());
    if config.run.include_primes {
        println!("* Primes included");
    } else {
        println!("* Primes NOT included");
    }
    if config.run.create_csv {
        println!("* CSV output included");
    } else {
        println!("* No CSV output");
    }
    if config.graph.use_color_buckets {
        println!(
            "* Bucket colorization enabled: {} by {}",
            config.graph.palette(),
            config.graph.color_property
        );
    } else {
        println!("* Monocolor enabled");
    }
    if let Some(path) = &config.store.path {
        println!("* Record cache: {}", path.display());
    }
}

fn print_outcome(outcome: &RunOutcome) {
    if let Some(report) = &outcome.family_report {
        for (family, count) in &report.counts {
            println!("Family {family}: {count} values");
        }
    }
    for timing in &outcome.timings {
        println!("{} done in {}ms", timing.step, timing.elapsed.as_millis());
    }
    println!(
        "{} records for numbers {} to {}",
        outcome.record_count, outcome.first_value, outcome.last_value
    );
    if let Some(stats) = &outcome.cache {
        println!("Cache: {} hits, {} computed", stats.hits, stats.computed);
    }
    match outcome.bucket_count {
        Some(count) => println!("{count} color buckets created"),
        None => println!("Base coloring"),
    }
    for path in &outcome.written {
        println!("Data saved as {}", path.display());
    }
    println!("Config hash: {}", outcome.config_hash);
}
