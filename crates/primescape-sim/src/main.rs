use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    buckets::{self, BucketsArgs},
    decompose::{self, DecomposeArgs},
    init_config::{self, InitConfigArgs},
    run::{self, RunArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "primescape", about = "Prime factor landscape explorer", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline described by a YAML configuration.
    Run(RunArgs),
    /// Decompose explicit values and print the records as JSON.
    Decompose(DecomposeArgs),
    /// Print the palette bucket layout for a value range.
    Buckets(BucketsArgs),
    /// Write a default configuration file.
    InitConfig(InitConfigArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run::run(&args),
        Command::Decompose(args) => decompose::run(&args),
        Command::Buckets(args) => buckets::run(&args),
        Command::InitConfig(args) => init_config::run(&args),
    }
}
