use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use primescape_sim::RunConfig;

#[derive(Args, Debug)]
pub struct InitConfigArgs {
    /// Destination of the YAML file.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &InitConfigArgs) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = args.out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&args.out, RunConfig::default().to_yaml()?)?;
    println!("configuration written to {}", args.out.display());
    Ok(())
}
