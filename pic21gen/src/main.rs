//!
//! # Shuttle-Generator CLI
//!
//! Loads (or defaults) the configuration, runs the generation batch, and
//! exports the layout plus optional preview into the chosen directory.
//!

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use pic21gen::{generate, Config, GenOptions};

// => The doc-comment on `ProgramOptions` here is displayed by the `clap`-generated help docs =>

/// Photonic shuttle layout generator
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct ProgramOptions {
    /// Configuration file (toml, yaml, or json); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output directory
    #[arg(short, long, default_value = ".")]
    outdir: PathBuf,
    /// Also render an SVG preview of the top cell
    #[arg(short, long)]
    preview: bool,
    /// Verbose output mode
    #[arg(short, long)]
    verbose: bool,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let options = ProgramOptions::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
        if options.verbose { "debug" } else { "info" },
    ))
    .init();

    let config = match &options.config {
        Some(path) => Config::open(path)?,
        None => Config::default(),
    };

    let opts = GenOptions {
        outdir: options.outdir.clone(),
        identity: generate::identity(),
        preview: options.preview,
    };
    let summary = generate::run(&config, &opts)?;

    log::info!(
        "completed: {} operations, {} attachment points, wrote {}",
        summary.n_ops,
        summary.n_attach,
        summary.gds.display()
    );
    Ok(())
}
