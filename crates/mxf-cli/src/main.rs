//! mxf - read Material eXchange Format files and print a structured dump.

mod dict_loader;
mod dump;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use mxf_dict::Rp210Dictionary;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Reads an MXF file (SMPTE 377M) and prints its decoded structure as JSON.
#[derive(Parser)]
#[command(name = "mxf", version, about)]
struct Cli {
    /// Path to the MXF file to read.
    file: PathBuf,

    /// Include the full decoded DataSet table for every header metadata set.
    #[arg(short, long)]
    verbose: bool,

    /// Path to an RP 210 CSV table (UL, Type, Data Element Name, Data
    /// Element Definition columns); without it only the built-in synthetic
    /// and Avid seed entries are known.
    #[arg(long)]
    dict: Option<PathBuf>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .from_env_lossy();
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(env_filter);
    tracing_subscriber::registry().with(stderr_layer).init();
}

fn run(cli: &Cli) -> Result<()> {
    let mut dictionary = Rp210Dictionary::synthetic_only().with_avid_extensions();
    if let Some(dict_path) = &cli.dict {
        let rows = dict_loader::load_rows(dict_path)?;
        dictionary = Rp210Dictionary::from_rows(rows).with_synthetic_seed().with_avid_extensions();
    }

    let file = File::open(&cli.file).with_context(|| format!("cannot open: {}", cli.file.display()))?;
    let mut reader = BufReader::new(file);

    let parsed = mxf_format::driver::parse(&mut reader, Arc::new(dictionary))
        .with_context(|| format!("cannot parse: {}", cli.file.display()))?;

    let output = dump::to_json(&parsed, cli.verbose);
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
