//! `tk-probe`: identify tracker modules on disk.
//!
//! Walks the given paths, probes every file against the format registry in
//! parallel and prints one record per file. Unrecognised files are reported,
//! not treated as failures.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;
use trackerkit_formats::Registry;
use trackerkit_probe::{OutputFormat, collect_files, load_config, probe_all, write_report};

#[derive(Parser)]
#[command(name = "tk-probe")]
#[command(about = "Identify tracker modules and summarise their contents")]
struct Args {
    /// Files or directories to probe
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Descend into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Report encoding
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Pretty print JSON output
    #[arg(long)]
    pretty: bool,

    /// Registry configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show a progress bar on stderr
    #[arg(long)]
    progress: bool,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with_writer(io::stderr)
        .init();
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );
    Ok(bar)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(args.config.as_deref())?;
    let registry = Registry::with_config(&config);
    let files = collect_files(&args.paths, args.recursive)?;
    info!(files = files.len(), formats = registry.entries().len(), "probing");

    let bar = if args.progress { Some(progress_bar(files.len())?) } else { None };
    let records = probe_all(&registry, &files, bar.as_ref());
    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }

    match &args.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
            write_report(&records, args.format, args.pretty, BufWriter::new(file))
        }
        None => write_report(&records, args.format, args.pretty, io::stdout().lock()),
    }
}
