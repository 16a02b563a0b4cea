//! `rdfox-pypi` - Repackage official RDFox downloads as Python wheels.
//!
//! Downloads the release archive for each platform, prints its SHA256, and
//! writes one wheel per platform into the output directory, printing the
//! wheel's SHA256 as well.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use clap::builder::PossibleValuesParser;
use tracing_subscriber::EnvFilter;

use rdfox_pypi_core::build::{DEFAULT_DESCRIPTION, DEFAULT_OUT_DIR};
use rdfox_pypi_core::io::download::HttpFetcher;
use rdfox_pypi_core::{BuildPlan, Reporter, build_wheels};
use rdfox_pypi_schema::{
    PlatformTable, RDFOX, RDFOX_DOWNLOAD_BASE_URL, RDFOX_PLATFORMS, Sha256Digest,
};

#[derive(Parser, Debug)]
#[command(name = "rdfox-pypi")]
#[command(about = "Repackage official RDFox downloads as Python wheels", long_about = None)]
struct Args {
    /// RDFox version to package (e.g. 7.2a)
    #[arg(long)]
    version: String,

    /// Wheel version suffix (e.g. .post1)
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    suffix: String,

    /// Target directory
    #[arg(long, default_value = DEFAULT_OUT_DIR)]
    outdir: PathBuf,

    /// Platform to build for, can be repeated (default: all)
    #[arg(
        long = "platform",
        value_parser = PossibleValuesParser::new(RDFOX_PLATFORMS.iter().map(|p| p.vendor))
    )]
    platforms: Vec<String>,

    /// Base URL of the RDFox release archives
    #[arg(long, env = "RDFOX_DOWNLOAD_BASE_URL", default_value = RDFOX_DOWNLOAD_BASE_URL)]
    base_url: String,

    /// Markdown file used as the wheel's long description
    #[arg(long)]
    description: Option<PathBuf>,

    /// Expected SHA256 of a platform's archive, can be repeated
    #[arg(long = "expect-sha256", value_name = "PLATFORM=SHA256", value_parser = parse_expected_hash)]
    expected_sha256: Vec<(String, Sha256Digest)>,

    /// Also write a RECORD file into each wheel
    #[arg(long)]
    record: bool,
}

/// Prints the digest audit trail to stdout.
struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn fetched(&self, url: &str, digest: &Sha256Digest) {
        println!("{digest} {url}");
    }

    fn wrote(&self, path: &Path, digest: &Sha256Digest) {
        println!("  {digest} {}", path.display());
    }
}

fn parse_expected_hash(s: &str) -> Result<(String, Sha256Digest), String> {
    let (platform, hash) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PLATFORM=SHA256, got '{s}'"))?;
    if PlatformTable::rdfox().get(platform).is_none() {
        return Err(format!("unknown platform '{platform}'"));
    }
    let digest = Sha256Digest::new(hash).map_err(|e| e.to_string())?;
    Ok((platform.to_string(), digest))
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let description = match &args.description {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read description {}", path.display()))?,
        None => DEFAULT_DESCRIPTION.to_string(),
    };

    let plan = BuildPlan {
        vendor_version: args.version,
        suffix: args.suffix,
        out_dir: args.outdir,
        platforms: args.platforms,
        base_url: args.base_url,
        description,
        expected_sha256: args.expected_sha256.into_iter().collect(),
        record: args.record,
    };

    let fetcher = HttpFetcher::new().context("failed to initialise HTTP client")?;
    let built = build_wheels(
        &plan,
        &RDFOX,
        &PlatformTable::rdfox(),
        &fetcher,
        &ConsoleReporter,
    )
    .with_context(|| format!("failed to build wheels for RDFox {}", plan.vendor_version))?;

    tracing::info!(count = built.len(), out_dir = %plan.out_dir.display(), "all wheels written");
    Ok(())
}
