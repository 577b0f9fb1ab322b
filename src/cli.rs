// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// There is a single command: read sites, crawl them, write site,logo pairs.
// Every flag is optional; with none at all we read stdin, write stdout and
// log to ./app.log.
// =============================================================================

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "logo-crawler",
    version = "0.1.0",
    about = "Finds the logo image URL of many websites at once",
    long_about = "logo-crawler reads a CSV list of sites (first column), fetches each homepage \
                  concurrently and prints a site,logo_url CSV record for every site whose logo \
                  it could find."
)]
pub struct Cli {
    /// CSV file with one site per row in the first column (default: stdin)
    ///
    /// Sites are given without a scheme, e.g. "example.com"
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// Where to write the site,logo_url records (default: stdout)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// JSON config file; any field left out keeps its default
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log file, truncated on every run. Use "-" to log to stderr
    #[arg(long, default_value = "app.log")]
    pub log_file: String,

    /// Maximum simultaneous connections to one host (overrides config)
    #[arg(long)]
    pub max_connections_per_host: Option<usize>,

    /// Per-request timeout in seconds (overrides config)
    #[arg(long)]
    pub timeout: Option<u64>,
}
