// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (to a file by default, so stdout stays pure CSV)
// 3. Build the config: defaults <- JSON file <- CLI flags
// 4. Read the sites, crawl them all, write the logos we found
// 5. Exit with 0, or 2 if something outside the crawl itself went wrong
//
// A site that fails to fetch or has no logo is NOT an error here; it just
// doesn't show up in the output.
// =============================================================================

mod cli;
mod config;
mod crawl;
mod error;
mod extract;
mod fetch;
mod io;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use config::CrawlConfig;
use std::fs::File;
use std::io::{stdin, stdout, BufReader, BufWriter};
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_file)?;

    let config = build_config(&cli)?;

    let sites = match &cli.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("could not open input file {}", path.display()))?;
            io::read_sites(BufReader::new(file))?
        }
        None => io::read_sites(stdin().lock())?,
    };

    info!(
        sites = sites.len(),
        max_connections_per_host = config.max_connections_per_host,
        "starting crawl"
    );

    let crawler = Arc::new(crawl::Crawler::new(&config)?);
    let results = crawl::run(crawler, sites).await;

    let written = match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("could not create output file {}", path.display()))?;
            io::write_results(BufWriter::new(file), &results)?
        }
        None => io::write_results(stdout().lock(), &results)?,
    };

    info!(
        crawled = results.len(),
        logos = written,
        missing = results.len() - written,
        "crawl finished"
    );

    Ok(())
}

// Defaults, then the optional JSON file, then individual CLI flags on top
fn build_config(cli: &Cli) -> Result<CrawlConfig> {
    let mut config = match &cli.config {
        Some(path) => CrawlConfig::from_file(path)?,
        None => CrawlConfig::default(),
    };

    if let Some(max) = cli.max_connections_per_host {
        config.max_connections_per_host = max;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }

    Ok(config)
}

fn init_logging(target: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if target == "-" {
        builder.with_writer(std::io::stderr).init();
    } else {
        let file =
            File::create(target).with_context(|| format!("could not create log file {}", target))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    }

    Ok(())
}
