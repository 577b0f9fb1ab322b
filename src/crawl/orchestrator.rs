// src/crawl/orchestrator.rs
// =============================================================================
// Runs the whole crawl: one task per site, all at once.
//
// How it works:
// 1. Deduplicate the input sites
// 2. Spawn one tokio task per site
// 3. Each task runs fetch -> parse -> pipeline -> resolve on its own
// 4. Wait for every task, collect exactly one LogoResult per site
//
// Isolation:
// - A failed site is logged and becomes a result without a logo
// - Nothing a task does can abort another task or the run
// - The only thing tasks share is the Fetcher (and its per-host limiter)
// =============================================================================

use anyhow::{Context, Result};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error};

use crate::config::CrawlConfig;
use crate::error::SiteError;
use crate::extract::{extract_logo, Pipeline};
use crate::fetch::{FetchOutcome, Fetcher};

/// What we found for one input site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoResult {
    pub site: String,
    pub logo_url: Option<String>,
}

pub struct Crawler {
    fetcher: Fetcher,
    pipeline: Pipeline,
}

impl Crawler {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(config)?,
            pipeline: Pipeline::new(config).context("invalid logo pattern")?,
        })
    }

    // Fetch, then extract. The parsed document only lives inside
    // extract_logo(), after the last await point.
    async fn process_site(&self, site: &str) -> Result<String, SiteError> {
        match self.fetcher.fetch(site).await {
            FetchOutcome::Failed { reason } => Err(SiteError::fetch(site, reason)),
            FetchOutcome::Fetched {
                markup,
                response_address,
            } => extract_logo(&self.pipeline, &markup, &response_address, site)
                .map_err(|kind| SiteError::extraction(site, kind)),
        }
    }

    /// Always produces a result; failures are logged here and nowhere else
    pub async fn crawl_site(&self, site: String) -> LogoResult {
        let logo_url = match self.process_site(&site).await {
            Ok(url) => {
                debug!(site = %site, logo = %url, "logo found");
                Some(url)
            }
            Err(e) => {
                error!("{}", e);
                None
            }
        };
        LogoResult { site, logo_url }
    }
}

// Crawls every site concurrently and returns one result per distinct site
//
// Results come back in task order, which is the iteration order of the
// deduplicated set, not the input order.
pub async fn run<I>(crawler: Arc<Crawler>, sites: I) -> Vec<LogoResult>
where
    I: IntoIterator<Item = String>,
{
    let sites: HashSet<String> = sites.into_iter().collect();
    debug!(tasks = sites.len(), "dispatching crawl tasks");

    let handles: Vec<_> = sites
        .into_iter()
        .map(|site| {
            let crawler = Arc::clone(&crawler);
            let task_site = site.clone();
            let handle = tokio::spawn(async move { crawler.crawl_site(task_site).await });
            (site, handle)
        })
        .collect();

    let (sites, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
    let joined = join_all(handles).await;

    sites
        .into_iter()
        .zip(joined)
        .map(|(site, joined)| match joined {
            Ok(result) => result,
            Err(e) => {
                // A panicking task still owes us a result for its site
                error!(site = %site, error = %e, "crawl task failed");
                LogoResult {
                    site,
                    logo_url: None,
                }
            }
        })
        .collect()
}
