// src/fetch/http.rs
// =============================================================================
// This module fetches one homepage per site.
//
// Key functionality:
// - Builds the request address as "http://" + site (no https negotiation)
// - Holds a per-host permit for the whole request, body included
// - Only HTTP 200 counts as success; every other status is BadStatus
// - Classifies transport failures into a small, fixed set of kinds
// - Never retries: one attempt, one outcome
//
// Rust concepts:
// - async/await: The request and the body read are the only await points
// - Enums: FetchOutcome is either Fetched or Failed, never both
// - RAII: The limiter permit is released when `_permit` goes out of scope
// =============================================================================

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::limiter::HostLimiter;
use crate::config::CrawlConfig;
use crate::error::FetchErrorKind;

/// The result of fetching one site, produced exactly once per site
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// HTTP 200 with the raw body and the address we ended up at
    Fetched {
        markup: Vec<u8>,
        response_address: String,
    },
    Failed { reason: FetchErrorKind },
}

impl FetchOutcome {
    fn failed(reason: FetchErrorKind) -> Self {
        FetchOutcome::Failed { reason }
    }
}

// The Fetcher owns the HTTP client (connection pool + fixed headers) and the
// per-host limiter. Both are cheap to clone, so a Fetcher is usually wrapped
// in an Arc and shared by every site task.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    limiter: HostLimiter,
    scheme: String,
}

impl Fetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("invalid header name '{}'", name))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("invalid value for header '{}'", name))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            // Never negotiate h2, even after a redirect to https
            .http1_only()
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            client,
            limiter: HostLimiter::new(config.connections_per_host()),
            scheme: config.scheme.clone(),
        })
    }

    #[cfg(test)]
    pub fn limiter(&self) -> &HostLimiter {
        &self.limiter
    }

    /// "acme.test" -> "http://acme.test"
    pub fn request_address(&self, site: &str) -> String {
        format!("{}://{}", self.scheme, site)
    }

    // Fetches the homepage of `site`
    //
    // This never returns an error: every failure becomes FetchOutcome::Failed
    // so one bad site can't take the rest of the run down with it.
    pub async fn fetch(&self, site: &str) -> FetchOutcome {
        let address = self.request_address(site);

        // We need the host up front to pick the right limiter slot.
        // A site that doesn't even form a valid address can't be connected to.
        let host = match Url::parse(&address) {
            Ok(url) => match url.host_str() {
                Some(host) => host.to_string(),
                None => return FetchOutcome::failed(FetchErrorKind::ConnectionError),
            },
            Err(e) => {
                debug!(site, error = %e, "site does not form a valid address");
                return FetchOutcome::failed(FetchErrorKind::ConnectionError);
            }
        };

        let _permit = match self.limiter.acquire(&host).await {
            Ok(permit) => permit,
            Err(_) => return FetchOutcome::failed(FetchErrorKind::ConnectionError),
        };

        debug!(
            site,
            %address,
            free_slots = self.limiter.available(&host),
            "fetching homepage"
        );

        let response = match self.client.get(&address).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(site, error = %e, "request failed");
                return FetchOutcome::failed(classify_error(&e));
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            return FetchOutcome::failed(FetchErrorKind::BadStatus(status.as_u16()));
        }

        // Grab the final address before .bytes() consumes the response
        let response_address = response.url().to_string();

        match response.bytes().await {
            Ok(body) => FetchOutcome::Fetched {
                markup: body.to_vec(),
                response_address,
            },
            Err(e) => {
                debug!(site, error = %e, "reading body failed");
                let reason = if e.is_timeout() {
                    FetchErrorKind::Timeout
                } else {
                    FetchErrorKind::PayloadError
                };
                FetchOutcome::failed(reason)
            }
        }
    }
}

// Maps a reqwest error onto our failure taxonomy
//
// Order matters: a connect timeout is both is_timeout() and is_connect(),
// and we want to report it as a timeout.
fn classify_error(error: &reqwest::Error) -> FetchErrorKind {
    if error.is_timeout() {
        FetchErrorKind::Timeout
    } else if error.is_connect() {
        FetchErrorKind::ConnectionError
    } else if error.is_body() || error.is_decode() {
        FetchErrorKind::PayloadError
    } else {
        // Too many redirects, malformed status line, bad headers, ...
        FetchErrorKind::ResponseError
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why hold the permit while reading the body?
//    - The connection is still busy until the body has been read
//    - Dropping the permit after send() would let a 6th request start while
//      5 bodies are still streaming from the same host
//
// 2. Why exactly 200 and not is_success()?
//    - A 204 or 206 homepage has no usable markup for us
//    - Redirects are followed by reqwest, so we only ever see the final status
//
// 3. Why return bytes instead of text()?
//    - The parser is lenient about encoding anyway; we decode lossily there
//    - Keeps "payload" failures limited to real transport problems
// -----------------------------------------------------------------------------
