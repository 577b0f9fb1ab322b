// src/fetch/mod.rs
// =============================================================================
// This module downloads homepages.
//
// Submodules:
// - limiter: caps simultaneous requests per host
// - http: the Fetcher itself (one GET per site, failure classification)
// =============================================================================

mod http;
mod limiter;

pub use http::{FetchOutcome, Fetcher};
