// src/crawl/mod.rs
// =============================================================================
// This module drives the crawl.
//
// Features:
// - One concurrent task per distinct site
// - Every site yields exactly one result, logo or not
// - Failures are logged per site and never stop the run
// =============================================================================

mod orchestrator;

pub use orchestrator::{run, Crawler, LogoResult};
