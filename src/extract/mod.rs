// src/extract/mod.rs
// =============================================================================
// This module finds the logo in a fetched homepage.
//
// Submodules:
// - markup: parsed, queryable HTML (wraps scraper)
// - strategy: the ordered logo heuristics and the pipeline running them
// - resolve: turns the winning match into an absolute URL
//
// Everything in here is synchronous and pure: same markup in, same answer
// out. The parsed document is not Send, so it must never be held across an
// .await; callers run extract_logo() after the fetch has completed.
// =============================================================================

mod markup;
mod resolve;
mod strategy;

pub use markup::MarkupModel;
pub use resolve::resolve;
pub use strategy::Pipeline;

use crate::error::ExtractionErrorKind;

// Parse -> pipeline -> resolve for one page
//
// Only the first matching strategy gets to resolve; if that fails the whole
// extraction fails.
pub fn extract_logo(
    pipeline: &Pipeline,
    markup: &[u8],
    response_address: &str,
    site: &str,
) -> Result<String, ExtractionErrorKind> {
    let model = MarkupModel::parse(markup);
    let found = pipeline
        .run(&model, site)
        .ok_or(ExtractionErrorKind::NoStrategyMatched)?;
    resolve(&found.candidate, response_address)
}
