// src/error.rs
// =============================================================================
// Error types for the per-site pipeline.
//
// Every failure here is recoverable: it degrades one site's result to "no
// logo" and gets logged. Nothing in this file ever aborts the whole run.
//
// The Display text of each variant is the short cause that ends up in the
// log line, e.g. "Network Error - acme.test timed out".
// =============================================================================

use thiserror::Error;

/// Why fetching a homepage failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchErrorKind {
    /// The transport's connect or read timeout fired
    #[error("timed out")]
    Timeout,
    /// DNS failure, refused connection, or an address we could not build
    #[error("could not connect")]
    ConnectionError,
    /// The server sent something that is not a valid HTTP response
    #[error("had a problem with the response")]
    ResponseError,
    /// The body was truncated or could not be decoded
    #[error("had a problem with the payload")]
    PayloadError,
    /// Anything other than HTTP 200
    #[error("failed with status {0}")]
    BadStatus(u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionErrorKind {
    #[error("logo could not be extracted")]
    NoStrategyMatched,
    #[error("logo reference was not usable")]
    NoUsableReference,
}

/// Everything that can go wrong while processing a single site
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SiteError {
    #[error("Network Error - {site} {kind}")]
    Fetch { site: String, kind: FetchErrorKind },
    #[error("Extraction Error - {site} {kind}")]
    Extraction {
        site: String,
        kind: ExtractionErrorKind,
    },
}

impl SiteError {
    pub fn fetch(site: &str, kind: FetchErrorKind) -> Self {
        SiteError::Fetch {
            site: site.to_string(),
            kind,
        }
    }

    pub fn extraction(site: &str, kind: ExtractionErrorKind) -> Self {
        SiteError::Extraction {
            site: site.to_string(),
            kind,
        }
    }
}
