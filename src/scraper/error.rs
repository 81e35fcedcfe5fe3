//! Shared error type for fetching and parsing level pages.

use thiserror::Error;

/// Fetch and parse errors. Transport failures (network, status, body) are kept
/// distinct so the CLI can report them separately from parse failures.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Network error: could not reach {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to read response body from {url}: {source}")]
    BodyRead {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },
}

impl ScraperError {
    /// True for failures of the HTTP exchange itself, as opposed to parsing.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ScraperError::Network { .. }
                | ScraperError::HttpStatus { .. }
                | ScraperError::BodyRead { .. }
        )
    }
}
