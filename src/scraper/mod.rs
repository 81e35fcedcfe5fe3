//! Fetching and parsing of level pages. Page source trait, shared client, section
//! extraction, and row normalization.

mod client;
mod error;

pub mod normalize;
pub mod sections;

pub use client::{PoliteClient, PoliteClientBuilder, DEFAULT_DELAY_SECS, DEFAULT_TIMEOUT_SECS};
pub use error::ScraperError;

use crate::model::{JlptLevel, LevelResult};

/// Source of raw page HTML. Implemented by [PoliteClient]; tests supply canned pages.
pub trait PageFetcher {
    fn fetch(&mut self, url: &str) -> Result<String, ScraperError>;
}

/// What scraping one level produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelOutcome {
    /// At least one section was extracted.
    Scraped(LevelResult),
    /// Neither content selector matched.
    NoContent,
    /// Content was found but no table yielded a row.
    Empty,
}

/// Fetch the page for `level` and extract its sections.
pub fn scrape_level<F: PageFetcher + ?Sized>(
    level: JlptLevel,
    url: &str,
    fetcher: &mut F,
) -> Result<LevelOutcome, ScraperError> {
    let html = fetcher.fetch(url)?;
    let outcome = match sections::parse_level_page(&html)? {
        None => LevelOutcome::NoContent,
        Some(sections) if sections.is_empty() => LevelOutcome::Empty,
        Some(sections) => LevelOutcome::Scraped(LevelResult { level, sections }),
    };
    Ok(outcome)
}
