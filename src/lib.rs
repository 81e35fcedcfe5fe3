//! jlptscrape: CLI scraper for JLPT vocabulary lists, outputting normalized Markdown and JSON.

pub mod cli;
pub mod config;
pub mod formats;
pub mod library;
pub mod model;
pub mod scraper;

// Re-exports for CLI and consumers.
pub use formats::{format_json, format_markdown, write_json, write_markdown, FormatError};
pub use library::{LibraryError, VocabLibrary};
pub use model::{
    CombinedDocument, JlptLevel, LevelDocument, LevelResult, VocabEntry, VocabRecord,
    VocabSection,
};
pub use scraper::normalize::{is_hiragana, is_kanji, normalize_entry, Script};
pub use scraper::{
    scrape_level, LevelOutcome, PageFetcher, PoliteClient, PoliteClientBuilder, ScraperError,
};
