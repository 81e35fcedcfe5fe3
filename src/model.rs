//! Canonical data model for scraped vocabulary.
//!
//! The scraper produces [LevelResult]; the formatters and the library consume it
//! or its flattened JSON view ([LevelDocument]).

use serde::{Deserialize, Serialize};
use std::fmt;

/// JLPT proficiency level, declared easiest first so that sorting yields N5..N1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JlptLevel {
    N5,
    N4,
    N3,
    N2,
    N1,
}

impl JlptLevel {
    pub const ALL: [JlptLevel; 5] = [
        JlptLevel::N5,
        JlptLevel::N4,
        JlptLevel::N3,
        JlptLevel::N2,
        JlptLevel::N1,
    ];

    /// Parse a level label, case-insensitive ("n5", "N5").
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "N5" => Some(JlptLevel::N5),
            "N4" => Some(JlptLevel::N4),
            "N3" => Some(JlptLevel::N3),
            "N2" => Some(JlptLevel::N2),
            "N1" => Some(JlptLevel::N1),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JlptLevel::N5 => "N5",
            JlptLevel::N4 => "N4",
            JlptLevel::N3 => "N3",
            JlptLevel::N2 => "N2",
            JlptLevel::N1 => "N1",
        }
    }

    /// File stem shared by the Markdown and JSON outputs, e.g. `N5_vocabulary`.
    pub fn file_stem(&self) -> String {
        format!("{}_vocabulary", self.as_str())
    }
}

impl fmt::Display for JlptLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One canonical (word, reading, meaning) triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabEntry {
    word: String,
    reading: String,
    meaning: String,
}

impl VocabEntry {
    pub fn new(
        word: impl Into<String>,
        reading: impl Into<String>,
        meaning: impl Into<String>,
    ) -> Self {
        Self {
            word: word.into(),
            reading: reading.into(),
            meaning: meaning.into(),
        }
    }

    /// Kanji form when one exists, otherwise the phonetic form.
    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn reading(&self) -> &str {
        &self.reading
    }

    pub fn meaning(&self) -> &str {
        &self.meaning
    }
}

/// Rows of one source table under a heading. Items keep source row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabSection {
    pub category: String,
    pub items: Vec<VocabEntry>,
}

/// Everything scraped for one level in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelResult {
    pub level: JlptLevel,
    pub sections: Vec<VocabSection>,
}

impl LevelResult {
    pub fn total_items(&self) -> usize {
        total_items(&self.sections)
    }
}

pub fn total_items(sections: &[VocabSection]) -> usize {
    sections.iter().map(|s| s.items.len()).sum()
}

/// Flat JSON record. Category is repeated on every record rather than nested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabRecord {
    pub word: String,
    pub reading: String,
    pub meaning: String,
    pub level: JlptLevel,
    pub category: String,
}

/// Per-level JSON document, written to `vocabulary_json/<LEVEL>_vocabulary.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDocument {
    pub level: JlptLevel,
    pub total_items: usize,
    pub vocabulary: Vec<VocabRecord>,
}

/// Combined JSON document, written to `vocabulary_json/all_vocabulary.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedDocument {
    pub levels: Vec<LevelDocument>,
}
