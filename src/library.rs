//! Read-back of generated Markdown files for browsing and searching.
//!
//! Loads `<LEVEL>_vocabulary.md` for every level from a directory and answers
//! level, category, and free-text queries over the records.

use crate::model::{JlptLevel, VocabRecord};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_CATEGORY: &str = "General";
const HEADER_CELLS: [&str; 3] = ["Word", "Reading", "Meaning"];

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Cannot read vocabulary file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// All records loaded from one Markdown directory, grouped by level.
#[derive(Debug, Default)]
pub struct VocabLibrary {
    by_level: BTreeMap<JlptLevel, Vec<VocabRecord>>,
}

impl VocabLibrary {
    /// Load every level's Markdown file from `dir`. A missing file gives an empty level.
    pub fn load(dir: &Path) -> Result<Self, LibraryError> {
        let mut by_level = BTreeMap::new();
        for level in JlptLevel::ALL {
            let path = dir.join(format!("{}.md", level.file_stem()));
            let records = match std::fs::read_to_string(&path) {
                Ok(content) => parse_markdown(&content, level),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(level = %level, path = %path.display(), "no vocabulary file");
                    Vec::new()
                }
                Err(e) => return Err(LibraryError::Io { path, source: e }),
            };
            tracing::debug!(level = %level, words = records.len(), "loaded level");
            by_level.insert(level, records);
        }
        Ok(Self { by_level })
    }

    pub fn from_records(records: impl IntoIterator<Item = VocabRecord>) -> Self {
        let mut by_level: BTreeMap<JlptLevel, Vec<VocabRecord>> = BTreeMap::new();
        for record in records {
            by_level.entry(record.level).or_default().push(record);
        }
        Self { by_level }
    }

    pub fn len(&self) -> usize {
        self.by_level.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn level_count(&self, level: JlptLevel) -> usize {
        self.by_level.get(&level).map_or(0, Vec::len)
    }

    fn records(&self, level: Option<JlptLevel>) -> Box<dyn Iterator<Item = &VocabRecord> + '_> {
        match level {
            Some(level) => Box::new(self.by_level.get(&level).into_iter().flatten()),
            None => Box::new(self.by_level.values().flatten()),
        }
    }

    /// Records matching every given filter. Empty `category` or `search` matches all.
    /// Search is a case-insensitive substring match on word, reading, meaning, and category.
    pub fn filter(
        &self,
        level: Option<JlptLevel>,
        category: Option<&str>,
        search: &str,
    ) -> Vec<&VocabRecord> {
        let category = category.filter(|c| !c.is_empty());
        let needle = search.to_lowercase();
        self.records(level)
            .filter(|r| category.map_or(true, |c| r.category == c))
            .filter(|r| {
                needle.is_empty()
                    || [&r.word, &r.reading, &r.meaning, &r.category]
                        .iter()
                        .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Sorted, de-duplicated category names.
    pub fn categories(&self, level: Option<JlptLevel>) -> Vec<String> {
        self.records(level)
            .map(|r| r.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Split a table row on pipes that are not escaped as `\|`.
fn split_unescaped_pipes(row: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = row.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    cells.push(current);
    cells
}

/// True for `|---|:--:|` style rows.
fn is_separator_row(row: &str) -> bool {
    row.contains('-') && row.chars().all(|c| matches!(c, '|' | '-' | ':' | ' '))
}

/// Parse a Markdown document written by [format_markdown](crate::formats::format_markdown).
///
/// `## ` lines set the category (default "General"); table rows become records.
/// The exact `| Word | Reading | Meaning |` header and separator rows made only of
/// `|`, `-`, `:` and spaces are skipped; any other row with three cells is data.
pub fn parse_markdown(content: &str, level: JlptLevel) -> Vec<VocabRecord> {
    let mut records = Vec::new();
    let mut category = DEFAULT_CATEGORY.to_string();

    for line in content.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("##") && !trimmed.starts_with("###") {
            category = trimmed.trim_start_matches('#').trim().to_string();
            continue;
        }

        if !trimmed.starts_with('|') || is_separator_row(trimmed) {
            continue;
        }

        let cells: Vec<String> = split_unescaped_pipes(trimmed)
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if cells.len() < 3 || cells[..3] == HEADER_CELLS {
            continue;
        }
        records.push(VocabRecord {
            word: cells[0].clone(),
            reading: cells[1].clone(),
            meaning: cells[2].clone(),
            level,
            category: category.clone(),
        });
    }

    records
}
