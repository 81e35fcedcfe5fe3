//! Output formats: Markdown tables and flat JSON records.
//! The formatters are pure; the writers create one whole file per call.

use crate::model::{total_items, JlptLevel, LevelDocument, VocabRecord, VocabSection};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from the file writers.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Failed to write output: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Escape `|` so cell text cannot split a Markdown table row.
pub(crate) fn escape_pipes(s: &str) -> String {
    s.replace('|', "\\|")
}

/// Render sections as a Markdown document: title, total count, then one table per section.
pub fn format_markdown(level: JlptLevel, sections: &[VocabSection]) -> String {
    let mut lines = vec![
        format!("# JLPT {} Vocabulary\n", level),
        format!("Total vocabulary items: **{}**\n", total_items(sections)),
    ];

    for section in sections {
        lines.push(format!("\n## {}\n", section.category));
        lines.push("| Word | Reading | Meaning |".to_string());
        lines.push("|------|---------|---------|".to_string());
        for entry in &section.items {
            lines.push(format!(
                "| {} | {} | {} |",
                escape_pipes(entry.word()),
                escape_pipes(entry.reading()),
                escape_pipes(entry.meaning())
            ));
        }
    }

    lines.join("\n")
}

/// Flatten sections into one record list, repeating level and category on each record.
pub fn format_json(level: JlptLevel, sections: &[VocabSection]) -> LevelDocument {
    let vocabulary: Vec<VocabRecord> = sections
        .iter()
        .flat_map(|section| {
            section.items.iter().map(move |entry| VocabRecord {
                word: entry.word().to_string(),
                reading: entry.reading().to_string(),
                meaning: entry.meaning().to_string(),
                level,
                category: section.category.clone(),
            })
        })
        .collect();
    LevelDocument {
        level,
        total_items: vocabulary.len(),
        vocabulary,
    }
}

/// Write a Markdown document to `path`, replacing any existing file.
pub fn write_markdown(contents: &str, path: &Path) -> Result<(), FormatError> {
    std::fs::write(path, contents).map_err(|e| FormatError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write `value` as pretty-printed JSON (2-space indent, non-ASCII kept literal).
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), FormatError> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).map_err(|e| FormatError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
