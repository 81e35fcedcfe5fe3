//! Row normalization. Source tables put kanji, hiragana, or romaji in the second
//! column depending on the level; the script of that column decides which cell is
//! the word and which is the reading.

use crate::model::VocabEntry;

const CJK_UNIFIED: std::ops::RangeInclusive<char> = '\u{4E00}'..='\u{9FFF}';
const HIRAGANA: std::ops::RangeInclusive<char> = '\u{3040}'..='\u{309F}';

/// Script of a cell, checked in this precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Kanji,
    Hiragana,
    Other,
}

impl Script {
    pub fn of(text: &str) -> Self {
        if is_kanji(text) {
            Script::Kanji
        } else if is_hiragana(text) {
            Script::Hiragana
        } else {
            Script::Other
        }
    }
}

/// True if `text` contains at least one CJK Unified Ideograph.
pub fn is_kanji(text: &str) -> bool {
    text.chars().any(|c| CJK_UNIFIED.contains(&c))
}

/// True if `text` is non-empty and every non-whitespace char is hiragana or `・`.
pub fn is_hiragana(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    text.chars()
        .filter(|c| !c.is_whitespace())
        .all(|c| HIRAGANA.contains(&c) || c == ' ' || c == '・')
}

/// Map three raw cells to the canonical (word, reading, meaning) triple.
///
/// - kanji in `col2`: word is `col2`, reading is `col1`
/// - hiragana in `col2`: both are `col2` (`col1` is dropped even if it differs)
/// - anything else, including empty: both are `col1`
///
/// `col3` is always the meaning.
pub fn normalize_entry(col1: &str, col2: &str, col3: &str) -> VocabEntry {
    let (word, reading) = match Script::of(col2) {
        Script::Kanji => (col2, col1),
        Script::Hiragana => (col2, col2),
        Script::Other => (col1, col1),
    };
    VocabEntry::new(word, reading, col3)
}
