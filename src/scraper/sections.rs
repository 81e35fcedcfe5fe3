//! Section extraction: walks headings and tables under the content root in
//! document order and turns table rows into categorized sections.

use crate::model::VocabSection;
use crate::scraper::error::ScraperError;
use crate::scraper::normalize::normalize_entry;
use scraper::{ElementRef, Html, Selector};

/// Primary content container, then the generic fallback.
const CONTENT_SELECTORS: [&str; 2] = ["div.entry-content", "article"];
const WALK_SELECTOR: &str = "h2, h3, h4, table";
/// Headings that start with this are share widgets, not categories.
const SHARE_MARKER: &str = "シェア";

/// Parse a CSS selector or return an error (avoids panics from Selector::parse).
pub(crate) fn parse_selector(sel: &str) -> Result<Selector, ScraperError> {
    Selector::parse(sel).map_err(|e| ScraperError::InvalidSelector {
        selector: sel.to_string(),
        message: e.to_string(),
    })
}

/// Text of an element with each text node trimmed and empty pieces dropped.
fn stripped_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).filter(|s| !s.is_empty()).collect()
}

/// First element matching the primary selector, else the fallback. `None` means no content.
pub fn find_content_root(doc: &Html) -> Result<Option<ElementRef<'_>>, ScraperError> {
    for sel in CONTENT_SELECTORS {
        let selector = parse_selector(sel)?;
        if let Some(root) = doc.select(&selector).next() {
            return Ok(Some(root));
        }
    }
    Ok(None)
}

/// Walk headings (h2-h4) and tables under `root` in document order.
///
/// Each table that appears after a usable heading and has at least one valid row
/// becomes its own section, so two tables under one heading give two sections with
/// the same category.
pub fn extract_sections(root: ElementRef<'_>) -> Result<Vec<VocabSection>, ScraperError> {
    let walk_sel = parse_selector(WALK_SELECTOR)?;
    let row_sel = parse_selector("tr")?;
    let cell_sel = parse_selector("td, th")?;

    let mut sections = Vec::new();
    let mut current_category: Option<String> = None;

    for element in root.select(&walk_sel) {
        if element.value().name() != "table" {
            let text = stripped_text(element);
            if !text.is_empty() && !text.starts_with(SHARE_MARKER) {
                tracing::debug!(category = %text, "found category");
                current_category = Some(text);
            }
            continue;
        }

        let Some(category) = current_category.as_ref() else {
            tracing::debug!("skipping table before first heading");
            continue;
        };

        let mut items = Vec::new();
        // First row is the header.
        for row in element.select(&row_sel).skip(1) {
            let cells: Vec<ElementRef<'_>> = row.select(&cell_sel).collect();
            if cells.len() < 3 {
                continue;
            }
            let col1 = stripped_text(cells[0]);
            let col2 = stripped_text(cells[1]);
            let col3 = stripped_text(cells[2]);
            if col1.is_empty() || col3.is_empty() {
                continue;
            }
            items.push(normalize_entry(&col1, &col2, &col3));
        }

        if items.is_empty() {
            tracing::debug!(category = %category, "table has no vocabulary rows");
            continue;
        }
        tracing::debug!(category = %category, items = items.len(), "extracted table");
        sections.push(VocabSection {
            category: category.clone(),
            items,
        });
    }

    Ok(sections)
}

/// Parse a full page and extract its sections. `Ok(None)` when the page has no content root.
pub fn parse_level_page(html: &str) -> Result<Option<Vec<VocabSection>>, ScraperError> {
    let doc = Html::parse_document(html);
    match find_content_root(&doc)? {
        Some(root) => extract_sections(root).map(Some),
        None => Ok(None),
    }
}
