// * The Refinery (Extraction Pipeline)
// * raw bytes -> parsed document -> proxy table -> typed records
// * Validation misses never escape this module; they only degrade individual fields.

pub mod locator;
pub mod rows;
pub mod tables;
pub mod validators;

// * Re-exports for convenient access
pub use locator::TableLocator;
pub use rows::{cell_text, classify_row, ClassifiedRow, Column, COLUMN_LAYOUT};
pub use tables::{extract_table, TableExtraction};

use scraper::Html;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Document is empty, nothing to parse")]
    EmptyDocument,

    #[error("Table with id '{id}' not found in page")]
    TableNotFound { id: String },
}

/// Decodes and parses raw page bytes.
///
/// The HTML parser recovers from any malformed markup, so the only unparseable
/// input is a page without content. Invalid UTF-8 is replaced, not rejected.
pub fn parse_page(bytes: &[u8]) -> Result<Html, ExtractError> {
    let text = String::from_utf8_lossy(bytes);
    if text.trim().is_empty() {
        return Err(ExtractError::EmptyDocument);
    }
    Ok(Html::parse_document(&text))
}

/// Runs the whole pipeline on one fetched page.
///
/// The parsed document stays inside this call, so callers only ever hold owned records.
pub fn extract_proxies(bytes: &[u8], locator: &TableLocator) -> Result<TableExtraction, ExtractError> {
    info!("Finding proxies table node");
    let document = parse_page(bytes)?;

    let table = locator
        .locate(&document)
        .ok_or_else(|| ExtractError::TableNotFound {
            id: locator.table_id().to_string(),
        })?;

    Ok(extract_table(&table))
}
