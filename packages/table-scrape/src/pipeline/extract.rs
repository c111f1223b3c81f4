//! Table extraction from a fetched document.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::error::{ConfigError, Result, ScrapeError};
use crate::types::record::Record;

/// Parse `document`, locate the first element matching `selector` and turn
/// each of its data rows into a [`Record`].
///
/// A row is a `tr` anywhere below the matched element. Rows without any
/// `td` are headers or decoration and are skipped. Cells map positionally
/// onto `field_names`.
///
/// # Errors
///
/// - [`ScrapeError::Configuration`] if `selector` is not valid CSS
/// - [`ScrapeError::StructureNotFound`] if nothing matches `selector`
/// - [`ScrapeError::EmptyExtraction`] if the match has no data rows
pub fn extract(document: &[u8], selector: &str, field_names: &[String]) -> Result<Vec<Record>> {
    let table_selector = parse_selector(selector)?;
    let row_selector = parse_selector("tr")?;
    let cell_selector = parse_selector("td")?;

    let html = Html::parse_document(&String::from_utf8_lossy(document));

    let table = html
        .select(&table_selector)
        .next()
        .ok_or_else(|| ScrapeError::StructureNotFound {
            selector: selector.to_string(),
        })?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in table.select(&row_selector) {
        let cells: Vec<String> = row.select(&cell_selector).map(cell_text).collect();
        if cells.is_empty() {
            skipped += 1;
            continue;
        }
        records.push(Record::from_cells(field_names, cells));
    }

    debug!(selector = %selector, rows = records.len(), skipped, "Table rows scanned");

    if records.is_empty() {
        return Err(ScrapeError::EmptyExtraction {
            selector: selector.to_string(),
        });
    }

    info!(selector = %selector, records = records.len(), "Records extracted");
    Ok(records)
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| {
        ScrapeError::Configuration(ConfigError::InvalidSelector {
            selector: selector.to_string(),
            reason: e.to_string(),
        })
    })
}

/// Text of a cell: every text node trimmed, then joined without separator.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().map(str::trim).collect()
}
