// src/table/parse.rs
use std::{fs, path::Path};

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};

use super::Table;
use crate::error::{ParseError, PipelineError, Result};

/// Column holding the show title in the ranked-list layout. Its cells often
/// wrap the title and year over several lines.
pub const SECONDARY_COLUMN_INDEX: usize = 1;

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("selector should parse"));
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("selector should parse"));
static HEADER_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("th").expect("selector should parse"));
static DATA_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("selector should parse"));

/// Parse the first `<table>` in `markup`.
///
/// The first row supplies the header (its `<th>` cells); every later row
/// contributes its `<td>` cells. Cell text is trimmed, and newlines in the
/// cell at [`SECONDARY_COLUMN_INDEX`] become spaces.
pub fn parse_table(markup: &str) -> std::result::Result<Table, ParseError> {
    let doc = Html::parse_fragment(markup);
    let table = doc.select(&TABLE).next().ok_or(ParseError::NoTable)?;

    let mut rows = table.select(&ROW);
    let headers: Vec<String> = rows
        .next()
        .map(|tr| tr.select(&HEADER_CELL).map(cell_text).collect())
        .unwrap_or_default();
    if headers.is_empty() {
        return Err(ParseError::NoHeaderCells);
    }
    let dupes = duplicate_headers(&headers);
    if !dupes.is_empty() {
        warn!(?dupes, "duplicate header labels; column rules will match each copy");
    }

    let rows: Vec<Vec<String>> = rows
        .map(|tr| {
            let mut cells: Vec<String> = tr.select(&DATA_CELL).map(cell_text).collect();
            collapse_secondary(&mut cells);
            cells
        })
        .collect();

    let ragged = rows.iter().filter(|r| r.len() != headers.len()).count();
    if ragged > 0 {
        warn!(ragged, width = headers.len(), "rows not matching header width");
    }
    Ok(Table::new(headers, rows))
}

/// Parse the snapshot at `path`, deleting it only if parsing succeeds.
#[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn parse_markup_file(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let markup = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    let table = parse_table(&markup)?;

    fs::remove_file(path).map_err(|e| PipelineError::io(path, e))?;
    debug!("markup snapshot removed");
    if table.is_empty() {
        warn!("table has a header but no data rows");
    }
    info!(columns = table.width(), rows = table.len(), "table parsed");
    Ok(table)
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Labels that appear more than once, in first-seen order.
fn duplicate_headers(headers: &[String]) -> Vec<&str> {
    let mut dupes: Vec<&str> = Vec::new();
    for (i, h) in headers.iter().enumerate() {
        if headers[..i].contains(h) && !dupes.contains(&h.as_str()) {
            dupes.push(h);
        }
    }
    dupes
}

fn collapse_secondary(cells: &mut [String]) {
    if let Some(cell) = cells.get_mut(SECONDARY_COLUMN_INDEX) {
        if cell.contains('\n') {
            *cell = cell.replace('\n', " ");
        }
    }
}
