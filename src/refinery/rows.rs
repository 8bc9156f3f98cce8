// * Row Classifier
// * Turns one `<tr>` into a `ProxyRecord`, assigning cells to fields by position.
// *
// * The position counter advances for EVERY child node of the row (text, comments,
// * elements), and only `<td>` children are inspected. An extra node ahead of a cell
// * shifts every following column. This mirrors the fixed layout of the source page.

use scraper::ElementRef;
use tracing::{debug, trace};

use crate::ops::telemetry;
use crate::persistence::schema::ProxyRecord;
use crate::refinery::validators;

/// Target field of one table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Ip,
    Port,
    CountryCode,
    CountryName,
    Anonymity,
    Google,
    Https,
    LastChecked,
}

// * Position -> field. The single place where the page layout is encoded.
pub const COLUMN_LAYOUT: [Column; 8] = [
    Column::Ip,
    Column::Port,
    Column::CountryCode,
    Column::CountryName,
    Column::Anonymity,
    Column::Google,
    Column::Https,
    Column::LastChecked,
];

impl Column {
    pub fn at(position: usize) -> Option<Column> {
        COLUMN_LAYOUT.get(position).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Ip => "ip",
            Column::Port => "port",
            Column::CountryCode => "code",
            Column::CountryName => "country",
            Column::Anonymity => "anonymity",
            Column::Google => "google",
            Column::Https => "https",
            Column::LastChecked => "last_checked",
        }
    }

    /// Validates `text` for this column and stores it on acceptance.
    /// Returns false on a validation miss, leaving the field untouched.
    pub fn apply(&self, record: &mut ProxyRecord, text: &str) -> bool {
        match self {
            Column::Ip if validators::is_ip(text) => record.ip = text.to_string(),
            Column::Port => match validators::parse_port(text) {
                Some(port) => record.port = port,
                None => return false,
            },
            Column::CountryCode if validators::is_country_code(text) => {
                record.code = text.to_string()
            }
            Column::CountryName if validators::is_country_name(text) => {
                record.country = text.to_string()
            }
            Column::Anonymity if validators::is_anonymity(text) => {
                record.anonymity = text.to_string()
            }
            Column::Google => match validators::parse_flag(text) {
                Some(flag) => record.google = flag,
                None => return false,
            },
            Column::Https => match validators::parse_flag(text) {
                Some(flag) => record.https = flag,
                None => return false,
            },
            Column::LastChecked if validators::is_last_checked(text) => {
                record.last_checked = text.to_string()
            }
            _ => return false,
        }
        true
    }
}

/// Record built from one row plus the columns whose cell was rejected
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedRow {
    pub record: ProxyRecord,
    pub rejected: Vec<Column>,
}

// * Concatenation of all descendant text nodes, document order, no separators.
pub fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect()
}

pub fn classify_row(row: &ElementRef) -> ClassifiedRow {
    let mut classified = ClassifiedRow::default();

    for (position, child) in row.children().enumerate() {
        let Some(cell) = ElementRef::wrap(child) else {
            continue;
        };
        if cell.value().name() != "td" {
            continue;
        }
        // * Cells past the known layout are ignored
        let Some(column) = Column::at(position) else {
            continue;
        };

        let text = cell_text(&cell);
        if !column.apply(&mut classified.record, &text) {
            debug!(field = column.as_str(), text = %text, "Cell rejected by validator");
            telemetry::record_validation_miss(column.as_str());
            classified.rejected.push(column);
        }
    }

    trace!(record = %classified.record, "Parsed row");
    classified
}
