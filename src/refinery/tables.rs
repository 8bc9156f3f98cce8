// * Table Extractor
// * Maps the direct `<tr>` children of the table's first `<tbody>` to records, in order.

use scraper::ElementRef;
use tracing::{info, warn};

use crate::persistence::schema::ProxyRecord;
use crate::refinery::rows::classify_row;

/// Records pulled out of the proxy table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableExtraction {
    pub records: Vec<ProxyRecord>,
    /// False when the table had no `<tbody>`; `records` is then empty
    pub body_found: bool,
    /// Total cells rejected by validators across all rows
    pub validation_misses: usize,
}

impl TableExtraction {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// * Direct element children with the given tag, document order
fn child_elements<'a>(
    parent: &ElementRef<'a>,
    tag: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == tag)
}

pub fn extract_table(table: &ElementRef) -> TableExtraction {
    let Some(body) = child_elements(table, "tbody").next() else {
        warn!("Table body not found, page structure might have changed");
        return TableExtraction::default();
    };

    let mut extraction = TableExtraction {
        body_found: true,
        ..TableExtraction::default()
    };

    for row in child_elements(&body, "tr") {
        let classified = classify_row(&row);
        extraction.validation_misses += classified.rejected.len();
        extraction.records.push(classified.record);
    }

    info!(
        records = extraction.records.len(),
        validation_misses = extraction.validation_misses,
        "Extracted proxies from table body"
    );
    extraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn extract(html: &str) -> TableExtraction {
        let document = Html::parse_document(html);
        let selector = Selector::parse("table").unwrap();
        let table = document.select(&selector).next().unwrap();
        extract_table(&table)
    }

    #[test]
    fn test_empty_body_yields_no_records() {
        let extraction = extract("<table><tbody></tbody></table>");
        assert!(extraction.body_found);
        assert!(extraction.is_empty());
    }

    #[test]
    fn test_missing_body_is_flagged() {
        // * A table with only a caption never gets an implied tbody
        let extraction = extract("<table><caption>Proxies</caption></table>");
        assert!(!extraction.body_found);
        assert!(extraction.is_empty());
    }

    #[test]
    fn test_rows_kept_in_order() {
        let html = "<table><tbody>\
            <tr><td>1.1.1.1</td><td>80</td></tr>\
            <tr><td>2.2.2.2</td><td>3128</td></tr>\
            <tr><td>bogus</td><td>8080</td></tr>\
            </tbody></table>";
        let extraction = extract(html);

        assert_eq!(extraction.len(), 3);
        assert_eq!(extraction.records[0].ip, "1.1.1.1");
        assert_eq!(extraction.records[1].port, 3128);
        // * Invalid rows are kept with zero-valued fields
        assert_eq!(extraction.records[2].ip, "");
        assert_eq!(extraction.records[2].port, 8080);
        assert_eq!(extraction.validation_misses, 1);
    }

    #[test]
    fn test_only_first_body_used() {
        let html = "<table>\
            <tbody><tr><td>1.1.1.1</td></tr></tbody>\
            <tbody><tr><td>2.2.2.2</td></tr></tbody>\
            </table>";
        let extraction = extract(html);
        assert_eq!(extraction.len(), 1);
        assert_eq!(extraction.records[0].ip, "1.1.1.1");
    }

    #[test]
    fn test_header_rows_outside_body_ignored() {
        let html = "<table>\
            <thead><tr><th>IP Address</th><th>Port</th></tr></thead>\
            <tbody><tr><td>3.3.3.3</td><td>8000</td></tr></tbody>\
            </table>";
        let extraction = extract(html);
        assert_eq!(extraction.len(), 1);
        assert_eq!(extraction.records[0].ip, "3.3.3.3");
    }
}
