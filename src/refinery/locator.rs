// * Table Locator
// * Depth-first, pre-order search for the first `<table>` carrying a given `id`.
// * The search stops at the first match; a missing table is an explicit `None`.

use scraper::{ElementRef, Html};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct TableLocator {
    table_id: String,
}

impl TableLocator {
    pub fn new(table_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
        }
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    fn is_target(&self, element: &ElementRef) -> bool {
        let value = element.value();
        value.name() == "table" && value.attr("id") == Some(self.table_id.as_str())
    }

    /// Returns the matching table, or `None` when the document has none.
    pub fn locate<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        // * `descendants()` walks the tree in document (pre-order) order and is lazy,
        // * so `find` short-circuits at the first hit
        let found = document
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|element| self.is_target(element));

        match found {
            Some(_) => debug!(id = %self.table_id, "Found proxy table node"),
            None => debug!(id = %self.table_id, "Proxy table node not found"),
        }

        found
    }
}
