// * Proxy record schema and the batch wire shape sent to the remote store

use serde::{Deserialize, Serialize};
use std::fmt;

/// One proxy entry parsed from the source table
///
/// Every field is either a validated value or its zero value (`""`, `0`, `false`).
/// A rejected cell and an empty cell are indistinguishable once stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRecord {
    pub ip: String,
    pub port: u16,
    pub code: String,
    pub country: String,
    pub anonymity: String,
    pub google: bool,
    pub https: bool,
    pub last_checked: String,
}

impl ProxyRecord {
    /// True when no column was accepted for this row
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// * Fixed-width layout used when tracing parsed rows
impl fmt::Display for ProxyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<15} |  {:<5} | {:<2} | {:<20} | {:<10} | {} | {} | {}",
            self.ip,
            self.port,
            self.code,
            self.country,
            self.anonymity,
            self.google,
            self.https,
            self.last_checked
        )
    }
}

/// Wire wrapper: `{"batch": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyBatch {
    pub batch: Vec<ProxyRecord>,
}

impl ProxyBatch {
    pub fn new(records: Vec<ProxyRecord>) -> Self {
        Self { batch: records }
    }

    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }
}

impl From<Vec<ProxyRecord>> for ProxyBatch {
    fn from(records: Vec<ProxyRecord>) -> Self {
        Self::new(records)
    }
}
