// * Sync Orchestrator
// * Destructive full replace: delete everything, then insert the fresh batch.
// *
// * The insert only runs after a successful delete, so a failing delete never leaves
// * duplicates behind. Delete + insert is not atomic: between the two calls (or after
// * a failed insert) the store is empty until the next successful cycle.

use std::sync::Arc;
use tracing::{error, info};

use crate::persistence::schema::{ProxyBatch, ProxyRecord};
use crate::persistence::store::ProxyStore;

/// Result of one replace attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Store now holds exactly the new batch
    Replaced { inserted: usize },
    /// Delete rejected; nothing was inserted and the batch is dropped
    DeleteFailed { reason: String },
    /// Delete succeeded but the insert did not; the store is empty
    InsertFailed { reason: String },
}

impl SyncOutcome {
    pub fn is_replaced(&self) -> bool {
        matches!(self, SyncOutcome::Replaced { .. })
    }

    // * Metric label
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOutcome::Replaced { .. } => "synced",
            SyncOutcome::DeleteFailed { .. } => "delete_failed",
            SyncOutcome::InsertFailed { .. } => "insert_failed",
        }
    }
}

pub struct SyncOrchestrator {
    store: Arc<dyn ProxyStore>,
}

impl SyncOrchestrator {
    pub fn new(store: Arc<dyn ProxyStore>) -> Self {
        Self { store }
    }

    pub async fn replace_all(&self, records: Vec<ProxyRecord>) -> SyncOutcome {
        if let Err(e) = self.store.delete_all().await {
            error!(error = %e, "Could not clean up. Halting all inserts until DELETE is fixed");
            return SyncOutcome::DeleteFailed {
                reason: e.to_string(),
            };
        }

        let batch = ProxyBatch::new(records);
        let inserted = batch.len();

        match self.store.insert_batch(&batch).await {
            Ok(()) => {
                info!(inserted, "Proxy store replaced");
                SyncOutcome::Replaced { inserted }
            }
            Err(e) => {
                error!(error = %e, "Failed to save batch of proxies, store left empty");
                SyncOutcome::InsertFailed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
