use proxy_list_sync::engine::{SyncOrchestrator, SyncOutcome};
use proxy_list_sync::network::errors::NetworkError;
use proxy_list_sync::persistence::{ProxyBatch, ProxyRecord, ProxyStore, StoreFuture};
use std::sync::{Arc, Mutex};

// * Fake remote store recording every call in order
#[derive(Default)]
struct FakeStore {
    delete_status: u16,
    calls: Mutex<Vec<String>>,
    inserted: Mutex<Vec<ProxyBatch>>,
}

impl FakeStore {
    fn answering(delete_status: u16) -> Self {
        Self {
            delete_status,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ProxyStore for FakeStore {
    fn delete_all(&self) -> StoreFuture<'_> {
        self.calls.lock().unwrap().push("delete".to_string());
        let status = self.delete_status;
        Box::pin(async move {
            if status == 204 {
                Ok(())
            } else {
                Err(NetworkError::UnexpectedStatus {
                    expected: 204,
                    actual: status,
                })
            }
        })
    }

    fn insert_batch<'a>(&'a self, batch: &'a ProxyBatch) -> StoreFuture<'a> {
        self.calls.lock().unwrap().push("insert".to_string());
        self.inserted.lock().unwrap().push(batch.clone());
        Box::pin(async { Ok(()) })
    }
}

fn records(n: usize) -> Vec<ProxyRecord> {
    (0..n)
        .map(|i| ProxyRecord {
            ip: format!("10.0.0.{}", i),
            port: 8080,
            ..ProxyRecord::default()
        })
        .collect()
}

#[tokio::test]
async fn test_insert_follows_successful_delete() {
    let store = Arc::new(FakeStore::answering(204));
    let orchestrator = SyncOrchestrator::new(store.clone());

    let outcome = orchestrator.replace_all(records(3)).await;

    assert_eq!(outcome, SyncOutcome::Replaced { inserted: 3 });
    assert_eq!(store.calls(), vec!["delete", "insert"]);
    assert_eq!(store.inserted.lock().unwrap()[0].len(), 3);
}

#[tokio::test]
async fn test_failed_delete_never_inserts() {
    for status in [200, 404, 500] {
        let store = Arc::new(FakeStore::answering(status));
        let orchestrator = SyncOrchestrator::new(store.clone());

        let outcome = orchestrator.replace_all(records(2)).await;

        assert!(matches!(outcome, SyncOutcome::DeleteFailed { .. }));
        assert_eq!(store.calls(), vec!["delete"]);
        assert!(store.inserted.lock().unwrap().is_empty());
    }
}
