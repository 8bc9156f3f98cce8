// * Remote proxy store capability
// * Two opaque operations: delete everything, then insert a batch.

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::network::client::http_client;
use crate::network::errors::NetworkError;
use crate::ops::telemetry;
use crate::persistence::schema::{ProxyBatch, ProxyRecord};

pub type StoreFuture<'a> = BoxFuture<'a, Result<(), NetworkError>>;

/// Destructive full-replace interface of the remote store
pub trait ProxyStore: Send + Sync {
    /// Removes every stored record. Only a "no content" answer counts as success.
    fn delete_all(&self) -> StoreFuture<'_>;

    /// Inserts the batch. The response body is never inspected for success.
    fn insert_batch<'a>(&'a self, batch: &'a ProxyBatch) -> StoreFuture<'a>;
}

/// REST implementation: `DELETE <collection>` and `POST <collection>/batch`
pub struct RestProxyStore {
    client: Client,
    delete_url: Url,
    insert_url: Url,
}

impl RestProxyStore {
    pub fn new(delete_url: &str, insert_url: &str, timeout: Duration) -> Result<Self, NetworkError> {
        Ok(Self {
            client: http_client(timeout)?,
            delete_url: parse_url(delete_url)?,
            insert_url: parse_url(insert_url)?,
        })
    }

    pub async fn delete(&self) -> Result<(), NetworkError> {
        info!(url = %self.delete_url, "Deleting all stored proxies");

        let resp = match self.client.delete(self.delete_url.clone()).send().await {
            Ok(resp) => resp,
            Err(e) => {
                telemetry::record_store_request("delete", "error");
                return Err(e.into());
            }
        };

        let status = resp.status();
        debug!(status = %status, "Delete response status");

        if status != StatusCode::NO_CONTENT {
            telemetry::record_store_request("delete", "unexpected_status");
            return Err(NetworkError::UnexpectedStatus {
                expected: StatusCode::NO_CONTENT.as_u16(),
                actual: status.as_u16(),
            });
        }

        telemetry::record_store_request("delete", "success");
        Ok(())
    }

    pub async fn insert(&self, batch: &ProxyBatch) -> Result<(), NetworkError> {
        info!(url = %self.insert_url, records = batch.len(), "Saving batch of proxies");

        // * `.json()` sets `Content-Type: application/json`
        let resp = match self
            .client
            .post(self.insert_url.clone())
            .json(batch)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                telemetry::record_store_request("insert", "error");
                return Err(e.into());
            }
        };

        let status = resp.status();
        debug!(status = %status, "Insert response status");

        if !status.is_success() {
            telemetry::record_store_request("insert", "unexpected_status");
            return Err(NetworkError::HttpStatus(status.as_u16(), self.insert_url.to_string()));
        }

        // * Body is diagnostic only
        match resp.text().await {
            Ok(body) => debug!(body = %body, "Insert response body"),
            Err(e) => debug!(error = %e, "Failed to read insert response body"),
        }

        telemetry::record_store_request("insert", "success");
        Ok(())
    }
}

impl ProxyStore for RestProxyStore {
    fn delete_all(&self) -> StoreFuture<'_> {
        Box::pin(self.delete())
    }

    fn insert_batch<'a>(&'a self, batch: &'a ProxyBatch) -> StoreFuture<'a> {
        Box::pin(self.insert(batch))
    }
}

fn parse_url(url: &str) -> Result<Url, NetworkError> {
    Url::parse(url).map_err(|_| NetworkError::InvalidUrl(url.to_string()))
}

/// In-memory store for testing and local dry runs
#[derive(Debug, Default)]
pub struct InMemoryProxyStore {
    records: RwLock<Vec<ProxyRecord>>,
    fail_deletes: AtomicBool,
    fail_inserts: AtomicBool,
    delete_calls: AtomicUsize,
    insert_calls: AtomicUsize,
}

impl InMemoryProxyStore {
    pub fn new() -> Self {
        Self::default()
    }

    // * Simulates a store answering something other than 204 to DELETE
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::Relaxed);
    }

    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::Relaxed);
    }

    pub fn records(&self) -> Vec<ProxyRecord> {
        self.records
            .read()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::Relaxed)
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::Relaxed)
    }
}

impl ProxyStore for InMemoryProxyStore {
    fn delete_all(&self) -> StoreFuture<'_> {
        Box::pin(async move {
            self.delete_calls.fetch_add(1, Ordering::Relaxed);
            if self.fail_deletes.load(Ordering::Relaxed) {
                return Err(NetworkError::UnexpectedStatus {
                    expected: 204,
                    actual: 500,
                });
            }
            if let Ok(mut records) = self.records.write() {
                records.clear();
            }
            Ok(())
        })
    }

    fn insert_batch<'a>(&'a self, batch: &'a ProxyBatch) -> StoreFuture<'a> {
        Box::pin(async move {
            self.insert_calls.fetch_add(1, Ordering::Relaxed);
            if self.fail_inserts.load(Ordering::Relaxed) {
                return Err(NetworkError::HttpStatus(500, "memory://proxies/batch".to_string()));
            }
            if let Ok(mut records) = self.records.write() {
                records.extend(batch.batch.iter().cloned());
            }
            Ok(())
        })
    }
}
