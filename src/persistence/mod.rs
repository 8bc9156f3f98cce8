// * Persistence: record schema, remote store capability and local page snapshots

pub mod schema;
pub mod snapshot;
pub mod store;

// * Re-exports for convenient access
pub use schema::{ProxyBatch, ProxyRecord};
pub use snapshot::PageSnapshot;
pub use store::{InMemoryProxyStore, ProxyStore, RestProxyStore, StoreFuture};
