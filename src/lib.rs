// * Proxy list sync: scrape the free proxy table, validate each row, replace the remote store.

pub mod config;
pub mod engine;
pub mod network;
pub mod ops;
pub mod persistence;
pub mod refinery;
