mod common;

use proxy_list_sync::network::errors::NetworkError;
use proxy_list_sync::persistence::{ProxyBatch, ProxyRecord, ProxyStore, RestProxyStore};
use std::time::Duration;

fn store_for(addr: std::net::SocketAddr) -> RestProxyStore {
    RestProxyStore::new(
        &format!("http://{}/proxies", addr),
        &format!("http://{}/proxies/batch", addr),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn sample_batch() -> ProxyBatch {
    ProxyBatch::new(vec![ProxyRecord {
        ip: "1.2.3.4".to_string(),
        port: 8080,
        code: "US".to_string(),
        country: "United States".to_string(),
        anonymity: "elite proxy".to_string(),
        google: true,
        https: false,
        last_checked: "5 minutes ago".to_string(),
    }])
}

#[tokio::test]
async fn test_delete_succeeds_only_on_no_content() {
    let (addr, log) = common::spawn_happy_server().await;
    let store = store_for(addr);

    store.delete_all().await.unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log[0].method, "DELETE");
    assert_eq!(log[0].path, "/proxies");
}

#[tokio::test]
async fn test_delete_with_ok_status_is_failure() {
    let (addr, _log) = common::spawn_server(|_| (200, "deleted".to_string())).await;
    let store = store_for(addr);

    match store.delete_all().await {
        Err(NetworkError::UnexpectedStatus { expected: 204, actual: 200 }) => {}
        other => panic!("Expected unexpected-status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_insert_posts_json_batch() {
    let (addr, log) = common::spawn_happy_server().await;
    let store = store_for(addr);
    let batch = sample_batch();

    store.insert_batch(&batch).await.unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log[0].method, "POST");
    assert_eq!(log[0].path, "/proxies/batch");
    assert_eq!(log[0].content_type.as_deref(), Some("application/json"));

    let sent: serde_json::Value = serde_json::from_slice(&log[0].body).unwrap();
    assert_eq!(sent["batch"][0]["ip"], "1.2.3.4");
    assert_eq!(sent["batch"][0]["port"], 8080);
    assert_eq!(sent["batch"][0]["google"], true);
    assert_eq!(sent["batch"][0]["last_checked"], "5 minutes ago");
}

#[tokio::test]
async fn test_insert_ignores_response_body() {
    let (addr, _log) = common::spawn_server(|_| (200, "not json at all".to_string())).await;
    let store = store_for(addr);

    assert!(store.insert_batch(&sample_batch()).await.is_ok());
}

#[tokio::test]
async fn test_insert_server_error_is_failure() {
    let (addr, _log) = common::spawn_server(|_| (500, "boom".to_string())).await;
    let store = store_for(addr);

    let err = store.insert_batch(&sample_batch()).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}
