use crate::config::constants::USER_AGENT;
use crate::network::errors::NetworkError;
use crate::ops::telemetry;
use futures::future::BoxFuture;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

pub type PageFuture<'a> = BoxFuture<'a, Result<Vec<u8>, NetworkError>>;

// * Capability: "fetch bytes from the source URL".
pub trait PageSource: Send + Sync {
    fn fetch_page(&self) -> PageFuture<'_>;
}

// * Builds the shared reqwest client used for page fetches and store calls.
pub fn http_client(timeout: Duration) -> Result<Client, NetworkError> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

// * The HTTP engine that retrieves the proxy list page.
pub struct PageClient {
    inner: Client,
    url: Url,
}

impl PageClient {
    // * @param url - Page to fetch on every cycle
    pub fn new(url: &str, timeout: Duration) -> Result<Self, NetworkError> {
        let url = Url::parse(url).map_err(|_| NetworkError::InvalidUrl(url.to_string()))?;
        Ok(Self {
            inner: http_client(timeout)?,
            url,
        })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    // * Fetches the page. Any non-2xx status is a transport failure.
    pub async fn fetch(&self) -> Result<Vec<u8>, NetworkError> {
        info!(url = %self.url, "Fetching proxy list page");
        let started = Instant::now();

        let resp = self.inner.get(self.url.clone()).send().await?;
        let status = resp.status();
        debug!(status = %status, "Page response status");

        if !status.is_success() {
            return Err(NetworkError::HttpStatus(status.as_u16(), self.url.to_string()));
        }

        let body = resp.bytes().await?;
        telemetry::record_fetch_duration(started.elapsed().as_secs_f64());
        debug!(bytes = body.len(), "Retrieved proxy list page");

        Ok(body.to_vec())
    }
}

impl PageSource for PageClient {
    fn fetch_page(&self) -> PageFuture<'_> {
        Box::pin(self.fetch())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_rejects_invalid_url() {
        let result = PageClient::new("not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(NetworkError::InvalidUrl(_))));
    }

    #[test]
    fn test_client_keeps_url() {
        let client = PageClient::new("https://free-proxy-list.net/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url(), "https://free-proxy-list.net/");
    }
}
