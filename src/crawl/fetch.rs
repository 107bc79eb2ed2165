// src/crawl/fetch.rs
// =============================================================================
// This module downloads pages.
//
// The crawler only depends on the `Fetcher` trait, so tests can serve pages
// from memory. `HttpFetcher` is the real implementation:
// - plain GET over http://, TLS over https:// (rustls)
// - sends our User-Agent
// - every request is bounded by a timeout; a hung server costs one worker
//   at most that long
// - redirects are NOT followed, and nothing is retried
// - any non-2xx status is an error
//
// Bodies are decoded with the charset named in the Content-Type header
// (windows-1251, latin-1, ...), falling back to UTF-8. Bytes that are
// invalid in that encoding become U+FFFD, which the normalizer then drops.
// =============================================================================

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{redirect, Client};
use std::time::Duration;
use url::Url;

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Downloads `url` and returns the response body.
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// Fetches pages over HTTP(S) with reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    // Cheap to clone; the connection pool is shared
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher.
    ///
    /// Parameters:
    ///   user_agent: value of the User-Agent header
    ///   timeout: deadline for one whole request (connect + body)
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| anyhow!(describe_error(&e)))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP {}", response.status()));
        }

        // text() honours the declared charset
        response
            .text()
            .await
            .map_err(|e| anyhow!(describe_error(&e)))
    }
}

// Short human-readable reason for a failed request
fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds() {
        assert!(HttpFetcher::new("spider-search-test", Duration::from_secs(1)).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_error() {
        let fetcher = HttpFetcher::new("spider-search-test", Duration::from_secs(2)).unwrap();
        // Port 9 (discard) on localhost is closed on any sane test machine
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        assert!(fetcher.fetch(&url).await.is_err());
    }
}
