use crate::error::{FetchError, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Timeout for deck and card metadata endpoints
pub const JSON_TIMEOUT: Duration = Duration::from_secs(45);

/// Timeout for image downloads
pub const ASSET_TIMEOUT: Duration = Duration::from_secs(60);

/// Get standard user agent string
pub fn get_user_agent() -> &'static str {
    "ArcmageFetch"
}

/// Transport used by the fetchers. Every call is a single request with no retry.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    /// GET a JSON document and decode it.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T>;

    /// GET a binary asset.
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn send(&self, url: &str, accept: &str, timeout: Duration) -> Result<reqwest::Response> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .header("User-Agent", get_user_agent())
            .header("Accept", accept)
            .timeout(timeout)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response)
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetch for HttpFetcher {
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.send(url, "application/json", JSON_TIMEOUT).await?;
        response.json().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.send(url, "*/*", ASSET_TIMEOUT).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;
        Ok(bytes.to_vec())
    }
}
