//! Async HTTP client for a running controller
//!
//! `get` inherits the server's long-poll behaviour: it does not return until
//! the key has been set. The underlying client has no request timeout, so
//! wrap the call in `tokio::time::timeout` if the caller needs a deadline.

use crate::common::{encode_key, Error, Result};
use crate::controller::Entries;
use reqwest::{Client, Response};

/// Default controller URL
pub const DEFAULT_URL: &str = "http://localhost:6001";

#[derive(Debug, Clone)]
pub struct ControllerClient {
    base_url: String,
    client: Client,
}

impl ControllerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn key_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, encode_key(key))
    }

    /// Fetch every entry (GET /)
    pub async fn list(&self) -> Result<Entries> {
        let response = self.client.get(format!("{}/", self.base_url)).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Wait for `key` and return its value (GET /{key})
    pub async fn get(&self, key: &str) -> Result<String> {
        let response = self.client.get(self.key_url(key)).send().await?;
        let response = check_status(response).await?;
        Ok(response.text().await?)
    }

    /// Overwrite `key` with `value` (POST /{key}); returns the echoed body
    pub async fn set(&self, key: &str, value: impl Into<String>) -> Result<String> {
        let response = self
            .client
            .post(self.key_url(key))
            .body(value.into())
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.text().await?)
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::UnexpectedStatus {
        status: status.as_u16(),
        body,
    })
}
