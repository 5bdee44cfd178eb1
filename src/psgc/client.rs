//! Upstream PSGC API access.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::config::PsgcConfig;
use crate::error::{HrisError, HrisResult};

/// Something that can fetch a PSGC resource by path.
///
/// The service talks to the public API through [`HttpPsgcSource`]; tests
/// substitute an in-memory source.
#[async_trait]
pub trait PsgcSource: Send + Sync {
    /// Fetches the JSON document at `path` (e.g. `regions.json`).
    async fn fetch(&self, path: &str) -> HrisResult<JsonValue>;
}

/// [`PsgcSource`] backed by the public PSGC REST API.
#[derive(Debug, Clone)]
pub struct HttpPsgcSource {
    client: Client,
    base_url: String,
}

impl HttpPsgcSource {
    /// Builds a client with the configured base URL and timeout.
    pub fn new(config: &PsgcConfig) -> HrisResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("hris/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HrisError::Upstream {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl PsgcSource for HttpPsgcSource {
    async fn fetch(&self, path: &str) -> HrisResult<JsonValue> {
        let url = self.url_for(path);
        debug!(url = %url, "Fetching PSGC resource");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| HrisError::Upstream {
                message: format!("request to {url} failed: {e}"),
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(HrisError::not_found("PSGC resource", path)),
            status if !status.is_success() => {
                return Err(HrisError::Upstream {
                    message: format!("{url} returned {status}"),
                });
            }
            _ => {}
        }

        response
            .json::<JsonValue>()
            .await
            .map_err(|e| HrisError::Upstream {
                message: format!("invalid JSON from {url}: {e}"),
            })
    }
}
