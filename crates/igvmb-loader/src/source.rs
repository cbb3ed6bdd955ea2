//! Track server client.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{LoaderError, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where configuration and track descriptors come from.
#[async_trait]
pub trait TrackSource: Send + Sync {
    /// GET `path` (absolute, e.g. `/data/default`) and parse the body as JSON.
    async fn get_json(&self, path: &str) -> Result<Value>;
}

/// HTTP client bound to one track server origin.
///
/// Cookies set by the server are kept and sent back on later requests, so
/// requests carry same-origin credentials.
#[derive(Debug, Clone)]
pub struct HttpTrackSource {
    client: Client,
    base_url: String,
}

impl HttpTrackSource {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|e| LoaderError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(LoaderError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        let client = ClientBuilder::new()
            .timeout(timeout)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TrackSource for HttpTrackSource {
    #[instrument(skip(self))]
    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LoaderError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await?;
        debug!(bytes = body.len(), "Track server responded");

        serde_json::from_slice(&body).map_err(|source| LoaderError::InvalidJson {
            path: path.to_string(),
            source,
        })
    }
}
