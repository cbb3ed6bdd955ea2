//! Genome browser widget seam.
//!
//! In a page this is igv.js (`igv.createBrowser` / `browser.loadTrack`).
//! [`SessionWidget`] is a headless implementation that records the
//! configuration and every registered track so the result can be written
//! out as an igv session document.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::Result;

/// A constructed browser instance.
#[async_trait]
pub trait BrowserHandle: Send + Sync {
    /// Register a single track descriptor.
    async fn load_track(&self, track: Value) -> Result<()>;
}

/// Factory for browser instances.
#[async_trait]
pub trait GenomeWidget: Send + Sync {
    /// Build a browser mounted at `mount` from an opaque configuration.
    async fn create_browser(&self, mount: &str, config: Value) -> Result<Arc<dyn BrowserHandle>>;
}

/// Headless browser holding its configuration and loaded tracks.
#[derive(Debug)]
pub struct SessionBrowser {
    mount: String,
    config: Value,
    tracks: Mutex<Vec<Value>>,
}

impl SessionBrowser {
    pub fn new(mount: impl Into<String>, config: Value) -> Self {
        Self {
            mount: mount.into(),
            config,
            tracks: Mutex::new(Vec::new()),
        }
    }

    pub fn mount(&self) -> &str {
        &self.mount
    }

    /// Tracks registered so far, in registration order.
    pub async fn tracks(&self) -> Vec<Value> {
        self.tracks.lock().await.clone()
    }

    /// The initial configuration with the registered tracks appended to its
    /// `tracks` list.
    pub async fn session(&self) -> Value {
        let loaded = self.tracks.lock().await.clone();
        match &self.config {
            Value::Object(map) => {
                let mut session = map.clone();
                let mut tracks = match session.remove("tracks") {
                    Some(Value::Array(existing)) => existing,
                    _ => Vec::new(),
                };
                tracks.extend(loaded);
                session.insert("tracks".to_string(), Value::Array(tracks));
                Value::Object(session)
            }
            other => json!({ "config": other, "tracks": loaded }),
        }
    }
}

#[async_trait]
impl BrowserHandle for SessionBrowser {
    async fn load_track(&self, track: Value) -> Result<()> {
        self.tracks.lock().await.push(track);
        Ok(())
    }
}

/// Widget producing [`SessionBrowser`]s; keeps the most recent one.
#[derive(Debug, Default)]
pub struct SessionWidget {
    last: Mutex<Option<Arc<SessionBrowser>>>,
}

impl SessionWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn browser(&self) -> Option<Arc<SessionBrowser>> {
        self.last.lock().await.clone()
    }
}

#[async_trait]
impl GenomeWidget for SessionWidget {
    async fn create_browser(&self, mount: &str, config: Value) -> Result<Arc<dyn BrowserHandle>> {
        let browser = Arc::new(SessionBrowser::new(mount, config));
        *self.last.lock().await = Some(Arc::clone(&browser));
        let handle: Arc<dyn BrowserHandle> = browser;
        Ok(handle)
    }
}
