//! In-process test doubles for the source and widget seams.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use crate::error::{LoaderError, Result};
use crate::source::TrackSource;
use crate::widget::{BrowserHandle, GenomeWidget};

#[derive(Debug, Clone)]
pub enum MockResponse {
    Json(Value),
    Fail(u16),
    InvalidJson,
}

/// Canned responses keyed by path; records every requested path.
#[derive(Debug)]
pub struct MockSource {
    responses: HashMap<String, MockResponse>,
    gated: HashSet<String>,
    gate: Arc<Semaphore>,
    requests: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            gated: HashSet::new(),
            gate: Arc::new(Semaphore::new(0)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, path: &str, response: MockResponse) -> Self {
        self.responses.insert(path.to_string(), response);
        self
    }

    /// Requests to `path` wait for a permit on [`MockSource::gate`].
    pub fn gated(mut self, path: &str) -> Self {
        self.gated.insert(path.to_string());
        self
    }

    pub fn gate(&self) -> Arc<Semaphore> {
        Arc::clone(&self.gate)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrackSource for MockSource {
    async fn get_json(&self, path: &str) -> Result<Value> {
        self.requests.lock().unwrap().push(path.to_string());

        if self.gated.contains(path) {
            self.gate.acquire().await.unwrap().forget();
        }

        match self.responses.get(path) {
            Some(MockResponse::Json(value)) => Ok(value.clone()),
            Some(MockResponse::Fail(status)) => Err(LoaderError::Status {
                path: path.to_string(),
                status: *status,
            }),
            Some(MockResponse::InvalidJson) => Err(LoaderError::InvalidJson {
                path: path.to_string(),
                source: serde_json::from_str::<Value>("{not json").unwrap_err(),
            }),
            None => Err(LoaderError::Status {
                path: path.to_string(),
                status: 404,
            }),
        }
    }
}

/// Browser handle recording accepted tracks; optionally refuses one call.
#[derive(Debug, Default)]
pub struct RecordingHandle {
    refuse_call: Option<usize>,
    calls: Mutex<usize>,
    loaded: Mutex<Vec<Value>>,
}

impl RecordingHandle {
    pub fn loaded(&self) -> Vec<Value> {
        self.loaded.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserHandle for RecordingHandle {
    async fn load_track(&self, track: Value) -> Result<()> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls - 1
        };
        // Give concurrent registrations a chance to run between tracks.
        tokio::task::yield_now().await;
        if self.refuse_call == Some(call) {
            return Err(LoaderError::Widget(format!("refused track {}", call)));
        }
        self.loaded.lock().unwrap().push(track);
        Ok(())
    }
}

#[derive(Debug)]
pub struct MockWidget {
    fail: bool,
    handle: Arc<RecordingHandle>,
    created: Mutex<Vec<(String, Value)>>,
}

impl MockWidget {
    pub fn new() -> Self {
        Self {
            fail: false,
            handle: Arc::new(RecordingHandle::default()),
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::new() }
    }

    /// Refuses the `call`-th (0-based) track registration.
    pub fn refusing(call: usize) -> Self {
        Self {
            handle: Arc::new(RecordingHandle {
                refuse_call: Some(call),
                ..Default::default()
            }),
            ..Self::new()
        }
    }

    pub fn handle(&self) -> Arc<RecordingHandle> {
        Arc::clone(&self.handle)
    }

    pub fn created(&self) -> Vec<(String, Value)> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenomeWidget for MockWidget {
    async fn create_browser(&self, mount: &str, config: Value) -> Result<Arc<dyn BrowserHandle>> {
        if self.fail {
            return Err(LoaderError::Widget("container element not found".to_string()));
        }
        self.created.lock().unwrap().push((mount.to_string(), config));
        Ok(self.handle.clone() as Arc<dyn BrowserHandle>)
    }
}
