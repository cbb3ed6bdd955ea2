//! Browser initialization and on-demand track loading.
//!
//! The browser handle lives inside the loader behind [`BrowserState`]; track
//! loading only ever sees it through [`TrackLoader::handle`], so a load issued
//! before initialization has finished is a typed
//! [`LoaderError::BrowserNotReady`].
//!
//! Policy for concurrent requests:
//!   - a load for a `(category, id)` already in flight is suppressed
//!     ([`LoadOutcome::Duplicate`]);
//!   - descriptors of one response are registered contiguously, in order;
//!     batches of different responses never interleave;
//!   - completion order across requests is arrival order.

use igvmb_common::category::DEFAULT_CONFIG_PATH;
use igvmb_common::TrackCategory;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

use crate::error::{json_kind, LoaderError, Result};
use crate::source::TrackSource;
use crate::widget::{BrowserHandle, GenomeWidget};

/// Lifecycle of the browser handle.
#[derive(Clone)]
pub enum BrowserState {
    /// Initialization not started or still running.
    Pending,
    Ready(Arc<dyn BrowserHandle>),
    /// Initialization failed; holds the error message.
    Failed(String),
}

impl BrowserState {
    pub fn is_pending(&self) -> bool {
        matches!(self, BrowserState::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, BrowserState::Ready(_))
    }
}

impl fmt::Debug for BrowserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserState::Pending => f.write_str("Pending"),
            BrowserState::Ready(_) => f.write_str("Ready"),
            BrowserState::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
        }
    }
}

/// Status events for UI indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoaderEvent {
    BrowserCreated { number: usize },
    BrowserFailed { error: String },
    TracksRequested { category: TrackCategory, id: String },
    TracksLoaded { category: TrackCategory, id: String, registered: usize, failed: usize },
    TracksFailed { category: TrackCategory, id: String, error: String },
    DuplicateSuppressed { category: TrackCategory, id: String },
}

/// One track the browser refused.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackFailure {
    /// Position of the descriptor in the response array.
    pub index: usize,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationReport {
    pub registered: usize,
    pub failures: Vec<TrackFailure>,
}

impl RegistrationReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(RegistrationReport),
    /// Same category and id was already in flight; nothing was requested.
    Duplicate,
}

/// Register each descriptor with the browser, in order.
///
/// Registrations are independent: a refused track is recorded and the rest
/// still run. Nothing is rolled back.
pub async fn register_tracks(handle: &dyn BrowserHandle, tracks: Vec<Value>) -> RegistrationReport {
    let mut report = RegistrationReport::default();
    for (index, track) in tracks.into_iter().enumerate() {
        match handle.load_track(track).await {
            Ok(()) => report.registered += 1,
            Err(e) => {
                warn!(index, error = %e, "Track registration failed");
                report.failures.push(TrackFailure { index, error: e.to_string() });
            }
        }
    }
    report
}

type InFlightKey = (TrackCategory, String);

/// Removes its key from the in-flight set when the load finishes or is dropped.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<InFlightKey>>,
    key: Option<InFlightKey>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.set
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .remove(&key);
        }
    }
}

pub struct TrackLoader {
    source: Arc<dyn TrackSource>,
    state: watch::Sender<BrowserState>,
    created: AtomicUsize,
    init_lock: tokio::sync::Mutex<()>,
    register_lock: tokio::sync::Mutex<()>,
    in_flight: Mutex<HashSet<InFlightKey>>,
    events: broadcast::Sender<LoaderEvent>,
}

impl TrackLoader {
    pub fn new(source: Arc<dyn TrackSource>) -> Self {
        let (state, _) = watch::channel(BrowserState::Pending);
        let (events, _) = broadcast::channel(256);
        Self {
            source,
            state,
            created: AtomicUsize::new(0),
            init_lock: tokio::sync::Mutex::new(()),
            register_lock: tokio::sync::Mutex::new(()),
            in_flight: Mutex::new(HashSet::new()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LoaderEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> BrowserState {
        self.state.borrow().clone()
    }

    /// Fetch the default configuration and build the browser from it.
    ///
    /// The configuration is passed to the widget unmodified. On failure no
    /// browser is constructed and the state becomes `Failed`; a later call
    /// may retry.
    pub async fn initialize(&self, widget: &dyn GenomeWidget, mount: &str) -> Result<()> {
        let _init = self.init_lock.lock().await;
        if self.state.borrow().is_ready() {
            return Err(LoaderError::AlreadyInitialized);
        }
        self.state.send_replace(BrowserState::Pending);

        let config = match self.source.get_json(DEFAULT_CONFIG_PATH).await {
            Ok(config) => config,
            Err(e) => return Err(self.fail_init(e)),
        };

        let handle = match widget.create_browser(mount, config).await {
            Ok(handle) => handle,
            Err(e) => return Err(self.fail_init(e)),
        };

        let number = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(BrowserState::Ready(handle));
        info!("Created IGV browser {}", number);
        self.emit(LoaderEvent::BrowserCreated { number });
        Ok(())
    }

    fn fail_init(&self, e: LoaderError) -> LoaderError {
        error!("Error: {}", e);
        self.state.send_replace(BrowserState::Failed(e.to_string()));
        self.emit(LoaderEvent::BrowserFailed { error: e.to_string() });
        e
    }

    /// The browser handle, or why it is not available.
    pub fn handle(&self) -> Result<Arc<dyn BrowserHandle>> {
        match &*self.state.borrow() {
            BrowserState::Ready(handle) => Ok(Arc::clone(handle)),
            BrowserState::Pending => Err(LoaderError::BrowserNotReady),
            BrowserState::Failed(e) => Err(LoaderError::BrowserUnavailable(e.clone())),
        }
    }

    /// Wait until initialization has finished, then return the handle.
    pub async fn wait_ready(&self, timeout: Duration) -> Result<Arc<dyn BrowserHandle>> {
        let mut rx = self.state.subscribe();
        let settled = tokio::time::timeout(timeout, rx.wait_for(|s| !s.is_pending()))
            .await
            .map(|r| r.map(|_| ()));
        match settled {
            Err(_) => Err(LoaderError::Timeout(timeout)),
            Ok(Err(_)) => Err(LoaderError::BrowserNotReady),
            Ok(Ok(())) => self.handle(),
        }
    }

    pub async fn load_bigwig_tracks(&self, id: &str) -> Result<LoadOutcome> {
        self.load_tracks(TrackCategory::BigWig, id).await
    }

    pub async fn load_bam_tracks(&self, id: &str) -> Result<LoadOutcome> {
        self.load_tracks(TrackCategory::Bam, id).await
    }

    /// Fetch the descriptor list for `id` and register every entry.
    ///
    /// The id is appended to the category prefix as-is.
    pub async fn load_tracks(&self, category: TrackCategory, id: &str) -> Result<LoadOutcome> {
        let handle = self.handle().inspect_err(|e| error!("Error: {}", e))?;

        let key = (category, id.to_string());
        let _guard = {
            let mut in_flight = self
                .in_flight
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if !in_flight.insert(key.clone()) {
                debug!(%category, id, "Load already in flight");
                self.emit(LoaderEvent::DuplicateSuppressed { category, id: id.to_string() });
                return Ok(LoadOutcome::Duplicate);
            }
            InFlightGuard { set: &self.in_flight, key: Some(key) }
        };

        self.emit(LoaderEvent::TracksRequested { category, id: id.to_string() });

        let path = category.path_for(id);
        let tracks = match self.fetch_track_list(&path).await {
            Ok(tracks) => tracks,
            Err(e) => {
                error!("Error: {}", e);
                self.emit(LoaderEvent::TracksFailed {
                    category,
                    id: id.to_string(),
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        let report = {
            let _batch = self.register_lock.lock().await;
            register_tracks(handle.as_ref(), tracks).await
        };

        info!(%category, id, registered = report.registered, failed = report.failures.len(), "Tracks loaded");
        self.emit(LoaderEvent::TracksLoaded {
            category,
            id: id.to_string(),
            registered: report.registered,
            failed: report.failures.len(),
        });
        Ok(LoadOutcome::Loaded(report))
    }

    async fn fetch_track_list(&self, path: &str) -> Result<Vec<Value>> {
        match self.source.get_json(path).await? {
            Value::Array(tracks) => Ok(tracks),
            other => Err(LoaderError::UnexpectedPayload {
                path: path.to_string(),
                found: json_kind(&other),
            }),
        }
    }

    fn emit(&self, event: LoaderEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockResponse, MockSource, MockWidget};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tracing_test::traced_test;

    fn loader_with(source: MockSource) -> (Arc<MockSource>, TrackLoader) {
        let source = Arc::new(source);
        let loader = TrackLoader::new(source.clone());
        (source, loader)
    }

    fn two_wig_tracks() -> Value {
        json!([{"type": "wig", "url": "a.bw"}, {"type": "wig", "url": "b.bw"}])
    }

    #[tokio::test]
    #[traced_test]
    async fn test_initialize_passes_config_through_unmodified() {
        let config = json!({"genome": "hg38", "locus": "chr1"});
        let (source, loader) =
            loader_with(MockSource::new().with("/data/default", MockResponse::Json(config.clone())));
        let widget = MockWidget::new();

        loader.initialize(&widget, "igv-div-1").await.unwrap();

        assert_eq!(widget.created(), vec![("igv-div-1".to_string(), config)]);
        assert_eq!(source.requests(), vec!["/data/default".to_string()]);
        assert!(loader.state().is_ready());
        assert!(logs_contain("Created IGV browser 1"));
    }

    #[tokio::test]
    async fn test_initialize_only_once() {
        let (source, loader) =
            loader_with(MockSource::new().with("/data/default", MockResponse::Json(json!({}))));
        let widget = MockWidget::new();

        loader.initialize(&widget, "igv").await.unwrap();
        let second = loader.initialize(&widget, "igv").await;

        assert!(matches!(second, Err(LoaderError::AlreadyInitialized)));
        assert_eq!(widget.created().len(), 1);
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_failed_config_fetch_is_contained() {
        let (_, loader) =
            loader_with(MockSource::new().with("/data/default", MockResponse::Fail(502)));
        let widget = MockWidget::new();
        let mut events = loader.subscribe();

        let result = loader.initialize(&widget, "igv").await;

        assert!(matches!(result, Err(LoaderError::Status { status: 502, .. })));
        assert!(widget.created().is_empty());
        assert!(matches!(loader.state(), BrowserState::Failed(_)));
        assert!(matches!(events.try_recv(), Ok(LoaderEvent::BrowserFailed { .. })));
        assert!(logs_contain("Error:"));
    }

    #[tokio::test]
    async fn test_invalid_json_config_never_constructs() {
        let (_, loader) =
            loader_with(MockSource::new().with("/data/default", MockResponse::InvalidJson));
        let widget = MockWidget::new();

        let result = loader.initialize(&widget, "igv").await;

        assert!(matches!(result, Err(LoaderError::InvalidJson { .. })));
        assert!(widget.created().is_empty());
    }

    #[tokio::test]
    async fn test_widget_failure_marks_browser_unavailable() {
        let (_, loader) =
            loader_with(MockSource::new().with("/data/default", MockResponse::Json(json!({}))));
        let widget = MockWidget::failing();

        assert!(loader.initialize(&widget, "igv").await.is_err());
        assert!(matches!(
            loader.load_bigwig_tracks("1").await,
            Err(LoaderError::BrowserUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_load_before_initialize_is_a_typed_fault() {
        let (source, loader) = loader_with(MockSource::new());

        let result = loader.load_bam_tracks("7").await;

        assert!(matches!(result, Err(LoaderError::BrowserNotReady)));
        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn test_bigwig_tracks_registered_in_order() {
        let (source, loader) = loader_with(
            MockSource::new()
                .with("/data/default", MockResponse::Json(json!({})))
                .with("/data/bigWigsTrack/42", MockResponse::Json(two_wig_tracks())),
        );
        let widget = MockWidget::new();
        loader.initialize(&widget, "igv").await.unwrap();

        let outcome = loader.load_bigwig_tracks("42").await.unwrap();

        assert_eq!(
            outcome,
            LoadOutcome::Loaded(RegistrationReport { registered: 2, failures: vec![] })
        );
        assert_eq!(
            widget.handle().loaded(),
            vec![json!({"type": "wig", "url": "a.bw"}), json!({"type": "wig", "url": "b.bw"})]
        );
        assert_eq!(source.requests()[1], "/data/bigWigsTrack/42");
    }

    #[tokio::test]
    async fn test_bam_loader_requests_bam_path_only() {
        let (source, loader) = loader_with(
            MockSource::new()
                .with("/data/default", MockResponse::Json(json!({})))
                .with("/data/bamTrack/x-9", MockResponse::Json(json!([{"type": "alignment"}]))),
        );
        let widget = MockWidget::new();
        loader.initialize(&widget, "igv").await.unwrap();

        loader.load_bam_tracks("x-9").await.unwrap();

        assert_eq!(source.requests(), vec!["/data/default", "/data/bamTrack/x-9"]);
        assert_eq!(widget.handle().loaded().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_track_fetch_registers_nothing() {
        let (_, loader) = loader_with(
            MockSource::new()
                .with("/data/default", MockResponse::Json(json!({})))
                .with("/data/bamTrack/1", MockResponse::Fail(400)),
        );
        let widget = MockWidget::new();
        loader.initialize(&widget, "igv").await.unwrap();
        let mut events = loader.subscribe();

        let result = loader.load_bam_tracks("1").await;

        assert!(matches!(result, Err(LoaderError::Status { status: 400, .. })));
        assert!(widget.handle().loaded().is_empty());
        assert!(matches!(events.try_recv(), Ok(LoaderEvent::TracksRequested { .. })));
        assert!(matches!(events.try_recv(), Ok(LoaderEvent::TracksFailed { .. })));
    }

    #[tokio::test]
    async fn test_non_array_payload_is_rejected() {
        let (_, loader) = loader_with(
            MockSource::new()
                .with("/data/default", MockResponse::Json(json!({})))
                .with("/data/bigWigsTrack/1", MockResponse::Json(json!({"type": "wig"}))),
        );
        let widget = MockWidget::new();
        loader.initialize(&widget, "igv").await.unwrap();

        let result = loader.load_bigwig_tracks("1").await;

        assert!(matches!(result, Err(LoaderError::UnexpectedPayload { found: "object", .. })));
    }

    #[tokio::test]
    async fn test_refused_track_does_not_stop_the_rest() {
        let (_, loader) = loader_with(
            MockSource::new()
                .with("/data/default", MockResponse::Json(json!({})))
                .with(
                    "/data/bigWigsTrack/3",
                    MockResponse::Json(json!([{"n": 0}, {"n": 1}, {"n": 2}])),
                ),
        );
        let widget = MockWidget::refusing(1);
        loader.initialize(&widget, "igv").await.unwrap();

        let outcome = loader.load_bigwig_tracks("3").await.unwrap();

        let LoadOutcome::Loaded(report) = outcome else {
            panic!("expected a loaded outcome");
        };
        assert_eq!(report.registered, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(widget.handle().loaded(), vec![json!({"n": 0}), json!({"n": 2})]);
    }

    #[tokio::test]
    async fn test_duplicate_in_flight_load_is_suppressed() {
        let source = MockSource::new()
            .with("/data/default", MockResponse::Json(json!({})))
            .with("/data/bigWigsTrack/5", MockResponse::Json(two_wig_tracks()))
            .gated("/data/bigWigsTrack/5");
        let gate = source.gate();
        let (source, loader) = loader_with(source);
        let loader = Arc::new(loader);
        let widget = MockWidget::new();
        loader.initialize(&widget, "igv").await.unwrap();

        let first = {
            let loader = Arc::clone(&loader);
            tokio::spawn(async move { loader.load_bigwig_tracks("5").await })
        };
        while source.requests().len() < 2 {
            tokio::task::yield_now().await;
        }

        let second = loader.load_bigwig_tracks("5").await.unwrap();
        assert_eq!(second, LoadOutcome::Duplicate);

        gate.add_permits(1);
        let first = first.await.unwrap().unwrap();
        assert!(matches!(first, LoadOutcome::Loaded(ref r) if r.registered == 2));
        assert_eq!(source.requests().len(), 2);

        // Finished loads may be requested again.
        gate.add_permits(1);
        assert!(matches!(
            loader.load_bigwig_tracks("5").await.unwrap(),
            LoadOutcome::Loaded(_)
        ));
    }

    fn tagged_tracks(group: &str, n: usize) -> Value {
        Value::Array((0..n).map(|i| json!({"group": group, "index": i})).collect())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_batches_register_contiguously() {
        let (_, loader) = loader_with(
            MockSource::new()
                .with("/data/default", MockResponse::Json(json!({})))
                .with("/data/bigWigsTrack/a", MockResponse::Json(tagged_tracks("a", 50)))
                .with("/data/bamTrack/b", MockResponse::Json(tagged_tracks("b", 50))),
        );
        let widget = MockWidget::new();
        loader.initialize(&widget, "igv").await.unwrap();

        let (wig, bam) = tokio::join!(loader.load_bigwig_tracks("a"), loader.load_bam_tracks("b"));
        assert!(matches!(wig.unwrap(), LoadOutcome::Loaded(ref r) if r.registered == 50));
        assert!(matches!(bam.unwrap(), LoadOutcome::Loaded(ref r) if r.registered == 50));

        let loaded = widget.handle().loaded();
        assert_eq!(loaded.len(), 100);
        let switches = loaded.windows(2).filter(|w| w[0]["group"] != w[1]["group"]).count();
        assert_eq!(switches, 1);

        for group in ["a", "b"] {
            let indices: Vec<u64> = loaded
                .iter()
                .filter(|t| t["group"] == group)
                .filter_map(|t| t["index"].as_u64())
                .collect();
            assert_eq!(indices, (0..50).collect::<Vec<u64>>());
        }
    }

    #[tokio::test]
    async fn test_wait_ready_times_out_while_pending() {
        let (_, loader) = loader_with(MockSource::new());
        let result = loader.wait_ready(Duration::from_millis(10)).await;
        assert!(matches!(result, Err(LoaderError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_wait_ready_returns_handle_after_initialize() {
        let (_, loader) =
            loader_with(MockSource::new().with("/data/default", MockResponse::Json(json!({}))));
        let widget = MockWidget::new();
        loader.initialize(&widget, "igv").await.unwrap();

        assert!(loader.wait_ready(Duration::from_millis(10)).await.is_ok());
    }

    #[test]
    fn test_events_serialize_with_type_tag() {
        let event = LoaderEvent::TracksLoaded {
            category: TrackCategory::Bam,
            id: "9".into(),
            registered: 1,
            failed: 0,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"type": "tracks_loaded", "category": "bam", "id": "9", "registered": 1, "failed": 0})
        );
    }
}
