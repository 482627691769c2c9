use async_trait::async_trait;
use campus_scraper::config::{FetchConfig, GatewayConfig};
use campus_scraper::error::{Result, ScraperError};
use campus_scraper::faults::FaultPolicy;
use campus_scraper::gateway::{BackendFault, GenerativeBackend, ModelGateway};
use campus_scraper::pipeline::{write_snapshot, Pipeline, RunOptions};
use campus_scraper::reconcile::InMemoryRecordStore;
use campus_scraper::sources::fetch::{FetchedPage, PageFetcher};
use campus_scraper::sources::{EventSource, HarvestContext};
use campus_scraper::types::ScrapedEvent;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Source that serves a canned record list without touching the network.
struct StubSource {
    name: &'static str,
    events: Vec<ScrapedEvent>,
}

#[async_trait]
impl EventSource for StubSource {
    fn source_name(&self) -> &'static str {
        self.name
    }

    async fn scrape(&self, _ctx: &HarvestContext<'_>) -> Result<Vec<ScrapedEvent>> {
        Ok(self.events.clone())
    }
}

/// Stub sources never fetch; any call here is a test bug.
struct NoFetch;

#[async_trait]
impl PageFetcher for NoFetch {
    async fn get(&self, url: &str) -> Result<FetchedPage> {
        Err(ScraperError::Api {
            message: format!("unexpected fetch of {url}"),
        })
    }
}

struct ScriptedBackend {
    responses: Mutex<VecDeque<std::result::Result<String, BackendFault>>>,
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn generate(
        &self,
        _model: &str,
        _instruction: &str,
        _content: &str,
    ) -> std::result::Result<String, BackendFault> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("backend script exhausted")
    }
}

fn sample_event(title: &str) -> ScrapedEvent {
    let mut event = ScrapedEvent::new(title, format!("https://example.com/events/{title}"));
    event.signup_link = format!("https://example.com/signup/{title}");
    event
}

fn pipeline_with(
    sources: Vec<Box<dyn EventSource>>,
    responses: Vec<std::result::Result<String, BackendFault>>,
    store: Arc<InMemoryRecordStore>,
) -> Pipeline {
    let backend = Arc::new(ScriptedBackend {
        responses: Mutex::new(responses.into()),
    });
    let gateway = ModelGateway::new(Box::new(backend), &GatewayConfig::default());
    Pipeline::new(sources, Box::new(NoFetch), gateway, store, FetchConfig::default())
}

fn options(output_dir: &std::path::Path, persist: bool) -> RunOptions {
    RunOptions {
        persist,
        faults: FaultPolicy::Unattended,
        output_dir: output_dir.to_string_lossy().to_string(),
    }
}

#[tokio::test]
async fn a_run_scrapes_classifies_snapshots_and_reconciles() {
    let output = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryRecordStore::new());
    let pipeline = pipeline_with(
        vec![
            Box::new(StubSource {
                name: "stub_a",
                events: vec![sample_event("ml-talk"), sample_event("bake-sale")],
            }),
            Box::new(StubSource {
                name: "stub_b",
                events: vec![sample_event("rust-workshop")],
            }),
        ],
        vec![
            Ok("Talks, 90%".into()),
            Ok("ERROR, not academic".into()),
            Ok("Workshops, 80%".into()),
        ],
        store.clone(),
    );

    let summary = pipeline.run(&options(output.path(), true)).await.unwrap();

    assert_eq!(summary.scraped, 3);
    assert_eq!(summary.classified, 2);
    let reconcile = summary.reconcile.unwrap();
    assert_eq!((reconcile.created, reconcile.updated, reconcile.failed), (2, 0, 0));
    assert_eq!(store.len(), 2);

    // the snapshot holds the combined classified set, in order
    let snapshot = std::fs::read_to_string(&summary.snapshot_file).unwrap();
    let records: Vec<serde_json::Value> = serde_json::from_str(&snapshot).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["title"], "ml-talk");
    assert_eq!(records[0]["eventType"], "Talks");
    assert_eq!(records[1]["title"], "rust-workshop");
    assert!(snapshot.contains("\"signupLink\""));
}

#[tokio::test]
async fn a_non_persisting_run_returns_records_and_leaves_the_store_alone() {
    let output = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryRecordStore::new());
    let pipeline = pipeline_with(
        vec![Box::new(StubSource {
            name: "stub_a",
            events: vec![sample_event("ml-talk")],
        })],
        vec![Ok("Talks, 95%".into())],
        store.clone(),
    );

    let summary = pipeline.run(&options(output.path(), false)).await.unwrap();

    assert!(store.is_empty());
    assert!(summary.reconcile.is_none());
    let events = summary.events.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "ml-talk");
    // the audit snapshot is written even without persistence
    assert!(std::path::Path::new(&summary.snapshot_file).exists());
}

#[tokio::test]
async fn running_the_pipeline_twice_creates_no_duplicates() {
    let output = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryRecordStore::new());
    let pipeline = pipeline_with(
        vec![Box::new(StubSource {
            name: "stub_a",
            events: vec![sample_event("ml-talk")],
        })],
        vec![Ok("Talks, 95%".into()), Ok("Talks, 95%".into())],
        store.clone(),
    );
    let opts = options(output.path(), true);

    pipeline.run(&opts).await.unwrap();
    let second = pipeline.run(&opts).await.unwrap();

    assert_eq!(store.len(), 1);
    let reconcile = second.reconcile.unwrap();
    assert_eq!((reconcile.created, reconcile.updated), (0, 1));
}

#[test]
fn snapshots_keep_utf8_unescaped() {
    let output = tempfile::tempdir().unwrap();
    let mut event = sample_event("café-night");
    event.description = "Café conversations über Technik".to_string();

    let path = write_snapshot(&[event], &output.path().to_string_lossy()).unwrap();
    let content = std::fs::read_to_string(path).unwrap();
    assert!(content.contains("Café conversations über Technik"));
    assert!(!content.contains("\\u"));
}
