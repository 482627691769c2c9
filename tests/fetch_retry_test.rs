use async_trait::async_trait;
use campus_scraper::error::{Result, ScraperError};
use campus_scraper::faults::FaultPolicy;
use campus_scraper::sources::fetch::{fetch_detail, fetch_listing, FetchedPage, PageFetcher};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

struct ScriptedFetcher {
    pages: Mutex<VecDeque<Result<FetchedPage>>>,
    calls: Mutex<Vec<Instant>>,
}

impl ScriptedFetcher {
    fn new(pages: Vec<Result<FetchedPage>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn call_offsets_secs(&self, start: Instant) -> Vec<u64> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|at| at.duration_since(start).as_secs())
            .collect()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn get(&self, _url: &str) -> Result<FetchedPage> {
        self.calls.lock().unwrap().push(Instant::now());
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .expect("fetcher script exhausted")
    }
}

fn page(status: u16, body: &str) -> Result<FetchedPage> {
    Ok(FetchedPage {
        status,
        body: body.to_string(),
    })
}

const DELAY: Duration = Duration::from_secs(10);

#[tokio::test(start_paused = true)]
async fn listing_retries_on_non_200_with_a_fixed_delay() {
    let fetcher = ScriptedFetcher::new(vec![
        page(500, "oops"),
        page(503, "still down"),
        page(200, "<html>events</html>"),
    ]);

    let start = Instant::now();
    let body = fetch_listing(&fetcher, "https://example.com/", DELAY, FaultPolicy::Unattended)
        .await
        .unwrap();

    assert_eq!(body, "<html>events</html>");
    // exactly two delayed retries, no backoff growth
    assert_eq!(fetcher.call_offsets_secs(start), [0, 10, 20]);
}

#[tokio::test(start_paused = true)]
async fn listing_treats_transport_errors_as_transient() {
    let fetcher = ScriptedFetcher::new(vec![
        Err(ScraperError::Api {
            message: "connection refused".into(),
        }),
        page(200, "<html>ok</html>"),
    ]);

    let start = Instant::now();
    let body = fetch_listing(&fetcher, "https://example.com/", DELAY, FaultPolicy::Unattended)
        .await
        .unwrap();

    assert_eq!(body, "<html>ok</html>");
    assert_eq!(fetcher.call_offsets_secs(start), [0, 10]);
}

#[tokio::test(start_paused = true)]
async fn detail_fetches_give_up_after_the_attempt_budget() {
    let fetcher = ScriptedFetcher::new(vec![
        page(404, ""),
        page(404, ""),
        page(404, ""),
        page(404, ""),
        page(404, ""),
    ]);

    let start = Instant::now();
    let body = fetch_detail(&fetcher, "https://example.com/e/1", DELAY, 5).await;

    assert!(body.is_none());
    assert_eq!(fetcher.call_offsets_secs(start), [0, 10, 20, 30, 40]);
}

#[tokio::test(start_paused = true)]
async fn detail_recovers_within_the_attempt_budget() {
    let fetcher = ScriptedFetcher::new(vec![page(502, "bad gateway"), page(200, "<html>detail</html>")]);

    let start = Instant::now();
    let body = fetch_detail(&fetcher, "https://example.com/e/1", DELAY, 5).await;

    assert_eq!(body.as_deref(), Some("<html>detail</html>"));
    assert_eq!(fetcher.call_offsets_secs(start), [0, 10]);
}
