use crate::error::Result;
use crate::faults::FaultPolicy;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// One fetched page, reduced to what retry decisions need.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

/// Transport seam for listing and detail fetches; scripted in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchedPage>;
}

/// reqwest-backed fetcher used for real runs.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("reqwest client");
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<FetchedPage> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(FetchedPage { status, body })
    }
}

/// Fetch a listing page, retrying indefinitely on any failure with a fixed
/// delay. The listing page is the whole run for its source, so this never
/// gives up; only an interactive operator can abort it.
pub async fn fetch_listing(
    fetcher: &dyn PageFetcher,
    url: &str,
    delay: Duration,
    faults: FaultPolicy,
) -> Result<String> {
    loop {
        match fetcher.get(url).await {
            Ok(page) if page.status == 200 => return Ok(page.body),
            Ok(page) => {
                warn!("Connection to {} unsuccessful (status {})", url, page.status);
                faults.confirm_continue(&format!(
                    "Connection to {url} unsuccessful (status {}).",
                    page.status
                ))?;
            }
            Err(e) => {
                warn!("Connection to {} unsuccessful: {}", url, e);
                faults.confirm_continue(&format!("Connection to {url} unsuccessful."))?;
            }
        }
        info!("Retrying {} in {} seconds", url, delay.as_secs());
        tokio::time::sleep(delay).await;
    }
}

/// Fetch a detail page with the same fixed delay but a bounded number of
/// attempts. `None` once the attempts are spent, so the caller can skip that
/// one record instead of aborting the adapter run.
pub async fn fetch_detail(
    fetcher: &dyn PageFetcher,
    url: &str,
    delay: Duration,
    max_attempts: u32,
) -> Option<String> {
    for attempt in 1..=max_attempts {
        match fetcher.get(url).await {
            Ok(page) if page.status == 200 => return Some(page.body),
            Ok(page) => warn!(
                "Attempt {}/{} for {} failed with status {}",
                attempt, max_attempts, url, page.status
            ),
            Err(e) => warn!("Attempt {}/{} for {} failed: {}", attempt, max_attempts, url, e),
        }
        if attempt < max_attempts {
            tokio::time::sleep(delay).await;
        }
    }
    None
}
