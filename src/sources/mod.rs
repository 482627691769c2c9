pub mod cordy;
pub mod fetch;
pub mod sg_innovate;

use crate::dates::{self, DateOutcome};
use crate::error::Result;
use crate::faults::FaultPolicy;
use crate::gateway::ModelGateway;
use crate::types::ScrapedEvent;
use fetch::PageFetcher;
use std::collections::HashSet;
use std::time::Duration;
use tracing::warn;

/// Core trait every event source adapter implements.
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    /// Unique identifier for this source.
    fn source_name(&self) -> &'static str;

    /// Fetch and enrich all events currently listed by this source.
    /// Records returned here do not yet carry an event type.
    async fn scrape(&self, ctx: &HarvestContext<'_>) -> Result<Vec<ScrapedEvent>>;
}

/// A partial record straight off a listing page, with its deadline still in
/// the source's own date format.
#[derive(Debug, Clone)]
pub struct ListedEvent {
    pub event: ScrapedEvent,
    pub raw_deadline: String,
}

/// Shared collaborators and tuning handed to every adapter.
pub struct HarvestContext<'a> {
    pub fetcher: &'a dyn PageFetcher,
    pub gateway: &'a ModelGateway,
    pub faults: FaultPolicy,
    pub listing_retry_delay: Duration,
    pub detail_max_attempts: u32,
}

impl HarvestContext<'_> {
    pub async fn fetch_listing(&self, url: &str) -> Result<String> {
        fetch::fetch_listing(self.fetcher, url, self.listing_retry_delay, self.faults).await
    }

    pub async fn fetch_detail(&self, url: &str) -> Option<String> {
        fetch::fetch_detail(
            self.fetcher,
            url,
            self.listing_retry_delay,
            self.detail_max_attempts,
        )
        .await
    }

    /// Normalize a raw date string, routing unparseable input through the
    /// fault policy and treating the field as absent afterwards.
    pub fn normalize_deadline(&self, raw: &str) -> Result<Option<String>> {
        match dates::normalize(raw) {
            DateOutcome::Canonical(date) => Ok(Some(date)),
            DateOutcome::NoDate => Ok(None),
            DateOutcome::Unparseable => {
                warn!("Date format not recognized: '{}'", raw);
                self.faults.confirm_continue(&format!(
                    "Date format not recognized: '{raw}'. The field will be left empty."
                ))?;
                Ok(None)
            }
        }
    }
}

/// Collapse duplicate tags while preserving first-seen order.
pub fn collapse_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter().filter(|tag| seen.insert(tag.clone())).collect()
}
