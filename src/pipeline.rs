use crate::config::FetchConfig;
use crate::error::{Result, ScraperError};
use crate::faults::FaultPolicy;
use crate::gateway::{classify, ModelGateway};
use crate::reconcile::{ReconcileSummary, Reconciler, RecordStore};
use crate::sources::fetch::PageFetcher;
use crate::sources::{EventSource, HarvestContext};
use crate::types::ScrapedEvent;
use chrono::Utc;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

/// Options for one scrape run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Reconcile into the store, or just snapshot and return the records.
    pub persist: bool,
    pub faults: FaultPolicy,
    pub output_dir: String,
}

/// Result of a complete scrape run.
#[derive(Debug)]
pub struct RunSummary {
    pub scraped: usize,
    pub classified: usize,
    pub snapshot_file: String,
    pub reconcile: Option<ReconcileSummary>,
    /// The classified records, returned when the run does not persist.
    pub events: Option<Vec<ScrapedEvent>>,
}

/// Orchestrates one run: every source adapter to completion, classification
/// over the combined set, audit snapshot, then reconciliation.
pub struct Pipeline {
    sources: Vec<Box<dyn EventSource>>,
    fetcher: Box<dyn PageFetcher>,
    gateway: ModelGateway,
    store: Arc<dyn RecordStore>,
    fetch: FetchConfig,
    run_lock: Mutex<()>,
}

impl Pipeline {
    pub fn new(
        sources: Vec<Box<dyn EventSource>>,
        fetcher: Box<dyn PageFetcher>,
        gateway: ModelGateway,
        store: Arc<dyn RecordStore>,
        fetch: FetchConfig,
    ) -> Self {
        Self {
            sources,
            fetcher,
            gateway,
            store,
            fetch,
            run_lock: Mutex::new(()),
        }
    }

    /// Run one full pass: scrape every source, classify the combined set,
    /// snapshot it, then reconcile. A run that would overlap one already in
    /// progress is refused, not queued.
    #[instrument(skip(self, options))]
    pub async fn run(&self, options: &RunOptions) -> Result<RunSummary> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| ScraperError::RunInProgress)?;

        let ctx = HarvestContext {
            fetcher: self.fetcher.as_ref(),
            gateway: &self.gateway,
            faults: options.faults,
            listing_retry_delay: Duration::from_secs(self.fetch.listing_retry_delay_secs),
            detail_max_attempts: self.fetch.detail_max_attempts,
        };

        let mut combined = Vec::new();
        for source in &self.sources {
            info!("Running source adapter {}", source.source_name());
            let events = source.scrape(&ctx).await?;
            info!("{} produced {} events", source.source_name(), events.len());
            combined.extend(events);
        }
        let scraped = combined.len();

        let classified = classify::classify_events(&self.gateway, combined, options.faults).await?;
        let classified_count = classified.len();

        // The snapshot is written before reconciliation and regardless of
        // whether reconciliation runs, so every run leaves an audit trail.
        let snapshot_file = write_snapshot(&classified, &options.output_dir)?;
        info!("Saved run snapshot to {}", snapshot_file);

        if options.persist {
            let reconciler = Reconciler::new(self.store.clone());
            let summary = reconciler.reconcile(&classified).await;
            Ok(RunSummary {
                scraped,
                classified: classified_count,
                snapshot_file,
                reconcile: Some(summary),
                events: None,
            })
        } else {
            info!("Persistence disabled; returning {} records", classified_count);
            Ok(RunSummary {
                scraped,
                classified: classified_count,
                snapshot_file,
                reconcile: None,
                events: Some(classified),
            })
        }
    }

    /// Start runs on a fixed interval. A tick that fires while the previous
    /// run is somehow still holding the lock is skipped, not queued.
    pub async fn run_on_schedule(&self, interval_minutes: u64, options: RunOptions) {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_minutes * 60));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.run(&options).await {
                Ok(summary) => info!(
                    "Scheduled run finished: {}/{} events kept",
                    summary.classified, summary.scraped
                ),
                Err(ScraperError::RunInProgress) => {
                    warn!("Previous run still in progress, skipping this tick")
                }
                Err(e) => error!("Scheduled run failed: {}", e),
            }
        }
    }
}

/// Persist the full combined, classified record set for audit/replay.
pub fn write_snapshot(events: &[ScrapedEvent], output_dir: &str) -> Result<String> {
    // Ensure output directory exists
    fs::create_dir_all(output_dir)?;

    // Generate filename with timestamp
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let filename = format!("combined_{timestamp}.json");
    let filepath = Path::new(output_dir).join(&filename);

    // Serialize and write
    let json_content = serde_json::to_string_pretty(events)?;
    fs::write(&filepath, json_content)?;

    Ok(filepath.to_string_lossy().to_string())
}
