use crate::constants::SERVICE_ACCOUNT;
use crate::error::{Result, ScraperError};
use crate::types::ScrapedEvent;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A persisted catalog record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEvent {
    pub id: Uuid,
    pub created_by: String,
    #[serde(flatten)]
    pub event: ScrapedEvent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The record store the reconciler merges into. The production store is an
/// external collaborator; everything here depends only on this surface.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_by_signup_link_and_title(
        &self,
        signup_link: &str,
        title: &str,
    ) -> Result<Option<Uuid>>;
    async fn insert(&self, event: &ScrapedEvent, created_by: &str) -> Result<Uuid>;
    async fn update(&self, id: Uuid, event: &ScrapedEvent) -> Result<()>;
}

/// In-memory record store for development and testing.
pub struct InMemoryRecordStore {
    events: Mutex<HashMap<Uuid, StoredEvent>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: Uuid) -> Option<StoredEvent> {
        self.events.lock().unwrap().get(&id).cloned()
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn find_by_signup_link_and_title(
        &self,
        signup_link: &str,
        title: &str,
    ) -> Result<Option<Uuid>> {
        let events = self.events.lock().unwrap();
        Ok(events
            .values()
            .find(|stored| stored.event.signup_link == signup_link && stored.event.title == title)
            .map(|stored| stored.id))
    }

    async fn insert(&self, event: &ScrapedEvent, created_by: &str) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let stored = StoredEvent {
            id,
            created_by: created_by.to_string(),
            event: event.clone(),
            created_at: now,
            updated_at: now,
        };
        self.events.lock().unwrap().insert(id, stored);
        debug!("Created event: {} with id {}", event.title, id);
        Ok(id)
    }

    async fn update(&self, id: Uuid, incoming: &ScrapedEvent) -> Result<()> {
        let mut events = self.events.lock().unwrap();
        let stored = events.get_mut(&id).ok_or_else(|| ScraperError::Api {
            message: format!("no stored event with id {id}"),
        })?;
        merge_into(&mut stored.event, incoming);
        stored.updated_at = Utc::now();
        debug!("Updated event: {} with id {}", stored.event.title, id);
        Ok(())
    }
}

/// Apply the provided fields of `incoming` onto `existing`. Optional fields
/// the incoming record does not carry never erase stored values.
fn merge_into(existing: &mut ScrapedEvent, incoming: &ScrapedEvent) {
    existing.title = incoming.title.clone();
    existing.link = incoming.link.clone();
    existing.signup_link = incoming.signup_link.clone();
    existing.brief_description = incoming.brief_description.clone();
    existing.description = incoming.description.clone();
    existing.tags = incoming.tags.clone();
    existing.mode = incoming.mode;
    existing.origin = incoming.origin.clone();
    if incoming.signup_deadline.is_some() {
        existing.signup_deadline = incoming.signup_deadline.clone();
    }
    if incoming.event_type.is_some() {
        existing.event_type = incoming.event_type;
    }
    if incoming.additional_information.is_some() {
        existing.additional_information = incoming.additional_information.clone();
    }
    if incoming.image.is_some() {
        existing.image = incoming.image.clone();
    }
    if incoming.organisation.is_some() {
        existing.organisation = incoming.organisation.clone();
    }
    if incoming.location.is_some() {
        existing.location = incoming.location.clone();
    }
}

/// Outcome counts for one reconciliation batch.
#[derive(Debug, Default, Serialize)]
pub struct ReconcileSummary {
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
}

/// Merges freshly scraped records into the record store without creating
/// duplicates. The dedupe key is the exact (signup link, title) pair.
pub struct Reconciler {
    store: Arc<dyn RecordStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Upsert each record by its dedupe key. Individual failures are logged
    /// and counted; the batch keeps going.
    pub async fn reconcile(&self, events: &[ScrapedEvent]) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();
        for event in events {
            match self.reconcile_one(event).await {
                Ok(true) => summary.created += 1,
                Ok(false) => summary.updated += 1,
                Err(e) => {
                    warn!(
                        "Unable to add event {} ({}) into the store: {}",
                        event.title, event.signup_link, e
                    );
                    summary.failed += 1;
                }
            }
        }
        info!(
            "Reconciled {} events: {} created, {} updated, {} failed",
            events.len(),
            summary.created,
            summary.updated,
            summary.failed
        );
        summary
    }

    // true = created, false = updated
    async fn reconcile_one(&self, event: &ScrapedEvent) -> Result<bool> {
        if let Some(id) = self
            .store
            .find_by_signup_link_and_title(&event.signup_link, &event.title)
            .await?
        {
            self.store.update(id, event).await?;
            return Ok(false);
        }
        self.store.insert(event, SERVICE_ACCOUNT).await?;
        Ok(true)
    }
}
