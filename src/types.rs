use crate::constants::WEB_ORIGIN;
use serde::{Deserialize, Serialize};

/// One event record as produced by a source adapter. Field names follow the
/// catalog's JSON schema, which is also the snapshot format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedEvent {
    pub title: String,
    /// Canonical detail-page URL on the source site.
    pub link: String,
    /// External registration URL; half of the dedupe key.
    #[serde(default)]
    pub signup_link: String,
    #[serde(default)]
    pub brief_description: String,
    #[serde(default)]
    pub description: String,
    pub signup_deadline: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub mode: EventMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventCategory>,
    pub origin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_information: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organisation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ScrapedEvent {
    /// New partial record with only the identity fields filled. The origin
    /// is always the web-scrape tag; everything else comes later.
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            signup_link: String::new(),
            brief_description: String::new(),
            description: String::new(),
            signup_deadline: None,
            tags: Vec::new(),
            mode: EventMode::Unknown,
            event_type: None,
            origin: WEB_ORIGIN.to_string(),
            additional_information: None,
            image: None,
            organisation: None,
            location: None,
        }
    }
}

/// Delivery mode of an event. Closed set; anything a model answers outside
/// of it is coerced to `Unknown` at the decode boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventMode {
    Offline,
    Online,
    Hybrid,
    Tba,
    Unknown,
}

impl EventMode {
    /// Decode a free-text response against the closed mode set.
    pub fn from_response(response: &str) -> Self {
        match response.trim().to_lowercase().as_str() {
            "offline" => EventMode::Offline,
            "online" => EventMode::Online,
            "hybrid" => EventMode::Hybrid,
            "tba" => EventMode::Tba,
            _ => EventMode::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventMode::Offline => "offline",
            EventMode::Online => "online",
            EventMode::Hybrid => "hybrid",
            EventMode::Tba => "tba",
            EventMode::Unknown => "unknown",
        }
    }
}

/// Catalog categories an eligible event can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventCategory {
    Talks,
    Workshops,
    #[serde(rename = "Case Comps")]
    CaseComps,
    Hackathons,
}

impl EventCategory {
    /// Decode the classifier's category label; `None` for anything outside
    /// the closed set.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Talks" => Some(EventCategory::Talks),
            "Workshops" => Some(EventCategory::Workshops),
            "Case Comps" => Some(EventCategory::CaseComps),
            "Hackathons" => Some(EventCategory::Hackathons),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventCategory::Talks => "Talks",
            EventCategory::Workshops => "Workshops",
            EventCategory::CaseComps => "Case Comps",
            EventCategory::Hackathons => "Hackathons",
        }
    }
}
