use super::ModelGateway;
use crate::error::{Result, ScraperError};
use crate::faults::FaultPolicy;
use crate::types::{EventCategory, ScrapedEvent};
use tracing::{debug, info, warn};

/// System instruction for catalog eligibility classification. The response
/// contract is a two-part `category, confidence` string with an `ERROR`
/// sentinel for ineligible events.
const CLASSIFY_INSTRUCTION: &str = "You will now take on the role of a data engineer classifying data. \
You will be provided information of independent isolated events in a json format. Each json represents \
an independent event which is unrelated to other events. Based on the information provided for an event, \
you are to determine if the event should be in the database. To be included in the database, the event \
must be academic related and be of one of the following categories: 'Talks', 'Workshops', 'Case Comps', \
'Hackathons'. Should the event not fulfil any criteria, you are to reply with: 'ERROR, reasoning'. \
Otherwise, you are to determine which category it falls in, along with your confidence in your \
categorization in percentage. You are to only reply with both information in the format: \
'category, confidence'.";

/// Eligibility verdict, decoded once at the response boundary so nothing
/// downstream ever compares sentinel strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Eligible {
        category: EventCategory,
        confidence: String,
    },
    Ineligible {
        reason: String,
    },
}

/// Decode the `category, confidence` response shape.
pub fn decode_verdict(response: &str) -> Result<Verdict> {
    let (label, detail) = response.split_once(", ").ok_or_else(|| ScraperError::Api {
        message: format!("malformed classifier response: '{response}'"),
    })?;
    if label == "ERROR" {
        return Ok(Verdict::Ineligible {
            reason: detail.to_string(),
        });
    }
    let category = EventCategory::from_label(label).ok_or_else(|| ScraperError::Api {
        message: format!("classifier returned unknown category: '{label}'"),
    })?;
    Ok(Verdict::Eligible {
        category,
        confidence: detail.to_string(),
    })
}

/// Classify a combined batch of scraped events. Ineligible records are
/// dropped; the rest keep their input order with `event_type` attached.
/// Confidence and rejection reasons are logged, never persisted.
pub async fn classify_events(
    gateway: &ModelGateway,
    events: Vec<ScrapedEvent>,
    faults: FaultPolicy,
) -> Result<Vec<ScrapedEvent>> {
    let total = events.len();
    info!("Starting classification of {} events", total);

    let mut kept = Vec::new();
    for (i, mut event) in events.into_iter().enumerate() {
        debug!("Classifying event {}/{}: {}", i + 1, total, event.title);
        let content = serde_json::to_string(&event)?;
        let response = gateway.generate(CLASSIFY_INSTRUCTION, &content).await?;
        match decode_verdict(&response) {
            Ok(Verdict::Eligible {
                category,
                confidence,
            }) => {
                debug!("{}: {} ({})", event.title, category.label(), confidence);
                event.event_type = Some(category);
                kept.push(event);
            }
            Ok(Verdict::Ineligible { reason }) => {
                debug!("Dropping '{}': {}", event.title, reason);
            }
            Err(e) => {
                warn!("Undecodable verdict for '{}': {}", event.title, e);
                faults.confirm_continue(&format!(
                    "Classifier returned an undecodable verdict for '{}'; the record will be skipped.",
                    event.title
                ))?;
            }
        }
    }
    info!("Classification kept {}/{} events", kept.len(), total);
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdicts_decode_at_the_boundary() {
        assert_eq!(
            decode_verdict("Talks, 92%").unwrap(),
            Verdict::Eligible {
                category: EventCategory::Talks,
                confidence: "92%".to_string()
            }
        );
        assert_eq!(
            decode_verdict("Case Comps, 75%").unwrap(),
            Verdict::Eligible {
                category: EventCategory::CaseComps,
                confidence: "75%".to_string()
            }
        );
        assert_eq!(
            decode_verdict("ERROR, not academic").unwrap(),
            Verdict::Ineligible {
                reason: "not academic".to_string()
            }
        );
    }

    #[test]
    fn malformed_responses_are_errors_not_verdicts() {
        assert!(decode_verdict("Talks").is_err());
        assert!(decode_verdict("").is_err());
        assert!(decode_verdict("Concerts, 99%").is_err());
    }
}
