use super::ModelGateway;
use crate::error::Result;
use crate::types::EventMode;
use tracing::{debug, warn};

const SUMMARIZE_INSTRUCTION: &str = "You will now take on the role of a UX designer. You are provided \
with the description of an event. You are to summarize the description in 30 words or less and provide \
a brief description of the event such that it would catch a user's attention to find out more about the \
event. Return only the attention grabbing description without any formating, titles, headings, special \
characters or newlines.";

const MODE_INSTRUCTION: &str = "You will now take on the role of a data engineer. You are provided with \
the location of an event. You are to classify the location into 1 of 4 categories: offline, online, \
hybrid or TBA. Where hybrid implies that the event takes place both physically and online while TBA \
implies that the location is yet to be announced. If you are unsure, reply with unknown. You are only \
allowed to respond with any of the following 5 words: offline, online, hybrid, TBA, unknown.";

/// Word budget for the brief description.
const BRIEF_WORD_LIMIT: usize = 30;

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Order two candidate descriptions so the shorter becomes the brief, and
/// synthesize a fresh brief when the source's is missing or over budget.
pub async fn resolve_descriptions(
    gateway: &ModelGateway,
    brief: String,
    full: String,
) -> Result<(String, String)> {
    let (mut brief, full) = if brief.len() > full.len() {
        (full, brief)
    } else {
        (brief, full)
    };

    if brief.is_empty() || word_count(&brief) > BRIEF_WORD_LIMIT {
        debug!("Generating a new brief description");
        // Summarize the overlong brief when there is one, else the full text
        let content = if brief.is_empty() { &full } else { &brief };
        brief = gateway.generate(SUMMARIZE_INSTRUCTION, content).await?;
    }
    Ok((brief, full))
}

/// Infer the delivery mode from free-text location. Anything the model
/// answers outside the closed mode set coerces to `Unknown`.
pub async fn infer_mode(gateway: &ModelGateway, location: &str) -> Result<EventMode> {
    let response = gateway.generate(MODE_INSTRUCTION, location).await?;
    let mode = EventMode::from_response(&response);
    if mode == EventMode::Unknown && !response.trim().eq_ignore_ascii_case("unknown") {
        warn!(
            "Mode inference answered '{}', outside the expected set",
            response.trim()
        );
    }
    debug!("Location '{}' classified as {}", location, mode.as_str());
    Ok(mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_counting_splits_on_any_whitespace() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("one two  three\nfour"), 4);
    }
}
