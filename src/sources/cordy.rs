//! Cordy source adapter.
//!
//! The listing page carries title, deadline, tags, organisation, a caption
//! and a thumbnail; the detail page adds the full description and the
//! signup link. The site exposes no venue or schedule, so mode stays
//! unknown and there is no additional information.

use super::{collapse_tags, EventSource, HarvestContext, ListedEvent};
use crate::constants::CORDY_SOURCE;
use crate::error::Result;
use crate::gateway::enrich;
use crate::text::extract_text;
use crate::types::ScrapedEvent;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};

const LISTING_URL: &str = "https://www.cordy.sg/";
const BASE_URL: &str = "https://www.cordy.sg";

pub struct CordySource;

impl Default for CordySource {
    fn default() -> Self {
        Self::new()
    }
}

/// Fields only the detail page carries.
#[derive(Debug, Clone)]
pub struct CordyDetail {
    pub description: String,
    pub signup_link: String,
}

impl CordySource {
    pub fn new() -> Self {
        Self
    }

    /// Extract partial records from the listing page. Cards without a title
    /// or link are dropped.
    pub fn parse_listing(html: &str) -> Vec<ListedEvent> {
        let document = Html::parse_document(html);
        let card_selector = Selector::parse(".opp-cms-wrapper.w-dyn-item").unwrap();
        let title_selector = Selector::parse(".text-block-6").unwrap();
        let link_selector = Selector::parse(".opp-cms-link-item").unwrap();
        let date_selector = Selector::parse(".text-block-10").unwrap();
        let tag_selector = Selector::parse(".text-block-18").unwrap();
        let org_selector = Selector::parse(".opp-cms-organisation").unwrap();
        let caption_selector = Selector::parse(".opp-cms-caption").unwrap();
        let image_selector = Selector::parse(".opp-cms-thumbnail img").unwrap();

        let mut listed = Vec::new();
        for card in document.select(&card_selector) {
            let title = card
                .select(&title_selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            if title.is_empty() {
                debug!("Skipping listing card with no title");
                continue;
            }
            let Some(href) = card
                .select(&link_selector)
                .next()
                .and_then(|el| el.value().attr("href"))
            else {
                warn!("Skipping '{}': card has no detail link", title);
                continue;
            };

            let mut event = ScrapedEvent::new(title, format!("{BASE_URL}{href}"));
            event.brief_description = card
                .select(&caption_selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            event.tags = collapse_tags(
                card.select(&tag_selector)
                    .map(|el| el.text().collect::<String>().trim().to_string())
                    .filter(|tag| !tag.is_empty())
                    .collect(),
            );
            event.organisation = card
                .select(&org_selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|org| !org.is_empty());
            event.image = card
                .select(&image_selector)
                .next()
                .and_then(|el| el.value().attr("src"))
                .map(str::to_string);

            let raw_deadline = card
                .select(&date_selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .unwrap_or_default();

            listed.push(ListedEvent { event, raw_deadline });
        }
        listed
    }

    /// Pull the full description and signup link out of a detail page.
    /// `None` when the page does not have the expected structure.
    pub fn extract_detail(html: &str) -> Option<CordyDetail> {
        let document = Html::parse_document(html);
        let description_selector = Selector::parse(
            "body > div:nth-of-type(3) > div > div:nth-of-type(3) > div:nth-of-type(3)",
        )
        .unwrap();
        let signup_selector = Selector::parse("body > div:nth-of-type(3) > div > a").unwrap();

        let container = document.select(&description_selector).next()?;
        let description = extract_text(container);
        let signup_link = document
            .select(&signup_selector)
            .next()?
            .value()
            .attr("href")?
            .to_string();
        Some(CordyDetail {
            description,
            signup_link,
        })
    }
}

#[async_trait::async_trait]
impl EventSource for CordySource {
    fn source_name(&self) -> &'static str {
        CORDY_SOURCE
    }

    #[instrument(skip(self, ctx))]
    async fn scrape(&self, ctx: &HarvestContext<'_>) -> Result<Vec<ScrapedEvent>> {
        info!("Fetching events from Cordy");
        let listing_html = ctx.fetch_listing(LISTING_URL).await?;
        let listed = Self::parse_listing(&listing_html);
        info!("Found {} event cards on the Cordy listing", listed.len());

        let mut events = Vec::new();
        for ListedEvent {
            mut event,
            raw_deadline,
        } in listed
        {
            event.signup_deadline = ctx.normalize_deadline(&raw_deadline)?;

            debug!("Accessing {}", event.link);
            let Some(detail_html) = ctx.fetch_detail(&event.link).await else {
                warn!("Skipping '{}': detail page unavailable", event.title);
                continue;
            };
            let Some(detail) = Self::extract_detail(&detail_html) else {
                warn!("Skipping '{}': detail page structure not recognized", event.title);
                continue;
            };

            let brief = std::mem::take(&mut event.brief_description);
            let (brief, full) =
                enrich::resolve_descriptions(ctx.gateway, brief, detail.description).await?;
            event.brief_description = brief;
            event.description = full;
            event.signup_link = detail.signup_link;
            debug!("Successfully added {}", event.title);
            events.push(event);
        }
        info!("Scraped {} events from Cordy", events.len());
        Ok(events)
    }
}
