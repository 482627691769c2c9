//! SGInnovate source adapter.
//!
//! The listing page carries title, link, image, deadline, signup link and
//! tags; the detail page adds both description variants, the schedule and
//! the venue text that feeds mode inference. Start/end times are too
//! inconsistent to extract, so the schedule is kept verbatim as additional
//! information. The site exposes no organiser.

use super::{collapse_tags, EventSource, HarvestContext, ListedEvent};
use crate::constants::SG_INNOVATE_SOURCE;
use crate::error::Result;
use crate::gateway::enrich;
use crate::text::extract_text;
use crate::types::ScrapedEvent;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};

const LISTING_URL: &str = "https://www.sginnovate.com/events";
const BASE_URL: &str = "https://www.sginnovate.com";

pub struct SgInnovateSource;

impl Default for SgInnovateSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Fields only the detail page carries.
#[derive(Debug, Clone)]
pub struct SgInnovateDetail {
    pub brief_description: String,
    pub description: String,
    pub schedule: String,
    pub location: String,
}

impl SgInnovateSource {
    pub fn new() -> Self {
        Self
    }

    /// Extract partial records from the listing page. Promotional cards are
    /// recognized by their banner image and skipped; cards without a title
    /// are dropped.
    pub fn parse_listing(html: &str) -> Vec<ListedEvent> {
        let document = Html::parse_document(html);
        let card_selector = Selector::parse(".col-md-6.col-lg-4.mb-4").unwrap();
        let promo_selector = Selector::parse("img[src*=\"Host-an-event\"]").unwrap();
        let title_selector = Selector::parse("h4 > a").unwrap();
        let image_selector = Selector::parse("img").unwrap();
        let date_selector = Selector::parse("p").unwrap();
        let signup_selector = Selector::parse(".register-hld a").unwrap();
        let tag_selector = Selector::parse("a[href*=\"search-events\"]").unwrap();

        let mut listed = Vec::new();
        for card in document.select(&card_selector) {
            if card.select(&promo_selector).next().is_some() {
                debug!("Skipping promotional card");
                continue;
            }
            let Some(title_link) = card.select(&title_selector).next() else {
                continue;
            };
            let title = title_link.text().collect::<String>().trim().to_string();
            if title.is_empty() {
                debug!("Skipping listing card with no title");
                continue;
            }
            let Some(href) = title_link.value().attr("href") else {
                warn!("Skipping '{}': card has no detail link", title);
                continue;
            };

            let mut event = ScrapedEvent::new(title, format!("{BASE_URL}{href}"));
            event.image = card
                .select(&image_selector)
                .next()
                .and_then(|el| el.value().attr("src"))
                .map(str::to_string);
            event.signup_link = card
                .select(&signup_selector)
                .next()
                .and_then(|el| el.value().attr("href"))
                .unwrap_or_default()
                .to_string();
            event.tags = collapse_tags(
                card.select(&tag_selector)
                    .map(|el| el.text().collect::<String>().trim().to_string())
                    .filter(|tag| !tag.is_empty() && !tag.starts_with('+'))
                    .collect(),
            );

            let raw_deadline = card
                .select(&date_selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .unwrap_or_default();

            listed.push(ListedEvent { event, raw_deadline });
        }
        listed
    }

    /// Pull the description variants, schedule and venue text out of a
    /// detail page. The fields live at fixed structural positions; a page
    /// missing any of them is not an event detail page.
    pub fn extract_detail(html: &str) -> Option<SgInnovateDetail> {
        let document = Html::parse_document(html);
        let article = "#content > section:nth-of-type(1) > div > div > div > div > div > div:nth-of-type(2) > article";
        let brief_selector =
            Selector::parse(&format!("{article} > div:nth-of-type(1)")).unwrap();
        let description_selector = Selector::parse(&format!(
            "{article} > div:nth-of-type(3) > section:nth-of-type(1)"
        ))
        .unwrap();
        let schedule_selector = Selector::parse(&format!(
            "{article} > div:nth-of-type(3) > section:nth-of-type(2)"
        ))
        .unwrap();
        let location_selector = Selector::parse(
            "#content > section:nth-of-type(1) > div > div > div > header > div:nth-of-type(3) \
             > div > div:nth-of-type(1) > div > div:nth-of-type(2)",
        )
        .unwrap();

        let brief_description = extract_text(document.select(&brief_selector).next()?);
        let description = extract_text(document.select(&description_selector).next()?);
        let schedule = extract_text(document.select(&schedule_selector).next()?);
        let location = extract_text(document.select(&location_selector).next()?);
        Some(SgInnovateDetail {
            brief_description,
            description,
            schedule,
            location,
        })
    }
}

#[async_trait::async_trait]
impl EventSource for SgInnovateSource {
    fn source_name(&self) -> &'static str {
        SG_INNOVATE_SOURCE
    }

    #[instrument(skip(self, ctx))]
    async fn scrape(&self, ctx: &HarvestContext<'_>) -> Result<Vec<ScrapedEvent>> {
        info!("Fetching events from SGInnovate");
        let listing_html = ctx.fetch_listing(LISTING_URL).await?;
        let listed = Self::parse_listing(&listing_html);
        info!("Found {} event cards on the SGInnovate listing", listed.len());

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

            let (brief, full) = enrich::resolve_descriptions(
                ctx.gateway,
                detail.brief_description,
                detail.description,
            )
            .await?;
            event.brief_description = brief;
            event.description = full;
            event.additional_information = Some(detail.schedule);
            event.mode = enrich::infer_mode(ctx.gateway, &detail.location).await?;
            event.location = Some(detail.location);
            debug!("Successfully added {}", event.title);
            events.push(event);
        }
        info!("Scraped {} events from SGInnovate", events.len());
        Ok(events)
    }
}
