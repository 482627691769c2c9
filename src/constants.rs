/// Source name constants to ensure consistency across the codebase.

// Source names (used in CLI and config)
pub const CORDY_SOURCE: &str = "cordy";
pub const SG_INNOVATE_SOURCE: &str = "sg_innovate";

/// Origin tag carried by every scraped record, distinguishing automated
/// web-scrape output from user-submitted records.
pub const WEB_ORIGIN: &str = "web";

/// Identity that newly inserted scraped records are attributed to.
pub const SERVICE_ACCOUNT: &str = "webscrape-service";

/// Get all supported source names
pub fn supported_sources() -> Vec<&'static str> {
    vec![CORDY_SOURCE, SG_INNOVATE_SOURCE]
}
