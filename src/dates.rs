use chrono::NaiveDate;

/// Date formats the source sites are known to use, in the order they are
/// tried. First successful parse wins.
pub const KNOWN_FORMATS: [&str; 2] = [
    "%b %d, %Y", // SGInnovate: "Jul 05, 2025"
    "%B %d, %Y", // Cordy: "July 05, 2025"
];

/// Every recognized date is re-rendered in this single format.
pub const CANONICAL_FORMAT: &str = "%d %B %Y";

/// Outcome of normalizing a raw date string. An empty input is not the same
/// thing as one no known format matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateOutcome {
    NoDate,
    Canonical(String),
    Unparseable,
}

/// Standardize a scraped date string across source sites.
pub fn normalize(raw: &str) -> DateOutcome {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DateOutcome::NoDate;
    }
    for format in KNOWN_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return DateOutcome::Canonical(date.format(CANONICAL_FORMAT).to_string());
        }
    }
    DateOutcome::Unparseable
}
