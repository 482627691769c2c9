use crate::constants::{CORDY_SOURCE, SG_INNOVATE_SOURCE};
use crate::error::{Result, ScraperError};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub run: RunConfig,
    pub schedule: ScheduleConfig,
    pub gateway: GatewayConfig,
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub verbosity: Verbosity,
    pub interactive: bool,
    pub persist: bool,
    pub output_dir: String,
    pub sources: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Critical,
            interactive: false,
            persist: true,
            output_dir: "output".to_string(),
            sources: vec![CORDY_SOURCE.to_string(), SG_INNOVATE_SOURCE.to_string()],
        }
    }
}

/// Volume of the diagnostic channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Off,
    Critical,
    All,
}

impl Verbosity {
    /// Env-filter directive this verbosity maps to.
    pub fn filter_directive(&self) -> &'static str {
        match self {
            Verbosity::Off => "campus_scraper=error",
            Verbosity::Critical => "campus_scraper=warn",
            Verbosity::All => "campus_scraper=debug",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub interval_minutes: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { interval_minutes: 1440 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Fallback order for the generative service, most preferred first.
    pub models: Vec<String>,
    pub base_backoff_secs: u64,
    pub backoff_ceiling_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            models: vec![
                "gemini-2.0-flash".to_string(),
                "gemini-2.5-flash".to_string(),
                "gemini-2.5-flash-lite-preview-06-17".to_string(),
                "gemini-2.0-flash-lite".to_string(),
            ],
            base_backoff_secs: 25,
            backoff_ceiling_secs: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub listing_retry_delay_secs: u64,
    pub detail_max_attempts: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            listing_retry_delay_secs: 10,
            detail_max_attempts: 5,
        }
    }
}

impl Config {
    /// Load `config.toml` from the working directory. A missing file means
    /// defaults; an unreadable or invalid file is an error.
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        match fs::read_to_string(config_path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ScraperError::Config(format!(
                "Failed to read config file '{config_path}': {e}"
            ))),
        }
    }
}
