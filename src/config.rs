use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

const CONFIG_FILE: &str = "review_scraper";
const ENV_PREFIX: &str = "REVIEWS";

/// Runtime settings. Every field has a default so an empty environment works.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub browser: BrowserSettings,
    pub selectors: Selectors,
    pub pagination: PaginationSettings,
    pub output: OutputSettings,
    pub insight: InsightSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,
    /// Pinned so that the page renders dates in one predictable format.
    pub locale: String,
    /// Pause after each "load more" click to let new reviews render.
    pub settle_ms: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        BrowserSettings {
            headless: true,
            locale: "en-US".to_string(),
            settle_ms: 750,
        }
    }
}

impl BrowserSettings {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Structural queries used to find reviews and their fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub container: String,
    pub name: String,
    pub body: String,
    pub rating: String,
    /// Row holding reviewer name and date as siblings; the last child is the date.
    pub name_row: String,
    pub load_more_role: String,
    pub load_more_label: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Selectors {
            container: "div > section".to_string(),
            name: "header > span".to_string(),
            body: "p".to_string(),
            rating: "[role=\"img\"][aria-label]".to_string(),
            name_row: "header > span".to_string(),
            load_more_role: "button".to_string(),
            load_more_label: "Load more".to_string(),
        }
    }
}

/// What to do when the load-more control is present but the click fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    #[default]
    Stop,
    Retry,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    pub on_failure: FailurePolicy,
    /// Extra consecutive attempts allowed under `FailurePolicy::Retry`.
    pub max_retries: u32,
    pub max_rounds: Option<usize>,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        PaginationSettings {
            on_failure: FailurePolicy::Stop,
            max_retries: 2,
            max_rounds: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            dir: PathBuf::from("report"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InsightSettings {
    pub base_url: String,
    pub model: String,
    pub agent_name: String,
    pub poll_interval_ms: u64,
    pub timeout_secs: u64,
}

impl Default for InsightSettings {
    fn default() -> Self {
        InsightSettings {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            agent_name: "Review Analyst".to_string(),
            poll_interval_ms: 1000,
            timeout_secs: 600,
        }
    }
}

impl InsightSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Load `review_scraper.toml` (optional) then `REVIEWS_*` env overrides,
/// e.g. `REVIEWS_BROWSER__HEADLESS=false`.
pub fn load() -> Result<Settings> {
    Config::builder()
        .add_source(File::with_name(CONFIG_FILE).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to read configuration")?
        .try_deserialize()
        .context("Invalid configuration")
}
