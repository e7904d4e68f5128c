use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::model::runner::{DirectionMatch, StaminaFlag, StepUp};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub defaults: RunnerDefaults,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeConfig {
    /// Substitute an estimated topspeed when the racecard has none. When off
    /// the runner is dropped instead.
    #[serde(default = "default_true")]
    pub estimate_missing_topspeed: bool,
    #[serde(default = "default_topspeed_min")]
    pub topspeed_min: u32,
    /// Exclusive upper bound.
    #[serde(default = "default_topspeed_max")]
    pub topspeed_max: u32,
}

/// Fallbacks for scraped runners that have no form data.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerDefaults {
    #[serde(default = "default_market_odds")]
    pub market_odds: f64,
    #[serde(default)]
    pub trainer_travel_miles: f64,
    #[serde(default = "default_step_up")]
    pub step_up: StepUp,
    #[serde(default = "default_stamina")]
    pub pedigree_stamina: StaminaFlag,
    #[serde(default = "default_stamina")]
    pub ground: StaminaFlag,
    #[serde(default = "default_direction")]
    pub direction: DirectionMatch,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config from {:?}", path.as_ref()))?;
        let config: Config = toml::from_str(&content)
            .context("Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fetch.timeout_secs == 0 {
            anyhow::bail!("fetch.timeout_secs must be positive");
        }
        if self.scrape.topspeed_min >= self.scrape.topspeed_max {
            anyhow::bail!(
                "scrape.topspeed_min ({}) must be below topspeed_max ({})",
                self.scrape.topspeed_min,
                self.scrape.topspeed_max
            );
        }
        if !(self.defaults.market_odds > 1.0) {
            anyhow::bail!("defaults.market_odds must be greater than 1.0");
        }
        if !self.export.delimiter.is_ascii() {
            anyhow::bail!("export.delimiter must be a single ASCII character");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            scrape: ScrapeConfig::default(),
            defaults: RunnerDefaults::default(),
            export: ExportConfig::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            estimate_missing_topspeed: true,
            topspeed_min: default_topspeed_min(),
            topspeed_max: default_topspeed_max(),
        }
    }
}

impl Default for RunnerDefaults {
    fn default() -> Self {
        Self {
            market_odds: default_market_odds(),
            trainer_travel_miles: 0.0,
            step_up: default_step_up(),
            pedigree_stamina: default_stamina(),
            ground: default_stamina(),
            direction: default_direction(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            file_name: default_file_name(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_true() -> bool {
    true
}

fn default_topspeed_min() -> u32 {
    68
}

fn default_topspeed_max() -> u32 {
    80
}

fn default_market_odds() -> f64 {
    10.0
}

fn default_step_up() -> StepUp {
    StepUp::Maybe
}

fn default_stamina() -> StaminaFlag {
    StaminaFlag::Mixed
}

fn default_direction() -> DirectionMatch {
    DirectionMatch::Match
}

fn default_delimiter() -> char {
    ','
}

fn default_file_name() -> String {
    "race_model_output.csv".to_string()
}
