//! Extract runners from a desktop racecard page

use sha2::{Digest, Sha256};
use url::Url;

use crate::config::ScrapeConfig;
use crate::error::{RacecardError, Result};
use crate::racecard::fetch::PageFetcher;
use crate::racecard::html::{blocks_by_class, text_by_class};
use crate::racecard::page::{RacecardPage, ScrapedRunner, NO_COMMENT};

pub const RUNNER_ROW_CLASS: &str = "RC-runnerRow";
pub const RUNNER_NAME_CLASS: &str = "RC-runnerName";
pub const COMMENT_CLASS: &str = "RC-cardComment";
pub const TOPSPEED_CLASS: &str = "RC-topspeed";

/// Why a single runner block was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerSkip {
    MissingName,
    MissingTopSpeed,
    /// `topspeed_min..topspeed_max` is empty, so no estimate can be drawn.
    EmptyEstimateRange,
}

/// Digits of the topspeed text read as one number ("TS: 78" -> 78).
pub fn parse_top_speed(text: &str) -> Option<u32> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Stand-in topspeed within `[topspeed_min, topspeed_max)`, seeded from the
/// runner name so the same runner always gets the same estimate. `None` when
/// the range is empty.
pub fn estimate_top_speed(name: &str, config: &ScrapeConfig) -> Option<u32> {
    if config.topspeed_min >= config.topspeed_max {
        return None;
    }
    let digest = Sha256::digest(name.as_bytes());
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&digest[..8]);
    let mut rng = fastrand::Rng::with_seed(u64::from_le_bytes(seed));
    Some(rng.u32(config.topspeed_min..config.topspeed_max))
}

/// Parse one runner block.
pub fn parse_runner(block: &str, config: &ScrapeConfig) -> std::result::Result<ScrapedRunner, RunnerSkip> {
    let name = text_by_class(block, RUNNER_NAME_CLASS)
        .filter(|n| !n.is_empty())
        .ok_or(RunnerSkip::MissingName)?;

    let comment = text_by_class(block, COMMENT_CLASS)
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| NO_COMMENT.to_string());

    let (top_speed, top_speed_estimated) = match text_by_class(block, TOPSPEED_CLASS)
        .as_deref()
        .and_then(parse_top_speed)
    {
        Some(ts) => (ts, false),
        None if config.estimate_missing_topspeed => {
            let ts = estimate_top_speed(&name, config).ok_or(RunnerSkip::EmptyEstimateRange)?;
            tracing::warn!("No topspeed for {}, using estimate {}", name, ts);
            (ts, true)
        }
        None => return Err(RunnerSkip::MissingTopSpeed),
    };

    Ok(ScrapedRunner {
        name,
        comment,
        top_speed,
        top_speed_estimated,
    })
}

/// Every runner on the page. Blocks that fail to parse are skipped on their
/// own and never abort the page.
pub fn parse_racecard(html: &str, config: &ScrapeConfig) -> Vec<ScrapedRunner> {
    let blocks = blocks_by_class(html, RUNNER_ROW_CLASS);
    tracing::debug!("Found {} runner blocks", blocks.len());

    let mut runners = Vec::with_capacity(blocks.len());
    for (i, block) in blocks.iter().enumerate() {
        match parse_runner(block, config) {
            Ok(runner) => runners.push(runner),
            Err(skip) => tracing::warn!("Skipping runner block {}: {:?}", i, skip),
        }
    }
    runners
}

/// Extract runners from a fetched page. Zero runners is `EmptyResult`.
pub fn scrape_page(page: &RacecardPage, config: &ScrapeConfig) -> Result<Vec<ScrapedRunner>> {
    let runners = parse_racecard(&page.body, config);
    if runners.is_empty() {
        tracing::warn!("No runners found on {}", page.url);
        return Err(RacecardError::EmptyResult);
    }
    tracing::info!("Scraped {} runners from {}", runners.len(), page.url);
    Ok(runners)
}

/// Fetch and scrape one racecard.
pub async fn scrape_racecard(
    fetcher: &dyn PageFetcher,
    url: &Url,
    config: &ScrapeConfig,
) -> Result<Vec<ScrapedRunner>> {
    let page = fetcher.fetch(url).await?;
    scrape_page(&page, config)
}
