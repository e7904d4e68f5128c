use serde::{Deserialize, Serialize};

/// Raw racecard page as retrieved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RacecardPage {
    pub url: String,
    pub fetched_ts: i64, // epoch ms
    pub body: String,
}

/// One runner extracted from a racecard page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedRunner {
    pub name: String,
    pub comment: String,
    pub top_speed: u32,
    /// True when the page had no usable topspeed and the value was estimated.
    pub top_speed_estimated: bool,
}

pub const NO_COMMENT: &str = "No comment";
