//! Error kinds surfaced by the racecard pipeline

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RacecardError {
    /// Network failure, timeout or a non-200 response.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid racecard URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Ingestion succeeded but produced zero usable runners.
    #[error("No runners found")]
    EmptyResult,

    #[error("Missing field '{column}'{}", row_suffix(.row))]
    MissingField { column: String, row: Option<usize> },

    #[error("Invalid value '{value}' in column '{column}' at row {row}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Selection needs {required} runners, only {available} available")]
    InsufficientRunners { required: usize, available: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Table error: {0}")]
    Table(#[from] polars::prelude::PolarsError),
}

impl RacecardError {
    /// True when nothing was retrieved at all, as opposed to data that came
    /// back empty.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::InvalidUrl { .. })
    }

    /// Short message for the user distinguishing the two "cannot proceed" states.
    pub fn user_message(&self) -> String {
        if self.is_no_data() {
            format!("Failed to retrieve data ({}). Please check the URL or try another race.", self)
        } else if matches!(self, Self::EmptyResult) {
            "Data retrieved but no runners were found.".to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<reqwest::Error> for RacecardError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Transport(format!("request timed out: {}", e))
        } else {
            Self::Transport(e.to_string())
        }
    }
}

fn row_suffix(row: &Option<usize>) -> String {
    match row {
        Some(r) => format!(" at row {}", r),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, RacecardError>;
