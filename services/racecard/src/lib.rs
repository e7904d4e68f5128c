pub mod config;
pub mod error;
pub mod model;
pub mod outputs;
pub mod pipeline;
pub mod racecard;
pub mod report;

pub use error::{RacecardError, Result};
