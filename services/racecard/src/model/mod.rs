//! Scoring model: derived metrics, suitability rules, verdicts and selections
//!
//! The model is a fixed rule table, applied as:
//! 1. Derive delta (`ranTo - speed`) per runner
//! 2. Evaluate suitability rules, fair-price tier and value flag
//! 3. Compose the verdict from the rule hits
//! 4. Rank by delta and extract bet selections

pub mod runner;
pub mod derive;
pub mod rules;
pub mod verdict;
pub mod select;

pub use runner::*;
pub use derive::*;
pub use rules::*;
pub use verdict::*;
pub use select::*;
