//! Racecard ingestion: fetch → scrape/table → normalized runner records
//!
//! Two sources feed the model:
//! 1. A desktop racecard page, fetched once with a bounded timeout and
//!    scraped for its repeating runner blocks
//! 2. A delimited table with one row per runner

pub mod page;
pub mod fetch;
pub mod html;
pub mod scrape;
pub mod table;
pub mod normalize;

pub use page::*;
pub use fetch::*;
pub use scrape::*;
pub use table::*;
pub use normalize::*;
