//! Tabular racecard input (delimited text with a header row)

use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;

use crate::error::{RacecardError, Result};
use crate::model::runner::RunnerField;

pub const HORSE_COLUMN: &str = "Horse";

/// Columns the model derives itself. Present in re-ingested exports and
/// ignored on input.
pub const DERIVED_COLUMNS: &[&str] = &["Delta", "Fair Price", "Value Bet?", "Model Verdict", "Estimated"];

/// Accepted header names per field, canonical name first.
pub fn aliases(field: RunnerField) -> &'static [&'static str] {
    match field {
        RunnerField::TopSpeed => &["TopSpeed", "Top Speed"],
        RunnerField::Speed => &["Speed"],
        RunnerField::RanTo => &["RanTo", "Ran To"],
        RunnerField::StepUp => &["Step-Up Suitability", "Step Up Suitability"],
        RunnerField::PedigreeStamina => &["Pedigree Stamina Flag", "Pedigree Stamina"],
        RunnerField::Ground => &["Going Suitability", "Softer Ground?", "Ground Suitability"],
        RunnerField::TrainerTravel => &["Trainer Travel (mi)", "Trainer Travel"],
        RunnerField::Direction => &["Direction Match"],
        RunnerField::MarketOdds => &["Betfair Odds", "Market Odds"],
    }
}

/// Fields a tabular source must supply for every runner.
pub const REQUIRED_FIELDS: [RunnerField; 8] = [
    RunnerField::Speed,
    RunnerField::RanTo,
    RunnerField::StepUp,
    RunnerField::PedigreeStamina,
    RunnerField::Ground,
    RunnerField::TrainerTravel,
    RunnerField::Direction,
    RunnerField::MarketOdds,
];

fn header_eq(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// String cells of a delimited file, in file order.
#[derive(Debug, Clone)]
pub struct RunnerTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RunnerTable {
    pub fn load<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        tracing::debug!("Read {} bytes from {:?}", bytes.len(), path.as_ref());
        Self::from_bytes(bytes, delimiter)
    }

    pub fn from_bytes(bytes: Vec<u8>, delimiter: u8) -> Result<Self> {
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(RacecardError::EmptyResult);
        }

        // Schema inference off: every column is read as text and parsed here
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .map_parse_options(|opts| opts.with_separator(delimiter))
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;

        Self::from_frame(&df)
    }

    fn from_frame(df: &DataFrame) -> Result<Self> {
        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|c| c.to_string())
            .collect();

        let mut rows = vec![Vec::with_capacity(columns.len()); df.height()];
        for name in &columns {
            let cells = df.column(name)?.str()?;
            for (row_idx, row) in rows.iter_mut().enumerate() {
                let cell = cells
                    .get(row_idx)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string);
                row.push(cell);
            }
        }

        tracing::info!("Loaded table with {} rows, {} columns", rows.len(), columns.len());
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first column matching any of `names`.
    pub fn column_index(&self, names: &[&str]) -> Option<usize> {
        names
            .iter()
            .find_map(|name| self.columns.iter().position(|c| header_eq(c, name)))
    }

    pub fn field_index(&self, field: RunnerField) -> Option<usize> {
        self.column_index(aliases(field))
    }

    /// Like `column_index` but a missing column is `MissingField`.
    pub fn require_column(&self, names: &[&str]) -> Result<usize> {
        self.column_index(names).ok_or_else(|| RacecardError::MissingField {
            column: names.first().copied().unwrap_or_default().to_string(),
            row: None,
        })
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Columns that are neither a runner field nor derived output.
    pub fn passthrough_columns(&self) -> Vec<usize> {
        let known: Vec<usize> = std::iter::once(self.column_index(&[HORSE_COLUMN]))
            .chain(REQUIRED_FIELDS.iter().map(|f| self.field_index(*f)))
            .flatten()
            .collect();

        self.columns
            .iter()
            .enumerate()
            .filter(|(idx, name)| {
                !known.contains(idx) && !DERIVED_COLUMNS.iter().any(|d| header_eq(d, name))
            })
            .map(|(idx, _)| idx)
            .collect()
    }
}
