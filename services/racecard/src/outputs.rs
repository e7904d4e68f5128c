//! Export of the enriched record set (delimited text) and selection summary (JSON)

use polars::prelude::*;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::model::derive::ScoredRace;
use crate::model::runner::RunnerField;
use crate::model::select::RaceSelection;
use crate::racecard::table::HORSE_COLUMN;

pub const VALUE_YES: &str = "💰 YES";
pub const VALUE_NO: &str = "—";

/// Passthrough column names across all runners, first-seen order.
fn passthrough_columns(race: &ScoredRace) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for runner in race.runners() {
        for (column, _) in &runner.record().passthrough {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
    }
    columns
}

/// One row per runner in ingestion order, with every derived field.
pub fn export_frame(race: &ScoredRace) -> Result<DataFrame> {
    let runners = race.runners();

    let mut series = vec![Series::new(
        HORSE_COLUMN,
        runners.iter().map(|r| r.name()).collect::<Vec<_>>(),
    )];

    for column in passthrough_columns(race) {
        let values: Vec<Option<&str>> = runners
            .iter()
            .map(|r| r.record().passthrough_value(&column))
            .collect();
        series.push(Series::new(&column, values));
    }

    let speed: Vec<f64> = runners.iter().map(|r| r.record().speed).collect();
    let ran_to: Vec<f64> = runners.iter().map(|r| r.record().ran_to).collect();
    let delta: Vec<f64> = runners.iter().map(|r| r.metrics().delta).collect();
    let step_up: Vec<&str> = runners.iter().map(|r| r.record().step_up.label()).collect();
    let pedigree: Vec<&str> = runners
        .iter()
        .map(|r| r.record().pedigree_stamina.label())
        .collect();
    let ground: Vec<&str> = runners.iter().map(|r| r.record().ground.label()).collect();
    let travel: Vec<f64> = runners
        .iter()
        .map(|r| r.record().trainer_travel_miles)
        .collect();
    let direction: Vec<&str> = runners.iter().map(|r| r.record().direction.label()).collect();
    let odds: Vec<f64> = runners.iter().map(|r| r.record().market_odds).collect();
    let fair_price: Vec<f64> = runners.iter().map(|r| r.metrics().fair_price).collect();
    let value_bet: Vec<&str> = runners
        .iter()
        .map(|r| if r.metrics().is_value_bet { VALUE_YES } else { VALUE_NO })
        .collect();
    let verdict: Vec<&str> = runners.iter().map(|r| r.metrics().verdict.as_str()).collect();
    let estimated: Vec<String> = runners
        .iter()
        .map(|r| r.record().estimated_columns().join("; "))
        .collect();

    series.extend([
        Series::new(RunnerField::Speed.column(), speed),
        Series::new(RunnerField::RanTo.column(), ran_to),
        Series::new("Delta", delta),
        Series::new(RunnerField::StepUp.column(), step_up),
        Series::new(RunnerField::PedigreeStamina.column(), pedigree),
        Series::new(RunnerField::Ground.column(), ground),
        Series::new(RunnerField::TrainerTravel.column(), travel),
        Series::new(RunnerField::Direction.column(), direction),
        Series::new(RunnerField::MarketOdds.column(), odds),
        Series::new("Fair Price", fair_price),
        Series::new("Value Bet?", value_bet),
        Series::new("Model Verdict", verdict),
        Series::new("Estimated", estimated),
    ]);

    Ok(DataFrame::new(series)?)
}

/// Write the enriched set as UTF-8 delimited text with a header row.
pub fn write_csv<W: Write>(race: &ScoredRace, writer: &mut W, delimiter: u8) -> Result<()> {
    let mut df = export_frame(race)?;
    CsvWriter::new(writer)
        .include_header(true)
        .with_separator(delimiter)
        .finish(&mut df)?;
    Ok(())
}

pub fn write_csv_file<P: AsRef<Path>>(race: &ScoredRace, path: P, delimiter: u8) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let mut file = std::fs::File::create(path)?;
    write_csv(race, &mut file, delimiter)?;

    tracing::info!("Wrote {} runners to {:?}", race.len(), path);
    Ok(())
}

/// Selection summary as pretty JSON.
pub fn selection_json(selection: &RaceSelection) -> serde_json::Result<String> {
    let summary = serde_json::json!({
        "most_likely_winner": {
            "name": selection.most_likely_winner.name(),
            "delta": selection.most_likely_winner.metrics().delta,
            "verdict": selection.most_likely_winner.metrics().verdict,
            "estimated": selection.most_likely_winner.record().estimated_columns(),
        },
        "best_value_pick": {
            "name": selection.best_value_pick.name(),
            "fair_price": selection.best_value_pick.metrics().fair_price,
            "market_odds": selection.best_value_pick.record().market_odds,
            "is_value_bet": selection.value_pick_is_value_bet,
            "estimated": selection.best_value_pick.record().estimated_columns(),
        },
        "forecast": selection.forecast,
        "tricast": selection.tricast,
        "placepot": selection.placepot,
        "ranking_estimated": selection.ranking_estimated,
    });
    serde_json::to_string_pretty(&summary)
}
