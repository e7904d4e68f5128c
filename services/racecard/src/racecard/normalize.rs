//! Turn scraped runners or table rows into uniform runner records

use std::collections::HashSet;

use crate::config::RunnerDefaults;
use crate::error::{RacecardError, Result};
use crate::model::runner::*;
use crate::racecard::page::ScrapedRunner;
use crate::racecard::table::{aliases, RunnerTable, HORSE_COLUMN, REQUIRED_FIELDS};

pub const COMMENT_COLUMN: &str = "Timeform Comment";
pub const TOPSPEED_COLUMN: &str = "TopSpeed";

fn invalid(field: RunnerField, row: usize, value: &str) -> RacecardError {
    RacecardError::InvalidValue {
        column: field.column().to_string(),
        row: row + 1,
        value: value.to_string(),
    }
}

fn parse_number(field: RunnerField, row: usize, raw: &str) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(invalid(field, row, raw)),
    }
}

fn parse_odds(row: usize, raw: &str) -> Result<f64> {
    let odds = parse_number(RunnerField::MarketOdds, row, raw)?;
    if odds <= 1.0 {
        return Err(invalid(RunnerField::MarketOdds, row, raw));
    }
    Ok(odds)
}

/// Apply one table cell to a record. The cell has already been found
/// non-empty.
fn apply_cell(record: &mut RunnerRecord, field: RunnerField, row: usize, raw: &str) -> Result<()> {
    match field {
        RunnerField::TopSpeed => {}
        RunnerField::Speed => record.speed = parse_number(field, row, raw)?,
        RunnerField::RanTo => record.ran_to = parse_number(field, row, raw)?,
        RunnerField::StepUp => {
            record.step_up = StepUp::parse(raw).ok_or_else(|| invalid(field, row, raw))?
        }
        RunnerField::PedigreeStamina => {
            record.pedigree_stamina = StaminaFlag::parse(raw).ok_or_else(|| invalid(field, row, raw))?
        }
        RunnerField::Ground => {
            record.ground = StaminaFlag::parse(raw).ok_or_else(|| invalid(field, row, raw))?
        }
        RunnerField::TrainerTravel => record.trainer_travel_miles = parse_number(field, row, raw)?,
        RunnerField::Direction => {
            record.direction = DirectionMatch::parse(raw).ok_or_else(|| invalid(field, row, raw))?
        }
        RunnerField::MarketOdds => record.market_odds = parse_odds(row, raw)?,
    }
    record.estimated.retain(|f| *f != field);
    Ok(())
}

fn blank_record(name: String, defaults: &RunnerDefaults) -> RunnerRecord {
    RunnerRecord {
        name,
        speed: 0.0,
        ran_to: 0.0,
        step_up: defaults.step_up,
        pedigree_stamina: defaults.pedigree_stamina,
        ground: defaults.ground,
        direction: defaults.direction,
        trainer_travel_miles: defaults.trainer_travel_miles,
        market_odds: defaults.market_odds,
        passthrough: Vec::new(),
        estimated: Vec::new(),
    }
}

fn warn_duplicates(records: &[RunnerRecord]) {
    let mut seen = HashSet::new();
    for r in records {
        if !seen.insert(r.name.to_lowercase()) {
            tracing::warn!("Duplicate runner name in race: {}", r.name);
        }
    }
}

/// Map every table row to a record. All required columns must exist and
/// every required cell must be filled.
pub fn records_from_table(table: &RunnerTable) -> Result<Vec<RunnerRecord>> {
    let horse_col = table.require_column(&[HORSE_COLUMN])?;
    let field_cols = REQUIRED_FIELDS
        .iter()
        .map(|f| Ok((*f, table.require_column(aliases(*f))?)))
        .collect::<Result<Vec<_>>>()?;
    let passthrough = table.passthrough_columns();

    if table.is_empty() {
        return Err(RacecardError::EmptyResult);
    }

    let defaults = RunnerDefaults::default();
    let mut records = Vec::with_capacity(table.len());

    for row in 0..table.len() {
        let missing = |column: &str| RacecardError::MissingField {
            column: column.to_string(),
            row: Some(row + 1),
        };

        let name = table.cell(row, horse_col).ok_or_else(|| missing(HORSE_COLUMN))?;
        let mut record = blank_record(name.to_string(), &defaults);

        for (field, col) in &field_cols {
            let raw = table.cell(row, *col).ok_or_else(|| missing(field.column()))?;
            apply_cell(&mut record, *field, row, raw)?;
        }

        record.passthrough = passthrough
            .iter()
            .filter_map(|col| {
                let value = table.cell(row, *col)?;
                Some((table.columns()[*col].clone(), value.to_string()))
            })
            .collect();

        records.push(record);
    }

    warn_duplicates(&records);
    tracing::info!("Normalized {} runners from table", records.len());
    Ok(records)
}

/// Map scraped runners to records. Speed and RanTo both start at the
/// topspeed; everything else comes from `defaults` and is marked estimated
/// until a matching `form` row supplies it.
pub fn records_from_scrape(
    runners: &[ScrapedRunner],
    defaults: &RunnerDefaults,
    form: Option<&RunnerTable>,
) -> Result<Vec<RunnerRecord>> {
    if runners.is_empty() {
        return Err(RacecardError::EmptyResult);
    }

    let form_horse_col = match form {
        Some(table) => Some(table.require_column(&[HORSE_COLUMN])?),
        None => None,
    };

    let mut records = Vec::with_capacity(runners.len());
    let mut matched_rows = HashSet::new();

    for runner in runners {
        let mut record = blank_record(runner.name.clone(), defaults);
        record.speed = runner.top_speed as f64;
        record.ran_to = runner.top_speed as f64;
        record.estimated = vec![
            RunnerField::RanTo,
            RunnerField::StepUp,
            RunnerField::PedigreeStamina,
            RunnerField::Ground,
            RunnerField::TrainerTravel,
            RunnerField::Direction,
            RunnerField::MarketOdds,
        ];
        if runner.top_speed_estimated {
            record.estimated.insert(0, RunnerField::TopSpeed);
            record.estimated.insert(1, RunnerField::Speed);
        }
        record.passthrough = vec![
            (COMMENT_COLUMN.to_string(), runner.comment.clone()),
            (TOPSPEED_COLUMN.to_string(), runner.top_speed.to_string()),
        ];

        if let (Some(table), Some(horse_col)) = (form, form_horse_col) {
            let row = (0..table.len()).find(|r| {
                table
                    .cell(*r, horse_col)
                    .map_or(false, |n| n.trim().eq_ignore_ascii_case(runner.name.trim()))
            });
            if let Some(row) = row {
                overlay_form_row(&mut record, table, row)?;
                matched_rows.insert(row);
            } else {
                tracing::debug!("No form row for {}", runner.name);
            }
        }

        records.push(record);
    }

    if let Some(table) = form {
        let unmatched = table.len() - matched_rows.len();
        if unmatched > 0 {
            tracing::warn!("{} form rows matched no scraped runner", unmatched);
        }
    }

    warn_duplicates(&records);
    let estimated = records.iter().filter(|r| !r.estimated.is_empty()).count();
    tracing::info!(
        "Normalized {} scraped runners ({} with estimated fields)",
        records.len(),
        estimated
    );
    Ok(records)
}

/// Replace defaults with whatever the form row supplies. A form Speed
/// replaces the topspeed-derived value.
fn overlay_form_row(record: &mut RunnerRecord, table: &RunnerTable, row: usize) -> Result<()> {
    for field in REQUIRED_FIELDS {
        let Some(col) = table.field_index(field) else {
            continue;
        };
        if let Some(raw) = table.cell(row, col) {
            apply_cell(record, field, row, raw)?;
        }
    }
    for col in table.passthrough_columns() {
        if let Some(value) = table.cell(row, col) {
            let column = table.columns()[col].clone();
            match record.passthrough.iter_mut().find(|(c, _)| *c == column) {
                Some(existing) => existing.1 = value.to_string(),
                None => record.passthrough.push((column, value.to_string())),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DERBY: &str = "\
Horse,Speed,RanTo,Step-Up Suitability,Pedigree Stamina Flag,Softer Ground?,Form Recency,Trainer Travel (mi),Direction Match,Betfair Odds
Galileo's Dream,75,88,✅ Yes,✅,✅ Yes,1–3m,152,✅,6.0
Storm Signal,68,70,⚠️ Maybe,⚠️,⚠️ Maybe,0–1m,45,✅,9.5
Velvet Monarch,72,78,✅ Yes,✅,✅ Yes,3–6m,231,❌,4.5
";

    fn table(csv: &str) -> RunnerTable {
        RunnerTable::from_bytes(csv.as_bytes().to_vec(), b',').unwrap()
    }

    fn scraped(name: &str, ts: u32, estimated: bool) -> ScrapedRunner {
        ScrapedRunner {
            name: name.to_string(),
            comment: "Keeps on".to_string(),
            top_speed: ts,
            top_speed_estimated: estimated,
        }
    }

    #[test]
    fn test_records_from_table() {
        let records = records_from_table(&table(DERBY)).unwrap();
        assert_eq!(records.len(), 3);

        let g = &records[0];
        assert_eq!(g.name, "Galileo's Dream");
        assert_eq!(g.speed, 75.0);
        assert_eq!(g.ran_to, 88.0);
        assert_eq!(g.step_up, StepUp::Yes);
        assert_eq!(g.pedigree_stamina, StaminaFlag::Good);
        assert_eq!(g.ground, StaminaFlag::Good);
        assert_eq!(g.trainer_travel_miles, 152.0);
        assert_eq!(g.direction, DirectionMatch::Match);
        assert_eq!(g.market_odds, 6.0);
        assert!(g.estimated.is_empty());
        assert_eq!(g.passthrough_value("Form Recency"), Some("1–3m"));

        assert_eq!(records[2].direction, DirectionMatch::Mismatch);
        assert_eq!(records[1].step_up, StepUp::Maybe);
    }

    #[test]
    fn test_missing_column_is_named() {
        let csv = "Horse,Speed,Step-Up Suitability,Pedigree Stamina Flag,Going Suitability,Trainer Travel (mi),Direction Match,Betfair Odds\nA,70,✅ Yes,✅,✅,100,✅,5.0\n";
        match records_from_table(&table(csv)) {
            Err(RacecardError::MissingField { column, row }) => {
                assert_eq!(column, "RanTo");
                assert_eq!(row, None);
            }
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_cell_names_row() {
        let csv = DERBY.replace("Storm Signal,68,70", "Storm Signal,68,");
        match records_from_table(&table(&csv)) {
            Err(RacecardError::MissingField { column, row }) => {
                assert_eq!(column, "RanTo");
                assert_eq!(row, Some(2));
            }
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_values() {
        let csv = DERBY.replace("Storm Signal,68", "Storm Signal,fast");
        assert!(matches!(
            records_from_table(&table(&csv)),
            Err(RacecardError::InvalidValue { ref column, row: 2, .. }) if column == "Speed"
        ));

        let csv = DERBY.replace(",9.5", ",1.0");
        assert!(matches!(
            records_from_table(&table(&csv)),
            Err(RacecardError::InvalidValue { ref column, .. }) if column == "Betfair Odds"
        ));

        let csv = DERBY.replace("⚠️ Maybe,⚠️,⚠️ Maybe", "perhaps,⚠️,⚠️ Maybe");
        assert!(matches!(
            records_from_table(&table(&csv)),
            Err(RacecardError::InvalidValue { ref value, .. }) if value == "perhaps"
        ));
    }

    #[test]
    fn test_header_only_is_empty_result() {
        let header = DERBY.lines().next().unwrap();
        let csv = format!("{}\n", header);
        assert!(matches!(
            records_from_table(&table(&csv)),
            Err(RacecardError::EmptyResult)
        ));
    }

    #[test]
    fn test_scraped_defaults_are_estimated() {
        let defaults = RunnerDefaults::default();
        let records = records_from_scrape(&[scraped("Skyelight", 74, false)], &defaults, None).unwrap();
        let r = &records[0];

        assert_eq!(r.speed, 74.0);
        assert_eq!(r.ran_to, 74.0);
        assert_eq!(r.step_up, StepUp::Maybe);
        assert_eq!(r.market_odds, 10.0);
        assert!(r.is_estimated(RunnerField::RanTo));
        assert!(r.is_estimated(RunnerField::MarketOdds));
        assert!(!r.is_estimated(RunnerField::Speed));
        assert!(!r.is_estimated(RunnerField::TopSpeed));
        assert_eq!(r.passthrough_value(COMMENT_COLUMN), Some("Keeps on"));
        assert_eq!(r.passthrough_value(TOPSPEED_COLUMN), Some("74"));
    }

    #[test]
    fn test_estimated_topspeed_marks_speed() {
        let records =
            records_from_scrape(&[scraped("Bintshuaa", 70, true)], &RunnerDefaults::default(), None).unwrap();
        assert!(records[0].is_estimated(RunnerField::TopSpeed));
        assert!(records[0].is_estimated(RunnerField::Speed));
    }

    #[test]
    fn test_form_overlay() {
        let form = table("Horse,RanTo,Betfair Odds,Trainer Travel (mi),Value Cutoff\nskyelight,86,7.5,,6.0\nNobody,90,3.0,,\n");
        let records = records_from_scrape(
            &[scraped("Skyelight", 74, false), scraped("Soul Dance", 70, false)],
            &RunnerDefaults::default(),
            Some(&form),
        )
        .unwrap();

        let sky = &records[0];
        assert_eq!(sky.speed, 74.0);
        assert_eq!(sky.ran_to, 86.0);
        assert_eq!(sky.market_odds, 7.5);
        assert!(!sky.is_estimated(RunnerField::RanTo));
        assert!(!sky.is_estimated(RunnerField::MarketOdds));
        // Empty form cell keeps the default
        assert!(sky.is_estimated(RunnerField::TrainerTravel));
        assert_eq!(sky.passthrough_value("Value Cutoff"), Some("6.0"));

        let soul = &records[1];
        assert_eq!(soul.ran_to, 70.0);
        assert!(soul.is_estimated(RunnerField::RanTo));
    }

    #[test]
    fn test_form_without_horse_column() {
        let form = table("Name,RanTo\nA,80\n");
        let result = records_from_scrape(&[scraped("A", 70, false)], &RunnerDefaults::default(), Some(&form));
        assert!(matches!(result, Err(RacecardError::MissingField { .. })));
    }

    #[test]
    fn test_no_scraped_runners_is_empty_result() {
        assert!(matches!(
            records_from_scrape(&[], &RunnerDefaults::default(), None),
            Err(RacecardError::EmptyResult)
        ));
    }
}
