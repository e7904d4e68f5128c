//! End-to-end runs: source → records → enriched set → selection
//!
//! Each run is a single synchronous pass. Nothing is shared between runs;
//! a new query builds a new `RaceOutcome`.

use std::path::Path;
use url::Url;

use crate::config::Config;
use crate::error::Result;
use crate::model::derive::ScoredRace;
use crate::model::runner::RunnerRecord;
use crate::model::select::RaceSelection;
use crate::racecard::fetch::PageFetcher;
use crate::racecard::normalize::{records_from_scrape, records_from_table};
use crate::racecard::scrape::scrape_racecard;
use crate::racecard::table::RunnerTable;

/// Enriched record set plus the selections derived from it. Display and
/// export both read from this one value.
#[derive(Debug, Clone)]
pub struct RaceOutcome {
    pub race: ScoredRace,
    pub selection: RaceSelection,
}

pub fn score_records(records: Vec<RunnerRecord>) -> Result<RaceOutcome> {
    let race = ScoredRace::score(records)?;
    let selection = RaceSelection::select(&race)?;
    Ok(RaceOutcome { race, selection })
}

fn delimiter(config: &Config) -> u8 {
    // Validated ASCII in `Config::validate`
    config.export.delimiter as u8
}

/// Score a delimited runner table from disk.
pub fn run_table<P: AsRef<Path>>(path: P, config: &Config) -> Result<RaceOutcome> {
    tracing::info!("Scoring table {:?}", path.as_ref());
    let table = RunnerTable::load(path, delimiter(config))?;
    let records = records_from_table(&table)?;
    score_records(records)
}

/// Fetch, scrape and score one racecard, optionally overlaying form data.
pub async fn run_scrape(
    fetcher: &dyn PageFetcher,
    url: &Url,
    config: &Config,
    form: Option<&RunnerTable>,
) -> Result<RaceOutcome> {
    tracing::info!("Scoring racecard {}", url);
    let runners = scrape_racecard(fetcher, url, &config.scrape).await?;
    let records = records_from_scrape(&runners, &config.defaults, form)?;
    score_records(records)
}

/// Load an optional form file for `run_scrape`.
pub fn load_form<P: AsRef<Path>>(path: Option<P>, config: &Config) -> Result<Option<RunnerTable>> {
    match path {
        Some(p) => Ok(Some(RunnerTable::load(p, delimiter(config))?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RacecardError;
    use crate::racecard::page::RacecardPage;
    use async_trait::async_trait;
    use std::io::Write;

    struct StaticFetcher {
        status_ok: bool,
        body: String,
    }

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, url: &Url) -> Result<RacecardPage> {
            if !self.status_ok {
                return Err(RacecardError::Transport(format!("HTTP 404 Not Found from {}", url)));
            }
            Ok(RacecardPage {
                url: url.to_string(),
                fetched_ts: 0,
                body: self.body.clone(),
            })
        }
    }

    fn row(name: &str, ts: &str) -> String {
        format!(
            r#"<div class="RC-runnerRow"><a class="RC-runnerName">{}</a><span class="RC-topspeed">{}</span></div>"#,
            name, ts
        )
    }

    fn url() -> Url {
        Url::parse("https://www.attheraces.com/racecard/Test/1").unwrap()
    }

    const SAMPLE: &str = "\
Horse,Speed,RanTo,Step-Up Suitability,Pedigree Stamina Flag,Softer Ground?,Form Recency,Trainer Travel (mi),Direction Match,Betfair Odds
Galileo's Dream,75,88,✅ Yes,✅,✅ Yes,1–3m,152,✅,6.0
Storm Signal,68,70,⚠️ Maybe,⚠️,⚠️ Maybe,0–1m,45,✅,9.5
Velvet Monarch,72,78,✅ Yes,✅,✅ Yes,3–6m,231,❌,4.5
Desert Light,80,82,❌ No,❌,❌ No,1–3m,88,✅,3.0
King's Intent,70,69,⚠️ Maybe,⚠️,⚠️ Maybe,1–3m,112,✅,8.0
";

    #[test]
    fn test_run_table_sample_card() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let outcome = run_table(file.path(), &Config::default()).unwrap();
        let sel = &outcome.selection;

        assert_eq!(sel.most_likely_winner.name(), "Galileo's Dream");
        assert_eq!(
            sel.most_likely_winner.metrics().verdict,
            "🆙 Trip suits. 🧬 Pedigree supports trip. 🌧️ Going suits. \
             🚛 Travelled far – trainer intent. ⚡ RanTo spike."
        );
        assert_eq!(sel.best_value_pick.name(), "Galileo's Dream");
        assert_eq!(sel.forecast, vec!["Galileo's Dream", "Velvet Monarch"]);
        // Storm Signal and Desert Light tie on delta 2 and keep file order
        assert_eq!(
            sel.tricast,
            vec!["Galileo's Dream", "Velvet Monarch", "Storm Signal"]
        );
        assert_eq!(
            sel.placepot,
            vec![
                "Galileo's Dream",
                "Velvet Monarch",
                "Storm Signal",
                "Desert Light",
                "King's Intent"
            ]
        );

        let fair: Vec<f64> = outcome
            .race
            .runners()
            .iter()
            .map(|r| r.metrics().fair_price)
            .collect();
        assert_eq!(fair, vec![3.0, 15.0, 7.0, 15.0, 15.0]);
    }

    #[test]
    fn test_run_table_missing_file() {
        let result = run_table("/nonexistent/race.csv", &Config::default());
        assert!(matches!(result, Err(RacecardError::Io(_))));
    }

    #[tokio::test]
    async fn test_run_scrape() {
        let body = format!(
            "<html>{}{}{}</html>",
            row("Dream Illusion", "79"),
            row("Soul Dance", "72"),
            row("Skyelight", "75")
        );
        let fetcher = StaticFetcher { status_ok: true, body };
        let form = RunnerTable::from_bytes(
            b"Horse,RanTo,Betfair Odds\nSoul Dance,84,8.0\n".to_vec(),
            b',',
        )
        .unwrap();

        let outcome = run_scrape(&fetcher, &url(), &Config::default(), Some(&form))
            .await
            .unwrap();

        assert_eq!(outcome.race.len(), 3);
        // Soul Dance: 84 - 72 = 12 -> fair 3.0, odds 8.0 is value
        assert_eq!(outcome.selection.most_likely_winner.name(), "Soul Dance");
        assert_eq!(outcome.selection.best_value_pick.name(), "Soul Dance");
        assert_eq!(
            outcome.selection.forecast,
            vec!["Soul Dance", "Dream Illusion"]
        );
    }

    #[tokio::test]
    async fn test_run_scrape_without_form_is_marked_estimated() {
        let body = format!(
            "<html>{}{}</html>",
            row("Dream Illusion", "79"),
            row("Soul Dance", "72")
        );
        let fetcher = StaticFetcher { status_ok: true, body };

        let outcome = run_scrape(&fetcher, &url(), &Config::default(), None)
            .await
            .unwrap();
        let selection = &outcome.selection;

        // Speed and RanTo both come from the topspeed: every delta is 0
        assert!(outcome.race.runners().iter().all(|r| r.delta() == 0.0));
        assert!(selection.ranking_estimated);
        assert!(selection.most_likely_winner.record().delta_is_estimated());
        assert!(!selection.value_pick_is_value_bet);

        let lines = crate::report::render_selection(selection);
        assert!(lines[0].starts_with("Most Likely Winner: Dream Illusion"));
        assert!(lines[0].contains("[estimated: RanTo,"));
        assert_eq!(
            lines.last().map(String::as_str),
            Some(crate::report::ESTIMATED_RANKING_NOTICE)
        );

        let json = crate::outputs::selection_json(selection).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["ranking_estimated"], true);
        assert_eq!(value["most_likely_winner"]["estimated"][0], "RanTo");
        assert_eq!(value["best_value_pick"]["name"], "Soul Dance");
    }

    #[tokio::test]
    async fn test_run_scrape_transport_error() {
        let fetcher = StaticFetcher {
            status_ok: false,
            body: String::new(),
        };
        let err = run_scrape(&fetcher, &url(), &Config::default(), None)
            .await
            .unwrap_err();
        assert!(err.is_no_data());
    }

    #[tokio::test]
    async fn test_run_scrape_empty_page() {
        let fetcher = StaticFetcher {
            status_ok: true,
            body: "<html><body>Racecard unavailable</body></html>".to_string(),
        };
        let err = run_scrape(&fetcher, &url(), &Config::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RacecardError::EmptyResult));
        assert!(!err.is_no_data());
    }
}
