//! Plain-text rendering of a race selection

use crate::model::derive::EnrichedRunner;
use crate::model::select::RaceSelection;

pub const ESTIMATED_RANKING_NOTICE: &str =
    "⚠️ Ranking uses estimated Speed/RanTo (no form data). Supply a form table for observed values.";

/// Fair prices are tier values, always one decimal.
fn format_price(v: f64) -> String {
    format!("{:.1}", v)
}

/// Market odds as quoted, to two decimals.
fn format_odds(v: f64) -> String {
    format!("{:.2}", v)
}

fn estimated_suffix(runner: &EnrichedRunner) -> String {
    let columns = runner.record().estimated_columns();
    if columns.is_empty() {
        String::new()
    } else {
        format!(" [estimated: {}]", columns.join(", "))
    }
}

fn runner_line(label: &str, runner: &EnrichedRunner) -> String {
    let verdict = &runner.metrics().verdict;
    let line = if verdict.is_empty() {
        format!("{}: {}", label, runner.name())
    } else {
        format!("{}: {} — {}", label, runner.name(), verdict)
    };
    line + estimated_suffix(runner).as_str()
}

/// Lines for the selection summary, in display order.
pub fn render_selection(selection: &RaceSelection) -> Vec<String> {
    let value = &selection.best_value_pick;
    let value_label = if selection.value_pick_is_value_bet {
        "Value Bet"
    } else {
        "Value Bet (no runner above fair price, runner-up shown)"
    };

    let mut lines = vec![
        runner_line("Most Likely Winner", &selection.most_likely_winner),
        format!(
            "{}: {} — Back if over {} (currently {}){}",
            value_label,
            value.name(),
            format_price(value.metrics().fair_price),
            format_odds(value.record().market_odds),
            estimated_suffix(value),
        ),
        format!("Forecast: {}", selection.forecast.join(" > ")),
        format!("Tricast: {}", selection.tricast.join(" > ")),
        format!("Placepot Picks: {}", selection.placepot.join(", ")),
    ];
    if selection.ranking_estimated {
        lines.push(ESTIMATED_RANKING_NOTICE.to_string());
    }
    lines
}

/// One line per runner: name, delta, fair price, odds, value flag, verdict.
pub fn render_runners<'a, I>(runners: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a EnrichedRunner>,
{
    runners
        .into_iter()
        .map(|r| {
            let m = r.metrics();
            format!(
                "{:<24} delta={:>6.1} fair={:>5} odds={:>7} {:<5} {}{}",
                r.name(),
                m.delta,
                format_price(m.fair_price),
                format_odds(r.record().market_odds),
                if m.is_value_bet { "VALUE" } else { "" },
                m.verdict,
                estimated_suffix(r)
            )
            .trim_end()
            .to_string()
        })
        .collect()
}
