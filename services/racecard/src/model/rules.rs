//! Suitability rules, fair-price tiers and the value flag
//!
//! Every rule is an independent predicate over one record and its delta.
//! `Rule::ALL` fixes the priority order used when composing verdicts.

use serde::{Deserialize, Serialize};

use crate::model::runner::{RunnerRecord, StaminaFlag, StepUp};

/// Trainer travel beyond this many miles signals intent.
pub const TRAVEL_THRESHOLD_MILES: f64 = 150.0;

/// Delta above this is a RanTo spike.
pub const SPIKE_THRESHOLD: f64 = 10.0;

/// `(minimum delta, fair price)` checked top-down, first match wins.
pub const FAIR_PRICE_TIERS: [(f64, f64); 4] = [(12.0, 3.0), (9.0, 5.0), (6.0, 7.0), (3.0, 10.0)];

/// Fair price when delta is below every tier.
pub const FAIR_PRICE_FLOOR: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rule {
    StepUp,
    Pedigree,
    Ground,
    Travel,
    Spike,
}

impl Rule {
    /// Priority order; verdict phrases always follow it.
    pub const ALL: [Rule; 5] = [
        Rule::StepUp,
        Rule::Pedigree,
        Rule::Ground,
        Rule::Travel,
        Rule::Spike,
    ];

    pub fn holds(&self, record: &RunnerRecord, delta: f64) -> bool {
        match self {
            Rule::StepUp => record.step_up == StepUp::Yes,
            Rule::Pedigree => record.pedigree_stamina == StaminaFlag::Good,
            Rule::Ground => record.ground == StaminaFlag::Good,
            Rule::Travel => record.trainer_travel_miles > TRAVEL_THRESHOLD_MILES,
            Rule::Spike => delta > SPIKE_THRESHOLD,
        }
    }

    pub fn phrase(&self) -> &'static str {
        match self {
            Rule::StepUp => "🆙 Trip suits.",
            Rule::Pedigree => "🧬 Pedigree supports trip.",
            Rule::Ground => "🌧️ Going suits.",
            Rule::Travel => "🚛 Travelled far – trainer intent.",
            Rule::Spike => "⚡ RanTo spike.",
        }
    }
}

/// Rules that hold for a record, in priority order.
pub fn evaluate(record: &RunnerRecord, delta: f64) -> Vec<Rule> {
    Rule::ALL
        .iter()
        .copied()
        .filter(|rule| rule.holds(record, delta))
        .collect()
}

/// Tiered fair price for a delta. Tier edges are inclusive at the lower bound.
pub fn fair_price(delta: f64) -> f64 {
    FAIR_PRICE_TIERS
        .iter()
        .find(|(min_delta, _)| delta >= *min_delta)
        .map(|(_, price)| *price)
        .unwrap_or(FAIR_PRICE_FLOOR)
}

/// Market odds strictly above the fair price.
pub fn is_value_bet(market_odds: f64, fair_price: f64) -> bool {
    market_odds > fair_price
}
