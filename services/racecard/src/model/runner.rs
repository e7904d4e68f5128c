//! Core runner types

use serde::{Deserialize, Serialize};

/// Whether the step up in trip suits the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepUp {
    Yes,
    No,
    Maybe,
}

/// Three-way suitability used for pedigree stamina and ground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaminaFlag {
    Good,
    Mixed,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectionMatch {
    Match,
    Mismatch,
}

/// Normalized vocabulary shared by all categorical columns. Racecards mark
/// values with emoji, words, or both ("✅ Yes", "✅", "Yes").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Positive,
    Neutral,
    Negative,
}

fn parse_mark(raw: &str) -> Option<Mark> {
    let s = raw.trim();
    if s.contains('✅') {
        return Some(Mark::Positive);
    }
    if s.contains('❌') {
        return Some(Mark::Negative);
    }
    if s.contains('⚠') {
        return Some(Mark::Neutral);
    }
    match s.to_lowercase().as_str() {
        "yes" | "good" | "match" | "y" => Some(Mark::Positive),
        "maybe" | "mixed" | "?" => Some(Mark::Neutral),
        "no" | "poor" | "mismatch" | "n" => Some(Mark::Negative),
        _ => None,
    }
}

impl StepUp {
    pub fn parse(raw: &str) -> Option<Self> {
        parse_mark(raw).map(|m| match m {
            Mark::Positive => StepUp::Yes,
            Mark::Neutral => StepUp::Maybe,
            Mark::Negative => StepUp::No,
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            StepUp::Yes => "✅ Yes",
            StepUp::No => "❌ No",
            StepUp::Maybe => "⚠️ Maybe",
        }
    }
}

impl StaminaFlag {
    pub fn parse(raw: &str) -> Option<Self> {
        parse_mark(raw).map(|m| match m {
            Mark::Positive => StaminaFlag::Good,
            Mark::Neutral => StaminaFlag::Mixed,
            Mark::Negative => StaminaFlag::Poor,
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            StaminaFlag::Good => "✅",
            StaminaFlag::Mixed => "⚠️",
            StaminaFlag::Poor => "❌",
        }
    }
}

impl DirectionMatch {
    pub fn parse(raw: &str) -> Option<Self> {
        match parse_mark(raw)? {
            Mark::Positive => Some(DirectionMatch::Match),
            Mark::Negative => Some(DirectionMatch::Mismatch),
            Mark::Neutral => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DirectionMatch::Match => "✅",
            DirectionMatch::Mismatch => "❌",
        }
    }
}

/// Fields that can be filled from configured defaults or an estimate rather
/// than observed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RunnerField {
    TopSpeed,
    Speed,
    RanTo,
    StepUp,
    PedigreeStamina,
    Ground,
    TrainerTravel,
    Direction,
    MarketOdds,
}

impl RunnerField {
    pub fn column(&self) -> &'static str {
        match self {
            RunnerField::TopSpeed => "TopSpeed",
            RunnerField::Speed => "Speed",
            RunnerField::RanTo => "RanTo",
            RunnerField::StepUp => "Step-Up Suitability",
            RunnerField::PedigreeStamina => "Pedigree Stamina Flag",
            RunnerField::Ground => "Going Suitability",
            RunnerField::TrainerTravel => "Trainer Travel (mi)",
            RunnerField::Direction => "Direction Match",
            RunnerField::MarketOdds => "Betfair Odds",
        }
    }
}

/// One competitor in a race, as produced by a normalization pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerRecord {
    pub name: String,
    pub speed: f64,
    pub ran_to: f64,
    pub step_up: StepUp,
    pub pedigree_stamina: StaminaFlag,
    pub ground: StaminaFlag,
    pub direction: DirectionMatch,
    pub trainer_travel_miles: f64,
    pub market_odds: f64,
    /// Source columns carried through to the export untouched, in input order.
    #[serde(default)]
    pub passthrough: Vec<(String, String)>,
    /// Fields that hold an estimate or configured default.
    #[serde(default)]
    pub estimated: Vec<RunnerField>,
}

impl RunnerRecord {
    pub fn is_estimated(&self, field: RunnerField) -> bool {
        self.estimated.contains(&field)
    }

    /// Delta, and therefore rank, rests on an estimated Speed or RanTo.
    pub fn delta_is_estimated(&self) -> bool {
        self.is_estimated(RunnerField::Speed) || self.is_estimated(RunnerField::RanTo)
    }

    pub fn estimated_columns(&self) -> Vec<&'static str> {
        self.estimated.iter().map(|f| f.column()).collect()
    }

    pub fn passthrough_value(&self, column: &str) -> Option<&str> {
        self.passthrough
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_emoji_and_words() {
        assert_eq!(StepUp::parse("✅ Yes"), Some(StepUp::Yes));
        assert_eq!(StepUp::parse("⚠️ Maybe"), Some(StepUp::Maybe));
        assert_eq!(StepUp::parse("❌ No"), Some(StepUp::No));
        assert_eq!(StepUp::parse("yes"), Some(StepUp::Yes));

        assert_eq!(StaminaFlag::parse("✅"), Some(StaminaFlag::Good));
        assert_eq!(StaminaFlag::parse("⚠️"), Some(StaminaFlag::Mixed));
        assert_eq!(StaminaFlag::parse("Poor"), Some(StaminaFlag::Poor));

        assert_eq!(DirectionMatch::parse("✅"), Some(DirectionMatch::Match));
        assert_eq!(DirectionMatch::parse("Mismatch"), Some(DirectionMatch::Mismatch));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(StepUp::parse("sometimes"), None);
        assert_eq!(StaminaFlag::parse(""), None);
        assert_eq!(DirectionMatch::parse("⚠️"), None);
    }

    #[test]
    fn test_labels_parse_back() {
        for v in [StepUp::Yes, StepUp::No, StepUp::Maybe] {
            assert_eq!(StepUp::parse(v.label()), Some(v));
        }
        for v in [StaminaFlag::Good, StaminaFlag::Mixed, StaminaFlag::Poor] {
            assert_eq!(StaminaFlag::parse(v.label()), Some(v));
        }
    }

    #[test]
    fn test_delta_is_estimated() {
        let mut record = RunnerRecord {
            name: "Soul Dance".to_string(),
            speed: 72.0,
            ran_to: 72.0,
            step_up: StepUp::Maybe,
            pedigree_stamina: StaminaFlag::Mixed,
            ground: StaminaFlag::Mixed,
            direction: DirectionMatch::Match,
            trainer_travel_miles: 0.0,
            market_odds: 10.0,
            passthrough: vec![],
            estimated: vec![RunnerField::MarketOdds],
        };
        assert!(!record.delta_is_estimated());
        assert_eq!(record.estimated_columns(), vec!["Betfair Odds"]);

        record.estimated.push(RunnerField::RanTo);
        assert!(record.delta_is_estimated());
    }
}
