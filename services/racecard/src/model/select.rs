//! Rank runners by delta and extract bet selections

use serde::Serialize;

use crate::error::{RacecardError, Result};
use crate::model::derive::{EnrichedRunner, ScoredRace};
use crate::model::runner::{StaminaFlag, StepUp};

pub const FORECAST_SIZE: usize = 2;
pub const TRICAST_SIZE: usize = 3;
pub const PLACEPOT_SIZE: usize = 6;

/// Runners ordered by delta descending. The sort is stable, so equal deltas
/// keep their ingestion order.
pub fn rank(race: &ScoredRace) -> Vec<&EnrichedRunner> {
    let mut ranked: Vec<&EnrichedRunner> = race.runners().iter().collect();
    ranked.sort_by(|a, b| b.delta().total_cmp(&a.delta()));
    ranked
}

#[derive(Debug, Clone, Serialize)]
pub struct RaceSelection {
    pub most_likely_winner: EnrichedRunner,
    pub best_value_pick: EnrichedRunner,
    /// Whether the value pick is a genuine value bet or the runner-up fallback.
    pub value_pick_is_value_bet: bool,
    pub forecast: Vec<String>,
    pub tricast: Vec<String>,
    pub placepot: Vec<String>,
    /// Some runner's delta rests on an estimated Speed or RanTo, so the order
    /// above is not backed by observed form.
    pub ranking_estimated: bool,
}

impl RaceSelection {
    pub fn select(race: &ScoredRace) -> Result<Self> {
        let ranked = rank(race);
        let most_likely_winner = match ranked.first() {
            Some(r) => (*r).clone(),
            None => return Err(RacecardError::EmptyResult),
        };

        let (best_value_pick, value_pick_is_value_bet) =
            match ranked.iter().find(|r| r.metrics().is_value_bet) {
                Some(r) => ((*r).clone(), true),
                // Fall back to the runner-up, never the winner again
                None => match ranked.get(1) {
                    Some(r) => ((*r).clone(), false),
                    None => {
                        return Err(RacecardError::InsufficientRunners {
                            required: 2,
                            available: ranked.len(),
                        })
                    }
                },
            };

        let selection = Self {
            most_likely_winner,
            best_value_pick,
            value_pick_is_value_bet,
            forecast: top_names(&ranked, FORECAST_SIZE),
            tricast: top_names(&ranked, TRICAST_SIZE),
            placepot: top_names(&ranked, PLACEPOT_SIZE),
            ranking_estimated: ranked.iter().any(|r| r.record().delta_is_estimated()),
        };

        if selection.ranking_estimated {
            tracing::warn!("Ranking rests on estimated Speed/RanTo for at least one runner");
        }

        tracing::info!(
            "Selected winner={} value={} forecast={:?}",
            selection.most_likely_winner.name(),
            selection.best_value_pick.name(),
            selection.forecast
        );

        Ok(selection)
    }
}

/// Names of the first `n` ranked runners, or all of them when the field is
/// smaller than `n`.
pub fn top_names(ranked: &[&EnrichedRunner], n: usize) -> Vec<String> {
    let take = if ranked.len() < n {
        tracing::debug!("Only {} runners for a top-{} selection, taking all", ranked.len(), n);
        ranked.len()
    } else {
        n
    };
    ranked[..take].iter().map(|r| r.name().to_string()).collect()
}

/// Optional exact-match filters over the categorical flags.
#[derive(Debug, Clone, Default)]
pub struct RunnerFilter {
    pub step_up: Option<StepUp>,
    pub pedigree: Option<StaminaFlag>,
    pub ground: Option<StaminaFlag>,
}

impl RunnerFilter {
    pub fn is_empty(&self) -> bool {
        self.step_up.is_none() && self.pedigree.is_none() && self.ground.is_none()
    }

    pub fn matches(&self, runner: &EnrichedRunner) -> bool {
        let r = runner.record();
        self.step_up.map_or(true, |v| r.step_up == v)
            && self.pedigree.map_or(true, |v| r.pedigree_stamina == v)
            && self.ground.map_or(true, |v| r.ground == v)
    }

    /// Matching runners in ingestion order.
    pub fn apply<'a>(&self, race: &'a ScoredRace) -> Vec<&'a EnrichedRunner> {
        race.runners().iter().filter(|r| self.matches(r)).collect()
    }
}
