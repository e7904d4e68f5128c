//! Derived metrics and the enriched record set

use serde::Serialize;

use crate::error::{RacecardError, Result};
use crate::model::rules::{self, Rule};
use crate::model::runner::RunnerRecord;
use crate::model::verdict::compose_verdict;

/// `ranTo - speed`, the primary ranking key.
pub fn delta(record: &RunnerRecord) -> f64 {
    record.ran_to - record.speed
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub delta: f64,
    pub fair_price: f64,
    pub is_value_bet: bool,
    pub hits: Vec<Rule>,
    pub verdict: String,
}

impl DerivedMetrics {
    pub fn compute(record: &RunnerRecord) -> Self {
        let delta = delta(record);
        let fair_price = rules::fair_price(delta);
        let is_value_bet = rules::is_value_bet(record.market_odds, fair_price);
        let hits = rules::evaluate(record, delta);
        let verdict = compose_verdict(&hits);

        Self {
            delta,
            fair_price,
            is_value_bet,
            hits,
            verdict,
        }
    }
}

/// A record together with its metrics. Only built through `enrich`, so a
/// record is never seen with partial metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRunner {
    record: RunnerRecord,
    metrics: DerivedMetrics,
}

impl EnrichedRunner {
    pub fn enrich(record: RunnerRecord) -> Self {
        let metrics = DerivedMetrics::compute(&record);
        Self { record, metrics }
    }

    pub fn record(&self) -> &RunnerRecord {
        &self.record
    }

    pub fn metrics(&self) -> &DerivedMetrics {
        &self.metrics
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn delta(&self) -> f64 {
        self.metrics.delta
    }
}

/// The enriched record set for one race, in ingestion order. Read-only once
/// built; a new query builds a new one.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredRace {
    runners: Vec<EnrichedRunner>,
}

impl ScoredRace {
    pub fn score(records: Vec<RunnerRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(RacecardError::EmptyResult);
        }

        let runners: Vec<EnrichedRunner> = records.into_iter().map(EnrichedRunner::enrich).collect();

        let value_count = runners.iter().filter(|r| r.metrics.is_value_bet).count();
        tracing::info!(
            "Scored {} runners, {} value bets",
            runners.len(),
            value_count
        );
        for r in &runners {
            tracing::debug!(
                "{}: delta={} fair={} odds={} value={}",
                r.name(),
                r.metrics.delta,
                r.metrics.fair_price,
                r.record.market_odds,
                r.metrics.is_value_bet
            );
        }

        Ok(Self { runners })
    }

    pub fn runners(&self) -> &[EnrichedRunner] {
        &self.runners
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }
}
