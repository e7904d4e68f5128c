//! Compose a runner's verdict from its rule hits

use crate::model::rules::Rule;

/// Space-joined phrases for the rules that hold, always in `Rule::ALL`
/// order regardless of the order of `hits`. Empty when nothing holds.
pub fn compose_verdict(hits: &[Rule]) -> String {
    Rule::ALL
        .iter()
        .filter(|rule| hits.contains(rule))
        .map(|rule| rule.phrase())
        .collect::<Vec<_>>()
        .join(" ")
}
