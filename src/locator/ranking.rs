//! Candidate ranking
//!
//! Candidates are ordered by confidence (descending), ties broken by strategy
//! priority. Duplicate expressions keep their best-ranked occurrence.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

use super::strategy::LocatorCandidate;

pub const DEFAULT_MAX_ALTERNATIVES: usize = 4;

/// Final locator answer for one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatorResult {
    pub primary_locator: String,
    pub confidence: f64,
    pub alternatives: Vec<String>,
    pub reasoning: String,
    pub success: bool,
}

impl LocatorResult {
    /// Reported failure: empty primary, zero confidence
    pub fn failure(reasoning: impl Into<String>) -> Self {
        Self {
            primary_locator: String::new(),
            confidence: 0.0,
            alternatives: Vec::new(),
            reasoning: reasoning.into(),
            success: false,
        }
    }
}

fn compare(a: &LocatorCandidate, b: &LocatorCandidate) -> Ordering {
    b.confidence
        .partial_cmp(&a.confidence)
        .unwrap_or(Ordering::Equal)
        .then(a.strategy.cmp(&b.strategy))
}

/// Sort and de-duplicate candidates without truncating
pub fn order_candidates(mut candidates: Vec<LocatorCandidate>) -> Vec<LocatorCandidate> {
    candidates.sort_by(compare);
    let mut seen = HashSet::new();
    candidates.retain(|c| seen.insert(c.expression.clone()));
    candidates
}

pub fn rank(candidates: Vec<LocatorCandidate>) -> LocatorResult {
    rank_with_limit(candidates, DEFAULT_MAX_ALTERNATIVES)
}

pub fn rank_with_limit(candidates: Vec<LocatorCandidate>, max_alternatives: usize) -> LocatorResult {
    let ordered = order_candidates(candidates);
    let Some((primary, rest)) = ordered.split_first() else {
        return LocatorResult::failure("No locator strategy produced a candidate");
    };
    let alternatives = &rest[..rest.len().min(max_alternatives)];

    let reasoning = std::iter::once(primary)
        .chain(alternatives)
        .map(|c| format!("{} ({:.2})", c.strategy.label(), c.confidence))
        .collect::<Vec<_>>()
        .join(", ");

    LocatorResult {
        primary_locator: primary.expression.clone(),
        confidence: primary.confidence,
        alternatives: alternatives.iter().map(|c| c.expression.clone()).collect(),
        reasoning: format!("Strategies: {}", reasoning),
        success: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::strategy::StrategyKind;

    fn cand(expression: &str, strategy: StrategyKind, confidence: f64) -> LocatorCandidate {
        LocatorCandidate {
            expression: expression.to_string(),
            strategy,
            confidence,
            unique: true,
        }
    }

    #[test]
    fn test_rank_orders_by_confidence() {
        let result = rank(vec![
            cand("//button[1]", StrategyKind::Positional, 0.3),
            cand("//*[@id='go']", StrategyKind::Id, 0.95),
            cand("//button[text()='Go']", StrategyKind::ExactText, 0.75),
        ]);
        assert!(result.success);
        assert_eq!(result.primary_locator, "//*[@id='go']");
        assert_eq!(result.confidence, 0.95);
        assert_eq!(
            result.alternatives,
            vec!["//button[text()='Go']", "//button[1]"]
        );
        assert_eq!(
            result.reasoning,
            "Strategies: ID (0.95), Exact text (0.75), Positional (0.30)"
        );
    }

    #[test]
    fn test_ties_follow_strategy_priority() {
        let result = rank(vec![
            cand("//span[1]", StrategyKind::Positional, 0.35),
            cand("//span[@class='item']", StrategyKind::ClassTag, 0.35),
            cand("//*[@name='n']", StrategyKind::Name, 0.35),
        ]);
        assert_eq!(result.primary_locator, "//*[@name='n']");
        assert_eq!(result.alternatives, vec!["//span[@class='item']", "//span[1]"]);
    }

    #[test]
    fn test_alternatives_are_truncated() {
        let candidates = StrategyKind::ALL
            .iter()
            .enumerate()
            .map(|(i, k)| cand(&format!("//x[{}]", i + 1), *k, k.base_confidence()))
            .collect();
        let result = rank(candidates);
        assert_eq!(result.alternatives.len(), DEFAULT_MAX_ALTERNATIVES);
        assert_eq!(result.primary_locator, "//x[1]");

        let none = rank_with_limit(
            vec![
                cand("//a", StrategyKind::Id, 0.9),
                cand("//b", StrategyKind::Name, 0.8),
            ],
            0,
        );
        assert!(none.alternatives.is_empty());
    }

    #[test]
    fn test_duplicate_expressions_keep_best() {
        let result = rank(vec![
            cand("//a[1]", StrategyKind::Positional, 0.3),
            cand("//a[1]", StrategyKind::ClassTag, 0.55),
        ]);
        assert!(result.alternatives.is_empty());
        assert_eq!(result.reasoning, "Strategies: Class + tag (0.55)");
    }

    #[test]
    fn test_rank_is_deterministic() {
        let candidates = vec![
            cand("//p[2]", StrategyKind::Positional, 0.3),
            cand("//p[@class='c']", StrategyKind::ClassTag, 0.3),
            cand("//p[text()='x']", StrategyKind::ExactText, 0.75),
        ];
        let first = rank(candidates.clone());
        let mut reversed = candidates;
        reversed.reverse();
        let second = rank(reversed);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_candidates_is_reported_failure() {
        let result = rank(Vec::new());
        assert!(!result.success);
        assert!(result.primary_locator.is_empty());
        assert!(!result.reasoning.is_empty());
    }
}
