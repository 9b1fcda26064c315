//! Rubric completion tracking and score derivation.
//!
//! Everything here is a pure function of the rubric list, so callers may
//! recompute or memoize freely.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::{Decision, ItemId, Rubric};

/// Derived completion figures for one rubric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricStatus {
    /// Rubric these figures describe.
    pub rubric_id: ItemId,
    /// Number of distinct criteria in the rubric.
    pub total_criteria: usize,
    /// Criteria with a met or not-met decision.
    pub evaluated_count: usize,
    /// Criteria decided as met.
    pub met_count: usize,
    /// `met_count / total_criteria` as a rounded percentage, 0 when empty.
    pub percentage: u8,
    /// Every criterion has a decision. Vacuously true for empty rubrics.
    pub is_complete: bool,
}

/// Round `numerator / denominator` to the nearest integer, halves up.
///
/// Callers guarantee `denominator > 0`.
fn round_div(numerator: usize, denominator: usize) -> usize {
    (2 * numerator + denominator) / (2 * denominator)
}

/// Percentage of `part` in `whole`, rounded, clamped to 100.
fn percentage_of(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let pct = round_div(part.min(whole) * 100, whole);
    u8::try_from(pct.min(100)).unwrap_or(100)
}

/// Compute the status of one rubric.
///
/// Criteria are counted by id, so a repeated id is one criterion with one
/// evaluation.
pub fn compute_rubric_status(rubric: &Rubric) -> RubricStatus {
    let criterion_ids: HashSet<&ItemId> = rubric.criteria.iter().map(|c| &c.id).collect();
    let total_criteria = criterion_ids.len();

    let mut evaluated = HashSet::new();
    let mut met = HashSet::new();
    for evaluation in &rubric.evaluations {
        if !criterion_ids.contains(&evaluation.criterion_id) {
            continue;
        }
        if evaluation.decision.is_decided() {
            evaluated.insert(&evaluation.criterion_id);
        }
        if evaluation.decision == Decision::Met {
            met.insert(&evaluation.criterion_id);
        }
    }
    let evaluated_count = evaluated.len();
    let met_count = met.len();

    RubricStatus {
        rubric_id: rubric.id.clone(),
        total_criteria,
        evaluated_count,
        met_count,
        percentage: percentage_of(met_count, total_criteria),
        is_complete: evaluated_count == total_criteria,
    }
}

/// Returns `true` when every rubric, countable or not, is complete.
///
/// An empty rubric list is ready.
pub fn is_session_ready_to_save(rubrics: &[Rubric]) -> bool {
    rubrics
        .iter()
        .all(|r| compute_rubric_status(r).is_complete)
}

/// Average of the countable rubrics' percentages, rounded to 0..=100.
///
/// Not-countable rubrics record qualitative compliance only and never
/// enter the arithmetic. Without any countable rubric the score is 0.
pub fn compute_final_score(rubrics: &[Rubric]) -> u8 {
    let percentages: Vec<usize> = rubrics
        .iter()
        .filter(|r| r.is_countable())
        .map(|r| usize::from(compute_rubric_status(r).percentage))
        .collect();

    if percentages.is_empty() {
        return 0;
    }

    let avg = round_div(percentages.iter().sum(), percentages.len());
    u8::try_from(avg.min(100)).unwrap_or(100)
}

/// Number of criteria still undecided across all rubrics.
pub fn count_pending(rubrics: &[Rubric]) -> usize {
    rubrics
        .iter()
        .map(|r| {
            let status = compute_rubric_status(r);
            status.total_criteria.saturating_sub(status.evaluated_count)
        })
        .sum()
}
