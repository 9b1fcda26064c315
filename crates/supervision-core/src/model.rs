//! Core data model types for supervision evaluations.
//!
//! A supervision visit is judged against a list of rubrics. Each rubric
//! groups criteria, and each criterion carries exactly one evaluation.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stable identifier that is either numeric or textual.
///
/// Rubric and criterion ids come from the school's catalog, where some
/// are database integers and others are short codes such as `"A"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Num(i64),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Num(n) => write!(f, "{n}"),
            ItemId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for ItemId {
    fn from(value: i64) -> Self {
        ItemId::Num(value)
    }
}

impl From<i32> for ItemId {
    fn from(value: i32) -> Self {
        ItemId::Num(i64::from(value))
    }
}

impl From<u32> for ItemId {
    fn from(value: u32) -> Self {
        ItemId::Num(i64::from(value))
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        ItemId::Text(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        ItemId::Text(value)
    }
}

impl FromStr for ItemId {
    type Err = std::convert::Infallible;

    /// Integers parse as numeric ids, anything else is kept as text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<i64>() {
            Ok(n) => ItemId::Num(n),
            Err(_) => ItemId::Text(s.trim().to_string()),
        })
    }
}

/// The judgment recorded for one criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Met,
    NotMet,
    #[default]
    Undecided,
}

impl Decision {
    /// Returns `true` once the evaluator has picked met or not met.
    pub fn is_decided(self) -> bool {
        !matches!(self, Decision::Undecided)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Met => write!(f, "met"),
            Decision::NotMet => write!(f, "not_met"),
            Decision::Undecided => write!(f, "undecided"),
        }
    }
}

/// Whether a rubric feeds the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RubricKind {
    Countable,
    NotCountable,
}

impl fmt::Display for RubricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RubricKind::Countable => write!(f, "countable"),
            RubricKind::NotCountable => write!(f, "not_countable"),
        }
    }
}

impl FromStr for RubricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "countable" => Ok(RubricKind::Countable),
            "not_countable" | "uncountable" => Ok(RubricKind::NotCountable),
            other => Err(format!("unknown rubric kind: {other}")),
        }
    }
}

/// One evaluable statement shown to the supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricCriterion {
    pub id: ItemId,
    pub text: String,
}

/// The mutable judgment for a single criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionEvaluation {
    /// Id of the criterion this evaluation belongs to.
    pub criterion_id: ItemId,
    #[serde(default)]
    pub decision: Decision,
    #[serde(default)]
    pub comment: Option<String>,
}

impl CriterionEvaluation {
    /// A fresh evaluation with no decision and no comment.
    pub fn undecided(criterion_id: ItemId) -> Self {
        Self {
            criterion_id,
            decision: Decision::Undecided,
            comment: None,
        }
    }
}

/// A rubric as loaded from a template, before any evaluation exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricTemplate {
    pub id: ItemId,
    pub name: String,
    pub kind: RubricKind,
    #[serde(default)]
    pub criteria: Vec<RubricCriterion>,
}

/// A named group of criteria together with their evaluations.
///
/// The set of `evaluations[*].criterion_id` always equals the set of
/// `criteria[*].id`. Sessions only hand out shared references to rubrics,
/// and every path that accepts rubrics from outside re-normalizes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rubric {
    pub id: ItemId,
    pub name: String,
    pub kind: RubricKind,
    #[serde(default)]
    pub criteria: Vec<RubricCriterion>,
    #[serde(default)]
    pub evaluations: Vec<CriterionEvaluation>,
}

impl Rubric {
    /// Build a rubric from a template with every criterion undecided.
    pub fn from_template(template: RubricTemplate) -> Self {
        let mut rubric = Self {
            id: template.id,
            name: template.name,
            kind: template.kind,
            criteria: template.criteria,
            evaluations: Vec::new(),
        };
        rubric.normalize();
        rubric
    }

    pub fn is_countable(&self) -> bool {
        self.kind == RubricKind::Countable
    }

    /// Look up the evaluation for a criterion id.
    pub fn evaluation(&self, criterion_id: &ItemId) -> Option<&CriterionEvaluation> {
        self.evaluations
            .iter()
            .find(|e| &e.criterion_id == criterion_id)
    }

    pub(crate) fn evaluation_mut(
        &mut self,
        criterion_id: &ItemId,
    ) -> Option<&mut CriterionEvaluation> {
        self.evaluations
            .iter_mut()
            .find(|e| &e.criterion_id == criterion_id)
    }

    /// The criterion at a walk position.
    pub fn criterion_at(&self, index: usize) -> Option<&RubricCriterion> {
        self.criteria.get(index)
    }

    /// Put every evaluation back to undecided and drop comments.
    pub(crate) fn reset_evaluations(&mut self) {
        for evaluation in &mut self.evaluations {
            evaluation.decision = Decision::Undecided;
            evaluation.comment = None;
        }
    }

    /// Make criteria and evaluations correspond one-to-one.
    ///
    /// Repeated criterion ids keep their first occurrence. Existing
    /// evaluations are kept, missing ones are added as undecided, orphans
    /// and duplicates are dropped. Evaluations end up in criterion order.
    pub(crate) fn normalize(&mut self) {
        let mut seen = HashSet::new();
        self.criteria.retain(|c| seen.insert(c.id.clone()));

        let mut normalized = Vec::with_capacity(self.criteria.len());
        for criterion in &self.criteria {
            let evaluation = self
                .evaluations
                .iter()
                .find(|e| e.criterion_id == criterion.id)
                .cloned()
                .unwrap_or_else(|| CriterionEvaluation::undecided(criterion.id.clone()));
            normalized.push(evaluation);
        }
        self.evaluations = normalized;
    }

    /// Returns `true` if criterion ids are distinct and evaluations cover
    /// exactly those ids, once each.
    pub fn evaluations_match_criteria(&self) -> bool {
        let criteria: HashSet<&ItemId> = self.criteria.iter().map(|c| &c.id).collect();
        let evaluated: HashSet<&ItemId> =
            self.evaluations.iter().map(|e| &e.criterion_id).collect();
        criteria == evaluated
            && criteria.len() == self.criteria.len()
            && evaluated.len() == self.evaluations.len()
    }
}

/// Free-text fields describing the visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisionContext {
    #[serde(default)]
    pub topic_covered: String,
    #[serde(default)]
    pub general_summary: String,
    /// Fixed when the session is created.
    pub supervision_date: DateTime<Utc>,
}

impl SupervisionContext {
    pub fn new(supervision_date: DateTime<Utc>) -> Self {
        Self {
            topic_covered: String::new(),
            general_summary: String::new(),
            supervision_date,
        }
    }
}
