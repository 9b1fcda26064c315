//! Supervision session engine.
//!
//! A `SupervisionSession` owns one in-progress evaluation. It changes only
//! through the closed `Action` set and answers queries derived from the
//! status functions. Actions that name unknown rubrics or criteria are
//! ignored and leave the session untouched.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::TextLimits;
use crate::error::SupervisionError;
use crate::model::{
    CriterionEvaluation, Decision, ItemId, Rubric, RubricCriterion, RubricTemplate,
    SupervisionContext,
};
use crate::snapshot::{SessionPatch, SupervisionSnapshot};
use crate::status::{
    compute_final_score, compute_rubric_status, count_pending, is_session_ready_to_save,
    RubricStatus,
};

/// Commands accepted by a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Record met / not met / undecided for one criterion.
    SetDecision {
        rubric_id: ItemId,
        criterion_id: ItemId,
        decision: Decision,
    },
    /// Replace the comment of one criterion. Empty text clears it.
    SetComment {
        rubric_id: ItemId,
        criterion_id: ItemId,
        text: String,
    },
    UpdateTopic {
        text: String,
    },
    UpdateSummary {
        text: String,
    },
    ToggleContextPanel,
    /// Focus a rubric, or return to the overview with `None`.
    FocusRubric {
        #[serde(default)]
        rubric_id: Option<ItemId>,
    },
    /// Move to the next criterion of the focused rubric, leaving the
    /// rubric after its last criterion.
    AdvanceCriterion,
    ResetSession,
    /// Shallow-merge a previously saved draft.
    LoadSession(SessionPatch),
}

impl Action {
    /// Wire name of the action.
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetDecision { .. } => "SET_DECISION",
            Action::SetComment { .. } => "SET_COMMENT",
            Action::UpdateTopic { .. } => "UPDATE_TOPIC",
            Action::UpdateSummary { .. } => "UPDATE_SUMMARY",
            Action::ToggleContextPanel => "TOGGLE_CONTEXT_PANEL",
            Action::FocusRubric { .. } => "FOCUS_RUBRIC",
            Action::AdvanceCriterion => "ADVANCE_CRITERION",
            Action::ResetSession => "RESET_SESSION",
            Action::LoadSession(_) => "LOAD_SESSION",
        }
    }
}

/// Outcome of applying one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Applied,
    Ignored(IgnoreReason),
}

impl Dispatch {
    pub fn is_applied(&self) -> bool {
        matches!(self, Dispatch::Applied)
    }
}

/// Why an action was ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    UnknownRubric(ItemId),
    UnknownCriterion {
        rubric_id: ItemId,
        criterion_id: ItemId,
    },
    /// `AdvanceCriterion` while on the overview.
    NotFocused,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::UnknownRubric(id) => write!(f, "unknown rubric {id}"),
            IgnoreReason::UnknownCriterion {
                rubric_id,
                criterion_id,
            } => write!(f, "unknown criterion {criterion_id} in rubric {rubric_id}"),
            IgnoreReason::NotFocused => write!(f, "no rubric is focused"),
        }
    }
}

/// A criterion that still needs a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingCriterion {
    pub rubric_id: ItemId,
    pub rubric_name: String,
    pub criterion_id: ItemId,
    pub text: String,
}

/// One supervision visit, from creation to a save-ready snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisionSession {
    teacher_id: ItemId,
    cycle_id: ItemId,
    context: SupervisionContext,
    rubrics: Vec<Rubric>,
    current_rubric_id: Option<ItemId>,
    current_criterion_index: usize,
    is_context_panel_expanded: bool,
    limits: TextLimits,
}

impl SupervisionSession {
    /// Start a session dated now, with every criterion undecided.
    pub fn new(
        teacher_id: impl Into<ItemId>,
        cycle_id: impl Into<ItemId>,
        templates: Vec<RubricTemplate>,
    ) -> Self {
        Self::starting_at(teacher_id, cycle_id, templates, Utc::now())
    }

    /// Start a session with an explicit supervision date.
    pub fn starting_at(
        teacher_id: impl Into<ItemId>,
        cycle_id: impl Into<ItemId>,
        templates: Vec<RubricTemplate>,
        supervision_date: DateTime<Utc>,
    ) -> Self {
        Self {
            teacher_id: teacher_id.into(),
            cycle_id: cycle_id.into(),
            context: SupervisionContext::new(supervision_date),
            rubrics: distinct_rubrics(templates.into_iter().map(Rubric::from_template)),
            current_rubric_id: None,
            current_criterion_index: 0,
            is_context_panel_expanded: false,
            limits: TextLimits::default(),
        }
    }

    /// Replace the text limits applied to incoming comments and context.
    pub fn with_limits(mut self, limits: TextLimits) -> Self {
        self.limits = limits;
        self
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Apply one action in place.
    pub fn apply(&mut self, action: &Action) -> Dispatch {
        let outcome = match action {
            Action::SetDecision {
                rubric_id,
                criterion_id,
                decision,
            } => match self.evaluation_mut(rubric_id, criterion_id) {
                Ok(evaluation) => {
                    evaluation.decision = *decision;
                    Dispatch::Applied
                }
                Err(reason) => Dispatch::Ignored(reason),
            },
            Action::SetComment {
                rubric_id,
                criterion_id,
                text,
            } => {
                let comment = self.limits.comment(text);
                match self.evaluation_mut(rubric_id, criterion_id) {
                    Ok(evaluation) => {
                        evaluation.comment = Some(comment).filter(|c| !c.is_empty());
                        Dispatch::Applied
                    }
                    Err(reason) => Dispatch::Ignored(reason),
                }
            }
            Action::UpdateTopic { text } => {
                self.context.topic_covered = self.limits.context(text);
                Dispatch::Applied
            }
            Action::UpdateSummary { text } => {
                self.context.general_summary = self.limits.context(text);
                Dispatch::Applied
            }
            Action::ToggleContextPanel => {
                self.is_context_panel_expanded = !self.is_context_panel_expanded;
                Dispatch::Applied
            }
            Action::FocusRubric { rubric_id } => self.focus(rubric_id.as_ref()),
            Action::AdvanceCriterion => self.advance_criterion(),
            Action::ResetSession => {
                self.reset();
                Dispatch::Applied
            }
            Action::LoadSession(patch) => {
                self.merge(patch.clone());
                Dispatch::Applied
            }
        };

        if let Dispatch::Ignored(reason) = &outcome {
            tracing::debug!(action = action.name(), %reason, "ignoring action");
        }
        outcome
    }

    /// Apply one action and return the resulting session.
    pub fn dispatch(mut self, action: &Action) -> Self {
        self.apply(action);
        self
    }

    fn evaluation_mut(
        &mut self,
        rubric_id: &ItemId,
        criterion_id: &ItemId,
    ) -> Result<&mut CriterionEvaluation, IgnoreReason> {
        let rubric = self
            .rubrics
            .iter_mut()
            .find(|r| &r.id == rubric_id)
            .ok_or_else(|| IgnoreReason::UnknownRubric(rubric_id.clone()))?;
        rubric
            .evaluation_mut(criterion_id)
            .ok_or_else(|| IgnoreReason::UnknownCriterion {
                rubric_id: rubric_id.clone(),
                criterion_id: criterion_id.clone(),
            })
    }

    fn focus(&mut self, rubric_id: Option<&ItemId>) -> Dispatch {
        if let Some(id) = rubric_id {
            if self.rubric(id).is_none() {
                return Dispatch::Ignored(IgnoreReason::UnknownRubric(id.clone()));
            }
        }
        self.current_rubric_id = rubric_id.cloned();
        self.current_criterion_index = 0;
        Dispatch::Applied
    }

    fn advance_criterion(&mut self) -> Dispatch {
        let Some(rubric) = self.focused_rubric() else {
            return Dispatch::Ignored(IgnoreReason::NotFocused);
        };
        let count = rubric.criteria.len();

        if self.current_criterion_index + 1 < count {
            self.current_criterion_index += 1;
        } else {
            tracing::debug!(rubric = %rubric.id, "finished walking rubric");
            self.current_rubric_id = None;
            self.current_criterion_index = 0;
        }
        Dispatch::Applied
    }

    fn reset(&mut self) {
        for rubric in &mut self.rubrics {
            rubric.reset_evaluations();
        }
        self.context.topic_covered.clear();
        self.context.general_summary.clear();
        self.current_rubric_id = None;
        self.current_criterion_index = 0;
        self.is_context_panel_expanded = false;
    }

    fn merge(&mut self, patch: SessionPatch) {
        let limits = self.limits;

        if let Some(topic) = patch.topic_covered {
            self.context.topic_covered = limits.context(&topic);
        }
        if let Some(summary) = patch.general_summary {
            self.context.general_summary = limits.context(&summary);
        }
        if let Some(rubrics) = patch.rubrics {
            self.rubrics = distinct_rubrics(rubrics.into_iter().map(|mut rubric| {
                rubric.normalize();
                for evaluation in &mut rubric.evaluations {
                    evaluation.comment = evaluation
                        .comment
                        .take()
                        .map(|c| limits.comment(&c))
                        .filter(|c| !c.is_empty());
                }
                rubric
            }));
        }
        if let Some(focus) = patch.current_rubric_id {
            self.current_rubric_id = focus;
        }
        if let Some(index) = patch.current_criterion_index {
            self.current_criterion_index = index;
        }
        if let Some(expanded) = patch.is_context_panel_expanded {
            self.is_context_panel_expanded = expanded;
        }

        self.repair_navigation();
    }

    /// Fall back to the overview if the focused rubric is gone, and to the
    /// first criterion if the index is out of range.
    fn repair_navigation(&mut self) {
        let criteria_count = match &self.current_rubric_id {
            None => {
                self.current_criterion_index = 0;
                return;
            }
            Some(id) => self.rubric(id).map(|r| r.criteria.len()),
        };

        match criteria_count {
            None => {
                tracing::debug!("focused rubric no longer exists, returning to overview");
                self.current_rubric_id = None;
                self.current_criterion_index = 0;
            }
            Some(count) if self.current_criterion_index >= count.max(1) => {
                self.current_criterion_index = 0;
            }
            Some(_) => {}
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn teacher_id(&self) -> &ItemId {
        &self.teacher_id
    }

    pub fn cycle_id(&self) -> &ItemId {
        &self.cycle_id
    }

    pub fn context(&self) -> &SupervisionContext {
        &self.context
    }

    pub fn rubrics(&self) -> &[Rubric] {
        &self.rubrics
    }

    pub fn rubric(&self, rubric_id: &ItemId) -> Option<&Rubric> {
        self.rubrics.iter().find(|r| &r.id == rubric_id)
    }

    /// `None` means the overview is shown.
    pub fn current_rubric_id(&self) -> Option<&ItemId> {
        self.current_rubric_id.as_ref()
    }

    pub fn current_criterion_index(&self) -> usize {
        self.current_criterion_index
    }

    pub fn is_context_panel_expanded(&self) -> bool {
        self.is_context_panel_expanded
    }

    pub fn limits(&self) -> TextLimits {
        self.limits
    }

    /// Status of every rubric, in rubric order.
    pub fn status_of_all_rubrics(&self) -> Vec<RubricStatus> {
        self.rubrics.iter().map(compute_rubric_status).collect()
    }

    pub fn focused_rubric(&self) -> Option<&Rubric> {
        self.current_rubric_id
            .as_ref()
            .and_then(|id| self.rubric(id))
    }

    pub fn focused_criterion(&self) -> Option<&RubricCriterion> {
        self.focused_rubric()
            .and_then(|r| r.criterion_at(self.current_criterion_index))
    }

    pub fn focused_evaluation(&self) -> Option<&CriterionEvaluation> {
        let rubric = self.focused_rubric()?;
        let criterion = rubric.criterion_at(self.current_criterion_index)?;
        rubric.evaluation(&criterion.id)
    }

    /// Every rubric, countable or not, has all criteria decided.
    pub fn can_save(&self) -> bool {
        is_session_ready_to_save(&self.rubrics)
    }

    /// Current score. Only final once `can_save()` holds.
    pub fn final_score(&self) -> u8 {
        compute_final_score(&self.rubrics)
    }

    /// Criteria still undecided, in rubric and criterion order.
    pub fn pending_criteria(&self) -> Vec<PendingCriterion> {
        self.rubrics
            .iter()
            .flat_map(|rubric| {
                rubric
                    .criteria
                    .iter()
                    .filter(|c| {
                        rubric
                            .evaluation(&c.id)
                            .is_some_and(|e| !e.decision.is_decided())
                    })
                    .map(|c| PendingCriterion {
                        rubric_id: rubric.id.clone(),
                        rubric_name: rubric.name.clone(),
                        criterion_id: c.id.clone(),
                        text: c.text.clone(),
                    })
            })
            .collect()
    }

    /// Everything a later `LoadSession` needs to restore this session.
    pub fn draft(&self) -> SessionPatch {
        SessionPatch {
            topic_covered: Some(self.context.topic_covered.clone()),
            general_summary: Some(self.context.general_summary.clone()),
            rubrics: Some(self.rubrics.clone()),
            current_rubric_id: Some(self.current_rubric_id.clone()),
            current_criterion_index: Some(self.current_criterion_index),
            is_context_panel_expanded: Some(self.is_context_panel_expanded),
        }
    }

    /// Produce the hand-off snapshot, refusing while criteria are undecided.
    pub fn snapshot(&self) -> Result<SupervisionSnapshot, SupervisionError> {
        if !self.can_save() {
            return Err(SupervisionError::NotReadyToSave {
                pending: count_pending(&self.rubrics),
            });
        }

        Ok(SupervisionSnapshot {
            id: Uuid::new_v4(),
            teacher_id: self.teacher_id.clone(),
            cycle_id: self.cycle_id.clone(),
            context: self.context.clone(),
            rubrics: self.rubrics.clone(),
            saved_at: Utc::now(),
            final_score: self.final_score(),
        })
    }
}

/// Keep the first rubric for each id; commands could never reach the rest.
fn distinct_rubrics(rubrics: impl IntoIterator<Item = Rubric>) -> Vec<Rubric> {
    let mut seen = HashSet::new();
    rubrics
        .into_iter()
        .filter(|rubric| {
            let first = seen.insert(rubric.id.clone());
            if !first {
                tracing::debug!(rubric = %rubric.id, "dropping rubric with repeated id");
            }
            first
        })
        .collect()
}
