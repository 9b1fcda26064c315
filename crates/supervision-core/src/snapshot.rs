//! Saved supervision data: final snapshots and in-progress drafts.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::model::{Decision, ItemId, Rubric, SupervisionContext};
use crate::status::{compute_rubric_status, RubricStatus};

/// A completed evaluation, handed to whatever persists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisionSnapshot {
    /// Unique snapshot identifier.
    pub id: Uuid,
    pub teacher_id: ItemId,
    pub cycle_id: ItemId,
    pub context: SupervisionContext,
    /// Full rubric tree with every evaluation decided.
    pub rubrics: Vec<Rubric>,
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
    /// Score over countable rubrics, 0..=100.
    pub final_score: u8,
}

impl SupervisionSnapshot {
    /// Save the snapshot as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        write_json(self, path, "snapshot")
    }

    /// Load a snapshot from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot from {}", path.display()))?;
        let snapshot: SupervisionSnapshot =
            serde_json::from_str(&content).context("failed to parse snapshot JSON")?;
        Ok(snapshot)
    }

    pub fn statuses(&self) -> Vec<RubricStatus> {
        self.rubrics.iter().map(compute_rubric_status).collect()
    }

    /// Format the snapshot as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Teacher:** {} | **Cycle:** {} | **Date:** {} | **Score:** {}/100\n\n",
            self.teacher_id,
            self.cycle_id,
            self.context.supervision_date.format("%Y-%m-%d"),
            self.final_score
        ));

        if !self.context.topic_covered.is_empty() {
            md.push_str(&format!("**Topic:** {}\n\n", self.context.topic_covered));
        }
        if !self.context.general_summary.is_empty() {
            md.push_str(&format!("**Summary:** {}\n\n", self.context.general_summary));
        }

        md.push_str("### Rubrics\n\n");
        md.push_str("| Rubric | Kind | Met | Evaluated | Score |\n");
        md.push_str("|--------|------|-----|-----------|-------|\n");
        for (rubric, status) in self.rubrics.iter().zip(self.statuses()) {
            md.push_str(&format!(
                "| {} | {} | {}/{} | {}/{} | {}% |\n",
                rubric.name,
                rubric.kind,
                status.met_count,
                status.total_criteria,
                status.evaluated_count,
                status.total_criteria,
                status.percentage
            ));
        }

        let mut observations = Vec::new();
        for rubric in &self.rubrics {
            for criterion in &rubric.criteria {
                let Some(evaluation) = rubric.evaluation(&criterion.id) else {
                    continue;
                };
                if evaluation.decision == Decision::NotMet || evaluation.comment.is_some() {
                    observations.push(format!(
                        "- {} / {} ({}){}\n",
                        rubric.name,
                        criterion.text,
                        evaluation.decision,
                        evaluation
                            .comment
                            .as_deref()
                            .map(|c| format!(": {c}"))
                            .unwrap_or_default()
                    ));
                }
            }
        }

        if !observations.is_empty() {
            md.push_str("\n### Observations\n\n");
            for line in observations {
                md.push_str(&line);
            }
        }

        md
    }
}

/// Fields of a session that a draft may overwrite.
///
/// Absent fields are left untouched by `LoadSession`. Teacher and cycle ids
/// and the supervision date are not part of a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_covered: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rubrics: Option<Vec<Rubric>>,
    /// `Some(None)` returns to the overview; `None` keeps the current focus.
    #[serde(
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_rubric_id: Option<Option<ItemId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_criterion_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_context_panel_expanded: Option<bool>,
}

/// Distinguish an explicit `null` from a missing field.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl SessionPatch {
    /// Returns `true` if applying this patch would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == SessionPatch::default()
    }

    /// Save the draft as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        write_json(self, path, "draft")
    }

    /// Load a draft from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read draft from {}", path.display()))?;
        let patch: SessionPatch =
            serde_json::from_str(&content).context("failed to parse draft JSON")?;
        Ok(patch)
    }
}

fn write_json<T: Serialize>(value: &T, path: &Path, what: &str) -> Result<()> {
    let json =
        serde_json::to_string_pretty(value).with_context(|| format!("failed to serialize {what}"))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("failed to write {what} to {}", path.display()))?;
    tracing::info!("{what} written to {}", path.display());
    Ok(())
}
