//! TOML rubric template parser.
//!
//! Loads rubric templates from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{ItemId, RubricCriterion, RubricKind, RubricTemplate};

/// Intermediate TOML structure for parsing template files.
#[derive(Debug, Deserialize)]
struct TomlTemplateFile {
    template: TomlTemplateHeader,
    #[serde(default)]
    rubrics: Vec<TomlRubric>,
}

#[derive(Debug, Deserialize)]
struct TomlTemplateHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlRubric {
    id: ItemId,
    name: String,
    #[serde(default = "default_kind_str")]
    kind: String,
    #[serde(default)]
    criteria: Vec<TomlCriterion>,
}

fn default_kind_str() -> String {
    "countable".to_string()
}

#[derive(Debug, Deserialize)]
struct TomlCriterion {
    id: ItemId,
    text: String,
}

/// A named set of rubric templates, one supervision form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubricTemplateSet {
    pub id: String,
    pub name: String,
    pub description: String,
    pub rubrics: Vec<RubricTemplate>,
}

impl RubricTemplateSet {
    pub fn criteria_count(&self) -> usize {
        self.rubrics.iter().map(|r| r.criteria.len()).sum()
    }
}

/// Parse a single TOML file into a `RubricTemplateSet`.
pub fn parse_template(path: &Path) -> Result<RubricTemplateSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read template file: {}", path.display()))?;

    parse_template_str(&content, path)
}

/// Parse a TOML string into a `RubricTemplateSet`.
pub fn parse_template_str(content: &str, source_path: &Path) -> Result<RubricTemplateSet> {
    let parsed: TomlTemplateFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let rubrics = parsed
        .rubrics
        .into_iter()
        .map(|r| {
            let kind: RubricKind = r
                .kind
                .parse()
                .map_err(|e: String| anyhow::anyhow!("rubric {}: {}", r.id, e))?;

            let criteria = r
                .criteria
                .into_iter()
                .map(|c| RubricCriterion {
                    id: c.id,
                    text: c.text,
                })
                .collect();

            Ok(RubricTemplate {
                id: r.id,
                name: r.name,
                kind,
                criteria,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RubricTemplateSet {
        id: parsed.template.id,
        name: parsed.template.name,
        description: parsed.template.description,
        rubrics,
    })
}

/// Recursively load all `.toml` template files from a directory.
pub fn load_template_directory(dir: &Path) -> Result<Vec<RubricTemplateSet>> {
    let mut sets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            sets.extend(load_template_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_template(&path) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(sets)
}

/// A warning from template validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The rubric id (if applicable).
    pub rubric_id: Option<ItemId>,
    /// Warning message.
    pub message: String,
}

/// Validate a template set for common issues.
pub fn validate_template(set: &RubricTemplateSet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_rubrics = HashSet::new();
    for rubric in &set.rubrics {
        if !seen_rubrics.insert(&rubric.id) {
            warnings.push(ValidationWarning {
                rubric_id: Some(rubric.id.clone()),
                message: format!("duplicate rubric ID: {}", rubric.id),
            });
        }
    }

    for rubric in &set.rubrics {
        if rubric.criteria.is_empty() {
            warnings.push(ValidationWarning {
                rubric_id: Some(rubric.id.clone()),
                message: "rubric has no criteria and will always count as complete".into(),
            });
        }

        // Duplicates collapse into a single evaluation when a session starts.
        let mut seen_criteria = HashSet::new();
        for criterion in &rubric.criteria {
            if !seen_criteria.insert(&criterion.id) {
                warnings.push(ValidationWarning {
                    rubric_id: Some(rubric.id.clone()),
                    message: format!("duplicate criterion ID: {}", criterion.id),
                });
            }
            if criterion.text.trim().is_empty() {
                warnings.push(ValidationWarning {
                    rubric_id: Some(rubric.id.clone()),
                    message: format!("criterion {} has empty text", criterion.id),
                });
            }
        }
    }

    if !set.rubrics.is_empty() && !set.rubrics.iter().any(|r| r.kind == RubricKind::Countable) {
        warnings.push(ValidationWarning {
            rubric_id: None,
            message: "no countable rubrics; the final score will always be 0".into(),
        });
    }

    warnings
}
