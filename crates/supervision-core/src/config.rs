//! Supervision configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level supervision configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisionConfig {
    /// Maximum characters kept in a per-criterion comment.
    #[serde(default = "default_max_comment_chars")]
    pub max_comment_chars: usize,
    /// Maximum characters kept in the topic and summary fields.
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
    /// Output directory for snapshots and drafts.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_max_comment_chars() -> usize {
    2000
}
fn default_max_context_chars() -> usize {
    5000
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./supervision-results")
}

impl Default for SupervisionConfig {
    fn default() -> Self {
        Self {
            max_comment_chars: default_max_comment_chars(),
            max_context_chars: default_max_context_chars(),
            output_dir: default_output_dir(),
        }
    }
}

impl SupervisionConfig {
    /// Text limits to attach to a session.
    pub fn text_limits(&self) -> TextLimits {
        TextLimits {
            max_comment_chars: self.max_comment_chars,
            max_context_chars: self.max_context_chars,
        }
    }
}

/// Length limits applied to free text entering a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLimits {
    pub max_comment_chars: usize,
    pub max_context_chars: usize,
}

impl Default for TextLimits {
    fn default() -> Self {
        SupervisionConfig::default().text_limits()
    }
}

impl TextLimits {
    pub fn comment(&self, text: &str) -> String {
        truncate_chars(text, self.max_comment_chars)
    }

    pub fn context(&self, text: &str) -> String {
        truncate_chars(text, self.max_context_chars)
    }
}

/// Keep at most `max` characters, cutting on a char boundary.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => {
            tracing::debug!("truncating text from {} to {max} chars", text.chars().count());
            text[..cut].to_string()
        }
        None => text.to_string(),
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `supervision.toml` in the current directory
/// 2. `~/.config/supervision/config.toml`
///
/// Environment variable overrides: `SUPERVISION_MAX_COMMENT_CHARS`,
/// `SUPERVISION_MAX_CONTEXT_CHARS`.
pub fn load_config_from(path: Option<&Path>) -> Result<SupervisionConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("supervision.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content, &path)?
        }
        None => SupervisionConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Parse a TOML config string.
pub fn parse_config_str(content: &str, source_path: &Path) -> Result<SupervisionConfig> {
    toml::from_str::<SupervisionConfig>(content)
        .with_context(|| format!("failed to parse config: {}", source_path.display()))
}

fn apply_env_overrides(config: &mut SupervisionConfig) -> Result<()> {
    if let Ok(value) = std::env::var("SUPERVISION_MAX_COMMENT_CHARS") {
        config.max_comment_chars = value
            .trim()
            .parse()
            .with_context(|| format!("invalid SUPERVISION_MAX_COMMENT_CHARS: '{value}'"))?;
    }
    if let Ok(value) = std::env::var("SUPERVISION_MAX_CONTEXT_CHARS") {
        config.max_context_chars = value
            .trim()
            .parse()
            .with_context(|| format!("invalid SUPERVISION_MAX_CONTEXT_CHARS: '{value}'"))?;
    }
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("supervision"))
}
