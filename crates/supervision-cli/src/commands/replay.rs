//! The `supervision replay` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use supervision_core::config::load_config_from;
use supervision_core::engine::{Action, Dispatch, SupervisionSession};
use supervision_core::model::ItemId;
use supervision_core::parser;
use supervision_core::snapshot::SessionPatch;

use super::status_table;

pub struct ReplayArgs {
    pub template: PathBuf,
    pub actions: PathBuf,
    pub teacher: ItemId,
    pub cycle: ItemId,
    pub draft: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub fn execute(args: ReplayArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;

    let template = parser::parse_template(&args.template)?;
    for w in parser::validate_template(&template) {
        eprintln!("Warning: {}", w.message);
    }

    let content = std::fs::read_to_string(&args.actions)
        .with_context(|| format!("failed to read actions: {}", args.actions.display()))?;
    let actions: Vec<Action> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse actions: {}", args.actions.display()))?;

    let mut session = SupervisionSession::new(args.teacher, args.cycle, template.rubrics)
        .with_limits(config.text_limits());

    if let Some(draft_path) = &args.draft {
        let patch = SessionPatch::load_json(draft_path)?;
        session.apply(&Action::LoadSession(patch));
        eprintln!("Resumed draft: {}", draft_path.display());
    }

    let mut ignored = 0usize;
    for (i, action) in actions.iter().enumerate() {
        match session.apply(action) {
            Dispatch::Applied => tracing::debug!(step = i + 1, action = action.name(), "applied"),
            Dispatch::Ignored(reason) => {
                eprintln!("  Ignored #{} {}: {reason}", i + 1, action.name());
                ignored += 1;
            }
        }
    }

    eprintln!(
        "Applied {} of {} actions to '{}'",
        actions.len() - ignored,
        actions.len(),
        template.name
    );

    println!(
        "{}",
        status_table(session.rubrics(), &session.status_of_all_rubrics())
    );

    let output = args.output.unwrap_or(config.output_dir);
    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    match session.snapshot() {
        Ok(snapshot) => {
            println!("Final score: {}/100", snapshot.final_score);
            let path = output.join(format!("snapshot-{timestamp}.json"));
            snapshot.save_json(&path)?;
            println!("Snapshot saved to: {}", path.display());
        }
        Err(e) => {
            println!("Provisional score: {}/100", session.final_score());
            println!("{e}:");
            for pending in session.pending_criteria() {
                println!(
                    "  [{}] {} {}",
                    pending.rubric_name, pending.criterion_id, pending.text
                );
            }
            let path = output.join(format!("draft-{timestamp}.json"));
            session.draft().save_json(&path)?;
            println!("Draft saved to: {}", path.display());
        }
    }

    Ok(())
}
