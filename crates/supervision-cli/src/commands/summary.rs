//! The `supervision summary` command.

use std::path::PathBuf;

use anyhow::Result;

use supervision_core::snapshot::SupervisionSnapshot;

use super::status_table;

pub fn execute(snapshot_path: PathBuf, format: String) -> Result<()> {
    let snapshot = SupervisionSnapshot::load_json(&snapshot_path)?;

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", snapshot.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        "text" => {
            println!(
                "Teacher {} / cycle {} supervised on {}",
                snapshot.teacher_id,
                snapshot.cycle_id,
                snapshot.context.supervision_date.format("%Y-%m-%d")
            );
            if !snapshot.context.topic_covered.is_empty() {
                println!("Topic: {}", snapshot.context.topic_covered);
            }
            println!("\n{}", status_table(&snapshot.rubrics, &snapshot.statuses()));
            println!("\nFinal score: {}/100", snapshot.final_score);
        }
        other => anyhow::bail!("unknown format: {other} (expected text, markdown or json)"),
    }

    Ok(())
}
