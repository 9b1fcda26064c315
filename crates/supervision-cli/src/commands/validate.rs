//! The `supervision validate` command.

use std::path::PathBuf;

use anyhow::Result;

use supervision_core::parser;

pub fn execute(template_path: PathBuf) -> Result<()> {
    let sets = if template_path.is_dir() {
        parser::load_template_directory(&template_path)?
    } else {
        vec![parser::parse_template(&template_path)?]
    };

    let mut total_warnings = 0;

    for set in &sets {
        println!(
            "Template: {} ({} rubrics, {} criteria)",
            set.name,
            set.rubrics.len(),
            set.criteria_count()
        );
        if !set.description.is_empty() {
            println!("  {}", set.description);
        }

        let warnings = parser::validate_template(set);
        for w in &warnings {
            let prefix = w
                .rubric_id
                .as_ref()
                .map(|id| format!("  [rubric {id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All templates valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
