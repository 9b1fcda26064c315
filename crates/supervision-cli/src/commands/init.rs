//! The `supervision init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("supervision.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("templates")?;
    write_if_missing(Path::new("templates/example.toml"), EXAMPLE_TEMPLATE)?;
    write_if_missing(Path::new("templates/example-actions.json"), EXAMPLE_ACTIONS)?;

    println!("\nNext steps:");
    println!("  1. Adjust the rubrics in templates/example.toml");
    println!("  2. Run: supervision validate --template templates/example.toml");
    println!(
        "  3. Run: supervision replay --template templates/example.toml \
         --actions templates/example-actions.json --teacher 1 --cycle 2025"
    );

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# supervision configuration

max_comment_chars = 2000
max_context_chars = 5000
output_dir = "./supervision-results"
"#;

const EXAMPLE_TEMPLATE: &str = r#"[template]
id = "example"
name = "Example Classroom Visit"
description = "A small template to get started"

[[rubrics]]
id = 1
name = "Planning"
kind = "countable"

[[rubrics.criteria]]
id = "A"
text = "The lesson plan is available"

[[rubrics.criteria]]
id = "B"
text = "Learning objectives are shared with the class"

[[rubrics]]
id = 2
name = "Punctuality"
kind = "not_countable"

[[rubrics.criteria]]
id = "C"
text = "The class starts on time"
"#;

const EXAMPLE_ACTIONS: &str = r#"[
  {"type": "UPDATE_TOPIC", "text": "Equivalent fractions"},
  {"type": "SET_DECISION", "rubric_id": 1, "criterion_id": "A", "decision": "met"},
  {"type": "SET_DECISION", "rubric_id": 1, "criterion_id": "B", "decision": "met"},
  {"type": "SET_DECISION", "rubric_id": 2, "criterion_id": "C", "decision": "not_met"},
  {"type": "SET_COMMENT", "rubric_id": 2, "criterion_id": "C", "text": "Started ten minutes late"}
]
"#;
