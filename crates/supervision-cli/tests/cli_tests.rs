//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn supervision() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("supervision").unwrap()
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../templates")
        .join(name)
}

fn write_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("supervision.toml");
    std::fs::write(&path, "max_comment_chars = 200\nmax_context_chars = 500\n").unwrap();
    path
}

fn files_with_prefix(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(prefix))
        })
        .collect()
}

#[test]
fn validate_valid_template() {
    supervision()
        .arg("validate")
        .arg("--template")
        .arg(fixture("classroom-visit.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("3 rubrics, 7 criteria"))
        .stdout(predicate::str::contains(
            "Standard supervision form for a classroom observation",
        ))
        .stdout(predicate::str::contains("All templates valid"));
}

#[test]
fn validate_directory() {
    supervision()
        .arg("validate")
        .arg("--template")
        .arg(fixture(""))
        .assert()
        .success()
        .stdout(predicate::str::contains("Classroom Visit"));
}

#[test]
fn validate_nonexistent_file() {
    supervision()
        .arg("validate")
        .arg("--template")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("odd.toml");
    std::fs::write(
        &path,
        r#"
[template]
id = "odd"
name = "Odd"

[[rubrics]]
id = 1
name = "Empty"
kind = "not_countable"
"#,
    )
    .unwrap();

    supervision()
        .arg("validate")
        .arg("--template")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[rubric 1] WARNING"))
        .stdout(predicate::str::contains("2 warning(s) found"));
}

#[test]
fn replay_complete_session_writes_snapshot() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let output = dir.path().join("out");

    supervision()
        .arg("replay")
        .arg("--template")
        .arg(fixture("classroom-visit.toml"))
        .arg("--actions")
        .arg(fixture("classroom-visit-actions.json"))
        .arg("--teacher")
        .arg("17")
        .arg("--cycle")
        .arg("2025-A")
        .arg("--output")
        .arg(&output)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Final score: 84/100"))
        .stdout(predicate::str::contains("Snapshot saved to"))
        .stderr(predicate::str::contains("Ignored #15 SET_DECISION"));

    let snapshots = files_with_prefix(&output, "snapshot-");
    assert_eq!(snapshots.len(), 1);

    supervision()
        .arg("summary")
        .arg("--snapshot")
        .arg(&snapshots[0])
        .arg("--format")
        .arg("markdown")
        .assert()
        .success()
        .stdout(predicate::str::contains("**Teacher:** 17"))
        .stdout(predicate::str::contains("**Cycle:** 2025-A"))
        .stdout(predicate::str::contains("Jumped straight into the lab"));
}

#[test]
fn replay_partial_session_writes_draft_and_resumes() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let output = dir.path().join("out");

    supervision()
        .arg("replay")
        .arg("--template")
        .arg(fixture("classroom-visit.toml"))
        .arg("--actions")
        .arg(fixture("classroom-visit-partial.json"))
        .arg("--teacher")
        .arg("17")
        .arg("--cycle")
        .arg("2025")
        .arg("--output")
        .arg(&output)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("5 criteria still undecided"))
        .stdout(predicate::str::contains("[Punctuality and Records] G"))
        .stdout(predicate::str::contains("Draft saved to"));

    let drafts = files_with_prefix(&output, "draft-");
    assert_eq!(drafts.len(), 1);
    assert!(files_with_prefix(&output, "snapshot-").is_empty());

    let resumed = dir.path().join("resumed");
    supervision()
        .arg("replay")
        .arg("--template")
        .arg(fixture("classroom-visit.toml"))
        .arg("--actions")
        .arg(fixture("classroom-visit-actions.json"))
        .arg("--teacher")
        .arg("17")
        .arg("--cycle")
        .arg("2025")
        .arg("--draft")
        .arg(&drafts[0])
        .arg("--output")
        .arg(&resumed)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stderr(predicate::str::contains("Resumed draft"))
        .stdout(predicate::str::contains("Snapshot saved to"));
}

#[test]
fn replay_rejects_malformed_actions() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let actions = dir.path().join("bad.json");
    std::fs::write(&actions, r#"[{"type": "SELF_DESTRUCT"}]"#).unwrap();

    supervision()
        .arg("replay")
        .arg("--template")
        .arg(fixture("classroom-visit.toml"))
        .arg("--actions")
        .arg(&actions)
        .arg("--teacher")
        .arg("1")
        .arg("--cycle")
        .arg("1")
        .arg("--output")
        .arg(dir.path().join("out"))
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse actions"));
}

#[test]
fn summary_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    let output = dir.path().join("out");

    supervision()
        .arg("replay")
        .arg("--template")
        .arg(fixture("classroom-visit.toml"))
        .arg("--actions")
        .arg(fixture("classroom-visit-actions.json"))
        .arg("--teacher")
        .arg("1")
        .arg("--cycle")
        .arg("1")
        .arg("--output")
        .arg(&output)
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    let snapshots = files_with_prefix(&output, "snapshot-");
    supervision()
        .arg("summary")
        .arg("--snapshot")
        .arg(&snapshots[0])
        .arg("--format")
        .arg("yaml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format: yaml"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    supervision()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created supervision.toml"))
        .stdout(predicate::str::contains("Created templates/example.toml"));

    assert!(dir.path().join("supervision.toml").exists());
    assert!(dir.path().join("templates/example.toml").exists());
    assert!(dir.path().join("templates/example-actions.json").exists());

    // The scaffolded files work together.
    supervision()
        .current_dir(dir.path())
        .arg("replay")
        .arg("--template")
        .arg("templates/example.toml")
        .arg("--actions")
        .arg("templates/example-actions.json")
        .arg("--teacher")
        .arg("1")
        .arg("--cycle")
        .arg("2025")
        .assert()
        .success()
        .stdout(predicate::str::contains("Final score: 100/100"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    supervision()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    supervision()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}
