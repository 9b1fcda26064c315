//! Library-level supervision flow tests.
//!
//! Loads the shipped template and action script, drives a session through
//! them, and checks the hand-off artifacts.

use std::path::{Path, PathBuf};

use supervision_core::engine::{Action, SupervisionSession};
use supervision_core::model::{Decision, ItemId};
use supervision_core::parser;
use supervision_core::snapshot::{SessionPatch, SupervisionSnapshot};
use supervision_core::{SupervisionError, TextLimits};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../templates")
        .join(name)
}

fn load_actions(name: &str) -> Vec<Action> {
    let content = std::fs::read_to_string(fixture(name)).unwrap();
    serde_json::from_str(&content).unwrap()
}

fn fresh_session() -> SupervisionSession {
    let template = parser::parse_template(&fixture("classroom-visit.toml")).unwrap();
    SupervisionSession::new(17, "2025-A", template.rubrics)
}

#[test]
fn scripted_visit_reaches_a_saveable_state() {
    let actions = load_actions("classroom-visit-actions.json");
    let session = actions
        .iter()
        .fold(fresh_session(), |session, action| session.dispatch(action));

    assert!(session.can_save());
    assert_eq!(session.final_score(), 84);
    assert!(session.current_rubric_id().is_none());
    assert!(session.is_context_panel_expanded());
    assert_eq!(session.context().topic_covered, "Photosynthesis");

    let percentages: Vec<u8> = session
        .status_of_all_rubrics()
        .iter()
        .map(|s| s.percentage)
        .collect();
    assert_eq!(percentages, vec![67, 100, 50]);
}

#[test]
fn replay_is_deterministic() {
    let actions = load_actions("classroom-visit-actions.json");
    let start = fresh_session();
    let first = actions
        .iter()
        .fold(start.clone(), |session, action| session.dispatch(action));
    let second = actions
        .iter()
        .fold(start, |session, action| session.dispatch(action));
    assert_eq!(first, second);
}

#[test]
fn partial_visit_refuses_snapshot_and_lists_pending() {
    let actions = load_actions("classroom-visit-partial.json");
    let session = actions
        .iter()
        .fold(fresh_session(), |session, action| session.dispatch(action));

    assert!(!session.can_save());
    assert_eq!(
        session.snapshot().unwrap_err(),
        SupervisionError::NotReadyToSave { pending: 5 }
    );

    let pending: Vec<ItemId> = session
        .pending_criteria()
        .into_iter()
        .map(|p| p.criterion_id)
        .collect();
    let expected: Vec<ItemId> = ["B", "C", "E", "F", "G"]
        .into_iter()
        .map(ItemId::from)
        .collect();
    assert_eq!(pending, expected);
}

#[test]
fn draft_survives_a_file_roundtrip() {
    let session = load_actions("classroom-visit-partial.json")
        .iter()
        .fold(fresh_session(), |session, action| session.dispatch(action))
        .dispatch(&Action::FocusRubric {
            rubric_id: Some(3.into()),
        })
        .dispatch(&Action::AdvanceCriterion);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("draft.json");
    session.draft().save_json(&path).unwrap();

    let resumed = fresh_session().dispatch(&Action::LoadSession(
        SessionPatch::load_json(&path).unwrap(),
    ));
    assert_eq!(resumed.rubrics(), session.rubrics());
    assert_eq!(resumed.current_rubric_id(), Some(&ItemId::Num(3)));
    assert_eq!(resumed.current_criterion_index(), 1);
    assert_eq!(resumed.focused_criterion().unwrap().id, ItemId::from("G"));
}

#[test]
fn snapshot_survives_a_file_roundtrip() {
    let session = load_actions("classroom-visit-actions.json")
        .iter()
        .fold(fresh_session(), |session, action| session.dispatch(action));
    let snapshot = session.snapshot().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    snapshot.save_json(&path).unwrap();
    let loaded = SupervisionSnapshot::load_json(&path).unwrap();

    assert_eq!(loaded, snapshot);
    assert_eq!(loaded.final_score, 84);
    assert_eq!(loaded.teacher_id, ItemId::Num(17));
    let c = loaded.rubrics[0].evaluation(&"C".into()).unwrap();
    assert_eq!(c.decision, Decision::NotMet);
    assert_eq!(c.comment.as_deref(), Some("Jumped straight into the lab"));
}

#[test]
fn reset_after_a_full_visit_starts_over() {
    let session = load_actions("classroom-visit-actions.json")
        .iter()
        .fold(fresh_session(), |session, action| session.dispatch(action))
        .dispatch(&Action::ResetSession);

    assert!(!session.can_save());
    assert_eq!(session.pending_criteria().len(), 7);
    assert!(session.context().topic_covered.is_empty());
    assert!(session.context().general_summary.is_empty());
    assert_eq!(session.teacher_id(), &ItemId::Num(17));
}

#[test]
fn limits_apply_to_scripted_text() {
    let limits = TextLimits {
        max_comment_chars: 6,
        max_context_chars: 5,
    };
    let session = load_actions("classroom-visit-actions.json")
        .iter()
        .fold(fresh_session().with_limits(limits), |session, action| {
            session.dispatch(action)
        });

    assert_eq!(session.context().topic_covered, "Photo");
    let c = session.rubrics()[0].evaluation(&"C".into()).unwrap();
    assert_eq!(c.comment.as_deref(), Some("Jumped"));
}
