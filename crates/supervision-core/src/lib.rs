//! supervision-core — Rubric evaluation model and supervision session engine.
//!
//! This crate defines the rubric data model, the pure status and score
//! derivations, and the action-driven session engine that a supervisor
//! walks through while observing a teacher.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod snapshot;
pub mod status;

pub use config::{load_config_from, SupervisionConfig, TextLimits};
pub use engine::{Action, Dispatch, IgnoreReason, SupervisionSession};
pub use error::SupervisionError;
pub use model::{
    CriterionEvaluation, Decision, ItemId, Rubric, RubricCriterion, RubricKind, RubricTemplate,
    SupervisionContext,
};
pub use snapshot::{SessionPatch, SupervisionSnapshot};
pub use status::{
    compute_final_score, compute_rubric_status, is_session_ready_to_save, RubricStatus,
};
