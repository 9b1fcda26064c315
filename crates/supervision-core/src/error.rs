//! Session error types.
//!
//! The engine itself never fails; these errors are raised at the hand-off
//! boundary where a caller asks for something the session cannot give yet.

use thiserror::Error;

/// Errors surfaced to callers of a supervision session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SupervisionError {
    /// A snapshot was requested while some criteria are still undecided.
    #[error("session is not ready to save: {pending} criteria still undecided")]
    NotReadyToSave { pending: usize },
}
