//! Shared error types for the services crate.

use thiserror::Error;

/// Errors emitted by exam session services.
///
/// Intents that merely arrive in the wrong state (selecting on a submitted
/// exam, navigating past the gate) are not errors; the state machine reports
/// those as ignored outcomes. These variants cover genuine misuse.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available to draw")]
    Empty,

    #[error("exam has not been submitted yet")]
    NotSubmitted,
}
