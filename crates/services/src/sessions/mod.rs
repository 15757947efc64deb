mod progress;
mod session;

use std::sync::{Arc, Mutex};

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::ExamProgress;
pub use session::{
    ExamPhase, ExamSession, FinishReason, GatingMode, NavOutcome, SelectOutcome, SubmitOutcome,
};

/// Shared handle to the active exam session.
///
/// The presentation layer and the timer task both hold this; every intent
/// and tick runs to completion under the lock.
pub type SharedSession = Arc<Mutex<ExamSession>>;
