use std::sync::{Arc, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use exam_core::Clock;
use exam_core::countdown::TickOutcome;
use exam_core::model::SessionId;

use crate::sessions::SharedSession;

/// Handle to the once-per-second tick task for one exam session.
///
/// The task remembers the session identity it was armed for and re-checks it
/// on every tick, so a timer left over from a replaced session exits on its
/// own instead of mutating the newer exam. It also stops itself once the
/// countdown expires or the exam is otherwise submitted. Dropping the handle
/// aborts the task.
#[derive(Debug)]
pub struct ExamTimer {
    session_id: SessionId,
    handle: JoinHandle<()>,
}

impl ExamTimer {
    /// Spawn the tick task for `session`.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn spawn(session: SharedSession, clock: Clock) -> Self {
        let session_id = session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .id();
        let shared = Arc::clone(&session);

        let handle = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(Duration::from_secs(1));
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick completes immediately; skip it so the
            // clock loses its first second a full second after arming.
            ticks.tick().await;

            loop {
                ticks.tick().await;
                let mut session = shared.lock().unwrap_or_else(PoisonError::into_inner);
                if session.id() != session_id {
                    break;
                }
                match session.tick(clock.now()) {
                    TickOutcome::Running { .. } => {}
                    TickOutcome::Expired => {
                        tracing::info!("exam time expired, session {session_id} submitted");
                        break;
                    }
                    TickOutcome::Idle => break,
                }
            }
        });

        Self { session_id, handle }
    }

    /// The session this timer was armed for.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Stop ticking immediately.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// True once the task has exited: expired, superseded, or cancelled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ExamTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
