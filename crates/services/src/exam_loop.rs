use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bank::QuestionBank;
use exam_core::Clock;
use exam_core::config::ExamConfig;
use exam_core::model::SessionId;
use exam_core::scoring::ScoreReport;

use crate::error::SessionError;
use crate::seed::SeedSource;
use crate::sessions::{ExamSession, GatingMode, SharedSession};
use crate::timer::ExamTimer;

/// Orchestrates exam start, retry, and teardown against a loaded bank.
///
/// Owns the clock, the seed source, and the armed timer. Every fresh draw
/// gets a new seed and a new `SessionId`; replacing the active session always
/// cancels the prior timer first, so only one tick task can ever be live.
pub struct ExamLoopService {
    clock: Clock,
    bank: Arc<QuestionBank>,
    config: ExamConfig,
    gating: GatingMode,
    seeds: Mutex<SeedSource>,
    next_session: AtomicU64,
    timer: Mutex<Option<ExamTimer>>,
}

impl ExamLoopService {
    #[must_use]
    pub fn new(clock: Clock, bank: Arc<QuestionBank>, config: ExamConfig) -> Self {
        Self {
            clock,
            bank,
            config,
            gating: GatingMode::default(),
            seeds: Mutex::new(SeedSource::default()),
            next_session: AtomicU64::new(1),
            timer: Mutex::new(None),
        }
    }

    /// Replace the default wall-clock seed source, for deterministic draws.
    #[must_use]
    pub fn with_seeds(self, seeds: SeedSource) -> Self {
        Self {
            seeds: Mutex::new(seeds),
            ..self
        }
    }

    /// Select the flow variant; per-question gating is the default.
    #[must_use]
    pub fn with_gating(mut self, gating: GatingMode) -> Self {
        self.gating = gating;
        self
    }

    #[must_use]
    pub fn config(&self) -> ExamConfig {
        self.config
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Draw a fresh quiz set and hand back the shared session.
    ///
    /// Any timer armed for a previous session is cancelled first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the draw yields no questions.
    pub fn start(&self) -> Result<SharedSession, SessionError> {
        self.disarm_timer();
        let session = self.draw()?;
        tracing::info!(
            "started exam session {} with {} questions",
            session.id(),
            session.total_questions()
        );
        Ok(Arc::new(Mutex::new(session)))
    }

    /// Arm the once-per-second countdown task for the session.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn arm_timer(&self, session: &SharedSession) {
        let timer = ExamTimer::spawn(Arc::clone(session), self.clock);
        if let Some(prior) = lock(&self.timer).replace(timer) {
            prior.cancel();
        }
    }

    /// Replace the active exam with a fresh draw: the "new random set" flow.
    ///
    /// The prior timer is cancelled before the new session exists; if one was
    /// armed, a new timer is armed for the fresh session (which, like
    /// [`Self::arm_timer`], needs the tokio runtime).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the draw yields no questions.
    pub fn restart(&self, session: &SharedSession) -> Result<(), SessionError> {
        let was_armed = self.disarm_timer();
        let fresh = self.draw()?;
        tracing::info!(
            "redrew exam session {} with {} questions",
            fresh.id(),
            fresh.total_questions()
        );
        *lock(session) = fresh;
        if was_armed {
            self.arm_timer(session);
        }
        Ok(())
    }

    /// Retry a submitted exam with a fresh draw and a new seed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSubmitted` while the exam is in progress,
    /// and `SessionError::Empty` if the fresh draw yields no questions.
    pub fn retry(&self, session: &SharedSession) -> Result<(), SessionError> {
        if !lock(session).is_submitted() {
            return Err(SessionError::NotSubmitted);
        }
        self.restart(session)
    }

    /// Tear down a submitted exam, returning the final score.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSubmitted` while the exam is in progress.
    pub fn exit(&self, session: &SharedSession) -> Result<ScoreReport, SessionError> {
        let (id, report) = {
            let session = lock(session);
            (session.id(), session.final_score()?)
        };
        self.disarm_timer();
        tracing::info!(
            "exam session {id} exited with score {}/{}",
            report.correct,
            report.total
        );
        Ok(report)
    }

    fn draw(&self) -> Result<ExamSession, SessionError> {
        let seed = lock(&self.seeds).next_seed(&self.clock);
        let id = SessionId::new(self.next_session.fetch_add(1, Ordering::Relaxed));
        ExamSession::start(
            id,
            &self.bank,
            &self.config,
            self.gating,
            seed,
            self.clock.now(),
        )
    }

    /// Cancel any armed timer; reports whether one was armed.
    fn disarm_timer(&self) -> bool {
        match lock(&self.timer).take() {
            Some(timer) => {
                timer.cancel();
                true
            }
            None => false,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::countdown::ExamDuration;
    use exam_core::model::{OptionId, Question, QuestionId, QuestionOption};
    use exam_core::time::fixed_clock;

    fn bank_of(n: u64) -> Arc<QuestionBank> {
        let questions = (1..=n)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    Some(id as u32),
                    format!("Prompt {id}"),
                    vec![
                        QuestionOption::new(OptionId::A, "a"),
                        QuestionOption::new(OptionId::B, "b"),
                    ],
                    [OptionId::A].into_iter().collect(),
                    false,
                )
                .unwrap()
            })
            .collect();
        Arc::new(QuestionBank::from_questions(questions).unwrap())
    }

    fn service(seeds: SeedSource) -> ExamLoopService {
        ExamLoopService::new(
            fixed_clock(),
            bank_of(10),
            ExamConfig::new(5, ExamDuration::new(0, 1)),
        )
        .with_seeds(seeds)
    }

    #[test]
    fn start_draws_the_clamped_count_with_the_injected_seed() {
        let service = service(SeedSource::sequence([42]));
        let session = service.start().unwrap();
        let session = lock(&session);

        assert_eq!(session.total_questions(), 5);
        assert_eq!(session.seed(), 42);
        assert_eq!(session.id(), SessionId::new(1));
    }

    #[test]
    fn retry_requires_a_submitted_exam() {
        let service = service(SeedSource::sequence([1, 2]));
        let session = service.start().unwrap();

        assert!(matches!(
            service.retry(&session),
            Err(SessionError::NotSubmitted)
        ));

        lock(&session).end_now(fixed_clock().now());
        service.retry(&session).unwrap();

        let fresh = lock(&session);
        assert!(!fresh.is_submitted());
        assert_eq!(fresh.seed(), 2);
        assert_eq!(fresh.id(), SessionId::new(2));
        assert_eq!(fresh.current_index(), 0);
        assert_eq!(fresh.live_score().correct, 0);
    }

    #[test]
    fn distinct_seeds_draw_distinct_quiz_sets() {
        let service = service(SeedSource::sequence([1, 2]));
        let session = service.start().unwrap();
        let first: Vec<QuestionId> = lock(&session).quiz().iter().map(Question::id).collect();

        service.restart(&session).unwrap();
        let second: Vec<QuestionId> = lock(&session).quiz().iter().map(Question::id).collect();

        assert_ne!(first, second);
    }

    #[test]
    fn exit_reports_the_final_score_once_submitted() {
        let service = service(SeedSource::sequence([42]));
        let session = service.start().unwrap();

        assert!(matches!(
            service.exit(&session),
            Err(SessionError::NotSubmitted)
        ));

        lock(&session).end_now(fixed_clock().now());
        let report = service.exit(&session).unwrap();
        assert_eq!(report.total, 5);
    }
}
