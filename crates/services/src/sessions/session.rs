use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;

use bank::QuestionBank;
use exam_core::config::ExamConfig;
use exam_core::countdown::{Countdown, TickOutcome};
use exam_core::model::{AnswerKey, AnswerSheet, OptionId, Question, SessionId};
use exam_core::sampler;
use exam_core::scoring::{self, QuestionReview, ScoreReport};

use super::progress::ExamProgress;
use crate::error::SessionError;

//
// ─── STATES & OUTCOMES ─────────────────────────────────────────────────────────
//

/// Overall exam lifecycle. `Submitted` is terminal for answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamPhase {
    InProgress,
    Submitted,
}

/// How the exam left `InProgress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The user moved past the last question.
    LastQuestion,
    /// The user ended the exam before the last question.
    EndedEarly,
    /// The countdown reached zero.
    TimeExpired,
}

/// Whether "next" is gated behind a per-question submit step.
///
/// `PerQuestion` is the full flow: submit the current question, see the
/// verdict, then move on. `Free` permits plain navigation without the
/// intermediate confirm step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatingMode {
    #[default]
    PerQuestion,
    Free,
}

/// What became of a selection intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Applied,
    /// The intent was inconsistent with the current state and was dropped.
    Ignored,
}

/// What became of a per-question submit intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted { correct: bool },
    /// Submission requires at least one selected option.
    NothingSelected,
    Ignored,
}

/// What became of a navigation intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Moved { index: usize },
    /// Navigation is currently gated or clamped; the index did not change.
    Blocked,
    /// Moving past the last question submitted the exam.
    Finished,
    Ignored,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One attempt at a drawn quiz set.
///
/// Owns the quiz set, the answer sheet, the cursor, and the countdown, and
/// mediates every transition. Intents inconsistent with the current state are
/// ignored rather than rejected with errors; once the exam is submitted the
/// sheet is frozen and only scoring reads remain.
pub struct ExamSession {
    id: SessionId,
    seed: u32,
    gating: GatingMode,
    quiz: Vec<Question>,
    current: usize,
    answers: AnswerSheet,
    question_submitted: bool,
    countdown: Countdown,
    started_at: DateTime<Utc>,
    submitted_at: Option<DateTime<Utc>>,
    finish_reason: Option<FinishReason>,
}

impl ExamSession {
    /// Draw a quiz set from the bank and start the exam clock.
    ///
    /// The draw takes `min(clamped count, bank size)` questions in seeded
    /// random order; `started_at` should come from the services layer clock.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the draw yields no questions.
    pub fn start(
        id: SessionId,
        bank: &QuestionBank,
        config: &ExamConfig,
        gating: GatingMode,
        seed: u32,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let count = config.clamped_count(bank.len());
        let quiz = sampler::sample(bank.questions(), count, seed);
        if quiz.is_empty() {
            return Err(SessionError::Empty);
        }

        Ok(Self {
            id,
            seed,
            gating,
            quiz,
            current: 0,
            answers: AnswerSheet::new(),
            question_submitted: false,
            countdown: Countdown::new(config.duration().total_seconds()),
            started_at,
            submitted_at: None,
            finish_reason: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn seed(&self) -> u32 {
        self.seed
    }

    #[must_use]
    pub fn gating(&self) -> GatingMode {
        self.gating
    }

    #[must_use]
    pub fn phase(&self) -> ExamPhase {
        if self.submitted_at.is_some() {
            ExamPhase::Submitted
        } else {
            ExamPhase::InProgress
        }
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    #[must_use]
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    /// Total number of questions in the drawn quiz set.
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.quiz.len()
    }

    /// Current cursor position, 0-based and always in bounds.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        // The quiz set is non-empty and the cursor only ever clamps inside it.
        &self.quiz[self.current]
    }

    #[must_use]
    pub fn quiz(&self) -> &[Question] {
        &self.quiz
    }

    /// Whether the current question has been through its confirm step.
    #[must_use]
    pub fn question_submitted(&self) -> bool {
        self.question_submitted
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.countdown.remaining_seconds()
    }

    /// Remaining time as zero-padded `HH:MM:SS`.
    #[must_use]
    pub fn remaining_display(&self) -> String {
        self.countdown.to_string()
    }

    /// The user's current selection for the current question.
    #[must_use]
    pub fn current_selection(&self) -> BTreeSet<OptionId> {
        self.answers.selection(self.current_question().answer_key())
    }

    /// Whether an option is picked on the current question, for rendering.
    #[must_use]
    pub fn is_selected(&self, option: OptionId) -> bool {
        self.answers
            .is_selected(self.current_question().answer_key(), option)
    }

    //
    // ─── INTENTS ───────────────────────────────────────────────────────────────
    //

    /// Pick an option on the current question.
    ///
    /// Replaces the selection for single-answer questions, toggles for
    /// multi-answer ones. Ignored once the question or the exam is
    /// submitted, and for letters the question does not offer.
    pub fn select_option(&mut self, option: OptionId) -> SelectOutcome {
        if self.is_submitted() || self.question_submitted {
            return SelectOutcome::Ignored;
        }
        let question = self.current_question();
        if !question.has_option(option) {
            return SelectOutcome::Ignored;
        }
        let key = question.answer_key();
        let multi = question.is_multi();
        self.answers.select(key, option, multi);
        SelectOutcome::Applied
    }

    /// Confirm the current question, exposing its verdict without advancing.
    pub fn submit_question(&mut self) -> SubmitOutcome {
        if self.is_submitted() || self.question_submitted {
            return SubmitOutcome::Ignored;
        }
        let key = self.current_question().answer_key();
        if !self.answers.has_any(key) {
            return SubmitOutcome::NothingSelected;
        }
        self.question_submitted = true;
        SubmitOutcome::Submitted {
            correct: scoring::is_correct(self.current_question(), &self.answers.selection(key)),
        }
    }

    /// Move to the next question, or finish the exam from the last one.
    ///
    /// In `PerQuestion` mode the move is gated behind [`Self::submit_question`].
    pub fn next(&mut self, now: DateTime<Utc>) -> NavOutcome {
        if self.is_submitted() {
            return NavOutcome::Ignored;
        }
        if self.gating == GatingMode::PerQuestion && !self.question_submitted {
            return NavOutcome::Blocked;
        }
        if self.current + 1 < self.quiz.len() {
            self.current += 1;
            self.question_submitted = false;
            NavOutcome::Moved {
                index: self.current,
            }
        } else {
            self.finish(FinishReason::LastQuestion, now);
            NavOutcome::Finished
        }
    }

    /// Move to the previous question, clamping at the first.
    ///
    /// Any accepted navigation resets the per-question confirm state, even
    /// when the index clamps in place.
    pub fn previous(&mut self) -> NavOutcome {
        if self.is_submitted() {
            return NavOutcome::Ignored;
        }
        self.question_submitted = false;
        if self.current > 0 {
            self.current -= 1;
            NavOutcome::Moved {
                index: self.current,
            }
        } else {
            NavOutcome::Blocked
        }
    }

    /// End the exam immediately, before the last question.
    ///
    /// Returns false when the exam was already submitted.
    pub fn end_now(&mut self, now: DateTime<Utc>) -> bool {
        self.finish(FinishReason::EndedEarly, now)
    }

    /// Advance the exam clock by one second.
    ///
    /// Only ticks while the exam is in progress; expiry submits the exam
    /// exactly once, and every tick after that reads `Idle`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if self.is_submitted() {
            return TickOutcome::Idle;
        }
        let outcome = self.countdown.tick();
        if outcome == TickOutcome::Expired {
            self.finish(FinishReason::TimeExpired, now);
        }
        outcome
    }

    fn finish(&mut self, reason: FinishReason, now: DateTime<Utc>) -> bool {
        if self.is_submitted() {
            return false;
        }
        self.submitted_at = Some(now);
        self.finish_reason = Some(reason);
        self.question_submitted = false;
        true
    }

    //
    // ─── SCORING READS ─────────────────────────────────────────────────────────
    //

    /// Running score over the frozen-or-not answer sheet.
    #[must_use]
    pub fn live_score(&self) -> ScoreReport {
        scoring::score(&self.quiz, &self.answers)
    }

    /// Final score, available only once the exam is submitted.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSubmitted` while the exam is in progress.
    pub fn final_score(&self) -> Result<ScoreReport, SessionError> {
        if !self.is_submitted() {
            return Err(SessionError::NotSubmitted);
        }
        Ok(self.live_score())
    }

    /// Per-question review listing, available only once the exam is submitted.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSubmitted` while the exam is in progress.
    pub fn review(&self) -> Result<Vec<QuestionReview>, SessionError> {
        if !self.is_submitted() {
            return Err(SessionError::NotSubmitted);
        }
        Ok(scoring::review(&self.quiz, &self.answers))
    }

    /// Verdict for a question, `None` while it is still hidden.
    ///
    /// A verdict is known for every question once the exam is submitted, and
    /// for the current question once it has been through its confirm step.
    /// Unknown keys read as `None`.
    #[must_use]
    pub fn verdict(&self, key: AnswerKey) -> Option<bool> {
        let revealed = self.is_submitted()
            || (self.question_submitted && key == self.current_question().answer_key());
        if !revealed {
            return None;
        }
        self.quiz
            .iter()
            .find(|q| q.answer_key() == key)
            .map(|q| scoring::is_correct(q, &self.answers.selection(key)))
    }

    /// Verdict for the current question, `None` before its confirm step.
    #[must_use]
    pub fn current_verdict(&self) -> Option<bool> {
        self.verdict(self.current_question().answer_key())
    }

    /// Returns a summary of the attempt's progress.
    #[must_use]
    pub fn progress(&self) -> ExamProgress {
        let total = self.quiz.len();
        let answered = self
            .quiz
            .iter()
            .filter(|q| self.answers.has_any(q.answer_key()))
            .count();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = (100.0 * (self.current + 1) as f64 / total as f64).round() as u32;

        ExamProgress {
            total,
            answered,
            position: self.current + 1,
            percent,
            is_submitted: self.is_submitted(),
        }
    }
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("id", &self.id)
            .field("seed", &self.seed)
            .field("quiz_len", &self.quiz.len())
            .field("current", &self.current)
            .field("question_submitted", &self.question_submitted)
            .field("remaining", &self.countdown.remaining_seconds())
            .field("submitted_at", &self.submitted_at)
            .field("finish_reason", &self.finish_reason)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
