//! Pure scoring over a drawn quiz set and an answer sheet.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::model::{AnswerKey, AnswerSheet, OptionId, Question};

/// Aggregate score for an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    pub correct: usize,
    pub total: usize,
}

impl ScoreReport {
    /// Score as a rounded percentage; an empty quiz reads as 0.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = (100.0 * self.correct as f64 / self.total as f64).round() as u32;
        percent
    }
}

/// Review data for one question, owned so the presentation layer can render
/// it after the session is torn down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionReview {
    pub position: usize,
    pub key: AnswerKey,
    pub question_no: Option<u32>,
    pub prompt: String,
    pub selected: BTreeSet<OptionId>,
    pub answer: BTreeSet<OptionId>,
    pub correct: bool,
}

/// Order-independent set equality against the canonical answer set.
#[must_use]
pub fn is_correct(question: &Question, selection: &BTreeSet<OptionId>) -> bool {
    selection == question.answer()
}

/// Count correct questions across the quiz set.
#[must_use]
pub fn score(quiz: &[Question], answers: &AnswerSheet) -> ScoreReport {
    let correct = quiz
        .iter()
        .filter(|q| is_correct(q, &answers.selection(q.answer_key())))
        .count();

    ScoreReport {
        correct,
        total: quiz.len(),
    }
}

/// Per-question review listing, in quiz order with 1-based positions.
#[must_use]
pub fn review(quiz: &[Question], answers: &AnswerSheet) -> Vec<QuestionReview> {
    quiz.iter()
        .enumerate()
        .map(|(i, q)| {
            let selected = answers.selection(q.answer_key());
            let correct = is_correct(q, &selected);
            QuestionReview {
                position: i + 1,
                key: q.answer_key(),
                question_no: q.question_no(),
                prompt: q.prompt().to_string(),
                selected,
                answer: q.answer().clone(),
                correct,
            }
        })
        .collect()
}
