#![forbid(unsafe_code)]

//! Loading and validation of the static question bank.
//!
//! The bank is read once from a JSON document and is immutable for the
//! process lifetime. Malformed records are rejected with their index so the
//! operator can fix the document; an empty bank is fatal because no session
//! can ever start from it.

mod document;

use std::collections::BTreeSet;

use thiserror::Error;

use exam_core::model::{OptionId, Question, QuestionError, QuestionId, QuestionOption};

pub use document::{BankDocument, RawId, RawOption, RawQuestion};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    #[error("bank document is not valid JSON")]
    Parse(#[from] serde_json::Error),

    #[error("question bank has no questions")]
    Empty,

    #[error("question at index {index} has a malformed id: '{raw}'")]
    MalformedId { index: usize, raw: String },

    #[error("question at index {index} has a malformed option letter: '{raw}'")]
    MalformedOptionLetter { index: usize, raw: String },

    #[error("question at index {index} has a malformed answer letter: '{raw}'")]
    MalformedAnswerLetter { index: usize, raw: String },

    #[error("question at index {index} is invalid")]
    Question {
        index: usize,
        #[source]
        source: QuestionError,
    },
}

//
// ─── QUESTION BANK ─────────────────────────────────────────────────────────────
//

/// Immutable, ordered collection of validated questions.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Parse and validate a bank from its JSON document.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Parse` for malformed JSON, `BankError::Empty` for
    /// a bank with no questions, and an indexed variant for the first record
    /// that fails validation.
    pub fn from_json(raw: &str) -> Result<Self, BankError> {
        let document: BankDocument = serde_json::from_str(raw)?;
        Self::from_document(document)
    }

    /// Validate an already-deserialized document.
    ///
    /// A `count` field disagreeing with the number of records is tolerated;
    /// the records are authoritative.
    ///
    /// # Errors
    ///
    /// Same as [`QuestionBank::from_json`], minus the JSON parse failure.
    pub fn from_document(document: BankDocument) -> Result<Self, BankError> {
        let loaded = document.questions.len();
        if let Some(count) = document.count {
            if count != loaded as u64 {
                tracing::warn!("bank count field says {count} but {loaded} questions were loaded");
            }
        }

        let questions = document
            .questions
            .into_iter()
            .enumerate()
            .map(|(index, raw)| validate_question(index, raw))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_questions(questions)
    }

    /// Build a bank from already-validated questions.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Empty` when no questions are given.
    pub fn from_questions(questions: Vec<Question>) -> Result<Self, BankError> {
        if questions.is_empty() {
            return Err(BankError::Empty);
        }
        tracing::info!("loaded question bank with {} questions", questions.len());
        Ok(Self { questions })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false: construction rejects empty banks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }
}

fn validate_question(index: usize, raw: RawQuestion) -> Result<Question, BankError> {
    let id = match raw.id {
        RawId::Number(n) => QuestionId::new(n),
        RawId::Text(text) => text.parse().map_err(|_| BankError::MalformedId {
            index,
            raw: text.clone(),
        })?,
    };

    let options = raw
        .options
        .into_iter()
        .map(|option| {
            let letter: OptionId =
                option
                    .id
                    .parse()
                    .map_err(|_| BankError::MalformedOptionLetter {
                        index,
                        raw: option.id.clone(),
                    })?;
            Ok(QuestionOption::new(letter, option.text))
        })
        .collect::<Result<Vec<_>, BankError>>()?;

    let answer = raw
        .answer
        .into_iter()
        .map(|letter| {
            letter
                .parse::<OptionId>()
                .map_err(|_| BankError::MalformedAnswerLetter {
                    index,
                    raw: letter.clone(),
                })
        })
        .collect::<Result<BTreeSet<_>, BankError>>()?;

    Question::new(id, raw.question_no, raw.question, options, answer, raw.multi)
        .map_err(|source| BankError::Question { index, source })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn two_options(index: u64) -> String {
        format!(
            r#"{{
                "id": {index},
                "question": "Prompt {index}",
                "options": [
                    {{"id": "A", "text": "first"}},
                    {{"id": "B", "text": "second"}}
                ],
                "answer": ["A"],
                "multi": false
            }}"#
        )
    }

    #[test]
    fn loads_a_well_formed_document() {
        let raw = format!(
            r#"{{"count": 2, "questions": [{}, {}]}}"#,
            two_options(1),
            two_options(2)
        );
        let bank = QuestionBank::from_json(&raw).unwrap();

        assert_eq!(bank.len(), 2);
        assert_eq!(bank.get(0).unwrap().id(), QuestionId::new(1));
        assert_eq!(bank.get(0).unwrap().answer().len(), 1);
    }

    #[test]
    fn accepts_string_ids_that_parse_as_numbers() {
        let raw = r#"{"questions": [{
            "id": "481",
            "questionNo": 12,
            "question": "Prompt",
            "options": [{"id": "A", "text": "a"}, {"id": "B", "text": "b"}],
            "answer": ["B"],
            "multi": false
        }]}"#;
        let bank = QuestionBank::from_json(raw).unwrap();
        assert_eq!(bank.get(0).unwrap().id(), QuestionId::new(481));
        assert_eq!(bank.get(0).unwrap().question_no(), Some(12));
    }

    #[test]
    fn rejects_non_numeric_string_ids() {
        let raw = r#"{"questions": [{
            "id": "q-one",
            "question": "Prompt",
            "options": [{"id": "A", "text": "a"}, {"id": "B", "text": "b"}],
            "answer": ["A"]
        }]}"#;
        let err = QuestionBank::from_json(raw).unwrap_err();
        assert!(matches!(err, BankError::MalformedId { index: 0, .. }));
    }

    #[test]
    fn rejects_answer_letters_outside_the_alphabet() {
        let raw = r#"{"questions": [{
            "id": 1,
            "question": "Prompt",
            "options": [{"id": "A", "text": "a"}, {"id": "B", "text": "b"}],
            "answer": ["Z"]
        }]}"#;
        let err = QuestionBank::from_json(raw).unwrap_err();
        assert!(matches!(
            err,
            BankError::MalformedAnswerLetter { index: 0, .. }
        ));
    }

    #[test]
    fn surfaces_model_invariants_with_the_record_index() {
        let raw = r#"{"questions": [{
            "id": 1,
            "question": "Prompt",
            "options": [{"id": "A", "text": "a"}, {"id": "B", "text": "b"}],
            "answer": ["A", "B"],
            "multi": false
        }]}"#;
        let err = QuestionBank::from_json(raw).unwrap_err();
        assert!(matches!(
            err,
            BankError::Question {
                index: 0,
                source: QuestionError::ExtraAnswersOnSingle(2)
            }
        ));
    }

    #[test]
    fn empty_bank_is_fatal() {
        let err = QuestionBank::from_json(r#"{"count": 0, "questions": []}"#).unwrap_err();
        assert!(matches!(err, BankError::Empty));
    }

    #[test]
    fn garbage_json_is_a_parse_error() {
        let err = QuestionBank::from_json("not json").unwrap_err();
        assert!(matches!(err, BankError::Parse(_)));
    }
}
