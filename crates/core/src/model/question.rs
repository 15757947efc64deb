use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{AnswerKey, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("prompt cannot be empty")]
    EmptyPrompt,

    #[error("question must offer at least two options")]
    TooFewOptions,

    #[error("option {0} appears more than once")]
    DuplicateOption(OptionId),

    #[error("answer set cannot be empty")]
    EmptyAnswer,

    #[error("answer references option {0} that the question does not offer")]
    UnknownAnswerOption(OptionId),

    #[error("single-answer question must have exactly one correct option, got {0}")]
    ExtraAnswersOnSingle(usize),
}

//
// ─── OPTION LETTERS ────────────────────────────────────────────────────────────
//

/// Option letter from the fixed answer alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionId {
    A,
    B,
    C,
    D,
    E,
}

impl OptionId {
    pub const ALL: [OptionId; 5] = [
        OptionId::A,
        OptionId::B,
        OptionId::C,
        OptionId::D,
        OptionId::E,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionId::A => "A",
            OptionId::B => "B",
            OptionId::C => "C",
            OptionId::D => "D",
            OptionId::E => "E",
        }
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing an option letter from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptionIdError {
    raw: String,
}

impl fmt::Display for ParseOptionIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not an option letter (A-E)", self.raw)
    }
}

impl std::error::Error for ParseOptionIdError {}

impl FromStr for OptionId {
    type Err = ParseOptionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(OptionId::A),
            "B" | "b" => Ok(OptionId::B),
            "C" | "c" => Ok(OptionId::C),
            "D" | "d" => Ok(OptionId::D),
            "E" | "e" => Ok(OptionId::E),
            other => Err(ParseOptionIdError {
                raw: other.to_string(),
            }),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One selectable option: a letter and its display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    id: OptionId,
    text: String,
}

impl QuestionOption {
    #[must_use]
    pub fn new(id: OptionId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> OptionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A multiple-choice question with its canonical answer set.
///
/// Constructed only through [`Question::new`], which enforces the bank
/// invariants, so downstream code can rely on the shape without re-checking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    question_no: Option<u32>,
    prompt: String,
    options: Vec<QuestionOption>,
    answer: BTreeSet<OptionId>,
    multi: bool,
}

impl Question {
    /// Build a question, validating the bank invariants.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the prompt is empty, fewer than two
    /// options are offered, an option letter repeats, the answer set is empty
    /// or references an unknown letter, or a single-answer question carries
    /// more than one correct option.
    pub fn new(
        id: QuestionId,
        question_no: Option<u32>,
        prompt: impl Into<String>,
        options: Vec<QuestionOption>,
        answer: BTreeSet<OptionId>,
        multi: bool,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions);
        }

        let mut seen = BTreeSet::new();
        for option in &options {
            if !seen.insert(option.id()) {
                return Err(QuestionError::DuplicateOption(option.id()));
            }
        }

        if answer.is_empty() {
            return Err(QuestionError::EmptyAnswer);
        }
        if let Some(unknown) = answer.iter().find(|id| !seen.contains(id)) {
            return Err(QuestionError::UnknownAnswerOption(*unknown));
        }
        if !multi && answer.len() != 1 {
            return Err(QuestionError::ExtraAnswersOnSingle(answer.len()));
        }

        Ok(Self {
            id,
            question_no,
            prompt,
            options,
            answer,
            multi,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn question_no(&self) -> Option<u32> {
        self.question_no
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[QuestionOption] {
        &self.options
    }

    #[must_use]
    pub fn answer(&self) -> &BTreeSet<OptionId> {
        &self.answer
    }

    #[must_use]
    pub fn is_multi(&self) -> bool {
        self.multi
    }

    /// Stable key for storing this question's selections.
    #[must_use]
    pub fn answer_key(&self) -> AnswerKey {
        match self.question_no {
            Some(no) => AnswerKey::Number(no),
            None => AnswerKey::Ident(self.id),
        }
    }

    /// Returns true when the question offers the given option letter.
    #[must_use]
    pub fn has_option(&self, option: OptionId) -> bool {
        self.options.iter().any(|o| o.id() == option)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
