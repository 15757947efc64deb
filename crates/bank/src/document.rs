//! Raw, loosely-typed mirror of the bank document as serialized.
//!
//! Records are validated into the strict `exam_core` model by the loader;
//! nothing outside this crate should ever see these shapes.

use serde::Deserialize;

/// The bank document: a total count and an ordered list of question records.
#[derive(Debug, Clone, Deserialize)]
pub struct BankDocument {
    #[serde(default)]
    pub count: Option<u64>,
    pub questions: Vec<RawQuestion>,
}

/// One question record as it appears on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    pub id: RawId,
    #[serde(default, rename = "questionNo")]
    pub question_no: Option<u32>,
    pub question: String,
    pub options: Vec<RawOption>,
    #[serde(default)]
    pub answer: Vec<String>,
    #[serde(default)]
    pub multi: bool,
}

/// Bank identities appear both as numbers and as numeric strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(u64),
    Text(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOption {
    pub id: String,
    pub text: String,
}
