mod answers;
mod ids;
mod question;

pub use answers::AnswerSheet;
pub use ids::{AnswerKey, ParseIdError, QuestionId, SessionId};
pub use question::{
    OptionId, ParseOptionIdError, Question, QuestionError, QuestionOption,
};
