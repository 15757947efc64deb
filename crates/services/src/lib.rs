#![forbid(unsafe_code)]

pub mod error;
mod exam_loop;
mod seed;
pub mod sessions;
mod timer;

pub use exam_core::Clock;

pub use error::SessionError;
pub use exam_loop::ExamLoopService;
pub use seed::SeedSource;
pub use sessions::{
    ExamPhase, ExamProgress, ExamSession, FinishReason, GatingMode, NavOutcome, SelectOutcome,
    SharedSession, SubmitOutcome,
};
pub use timer::ExamTimer;
