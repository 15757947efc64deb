use serde::Serialize;

/// Aggregated view of exam progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExamProgress {
    pub total: usize,
    pub answered: usize,
    /// 1-based position of the current question.
    pub position: usize,
    /// Rounded percentage of the way through the quiz set.
    pub percent: u32,
    pub is_submitted: bool,
}
