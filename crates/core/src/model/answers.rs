use std::collections::{BTreeSet, HashMap};

use crate::model::ids::AnswerKey;
use crate::model::question::OptionId;

/// The user's current selections, keyed per question.
///
/// Entries are created lazily on first selection; a key with no entry reads
/// as the empty selection. Single-answer questions replace their selection on
/// every pick, multi-answer questions toggle membership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    entries: HashMap<AnswerKey, BTreeSet<OptionId>>,
}

impl AnswerSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pick for the given question.
    pub fn select(&mut self, key: AnswerKey, option: OptionId, multi: bool) {
        let entry = self.entries.entry(key).or_default();
        if multi {
            if !entry.remove(&option) {
                entry.insert(option);
            }
        } else {
            entry.clear();
            entry.insert(option);
        }
    }

    /// The current selection for a question; unknown keys read as empty.
    #[must_use]
    pub fn selection(&self, key: AnswerKey) -> BTreeSet<OptionId> {
        self.entries.get(&key).cloned().unwrap_or_default()
    }

    /// Returns true when the option is currently picked for the question.
    #[must_use]
    pub fn is_selected(&self, key: AnswerKey, option: OptionId) -> bool {
        self.entries
            .get(&key)
            .is_some_and(|entry| entry.contains(&option))
    }

    /// Returns true when the question has at least one pick.
    #[must_use]
    pub fn has_any(&self, key: AnswerKey) -> bool {
        self.entries.get(&key).is_some_and(|entry| !entry.is_empty())
    }

    /// Forget every selection; used when a fresh quiz set is drawn.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
