//! Two-phase editing of the overall discount / paid boxes.
//!
//! While the user types, the raw text is held as a draft and nothing is
//! redistributed. Only an explicit commit (blur or Enter) coerces the draft
//! and hands the value to the distributor or allocator.

use crate::coerce::to_int_with_max;

/// A draft (free-form text) over a committed integer value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftValue {
    draft: Option<String>,
    committed: i64,
}

impl DraftValue {
    pub fn new(committed: i64) -> Self {
        Self {
            draft: None,
            committed,
        }
    }

    /// Record a keystroke. No validation happens here.
    pub fn edit(&mut self, raw: impl Into<String>) {
        self.draft = Some(raw.into());
    }

    /// Coerce and return the pending draft, clearing it.
    ///
    /// Returns `None` when there is nothing to commit. The committed value is
    /// refreshed later via [`DraftValue::sync`], once the redistribution has
    /// produced the real figure.
    pub fn commit(&mut self, max_amount: i64) -> Option<i64> {
        self.draft
            .take()
            .map(|raw| to_int_with_max(&raw, max_amount))
    }

    /// Drop the pending draft, reverting to the committed value.
    pub fn cancel(&mut self) {
        self.draft = None;
    }

    /// Refresh the committed value from current totals. A draft being typed
    /// is left alone.
    pub fn sync(&mut self, committed: i64) {
        self.committed = committed;
    }

    pub fn is_dirty(&self) -> bool {
        self.draft.is_some()
    }

    pub fn draft(&self) -> Option<&str> {
        self.draft.as_deref()
    }

    pub fn committed(&self) -> i64 {
        self.committed
    }

    /// What the input box shows: the draft if one is pending.
    pub fn display(&self) -> String {
        match &self.draft {
            Some(raw) => raw.clone(),
            None => self.committed.to_string(),
        }
    }
}
