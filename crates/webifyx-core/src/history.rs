//! Snapshot-based undo/redo history.

use crate::element::Element;
use chrono::{DateTime, Utc};

/// Maximum number of history entries to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Description of the entry every history starts from.
pub const INITIAL_STATE: &str = "Initial state";

/// A full copy of the element list at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    elements: Vec<Element>,
    timestamp: DateTime<Utc>,
    description: String,
}

impl HistoryEntry {
    fn new(elements: Vec<Element>, description: impl Into<String>) -> Self {
        Self {
            elements,
            timestamp: Utc::now(),
            description: description.into(),
        }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Linear history log with a cursor.
///
/// The log is never empty and the cursor always points at a valid entry.
/// Recording a new entry after an undo discards the undone entries.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    index: usize,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Create a history holding at most [`MAX_UNDO_HISTORY`] entries.
    pub fn new() -> Self {
        Self::with_limit(MAX_UNDO_HISTORY)
    }

    /// Create a history with a custom entry limit (at least 1).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: vec![HistoryEntry::new(Vec::new(), INITIAL_STATE)],
            index: 0,
            limit: limit.max(1),
        }
    }

    /// Record a snapshot of `elements` as the newest entry.
    pub fn push(&mut self, description: impl Into<String>, elements: &[Element]) {
        // Drop the redo branch
        self.entries.truncate(self.index + 1);
        self.entries
            .push(HistoryEntry::new(elements.to_vec(), description));

        if self.entries.len() > self.limit {
            self.entries.remove(0);
        }
        self.index = self.entries.len() - 1;
    }

    /// Step back one entry, returning its snapshot.
    /// Returns None at the start of history.
    pub fn undo(&mut self) -> Option<&[Element]> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.entries[self.index].elements())
    }

    /// Step forward one entry, returning its snapshot.
    /// Returns None at the end of history.
    pub fn redo(&mut self) -> Option<&[Element]> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.entries[self.index].elements())
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Number of entries in the log.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: the log keeps at least one entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of the current entry.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The entry the cursor points at.
    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;

    fn list(ids: &[&str]) -> Vec<Element> {
        ids.iter()
            .map(|id| Element::with_id(*id, ElementKind::Text))
            .collect()
    }

    #[test]
    fn test_starts_with_initial_state() {
        let history = History::new();
        assert_eq!(history.len(), 1);
        assert_eq!(history.index(), 0);
        assert_eq!(history.current().description(), INITIAL_STATE);
        assert!(history.current().elements().is_empty());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_walk_the_log() {
        let mut history = History::new();
        history.push("first", &list(&["a"]));
        history.push("second", &list(&["a", "b"]));

        assert_eq!(history.undo().unwrap().len(), 1);
        assert_eq!(history.undo().unwrap().len(), 0);
        assert!(history.undo().is_none());
        assert_eq!(history.index(), 0);

        assert_eq!(history.redo().unwrap().len(), 1);
        assert_eq!(history.redo().unwrap().len(), 2);
        assert!(history.redo().is_none());
        assert_eq!(history.index(), 2);
    }

    #[test]
    fn test_push_after_undo_discards_future() {
        let mut history = History::new();
        history.push("first", &list(&["a"]));
        history.push("second", &list(&["a", "b"]));
        history.undo();

        history.push("branch", &list(&["c"]));

        assert_eq!(history.len(), 3);
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
        assert_eq!(history.current().description(), "branch");
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = History::new();
        for i in 0..120 {
            history.push(format!("edit {i}"), &list(&["a"]));
            assert!(history.len() <= MAX_UNDO_HISTORY);
            assert_eq!(history.index(), history.len() - 1);
        }
        assert_eq!(history.len(), MAX_UNDO_HISTORY);
        assert_eq!(history.entries()[0].description(), "edit 70");
        assert_eq!(history.current().description(), "edit 119");
    }

    #[test]
    fn test_snapshots_are_independent_copies() {
        let mut history = History::new();
        let mut elements = list(&["a"]);
        history.push("added", &elements);

        elements[0].props.insert("text".into(), "changed".into());

        assert_eq!(history.current().elements()[0].props["text"], "Sample text content");
    }

    #[test]
    fn test_custom_limit() {
        let mut history = History::with_limit(0);
        assert_eq!(history.limit(), 1);
        history.push("only", &list(&["a"]));
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
    }
}
