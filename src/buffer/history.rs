// Undo/redo snapshot stacks.

use std::sync::Arc;

use crate::config::UNDO_DEPTH;

/// Whole-session snapshot: every row's raw content plus the cursor and
/// viewport offsets in effect when it was taken. Row storage is shared, so
/// moving a snapshot between the two stacks never copies the document.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub rows: Arc<[String]>,
    pub cursor_x: usize,
    pub cursor_y: usize,
    pub row_offset: usize,
    pub col_offset: usize,
}

#[derive(Default)]
pub struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl History {
    /// Records the pre-edit state. Any new edit invalidates the redo stack,
    /// and the oldest snapshot is dropped past the depth bound.
    pub fn push(&mut self, snapshot: Snapshot) {
        if self.undo_stack.len() >= UNDO_DEPTH {
            self.undo_stack.remove(0);
        }
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();
    }

    /// Pops the latest undo snapshot, banking `current` for redo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let snapshot = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(snapshot)
    }

    /// Pops the latest redo snapshot, banking `current` for undo. Does not
    /// go through `push`, so the redo stack survives.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(tag: &str) -> Snapshot {
        Snapshot {
            rows: vec![tag.to_string()].into(),
            cursor_x: 0,
            cursor_y: 0,
            row_offset: 0,
            col_offset: 0,
        }
    }

    #[test]
    fn undo_moves_current_to_redo() {
        let mut history = History::default();
        history.push(snap("old"));

        let restored = history.undo(snap("now")).unwrap();
        assert_eq!(&*restored.rows, ["old".to_string()]);
        assert!(history.can_redo());
        assert!(!history.can_undo());

        let redone = history.redo(snap("old")).unwrap();
        assert_eq!(&*redone.rows, ["now".to_string()]);
        assert!(history.can_undo());
    }

    #[test]
    fn empty_stacks_are_noops() {
        let mut history = History::default();
        assert!(history.undo(snap("x")).is_none());
        assert!(history.redo(snap("x")).is_none());
        // A failed undo must not leak into the redo stack.
        assert!(!history.can_redo());
    }

    #[test]
    fn depth_bound_drops_oldest() {
        let mut history = History::default();
        for i in 0..60 {
            history.push(snap(&i.to_string()));
        }
        let mut restored = Vec::new();
        while history.can_undo() {
            restored.push(history.undo(snap("cur")).unwrap());
        }
        assert_eq!(restored.len(), UNDO_DEPTH);
        // Newest first; the ten oldest snapshots are gone.
        assert_eq!(&*restored[0].rows, ["59".to_string()]);
        assert_eq!(&*restored.last().unwrap().rows, ["10".to_string()]);
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut history = History::default();
        history.push(snap("a"));
        history.undo(snap("b")).unwrap();
        assert!(history.can_redo());
        history.push(snap("c"));
        assert!(!history.can_redo());
    }
}
