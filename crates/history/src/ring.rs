//! Linear undo/redo history with a fixed undo depth.
//!
//! The ring always holds a *current* value. Recording a new value pushes the
//! previous current onto the undo stack, so undoing returns the caller to the
//! state they were in before the change.

use std::collections::VecDeque;

use tracing::trace;

/// Number of undo steps retained when no explicit capacity is given.
pub const DEFAULT_CAPACITY: usize = 50;

/// Bounded undo/redo log over snapshots of type `S`.
#[derive(Debug, Clone)]
pub struct History<S> {
    current: S,
    /// Oldest entry at the front; eviction only ever trims this side.
    undo: VecDeque<S>,
    redo: Vec<S>,
    capacity: usize,
}

impl<S: Clone> History<S> {
    /// Create a history pointing at `initial` with empty undo/redo stacks.
    pub fn new(initial: S, capacity: usize) -> Self {
        Self {
            current: initial,
            undo: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            redo: Vec::new(),
            capacity,
        }
    }

    /// Record `next` as the new current state.
    ///
    /// Identical consecutive values are still recorded; there is no
    /// deduplication. Any redo branch is discarded.
    pub fn set_state(&mut self, next: S) {
        let previous = std::mem::replace(&mut self.current, next);
        self.undo.push_back(previous);
        self.redo.clear();

        while self.undo.len() > self.capacity {
            self.undo.pop_front();
            trace!(capacity = self.capacity, "evicted oldest undo entry");
        }
    }

    /// Step back one entry. Returns the new current state, or `None` when
    /// there is nothing to undo (state unchanged).
    pub fn undo(&mut self) -> Option<&S> {
        let previous = self.undo.pop_back()?;
        let current = std::mem::replace(&mut self.current, previous);
        self.redo.push(current);
        Some(&self.current)
    }

    /// Step forward one entry. Returns the new current state, or `None` when
    /// there is nothing to redo.
    pub fn redo(&mut self) -> Option<&S> {
        let next = self.redo.pop()?;
        let current = std::mem::replace(&mut self.current, next);
        self.undo.push_back(current);
        Some(&self.current)
    }

    /// Drop both stacks and restart at `initial`.
    pub fn reset(&mut self, initial: S) {
        self.current = initial;
        self.undo.clear();
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn current(&self) -> &S {
        &self.current
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<S: Clone + Default> Default for History<S> {
    fn default() -> Self {
        Self::new(S::default(), DEFAULT_CAPACITY)
    }
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_history_has_nothing_to_undo_or_redo() {
        let history = History::new(0, 10);
        assert_eq!(*history.current(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_returns_the_state_before_the_change() {
        let mut history = History::new("a", 10);
        history.set_state("b");
        history.set_state("c");

        assert_eq!(history.undo(), Some(&"b"));
        assert_eq!(history.undo(), Some(&"a"));
        assert_eq!(history.undo(), None);
        assert_eq!(*history.current(), "a");
    }

    #[test]
    fn redo_restores_undone_states_in_order() {
        let mut history = History::new(1, 10);
        history.set_state(2);
        history.set_state(3);
        history.undo();
        history.undo();

        assert_eq!(history.redo(), Some(&2));
        assert_eq!(history.redo(), Some(&3));
        assert_eq!(history.redo(), None);
        assert_eq!(*history.current(), 3);
    }

    #[test]
    fn new_state_discards_redo_branch() {
        let mut history = History::new(1, 10);
        history.set_state(2);
        history.undo();
        assert!(history.can_redo());

        history.set_state(5);
        assert!(!history.can_redo());
        assert_eq!(history.redo(), None);
        assert_eq!(history.undo(), Some(&1));
    }

    #[test]
    fn identical_states_are_still_recorded() {
        let mut history = History::new(7, 10);
        history.set_state(7);
        history.set_state(7);
        assert_eq!(history.undo_depth(), 2);
    }

    #[test]
    fn capacity_evicts_oldest_entries_only() {
        let mut history = History::new(0, 50);
        for i in 1..=60 {
            history.set_state(i);
        }
        assert_eq!(history.undo_depth(), 50);

        let mut last = None;
        while let Some(state) = history.undo() {
            last = Some(*state);
        }
        // States 0..=9 were evicted; the earliest retained state is 10.
        assert_eq!(last, Some(10));
        assert_eq!(history.redo_depth(), 50);
    }

    #[test]
    fn eviction_leaves_redo_stack_intact() {
        let mut history = History::new(0, 2);
        history.set_state(1);
        history.set_state(2);
        history.undo();
        history.undo();
        assert_eq!(history.redo_depth(), 2);

        // Redo pushes onto the undo side; the ring never trims redo.
        history.redo();
        history.redo();
        assert_eq!(history.undo_depth(), 2);
        assert_eq!(*history.current(), 2);
    }

    #[test]
    fn reset_clears_both_stacks() {
        let mut history = History::new(0, 10);
        history.set_state(1);
        history.set_state(2);
        history.undo();

        history.reset(9);
        assert_eq!(*history.current(), 9);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
