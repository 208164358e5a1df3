//! Bounded undo/redo stacks of whole committed states.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct History<T> {
    past: VecDeque<T>,
    future: Vec<T>,
    limit: usize,
}

impl<T> History<T> {
    pub fn new(limit: usize) -> Self {
        Self {
            past: VecDeque::with_capacity(limit),
            future: Vec::new(),
            limit,
        }
    }

    /// Remember the state a commit replaced. Clears the redo stack.
    pub fn record(&mut self, previous: T) {
        self.future.clear();
        if self.limit == 0 {
            return;
        }
        if self.past.len() == self.limit {
            self.past.pop_front();
        }
        self.past.push_back(previous);
    }

    /// Swap `current` for the most recent past state.
    pub fn undo(&mut self, current: T) -> Result<T, T> {
        match self.past.pop_back() {
            Some(previous) => {
                self.future.push(current);
                Ok(previous)
            }
            None => Err(current),
        }
    }

    /// Swap `current` for the most recently undone state.
    pub fn redo(&mut self, current: T) -> Result<T, T> {
        match self.future.pop() {
            Some(next) => {
                self.past.push_back(current);
                Ok(next)
            }
            None => Err(current),
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_redo_round_trip() {
        let mut history = History::new(10);
        history.record(1);
        history.record(2);

        let current = history.undo(3).unwrap();
        assert_eq!(current, 2);
        let current = history.undo(current).unwrap();
        assert_eq!(current, 1);
        assert_eq!(history.undo(current), Err(1));

        let current = history.redo(1).unwrap();
        assert_eq!(current, 2);
        assert!(history.can_redo());
    }

    #[test]
    fn record_drops_oldest_and_clears_redo() {
        let mut history = History::new(2);
        history.record('a');
        history.record('b');
        history.record('c');

        let restored = history.undo('d').unwrap();
        assert_eq!(restored, 'c');
        history.record('x');
        assert!(!history.can_redo());

        assert_eq!(history.undo('y'), Ok('x'));
        assert_eq!(history.undo('x'), Ok('b'));
        assert!(!history.can_undo());
    }
}
