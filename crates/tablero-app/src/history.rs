// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::VecDeque;

/// Maximum number of undoable states retained; the oldest is evicted
/// beyond this.
pub const HISTORY_LIMIT: usize = 10;

/// Linear snapshot history over a whole-value state `S`. Snapshots are
/// independently valid values; `past`, `present`, and `future` never
/// share mutable structure.
#[derive(Debug, Clone)]
pub struct History<S> {
    past: VecDeque<S>,
    present: S,
    future: VecDeque<S>,
}

impl<S: PartialEq> History<S> {
    pub fn new(present: S) -> Self {
        Self {
            past: VecDeque::new(),
            present,
            future: VecDeque::new(),
        }
    }

    pub fn present(&self) -> &S {
        &self.present
    }

    /// Install a new baseline and drop both buffers. Used for initial
    /// seeding and rehydration; not an undoable transition.
    pub fn reset(&mut self, present: S) {
        self.past.clear();
        self.future.clear();
        self.present = present;
    }

    /// Push a new present. A candidate equal to the current present is a
    /// no-op, so redundant edits never pollute the history. A real change
    /// drops the entire redo branch.
    pub fn record(&mut self, new_present: S) -> bool {
        if new_present == self.present {
            return false;
        }
        self.past
            .push_back(std::mem::replace(&mut self.present, new_present));
        if self.past.len() > HISTORY_LIMIT {
            self.past.pop_front();
        }
        self.future.clear();
        true
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        self.future
            .push_front(std::mem::replace(&mut self.present, previous));
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        self.past
            .push_back(std::mem::replace(&mut self.present, next));
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }
}
