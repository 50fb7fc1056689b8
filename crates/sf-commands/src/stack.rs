//! Linear undo/redo history.

use std::collections::VecDeque;
use std::marker::PhantomData;

use tracing::debug;

use crate::command::Command;

/// Undo/redo history over any state type.
///
/// Executing a new command discards the redo history. Undo and redo always
/// walk the history in strict reverse/forward order, so each command sees
/// the state it left behind.
pub struct CommandStack<S, C> {
    undo: VecDeque<C>,
    redo: Vec<C>,
    limit: Option<usize>,
    _state: PhantomData<fn(&S) -> S>,
}

impl<S, C> Default for CommandStack<S, C> {
    fn default() -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit: None,
            _state: PhantomData,
        }
    }
}

impl<S, C> std::fmt::Debug for CommandStack<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandStack")
            .field("undo_len", &self.undo.len())
            .field("redo_len", &self.redo.len())
            .field("limit", &self.limit)
            .finish()
    }
}

impl<S, C> CommandStack<S, C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` undo entries; the oldest is dropped first.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit.max(1)),
            ..Self::default()
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    fn push_undo(&mut self, command: C) {
        self.undo.push_back(command);
        if let Some(limit) = self.limit {
            while self.undo.len() > limit {
                self.undo.pop_front();
            }
        }
    }
}

impl<S: Clone, C: Command<S>> CommandStack<S, C> {
    /// Run `command`, record it for undo and drop any redo history.
    pub fn execute(&mut self, mut command: C, state: &S) -> S {
        let next = command.execute(state);
        debug!(command = command.name(), "execute");
        self.push_undo(command);
        self.redo.clear();
        next
    }

    /// Reverse the most recent command. With nothing to undo the state is
    /// returned unchanged.
    pub fn undo(&mut self, state: &S) -> S {
        let Some(mut command) = self.undo.pop_back() else {
            return state.clone();
        };
        let next = command.undo(state);
        debug!(command = command.name(), "undo");
        self.redo.push(command);
        next
    }

    /// Re-run the most recently undone command. With nothing to redo the
    /// state is returned unchanged.
    pub fn redo(&mut self, state: &S) -> S {
        let Some(mut command) = self.redo.pop() else {
            return state.clone();
        };
        let next = command.execute(state);
        debug!(command = command.name(), "redo");
        self.push_undo(command);
        next
    }
}
