use anyhow::Result;
use tracing::debug;

use crate::event::EditEvent;

/// Something undo and redo can push event values into.
pub trait ReplayTarget {
    fn replay(&mut self, event: &EditEvent) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryState {
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Linear undo/redo log.
///
/// `applied` events are in effect; the rest are redoable until the next
/// commit truncates them.
#[derive(Clone, Debug, Default)]
pub struct History {
    events: Vec<EditEvent>,
    applied: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[EditEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Index of the last applied event, `-1` before the first.
    pub fn current_state(&self) -> isize {
        self.applied as isize - 1
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.events.len()
    }

    pub fn state(&self) -> HistoryState {
        HistoryState {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }

    /// Record an event that has already been applied. Drops the redo tail.
    pub fn commit(&mut self, event: EditEvent) -> HistoryState {
        self.events.truncate(self.applied);
        self.events.push(event);
        self.applied = self.events.len();
        debug!(?event, len = self.events.len(), "history commit");
        self.state()
    }

    /// Restore the setting touched by the last applied event to the value
    /// the most recent earlier event with the same key gave it, or to its
    /// default. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self, target: &mut impl ReplayTarget) -> Result<bool> {
        if !self.can_undo() {
            return Ok(false);
        }
        let key = self.events[self.applied - 1].key();
        let previous = self.events[..self.applied - 1]
            .iter()
            .rev()
            .find(|e| e.key() == key)
            .copied()
            .unwrap_or_else(|| EditEvent::default_for(key));
        target.replay(&previous)?;
        self.applied -= 1;
        debug!(state = self.current_state(), "history undo");
        Ok(true)
    }

    pub fn redo(&mut self, target: &mut impl ReplayTarget) -> Result<bool> {
        if !self.can_redo() {
            return Ok(false);
        }
        target.replay(&self.events[self.applied])?;
        self.applied += 1;
        debug!(state = self.current_state(), "history redo");
        Ok(true)
    }
}
