// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! FIFO action queue with delayed entries.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::fmt;

use hashbrown::HashMap;

/// A deferred zero-argument callback.
pub type Action = Box<dyn FnOnce()>;

/// Handle to a scheduled action, usable for cancellation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(u64);

/// Whether a queued entry is an application action or one listener call of a burst.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum EntryKind {
    Action,
    Delivery,
}

pub(crate) struct Entry {
    pub(crate) kind: EntryKind,
    pub(crate) action: Action,
}

/// Actions waiting to run.
///
/// Ready entries run in insertion order. Delayed entries wait in a min-heap on
/// their due time and join the ready queue, in due order, once promoted.
/// Cancelled ids are removed from `pending` and skipped lazily.
#[derive(Default)]
pub(crate) struct ActionQueue {
    next_id: u64,
    pending: HashMap<ActionId, Entry>,
    ready: VecDeque<ActionId>,
    timers: BinaryHeap<Reverse<(u64, ActionId)>>,
}

impl fmt::Debug for ActionQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionQueue")
            .field("pending", &self.pending.len())
            .field("ready", &self.ready.len())
            .field("timers", &self.timers.len())
            .finish_non_exhaustive()
    }
}

impl ActionQueue {
    fn allocate(&mut self, kind: EntryKind, action: Action) -> ActionId {
        let id = ActionId(self.next_id);
        self.next_id += 1;
        self.pending.insert(id, Entry { kind, action });
        id
    }

    /// Appends a ready entry.
    pub(crate) fn push(&mut self, kind: EntryKind, action: Action) -> ActionId {
        let id = self.allocate(kind, action);
        self.ready.push_back(id);
        id
    }

    /// Adds an entry that becomes ready at `due`.
    pub(crate) fn push_at(&mut self, due: u64, action: Action) -> ActionId {
        let id = self.allocate(EntryKind::Action, action);
        self.timers.push(Reverse((due, id)));
        id
    }

    pub(crate) fn cancel(&mut self, id: ActionId) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Moves every timer due at or before `now` to the ready queue.
    pub(crate) fn promote_due(&mut self, now: u64) {
        while let Some(&Reverse((due, id))) = self.timers.peek() {
            if due > now {
                break;
            }
            self.timers.pop();
            if self.pending.contains_key(&id) {
                self.ready.push_back(id);
            }
        }
    }

    /// Takes the next live ready entry.
    pub(crate) fn pop_ready(&mut self) -> Option<Entry> {
        while let Some(id) = self.ready.pop_front() {
            if let Some(entry) = self.pending.remove(&id) {
                return Some(entry);
            }
        }
        None
    }

    pub(crate) fn ready_len(&self) -> usize {
        self.ready.len()
    }

    pub(crate) fn has_ready(&self) -> bool {
        self.ready.iter().any(|id| self.pending.contains_key(id))
    }

    /// Earliest due time among live timers.
    pub(crate) fn next_deadline(&mut self) -> Option<u64> {
        while let Some(&Reverse((due, id))) = self.timers.peek() {
            if self.pending.contains_key(&id) {
                return Some(due);
            }
            self.timers.pop();
        }
        None
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}
