// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The canonical pointer event every downstream consumer sees.

use smallvec::SmallVec;

use crate::types::{EventFamily, Pointer, PointerId, PointerPhase};

/// Inline capacity for pointer lists; more simultaneous contacts spill to the heap.
pub const INLINE_POINTERS: usize = 4;

/// List of pointers carried by a [`PointerEvent`].
pub type PointerList<T> = SmallVec<[Pointer<T>; INLINE_POINTERS]>;

/// Canonical input event, regardless of the native family it came from.
///
/// - `pointer_list`: every pointer currently active on the surface.
/// - `changed_pointer_list`: pointers that just started, moved or ended.
/// - `target_pointer_list`: the entries of `pointer_list` whose target is the
///   event target.
/// - `nb_pointers`: `pointer_list.len()`.
///
/// `changed_pointer_list` is always a subset of the union of the current and the
/// immediately prior `pointer_list`.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerEvent<T> {
    /// Lifecycle phase.
    pub phase: PointerPhase,
    /// Native family the event was normalized from.
    pub family: EventFamily,
    /// Element whose listener received the event.
    pub target: T,
    /// Milliseconds on the host clock.
    pub timestamp: u64,
    /// Active pointers.
    pub pointer_list: PointerList<T>,
    /// Pointers whose state changed with this event.
    pub changed_pointer_list: PointerList<T>,
    /// Active pointers targeting `target`.
    pub target_pointer_list: PointerList<T>,
    /// Number of active pointers.
    pub nb_pointers: usize,
}

impl<T: Clone + PartialEq> PointerEvent<T> {
    /// Assembles an event and derives `target_pointer_list` and `nb_pointers`.
    pub fn new(
        phase: PointerPhase,
        family: EventFamily,
        target: T,
        timestamp: u64,
        pointer_list: PointerList<T>,
        changed_pointer_list: PointerList<T>,
    ) -> Self {
        let target_pointer_list = pointer_list
            .iter()
            .filter(|p| p.target == target)
            .cloned()
            .collect();
        let nb_pointers = pointer_list.len();
        Self {
            phase,
            family,
            target,
            timestamp,
            pointer_list,
            changed_pointer_list,
            target_pointer_list,
            nb_pointers,
        }
    }
}

impl<T> PointerEvent<T> {
    /// First changed pointer, which is the only one for mouse and pen events.
    pub fn primary(&self) -> Option<&Pointer<T>> {
        self.changed_pointer_list.first()
    }

    /// Looks up an active pointer by identifier.
    pub fn pointer(&self, id: PointerId) -> Option<&Pointer<T>> {
        self.pointer_list.iter().find(|p| p.identifier == id)
    }

    /// Looks up a changed pointer by identifier.
    pub fn changed_pointer(&self, id: PointerId) -> Option<&Pointer<T>> {
        self.changed_pointer_list.iter().find(|p| p.identifier == id)
    }
}
