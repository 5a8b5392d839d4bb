// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer normalizer: turn raw mouse, touch and pen events into [`PointerEvent`]s.
//!
//! ## Rules per family
//!
//! - **Mouse**: down and move produce a one-pointer `pointer_list` using
//!   [`PointerId::MOUSE`]. Up produces `nb_pointers == 0` with the lifted pointer
//!   only in `changed_pointer_list`. Moves while the button is up are hover moves
//!   and carry no active pointer either.
//! - **Touch**: `pointer_list` is the native touch list and
//!   `changed_pointer_list` the native changed-touch list.
//! - **Pen**: each event carries a single contact. Contacts are kept in a table
//!   owned by the normalizer, so several pens or fingers reported through this
//!   family still produce a full `pointer_list`. Lifted contacts move into a
//!   removed set that is flushed into `changed_pointer_list` and cleared once
//!   the event is built.
//!
//! Events from a family the platform does not expose (see
//! [`InputCapabilities::accepts`]) are dropped; an unnormalized event is never
//! forwarded.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Point;
//! use understory_pointer::{InputCapabilities, Normalizer, PointerId, PointerPhase, RawEvent};
//!
//! let mut normalizer = Normalizer::new(InputCapabilities::empty());
//!
//! let down = normalizer
//!     .normalize(RawEvent::mouse(PointerPhase::Start, Point::new(10.0, 10.0), 1_u32, 0))
//!     .unwrap();
//! assert_eq!(down.nb_pointers, 1);
//! assert_eq!(down.pointer_list[0].identifier, PointerId::MOUSE);
//!
//! let up = normalizer
//!     .normalize(RawEvent::mouse(PointerPhase::End, Point::new(10.0, 10.0), 1_u32, 5))
//!     .unwrap();
//! assert_eq!(up.nb_pointers, 0);
//! assert_eq!(up.changed_pointer_list.len(), 1);
//! ```

use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::Point;
use smallvec::smallvec;

use crate::event::{PointerEvent, PointerList};
use crate::raw::{RawEvent, RawTouch};
use crate::types::{EventFamily, InputCapabilities, Pointer, PointerId, PointerPhase, PointerType};

#[derive(Clone, Debug)]
struct PenContact<T> {
    /// Insertion order, so the pointer list is stable across moves.
    seq: u64,
    pointer: Pointer<T>,
}

/// Converts raw platform events into canonical [`PointerEvent`]s.
///
/// One normalizer serves one input surface. It owns the pen contact table, so
/// several surfaces can coexist without sharing contact state.
#[derive(Clone, Debug)]
pub struct Normalizer<T> {
    capabilities: InputCapabilities,
    mouse_down: bool,
    pens: HashMap<PointerId, PenContact<T>>,
    removed: PointerList<T>,
    next_seq: u64,
}

impl<T> Normalizer<T> {
    /// Creates a normalizer for a platform with the given capabilities.
    pub fn new(capabilities: InputCapabilities) -> Self {
        Self {
            capabilities,
            mouse_down: false,
            pens: HashMap::new(),
            removed: PointerList::new(),
            next_seq: 0,
        }
    }

    /// Platform capabilities this normalizer was built with.
    pub fn capabilities(&self) -> InputCapabilities {
        self.capabilities
    }

    /// Returns `true` while the mouse button is held.
    pub fn is_mouse_down(&self) -> bool {
        self.mouse_down
    }

    /// Number of pen-family contacts currently down.
    pub fn active_pen_count(&self) -> usize {
        self.pens.len()
    }

    /// Forgets every tracked contact (for example when the window loses focus).
    pub fn reset(&mut self) {
        self.mouse_down = false;
        self.pens.clear();
        self.removed.clear();
    }
}

impl<T: Clone + PartialEq> Normalizer<T> {
    /// Normalizes one raw event.
    ///
    /// Returns `None` when the event must be dropped: its family is not exposed
    /// by the platform, or it is a pen move for a contact that never went down.
    pub fn normalize(&mut self, raw: RawEvent<T>) -> Option<PointerEvent<T>> {
        let family = raw.family();
        if !self.capabilities.accepts(family) {
            log::debug!(
                "dropping {:?} event: family not enabled for {:?}",
                family,
                self.capabilities
            );
            return None;
        }
        match raw {
            RawEvent::Mouse {
                phase,
                page,
                client,
                target,
                timestamp,
            } => Some(self.mouse(phase, page, client, target, timestamp)),
            RawEvent::Touch {
                phase,
                touches,
                changed_touches,
                target,
                timestamp,
            } => Some(Self::touch(phase, touches, changed_touches, target, timestamp)),
            RawEvent::Pen {
                phase,
                pointer_id,
                pointer_type,
                page,
                client,
                target,
                timestamp,
            } => {
                let pointer = Pointer {
                    identifier: PointerId(pointer_id),
                    pointer_type,
                    page,
                    client,
                    target: target.clone(),
                };
                self.pen(phase, pointer, target, timestamp)
            }
        }
    }

    fn mouse(
        &mut self,
        phase: PointerPhase,
        page: Point,
        client: Point,
        target: T,
        timestamp: u64,
    ) -> PointerEvent<T> {
        let pointer = Pointer::mouse(page, client, target.clone());
        let pointer_list: PointerList<T> = match phase {
            PointerPhase::Start => {
                self.mouse_down = true;
                smallvec![pointer.clone()]
            }
            PointerPhase::Move if self.mouse_down => smallvec![pointer.clone()],
            PointerPhase::Move => PointerList::new(),
            PointerPhase::End | PointerPhase::Cancel => {
                self.mouse_down = false;
                PointerList::new()
            }
        };
        PointerEvent::new(
            phase,
            EventFamily::Mouse,
            target,
            timestamp,
            pointer_list,
            smallvec![pointer],
        )
    }

    fn touch(
        phase: PointerPhase,
        touches: Vec<RawTouch<T>>,
        changed_touches: Vec<RawTouch<T>>,
        target: T,
        timestamp: u64,
    ) -> PointerEvent<T> {
        fn convert<T>(touches: Vec<RawTouch<T>>) -> PointerList<T> {
            touches
                .into_iter()
                .map(|t| Pointer {
                    identifier: PointerId(t.identifier),
                    pointer_type: PointerType::Touch,
                    page: t.page,
                    client: t.client,
                    target: t.target,
                })
                .collect()
        }
        PointerEvent::new(
            phase,
            EventFamily::Touch,
            target,
            timestamp,
            convert(touches),
            convert(changed_touches),
        )
    }

    fn pen(
        &mut self,
        phase: PointerPhase,
        pointer: Pointer<T>,
        target: T,
        timestamp: u64,
    ) -> Option<PointerEvent<T>> {
        let id = pointer.identifier;
        let changed: PointerList<T> = match phase {
            PointerPhase::Start => {
                if let Some(contact) = self.pens.get_mut(&id) {
                    contact.pointer = pointer.clone();
                } else {
                    let seq = self.next_seq;
                    self.next_seq += 1;
                    self.pens.insert(
                        id,
                        PenContact {
                            seq,
                            pointer: pointer.clone(),
                        },
                    );
                }
                smallvec![pointer]
            }
            PointerPhase::Move => {
                let Some(contact) = self.pens.get_mut(&id) else {
                    log::debug!("dropping pen move for unknown contact {id}");
                    return None;
                };
                contact.pointer.page = pointer.page;
                contact.pointer.client = pointer.client;
                smallvec![contact.pointer.clone()]
            }
            PointerPhase::End | PointerPhase::Cancel => {
                if self.pens.remove(&id).is_none() {
                    log::debug!("pen release for unknown contact {id}");
                }
                self.removed.push(pointer);
                core::mem::take(&mut self.removed)
            }
        };
        Some(PointerEvent::new(
            phase,
            EventFamily::Pen,
            target,
            timestamp,
            self.pen_list(),
            changed,
        ))
    }

    fn pen_list(&self) -> PointerList<T> {
        let mut contacts: Vec<&PenContact<T>> = self.pens.values().collect();
        contacts.sort_by_key(|c| c.seq);
        contacts.into_iter().map(|c| c.pointer.clone()).collect()
    }
}
