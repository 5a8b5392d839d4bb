// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag recognition: single-contact tracking with start-relative and step deltas.
//!
//! ## Usage
//!
//! 1) A pointer start with exactly one active contact begins a drag with
//!    [`DragState::start`], and the delegate gets `did_drag_start`.
//! 2) Each move of that contact goes through [`DragState::update`] (the step
//!    since the last move) and [`DragState::total_offset`] (the offset from the
//!    start), reported together as a [`DragInfo`].
//! 3) Lifting or cancelling the contact calls [`DragState::end`] and the
//!    delegate gets `did_drag_end`.
//!
//! Starts with two or more contacts are ignored, and so are starts while a
//! drag is already running.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Point;
//! use understory_event_state::drag::DragState;
//! use understory_pointer::PointerId;
//!
//! let mut drag = DragState::default();
//!
//! // Start dragging contact #1 at (10, 20)
//! drag.start(PointerId(1), Point::new(10.0, 20.0));
//! assert!(drag.is_dragging());
//!
//! // Move to (15, 25) - step is (5, 5)
//! let step = drag.update(Point::new(15.0, 25.0)).unwrap();
//! assert_eq!(step.x, 5.0);
//! assert_eq!(step.y, 5.0);
//!
//! // Total offset from start is also (5, 5)
//! let total = drag.total_offset(Point::new(15.0, 25.0)).unwrap();
//! assert_eq!(total.x, 5.0);
//! assert_eq!(total.y, 5.0);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use kurbo::{Point, Vec2};
use understory_pointer::{PointerEvent, PointerId, PointerPhase};

use crate::delegate::{DragInfo, RecognizerDelegate};
use crate::event::{InputEvent, PointerEventType};
use crate::recognizer::PointerRecognizer;

/// Tracks one dragged contact.
#[derive(Debug, Clone, Default, Copy)]
pub struct DragState {
    /// Contact being dragged.
    pub pointer: Option<PointerId>,
    /// Start position of the drag operation
    pub start_pos: Option<Point>,
    /// Last recorded position of the contact
    pub last_pos: Option<Point>,
}

impl DragState {
    /// Start tracking `pointer` from the given position.
    pub fn start(&mut self, pointer: PointerId, pos: Point) {
        self.pointer = Some(pointer);
        self.start_pos = Some(pos);
        self.last_pos = Some(pos);
    }

    /// Update the drag state with a new position, returning the step since last update.
    pub fn update(&mut self, pos: Point) -> Option<Vec2> {
        self.start_pos?;
        let step = self.last_pos.map(|last_pos| pos - last_pos);
        self.last_pos = Some(pos);
        step
    }

    /// Get total offset from drag start position.
    #[must_use]
    pub fn total_offset(&self, current_pos: Point) -> Option<Vec2> {
        self.start_pos.map(|start_pos| current_pos - start_pos)
    }

    /// End the current drag operation and reset state.
    pub fn end(&mut self) {
        *self = Self::default();
    }

    /// Returns `true` while a drag operation is active
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.start_pos.is_some()
    }
}

/// Recognizes single-contact drags.
pub struct DragRecognizer<T> {
    delegate: Rc<dyn RecognizerDelegate<T>>,
    state: RefCell<DragState>,
}

impl<T> fmt::Debug for DragRecognizer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragRecognizer")
            .field("state", &self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl<T> DragRecognizer<T> {
    /// Creates a recognizer reporting to `delegate`.
    pub fn new(delegate: Rc<dyn RecognizerDelegate<T>>) -> Self {
        Self {
            delegate,
            state: RefCell::new(DragState::default()),
        }
    }

    /// Returns `true` while a drag is running.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.state.borrow().is_dragging()
    }

    fn on_pointer(&self, event: &PointerEvent<T>) {
        let dragging = self.state.borrow().pointer;
        match (event.phase, dragging) {
            (PointerPhase::Start, None) => {
                if event.nb_pointers != 1 {
                    return;
                }
                let Some(contact) = event.primary() else {
                    return;
                };
                self.state
                    .borrow_mut()
                    .start(contact.identifier, contact.page);
                self.delegate.did_drag_start(event);
            }
            (PointerPhase::Move, Some(id)) => {
                let Some(contact) = event.pointer(id) else {
                    return;
                };
                let info = {
                    let mut state = self.state.borrow_mut();
                    let step = state.update(contact.page).unwrap_or_default();
                    let delta = state.total_offset(contact.page).unwrap_or_default();
                    DragInfo { delta, step }
                };
                self.delegate.did_drag(info, event);
            }
            (PointerPhase::End | PointerPhase::Cancel, Some(id)) => {
                let lifted = event.changed_pointer(id).is_some() || event.pointer(id).is_none();
                if !lifted {
                    return;
                }
                self.state.borrow_mut().end();
                self.delegate.did_drag_end(event);
            }
            _ => {}
        }
    }
}

impl<T> PointerRecognizer<T> for DragRecognizer<T> {
    fn event_types(&self) -> &'static [PointerEventType] {
        &PointerEventType::POINTER
    }

    fn handle_event(&self, event: &InputEvent<T>) {
        if let InputEvent::Pointer(event) = event {
            self.on_pointer(event);
        }
    }

    fn reset(&self) {
        self.state.borrow_mut().end();
    }
}
