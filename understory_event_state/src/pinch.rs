// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pinch recognition: forwards the gesture scale while a gesture is live.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use understory_gesture::{GestureEvent, GesturePhase};

use crate::delegate::RecognizerDelegate;
use crate::event::{InputEvent, PointerEventType};
use crate::recognizer::PointerRecognizer;

/// Recognizes pinches and reports their scale.
///
/// Starts tracking on a gesture start and reports `did_pinch_change` for every
/// gesture change until the gesture ends. Changes seen without a start (the
/// recognizer was attached mid-gesture) are ignored.
pub struct PinchRecognizer<T> {
    delegate: Rc<dyn RecognizerDelegate<T>>,
    tracking: Cell<bool>,
}

impl<T> fmt::Debug for PinchRecognizer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinchRecognizer")
            .field("tracking", &self.tracking.get())
            .finish_non_exhaustive()
    }
}

impl<T> PinchRecognizer<T> {
    /// Creates a recognizer reporting to `delegate`.
    pub fn new(delegate: Rc<dyn RecognizerDelegate<T>>) -> Self {
        Self {
            delegate,
            tracking: Cell::new(false),
        }
    }

    /// Returns `true` between a gesture start and its end.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.tracking.get()
    }

    fn on_gesture(&self, event: &GestureEvent<T>) {
        match event.phase {
            GesturePhase::Start => self.tracking.set(true),
            GesturePhase::Change if self.tracking.get() => {
                if let Some(scale) = event.scale {
                    self.delegate.did_pinch_change(scale, event);
                }
            }
            GesturePhase::Change => {}
            GesturePhase::End => self.tracking.set(false),
        }
    }
}

impl<T> PointerRecognizer<T> for PinchRecognizer<T> {
    fn event_types(&self) -> &'static [PointerEventType] {
        &PointerEventType::GESTURE
    }

    fn handle_event(&self, event: &InputEvent<T>) {
        if let InputEvent::Gesture(event) = event {
            self.on_gesture(event);
        }
    }

    fn reset(&self) {
        self.tracking.set(false);
    }
}
