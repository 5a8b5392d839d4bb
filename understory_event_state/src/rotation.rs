// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rotation recognition.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use understory_gesture::{GestureEvent, GesturePhase};

use crate::delegate::RecognizerDelegate;
use crate::event::{InputEvent, PointerEventType};
use crate::recognizer::PointerRecognizer;

/// Recognizes two-finger rotations and reports the angle in degrees.
///
/// Independent of [`PinchRecognizer`](crate::PinchRecognizer): both can sit on
/// the same target and each sees the whole gesture stream.
pub struct RotationRecognizer<T> {
    delegate: Rc<dyn RecognizerDelegate<T>>,
    tracking: Cell<bool>,
}

impl<T> fmt::Debug for RotationRecognizer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotationRecognizer")
            .field("tracking", &self.tracking.get())
            .finish_non_exhaustive()
    }
}

impl<T> RotationRecognizer<T> {
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
            GesturePhase::Change => {
                if !self.tracking.get() {
                    return;
                }
                if let Some(rotation) = event.rotation {
                    self.delegate.did_rotation_change(rotation, event);
                }
            }
            GesturePhase::End => self.tracking.set(false),
        }
    }
}

impl<T> PointerRecognizer<T> for RotationRecognizer<T> {
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
