// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The recognizer trait.

use std::rc::Rc;

use crate::event::{InputEvent, PointerEventType};

/// A state machine turning canonical events into delegate callbacks.
///
/// Recognizers are shared (`Rc`) between the application and the
/// [`RecognizerManager`](crate::RecognizerManager) of their target, so they
/// take `&self` and keep their state in cells.
pub trait PointerRecognizer<T> {
    /// Event types this recognizer needs to receive.
    fn event_types(&self) -> &'static [PointerEventType];

    /// Advances the state machine.
    fn handle_event(&self, event: &InputEvent<T>);

    /// Returns to the idle state without invoking any callback.
    fn reset(&self);
}

/// A shared, type-erased recognizer.
pub type SharedRecognizer<T> = Rc<dyn PointerRecognizer<T>>;

/// Returns `true` if both handles point at the same recognizer.
pub fn same_recognizer<T>(a: &SharedRecognizer<T>, b: &SharedRecognizer<T>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}
