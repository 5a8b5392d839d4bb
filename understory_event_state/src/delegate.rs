// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Callbacks recognizers report to.

use kurbo::Vec2;
use understory_gesture::GestureEvent;
use understory_pointer::PointerEvent;

/// Movement reported with [`RecognizerDelegate::did_drag`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DragInfo {
    /// Offset from the point where the drag started.
    pub delta: Vec2,
    /// Offset since the previous drag callback.
    pub step: Vec2,
}

/// Receiver of recognizer callbacks.
///
/// Every method defaults to doing nothing, so a delegate implements only the
/// ones it cares about. A delegate can be shared by several recognizers, which
/// is how a single object becomes tappable, draggable and pinchable at once.
///
/// ```
/// use std::cell::Cell;
/// use understory_event_state::RecognizerDelegate;
/// use understory_pointer::PointerEvent;
///
/// #[derive(Default)]
/// struct Button {
///     taps: Cell<u32>,
/// }
///
/// impl RecognizerDelegate<&'static str> for Button {
///     fn did_tap(&self, count: u32, _event: &PointerEvent<&'static str>) {
///         self.taps.set(self.taps.get() + count);
///     }
/// }
/// ```
pub trait RecognizerDelegate<T> {
    /// A contact went down on the target.
    fn did_touch(&self, event: &PointerEvent<T>) {
        let _ = event;
    }

    /// Touch feedback should end.
    fn did_untouch(&self) {}

    /// One or more taps completed; `count` is 2 for a double tap.
    fn did_tap(&self, count: u32, event: &PointerEvent<T>) {
        let _ = (count, event);
    }

    /// A single-contact drag began.
    fn did_drag_start(&self, event: &PointerEvent<T>) {
        let _ = event;
    }

    /// The dragged contact moved.
    fn did_drag(&self, info: DragInfo, event: &PointerEvent<T>) {
        let _ = (info, event);
    }

    /// The dragged contact lifted or was cancelled.
    fn did_drag_end(&self, event: &PointerEvent<T>) {
        let _ = event;
    }

    /// Scale changed during a pinch.
    fn did_pinch_change(&self, scale: f64, event: &GestureEvent<T>) {
        let _ = (scale, event);
    }

    /// Rotation changed during a two-finger gesture, in degrees.
    fn did_rotation_change(&self, rotation: f64, event: &GestureEvent<T>) {
        let _ = (rotation, event);
    }
}
