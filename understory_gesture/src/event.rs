// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture events, synthesized or native.

use kurbo::{Point, Vec2};

/// Lifecycle phase of a two-finger gesture.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GesturePhase {
    /// A second contact went down.
    Start,
    /// Contacts moved, or another contact joined while the gesture is live.
    Change,
    /// Fewer than two contacts remain.
    End,
}

/// A gesture event with its derived payload.
///
/// The payload is recomputed on every event and is `None` on
/// [`GesturePhase::End`]: once contacts lift, scale and rotation have no
/// meaning.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureEvent<T> {
    /// Lifecycle phase.
    pub phase: GesturePhase,
    /// Element the gesture is delivered to.
    pub target: T,
    /// Milliseconds on the host clock.
    pub timestamp: u64,
    /// Active contacts when the event was produced.
    pub nb_pointers: usize,
    /// Current two-contact distance over the distance at gesture start.
    pub scale: Option<f64>,
    /// Change of the two-contact angle since gesture start, in degrees.
    ///
    /// This is the plain difference of the two `atan2` angles and is not
    /// wrapped: a pair turning 20° across the ±180° line reads as -340°.
    pub rotation: Option<f64>,
    /// Movement of the contact centroid since gesture start.
    pub translation: Option<Vec2>,
    /// Current contact centroid.
    pub barycentre: Option<Point>,
}

impl<T> GestureEvent<T> {
    /// An end event: every payload field is `None`.
    pub fn end(target: T, timestamp: u64, nb_pointers: usize) -> Self {
        Self {
            phase: GesturePhase::End,
            target,
            timestamp,
            nb_pointers,
            scale: None,
            rotation: None,
            translation: None,
            barycentre: None,
        }
    }

    /// Converts a native gesture callback.
    ///
    /// Native gestures carry scale and rotation only; translation and centroid
    /// stay `None`. End events drop the payload like synthesized ones.
    pub fn from_native(native: NativeGesture<T>) -> Self {
        if native.phase == GesturePhase::End {
            return Self::end(native.target, native.timestamp, 0);
        }
        Self {
            phase: native.phase,
            target: native.target,
            timestamp: native.timestamp,
            nb_pointers: 2,
            scale: Some(native.scale),
            rotation: Some(native.rotation),
            translation: None,
            barycentre: None,
        }
    }
}

/// A gesture callback as reported by platforms that provide one.
#[derive(Clone, Debug, PartialEq)]
pub struct NativeGesture<T> {
    /// Lifecycle phase.
    pub phase: GesturePhase,
    /// Scale since gesture start.
    pub scale: f64,
    /// Rotation since gesture start, in degrees.
    pub rotation: f64,
    /// Receiving element.
    pub target: T,
    /// Milliseconds on the host clock.
    pub timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_change_keeps_scale_and_rotation() {
        let ev = GestureEvent::from_native(NativeGesture {
            phase: GesturePhase::Change,
            scale: 2.0,
            rotation: 15.0,
            target: 1_u8,
            timestamp: 3,
        });
        assert_eq!(ev.scale, Some(2.0));
        assert_eq!(ev.rotation, Some(15.0));
        assert_eq!(ev.translation, None);
    }

    #[test]
    fn native_end_drops_payload() {
        let ev = GestureEvent::from_native(NativeGesture {
            phase: GesturePhase::End,
            scale: 2.0,
            rotation: 15.0,
            target: (),
            timestamp: 3,
        });
        assert_eq!(ev.phase, GesturePhase::End);
        assert_eq!(ev.scale, None);
        assert_eq!(ev.rotation, None);
    }
}
