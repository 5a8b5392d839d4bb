// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event types listeners and recognizers bind to.

use understory_gesture::{GestureEvent, GesturePhase};
use understory_pointer::{InputCapabilities, PointerEvent, PointerPhase};

/// The event types a listener can be bound to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerEventType {
    /// A contact went down.
    PointerStart,
    /// Contacts moved.
    PointerMove,
    /// A contact lifted.
    PointerEnd,
    /// The platform cancelled contacts.
    PointerCancel,
    /// A two-finger gesture began.
    GestureStart,
    /// A two-finger gesture changed.
    GestureChange,
    /// A two-finger gesture ended.
    GestureEnd,
}

impl PointerEventType {
    /// The four pointer types.
    pub const POINTER: [Self; 4] = [
        Self::PointerStart,
        Self::PointerMove,
        Self::PointerEnd,
        Self::PointerCancel,
    ];

    /// The three gesture types.
    pub const GESTURE: [Self; 3] = [Self::GestureStart, Self::GestureChange, Self::GestureEnd];

    /// Native event the host has to subscribe to so this type gets produced.
    ///
    /// Pointer types map onto the platform's primary family. Gesture types map
    /// onto the native gesture callbacks when the platform has them, and onto
    /// the pointer events they are synthesized from otherwise. Returns `None`
    /// for gesture types on a mouse-only platform, where no gesture can occur.
    ///
    /// ```
    /// use understory_event_state::PointerEventType;
    /// use understory_pointer::InputCapabilities;
    ///
    /// let touch = InputCapabilities::TOUCH;
    /// assert_eq!(PointerEventType::PointerStart.native_event_name(touch), Some("touchstart"));
    /// assert_eq!(PointerEventType::GestureChange.native_event_name(touch), Some("touchmove"));
    ///
    /// let mouse = InputCapabilities::empty();
    /// assert_eq!(PointerEventType::PointerMove.native_event_name(mouse), Some("mousemove"));
    /// assert_eq!(PointerEventType::GestureStart.native_event_name(mouse), None);
    /// ```
    #[must_use]
    pub fn native_event_name(self, capabilities: InputCapabilities) -> Option<&'static str> {
        let family = capabilities.primary_family();
        let pointer_phase = match self {
            Self::PointerStart => PointerPhase::Start,
            Self::PointerMove => PointerPhase::Move,
            Self::PointerEnd => PointerPhase::End,
            Self::PointerCancel => PointerPhase::Cancel,
            Self::GestureStart | Self::GestureChange | Self::GestureEnd => {
                if capabilities.contains(InputCapabilities::GESTURE_EVENTS) {
                    return Some(match self {
                        Self::GestureStart => "gesturestart",
                        Self::GestureChange => "gesturechange",
                        _ => "gestureend",
                    });
                }
                if !capabilities.synthesizes_gestures() {
                    return None;
                }
                match self {
                    Self::GestureStart => PointerPhase::Start,
                    Self::GestureChange => PointerPhase::Move,
                    _ => PointerPhase::End,
                }
            }
        };
        Some(family.native_name(pointer_phase))
    }

    /// Returns `true` for the gesture types.
    #[must_use]
    pub const fn is_gesture(self) -> bool {
        matches!(
            self,
            Self::GestureStart | Self::GestureChange | Self::GestureEnd
        )
    }
}

impl From<PointerPhase> for PointerEventType {
    fn from(phase: PointerPhase) -> Self {
        match phase {
            PointerPhase::Start => Self::PointerStart,
            PointerPhase::Move => Self::PointerMove,
            PointerPhase::End => Self::PointerEnd,
            PointerPhase::Cancel => Self::PointerCancel,
        }
    }
}

impl From<GesturePhase> for PointerEventType {
    fn from(phase: GesturePhase) -> Self {
        match phase {
            GesturePhase::Start => Self::GestureStart,
            GesturePhase::Change => Self::GestureChange,
            GesturePhase::End => Self::GestureEnd,
        }
    }
}

/// A canonical event as delivered to listeners and recognizers.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent<T> {
    /// A normalized pointer event.
    Pointer(PointerEvent<T>),
    /// A native or synthesized gesture event.
    Gesture(GestureEvent<T>),
}

impl<T> InputEvent<T> {
    /// The type listeners bind to for this event.
    #[must_use]
    pub fn event_type(&self) -> PointerEventType {
        match self {
            Self::Pointer(event) => event.phase.into(),
            Self::Gesture(event) => event.phase.into(),
        }
    }

    /// Element the event is delivered to.
    #[must_use]
    pub fn target(&self) -> &T {
        match self {
            Self::Pointer(event) => &event.target,
            Self::Gesture(event) => &event.target,
        }
    }

    /// Milliseconds on the host clock.
    #[must_use]
    pub fn timestamp(&self) -> u64 {
        match self {
            Self::Pointer(event) => event.timestamp,
            Self::Gesture(event) => event.timestamp,
        }
    }

    /// The pointer event, if this is one.
    #[must_use]
    pub fn as_pointer(&self) -> Option<&PointerEvent<T>> {
        match self {
            Self::Pointer(event) => Some(event),
            Self::Gesture(_) => None,
        }
    }

    /// The gesture event, if this is one.
    #[must_use]
    pub fn as_gesture(&self) -> Option<&GestureEvent<T>> {
        match self {
            Self::Gesture(event) => Some(event),
            Self::Pointer(_) => None,
        }
    }
}
