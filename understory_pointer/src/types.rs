// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core pointer types: identifiers, families, phases and platform capabilities.

use core::fmt;

use kurbo::Point;

/// Stable identifier of one continuous contact.
///
/// An identifier never changes across the move events of a contact and is never
/// handed out to another contact while the first one is still down.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub u64);

impl PointerId {
    /// Reserved identifier used by every mouse-originated pointer.
    ///
    /// There is only ever one mouse, so a single sentinel is enough. Hosts must
    /// not use this value for touch or pen contacts.
    pub const MOUSE: Self = Self(u64::MAX);

    /// Returns `true` if this is the mouse sentinel.
    #[must_use]
    pub const fn is_mouse(self) -> bool {
        self.0 == u64::MAX
    }
}

impl fmt::Display for PointerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mouse() {
            f.write_str("mouse")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// Kind of device behind a pointer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerType {
    /// A mouse (always [`PointerId::MOUSE`]).
    Mouse,
    /// A finger on a touch surface.
    Touch,
    /// A stylus or pen.
    Pen,
}

/// A single contact in canonical form.
///
/// `T` is the application's target key (a node or widget id).
#[derive(Clone, Debug, PartialEq)]
pub struct Pointer<T> {
    /// Stable contact identifier.
    pub identifier: PointerId,
    /// Device kind.
    pub pointer_type: PointerType,
    /// Position relative to the document.
    pub page: Point,
    /// Position relative to the viewport.
    pub client: Point,
    /// Target the contact originated on.
    pub target: T,
}

impl<T> Pointer<T> {
    /// Creates a pointer whose page and client coordinates coincide.
    pub fn new(identifier: PointerId, pointer_type: PointerType, at: Point, target: T) -> Self {
        Self {
            identifier,
            pointer_type,
            page: at,
            client: at,
            target,
        }
    }

    /// Creates the mouse pointer at the given page/client coordinates.
    pub fn mouse(page: Point, client: Point, target: T) -> Self {
        Self {
            identifier: PointerId::MOUSE,
            pointer_type: PointerType::Mouse,
            page,
            client,
            target,
        }
    }
}

/// Lifecycle phase of a pointer event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    /// A contact went down.
    Start,
    /// One or more contacts moved.
    Move,
    /// A contact lifted.
    End,
    /// The platform cancelled one or more contacts.
    Cancel,
}

impl PointerPhase {
    /// Returns `true` for [`End`](Self::End) and [`Cancel`](Self::Cancel).
    #[must_use]
    pub const fn is_release(self) -> bool {
        matches!(self, Self::End | Self::Cancel)
    }
}

/// Native event model a raw event belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventFamily {
    /// Single-pointer mouse events.
    Mouse,
    /// Multi-touch events with native touch lists.
    Touch,
    /// Stylus/pen ("MS pointer") events, one contact per event.
    Pen,
}

/// A native event name that belongs to none of the supported families.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized native pointer event `{name}`")]
pub struct UnrecognizedEvent {
    /// The offending name.
    pub name: alloc::string::String,
}

impl EventFamily {
    /// Classifies a native event name into its family and phase.
    ///
    /// Accepts the mouse (`mousedown`…), touch (`touchstart`…), prefixed
    /// (`MSPointerDown`…) and unprefixed (`pointerdown`…) pointer spellings.
    ///
    /// ```
    /// use understory_pointer::{EventFamily, PointerPhase};
    ///
    /// assert_eq!(
    ///     EventFamily::parse("touchmove"),
    ///     Ok((EventFamily::Touch, PointerPhase::Move))
    /// );
    /// assert!(EventFamily::parse("keydown").is_err());
    /// ```
    pub fn parse(name: &str) -> Result<(Self, PointerPhase), UnrecognizedEvent> {
        let parsed = match name {
            "mousedown" => (Self::Mouse, PointerPhase::Start),
            "mousemove" => (Self::Mouse, PointerPhase::Move),
            "mouseup" => (Self::Mouse, PointerPhase::End),
            "touchstart" => (Self::Touch, PointerPhase::Start),
            "touchmove" => (Self::Touch, PointerPhase::Move),
            "touchend" => (Self::Touch, PointerPhase::End),
            "touchcancel" => (Self::Touch, PointerPhase::Cancel),
            "MSPointerDown" | "pointerdown" => (Self::Pen, PointerPhase::Start),
            "MSPointerMove" | "pointermove" => (Self::Pen, PointerPhase::Move),
            "MSPointerUp" | "pointerup" => (Self::Pen, PointerPhase::End),
            "MSPointerCancel" | "pointercancel" => (Self::Pen, PointerPhase::Cancel),
            _ => {
                return Err(UnrecognizedEvent {
                    name: name.into(),
                });
            }
        };
        Ok(parsed)
    }

    /// Native event name for a phase of this family.
    ///
    /// Mouse has no cancel event; `mouseup` is reported for it.
    #[must_use]
    pub const fn native_name(self, phase: PointerPhase) -> &'static str {
        match (self, phase) {
            (Self::Mouse, PointerPhase::Start) => "mousedown",
            (Self::Mouse, PointerPhase::Move) => "mousemove",
            (Self::Mouse, PointerPhase::End | PointerPhase::Cancel) => "mouseup",
            (Self::Touch, PointerPhase::Start) => "touchstart",
            (Self::Touch, PointerPhase::Move) => "touchmove",
            (Self::Touch, PointerPhase::End) => "touchend",
            (Self::Touch, PointerPhase::Cancel) => "touchcancel",
            (Self::Pen, PointerPhase::Start) => "MSPointerDown",
            (Self::Pen, PointerPhase::Move) => "MSPointerMove",
            (Self::Pen, PointerPhase::End) => "MSPointerUp",
            (Self::Pen, PointerPhase::Cancel) => "MSPointerCancel",
        }
    }
}

bitflags::bitflags! {
    /// Input models the host platform exposes, detected once at startup.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct InputCapabilities: u8 {
        /// Native touch events with touch lists.
        const TOUCH          = 0b0000_0001;
        /// Stylus/pen pointer events, one contact per event.
        const MS_POINTER     = 0b0000_0010;
        /// Native two-finger gesture events (scale and rotation).
        const GESTURE_EVENTS = 0b0000_0100;
    }
}

impl Default for InputCapabilities {
    fn default() -> Self {
        Self::empty()
    }
}

impl InputCapabilities {
    /// Returns `true` if events of `family` are handled on this platform.
    ///
    /// Mouse events are always accepted.
    #[must_use]
    pub fn accepts(self, family: EventFamily) -> bool {
        match family {
            EventFamily::Mouse => true,
            EventFamily::Touch => self.contains(Self::TOUCH),
            EventFamily::Pen => self.contains(Self::MS_POINTER),
        }
    }

    /// Returns `true` if gestures must be derived from raw contacts.
    ///
    /// That is the case when multiple contacts are reported but the platform
    /// has no gesture callbacks of its own.
    #[must_use]
    pub fn synthesizes_gestures(self) -> bool {
        self.intersects(Self::TOUCH | Self::MS_POINTER) && !self.contains(Self::GESTURE_EVENTS)
    }

    /// Family whose events carry pointer contacts on this platform.
    ///
    /// Pen pointer events take over touch when both are present, since they
    /// report every contact kind.
    #[must_use]
    pub fn primary_family(self) -> EventFamily {
        if self.contains(Self::MS_POINTER) {
            EventFamily::Pen
        } else if self.contains(Self::TOUCH) {
            EventFamily::Touch
        } else {
            EventFamily::Mouse
        }
    }
}
