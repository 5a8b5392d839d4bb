// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw platform events, as the host receives them.

use alloc::vec::Vec;

use kurbo::Point;

use crate::types::{EventFamily, PointerPhase, PointerType};

/// One entry of a native touch list.
#[derive(Clone, Debug, PartialEq)]
pub struct RawTouch<T> {
    /// Platform touch identifier.
    pub identifier: u64,
    /// Position relative to the document.
    pub page: Point,
    /// Position relative to the viewport.
    pub client: Point,
    /// Element the touch started on.
    pub target: T,
}

impl<T> RawTouch<T> {
    /// Creates a touch whose page and client coordinates coincide.
    pub fn new(identifier: u64, at: Point, target: T) -> Self {
        Self {
            identifier,
            page: at,
            client: at,
            target,
        }
    }
}

/// A native input event before normalization.
///
/// `target` is the element whose native listener received the event.
#[derive(Clone, Debug, PartialEq)]
pub enum RawEvent<T> {
    /// `mousedown` / `mousemove` / `mouseup`.
    Mouse {
        /// Phase derived from the native name.
        phase: PointerPhase,
        /// Position relative to the document.
        page: Point,
        /// Position relative to the viewport.
        client: Point,
        /// Receiving element.
        target: T,
        /// Milliseconds on the host clock.
        timestamp: u64,
    },
    /// `touchstart` / `touchmove` / `touchend` / `touchcancel`.
    Touch {
        /// Phase derived from the native name.
        phase: PointerPhase,
        /// Every finger currently on the surface.
        touches: Vec<RawTouch<T>>,
        /// Fingers whose contact state changed with this event.
        changed_touches: Vec<RawTouch<T>>,
        /// Receiving element.
        target: T,
        /// Milliseconds on the host clock.
        timestamp: u64,
    },
    /// Stylus/pen pointer events, one contact per event.
    Pen {
        /// Phase derived from the native name.
        phase: PointerPhase,
        /// Platform pointer id.
        pointer_id: u64,
        /// Device behind the contact; pen pointer events report fingers too.
        pointer_type: PointerType,
        /// Position relative to the document.
        page: Point,
        /// Position relative to the viewport.
        client: Point,
        /// Receiving element.
        target: T,
        /// Milliseconds on the host clock.
        timestamp: u64,
    },
}

impl<T> RawEvent<T> {
    /// Builds a mouse event whose page and client coordinates coincide.
    pub fn mouse(phase: PointerPhase, at: Point, target: T, timestamp: u64) -> Self {
        Self::Mouse {
            phase,
            page: at,
            client: at,
            target,
            timestamp,
        }
    }

    /// Builds a pen event whose page and client coordinates coincide.
    pub fn pen(phase: PointerPhase, pointer_id: u64, at: Point, target: T, timestamp: u64) -> Self {
        Self::Pen {
            phase,
            pointer_id,
            pointer_type: PointerType::Pen,
            page: at,
            client: at,
            target,
            timestamp,
        }
    }

    /// Family of this event.
    pub fn family(&self) -> EventFamily {
        match self {
            Self::Mouse { .. } => EventFamily::Mouse,
            Self::Touch { .. } => EventFamily::Touch,
            Self::Pen { .. } => EventFamily::Pen,
        }
    }

    /// Phase of this event.
    pub fn phase(&self) -> PointerPhase {
        match self {
            Self::Mouse { phase, .. } | Self::Touch { phase, .. } | Self::Pen { phase, .. } => {
                *phase
            }
        }
    }

    /// Receiving element.
    pub fn target(&self) -> &T {
        match self {
            Self::Mouse { target, .. } | Self::Touch { target, .. } | Self::Pen { target, .. } => {
                target
            }
        }
    }
}
