// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture synthesizer: derive two-finger gestures from canonical pointer events.
//!
//! ## States
//!
//! - **Idle → tracking**: a pointer start with at least two target pointers.
//!   The distance, angle and centroid of the first two pointers become the
//!   baseline, and a start event with `scale = 1`, `rotation = 0` and a zero
//!   translation is emitted.
//! - **Tracking → tracking**: further pointer starts, moves, and releases that
//!   leave two or more pointers emit change events. A start never emits a
//!   second start while tracking.
//! - **Tracking → idle**: as soon as fewer than two pointers remain on the
//!   tracked target, an end event is emitted and the baseline cleared.
//!
//! The tracked gesture belongs to the target it started on. Events for other
//! targets are ignored until it ends, so a contact elsewhere on the surface
//! neither ends nor disturbs it.
//!
//! Only the first two entries of the target pointer list, in list order,
//! take part in the computation. With three or more contacts the result
//! therefore depends on list order.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Point;
//! use understory_gesture::{GesturePhase, GestureSynthesizer};
//! use understory_pointer::{InputCapabilities, Normalizer, PointerPhase, RawEvent, RawTouch};
//!
//! let mut normalizer = Normalizer::new(InputCapabilities::TOUCH);
//! let mut gestures = GestureSynthesizer::new();
//!
//! let touch = |phase, a: Point, b: Point| RawEvent::Touch {
//!     phase,
//!     touches: vec![RawTouch::new(1, a, ()), RawTouch::new(2, b, ())],
//!     changed_touches: vec![RawTouch::new(2, b, ())],
//!     target: (),
//!     timestamp: 0,
//! };
//!
//! let down = normalizer
//!     .normalize(touch(PointerPhase::Start, Point::new(0.0, 0.0), Point::new(100.0, 0.0)))
//!     .unwrap();
//! let start = gestures.process(&down).unwrap();
//! assert_eq!(start.phase, GesturePhase::Start);
//! assert_eq!(start.scale, Some(1.0));
//!
//! let spread = normalizer
//!     .normalize(touch(PointerPhase::Move, Point::new(0.0, 0.0), Point::new(200.0, 0.0)))
//!     .unwrap();
//! let change = gestures.process(&spread).unwrap();
//! assert_eq!(change.scale, Some(2.0));
//! ```

use kurbo::{Point, Vec2};
use understory_pointer::{Pointer, PointerEvent, PointerPhase};

use crate::event::{GestureEvent, GesturePhase};

/// Distances below this are treated as coincident contacts.
const MIN_DISTANCE: f64 = 1e-9;

const DEGREES_PER_RADIAN: f64 = 180.0 / core::f64::consts::PI;

/// Geometry of a contact pair.
#[derive(Copy, Clone, Debug, PartialEq)]
struct PairGeometry {
    distance: f64,
    /// Degrees.
    angle: f64,
    centroid: Point,
}

impl PairGeometry {
    fn measure<T>(pointers: &[Pointer<T>]) -> Option<Self> {
        let [a, b, ..] = pointers else {
            return None;
        };
        let span = b.page - a.page;
        Some(Self {
            distance: span.hypot(),
            angle: span.atan2() * DEGREES_PER_RADIAN,
            centroid: a.page.midpoint(b.page),
        })
    }
}

/// The gesture in progress: its target and the baseline captured at start.
#[derive(Clone, Debug)]
struct Tracked<T> {
    target: T,
    baseline: PairGeometry,
}

/// Derives gesture events where the platform has no native gesture callbacks.
///
/// One gesture is tracked at a time, on the target it started on. While it is
/// live, pointer events on other targets do not touch it.
#[derive(Clone, Debug)]
pub struct GestureSynthesizer<T> {
    tracked: Option<Tracked<T>>,
}

impl<T> Default for GestureSynthesizer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> GestureSynthesizer<T> {
    /// Creates an idle synthesizer.
    #[must_use]
    pub fn new() -> Self {
        Self { tracked: None }
    }

    /// Returns `true` while a gesture is being tracked.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.tracked.is_some()
    }

    /// The target of the gesture being tracked, if any.
    #[must_use]
    pub fn tracked_target(&self) -> Option<&T> {
        self.tracked.as_ref().map(|tracked| &tracked.target)
    }

    /// Drops any tracked gesture without emitting an end event.
    pub fn reset(&mut self) {
        self.tracked = None;
    }
}

impl<T: Clone + PartialEq> GestureSynthesizer<T> {
    /// Feeds one pointer event and returns the gesture event it produces, if any.
    pub fn process(&mut self, event: &PointerEvent<T>) -> Option<GestureEvent<T>> {
        let active = event.target_pointer_list.as_slice();
        if self.tracked.is_none() {
            if event.phase != PointerPhase::Start {
                return None;
            }
            let baseline = PairGeometry::measure(active)?;
            log::debug!(
                "gesture start with {} pointers, baseline distance {:.1}",
                event.nb_pointers,
                baseline.distance
            );
            self.tracked = Some(Tracked {
                target: event.target.clone(),
                baseline,
            });
            return Some(GestureEvent {
                phase: GesturePhase::Start,
                target: event.target.clone(),
                timestamp: event.timestamp,
                nb_pointers: event.nb_pointers,
                scale: Some(1.0),
                rotation: Some(0.0),
                translation: Some(Vec2::ZERO),
                barycentre: Some(baseline.centroid),
            });
        }

        let tracked = self.tracked.as_ref()?;
        if tracked.target != event.target {
            log::trace!("pointer event on another target ignored while tracking");
            return None;
        }
        let baseline = tracked.baseline;

        let current = if event.nb_pointers < 2 {
            None
        } else {
            PairGeometry::measure(active)
        };
        let Some(current) = current else {
            log::debug!("gesture end, {} pointers left", event.nb_pointers);
            self.tracked = None;
            return Some(GestureEvent::end(
                event.target.clone(),
                event.timestamp,
                event.nb_pointers,
            ));
        };

        let scale = if baseline.distance > MIN_DISTANCE {
            current.distance / baseline.distance
        } else {
            1.0
        };
        Some(GestureEvent {
            phase: GesturePhase::Change,
            target: event.target.clone(),
            timestamp: event.timestamp,
            nb_pointers: event.nb_pointers,
            scale: Some(scale),
            rotation: Some(current.angle - baseline.angle),
            translation: Some(current.centroid - baseline.centroid),
            barycentre: Some(current.centroid),
        })
    }
}
