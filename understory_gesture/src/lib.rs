// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_gesture --heading-base-level=0

//! Understory Gesture: two-finger gestures from canonical pointer events.
//!
//! Some platforms report pinch and rotation through native gesture callbacks;
//! others only report raw contacts. This crate fills the gap:
//!
//! - [`GestureSynthesizer`] watches [`PointerEvent`](understory_pointer::PointerEvent)s
//!   from `understory_pointer` and emits [`GestureEvent`]s whenever two or more
//!   contacts are down.
//! - [`GestureEvent::from_native`] brings native gesture callbacks into the same
//!   shape, so recognizers never need to know where a gesture came from.
//!
//! A gesture event carries `scale`, `rotation` (degrees), `translation` and
//! `barycentre`, all relative to the two contacts present when the gesture
//! started. End events carry none of them.
//!
//! Use [`InputCapabilities::synthesizes_gestures`](understory_pointer::InputCapabilities::synthesizes_gestures)
//! to decide whether a platform needs the synthesizer at all.
//!
//! ## Features
//!
//! - `std` (default): float math through the standard library.
//! - `libm`: float math through `libm` for `no_std` targets.
//!
//! This crate is `no_std` compatible (with `alloc`).

#![no_std]

extern crate alloc;

pub mod event;
pub mod synthesizer;

pub use event::{GestureEvent, GesturePhase, NativeGesture};
pub use synthesizer::GestureSynthesizer;
