// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_pointer --heading-base-level=0

//! Understory Pointer: one canonical pointer stream from mouse, touch and pen input.
//!
//! Platforms report contacts through incompatible models: a single mouse,
//! multi-touch events carrying whole touch lists, and stylus/pen pointer events
//! carrying one contact at a time. This crate reconciles them into a single
//! [`PointerEvent`] shape:
//!
//! - `pointer_list`: every contact currently active.
//! - `changed_pointer_list`: contacts that just started, moved or ended.
//! - `target_pointer_list`: active contacts that target the receiving element.
//! - `nb_pointers`: the number of active contacts.
//!
//! ## Pieces
//!
//! - [`Pointer`] and [`PointerId`]: a contact with a stable identifier. The mouse
//!   always uses the reserved [`PointerId::MOUSE`].
//! - [`RawEvent`]: what the host hands over, one variant per [`EventFamily`].
//! - [`InputCapabilities`]: the input models the platform exposes, detected once
//!   at startup.
//! - [`Normalizer`]: converts raw events, keeping per-surface contact state.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Point;
//! use understory_pointer::{InputCapabilities, Normalizer, PointerPhase, RawEvent, RawTouch};
//!
//! let mut normalizer = Normalizer::new(InputCapabilities::TOUCH);
//!
//! let a = RawTouch::new(1, Point::new(0.0, 0.0), "canvas");
//! let b = RawTouch::new(2, Point::new(100.0, 0.0), "canvas");
//! let event = normalizer
//!     .normalize(RawEvent::Touch {
//!         phase: PointerPhase::Start,
//!         touches: vec![a, b.clone()],
//!         changed_touches: vec![b],
//!         target: "canvas",
//!         timestamp: 0,
//!     })
//!     .unwrap();
//!
//! assert_eq!(event.nb_pointers, 2);
//! assert_eq!(event.changed_pointer_list.len(), 1);
//! ```
//!
//! Event names coming from a host can be classified with [`EventFamily::parse`];
//! names that belong to no family are rejected with [`UnrecognizedEvent`] and
//! must be dropped rather than forwarded.
//!
//! ## Features
//!
//! - `std` (default): use the standard library for Kurbo.
//! - `libm`: `no_std` float support for Kurbo.
//!
//! This crate is `no_std` compatible (with `alloc`).

#![no_std]

extern crate alloc;

pub mod event;
pub mod normalizer;
pub mod raw;
pub mod types;

pub use event::{INLINE_POINTERS, PointerEvent, PointerList};
pub use normalizer::Normalizer;
pub use raw::{RawEvent, RawTouch};
pub use types::{
    EventFamily, InputCapabilities, Pointer, PointerId, PointerPhase, PointerType,
    UnrecognizedEvent,
};
