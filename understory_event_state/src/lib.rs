// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_event_state --heading-base-level=0

//! Understory Event State: pointer recognizers and the input surface that feeds them.
//!
//! This crate turns the canonical pointer stream of `understory_pointer` and the
//! gestures of `understory_gesture` into high-level interaction callbacks:
//!
//! - [`tap`]: touch feedback plus single and multi-tap counting.
//! - [`drag`]: single-contact drags with start-relative and step deltas.
//! - [`pinch`] and [`rotation`]: scale and angle of two-finger gestures.
//!
//! Recognizers report to a [`RecognizerDelegate`], a trait whose methods all
//! default to no-ops, so one delegate implements exactly the callbacks it cares
//! about and may be shared by several recognizers.
//!
//! ## Design Philosophy
//!
//! - **Independent recognizers**: each recognizer is a small state machine that
//!   sees the full event stream of its target. Drag, Pinch and Rotation on one
//!   target compose into a manipulable object; nothing arbitrates between them.
//! - **Best-effort fan-out**: a listener or recognizer that panics is logged and
//!   skipped; delivery to the others goes on.
//! - **Generic targets**: targets are application keys (`T`), not widgets.
//!
//! ## Input Surface
//!
//! [`InputSurface`] is what the host feeds. It normalizes native events,
//! synthesizes gestures when the platform has none, and delivers to the
//! listeners bound per (target, [`PointerEventType`]). Recognizers attach
//! through the same surface; all recognizers of a target share one
//! [`RecognizerManager`] bound once per event type.
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use kurbo::Point;
//! use understory_event_state::{
//!     DragInfo, DragRecognizer, InputSurface, RecognizerDelegate, SharedRecognizer,
//! };
//! use understory_pointer::{InputCapabilities, PointerEvent, PointerPhase, RawEvent};
//!
//! #[derive(Default)]
//! struct Knob {
//!     offsets: RefCell<Vec<(f64, f64)>>,
//! }
//!
//! impl RecognizerDelegate<u32> for Knob {
//!     fn did_drag(&self, info: DragInfo, _event: &PointerEvent<u32>) {
//!         self.offsets.borrow_mut().push((info.delta.x, info.delta.y));
//!     }
//! }
//!
//! let knob = Rc::new(Knob::default());
//! let drag: SharedRecognizer<u32> = Rc::new(DragRecognizer::<u32>::new(knob.clone()));
//!
//! let mut surface = InputSurface::new(InputCapabilities::empty());
//! surface.add_pointer_recognizer(7, drag).unwrap();
//!
//! for (phase, x) in [
//!     (PointerPhase::Start, 10.0),
//!     (PointerPhase::Move, 14.0),
//!     (PointerPhase::Move, 20.0),
//!     (PointerPhase::End, 20.0),
//! ] {
//!     surface.handle_native(RawEvent::mouse(phase, Point::new(x, 5.0), 7, 0));
//! }
//!
//! assert_eq!(*knob.offsets.borrow(), [(4.0, 0.0), (10.0, 0.0)]);
//! ```
//!
//! ## Timing
//!
//! Tap recognition needs timers (the multi-tap window and the feedback delay).
//! [`TapRecognizer`] takes a [`Scheduler`](understory_timing::Scheduler) handle
//! and its callbacks arrive from the scheduler's service passes.

mod delegate;
pub mod drag;
mod event;
pub mod manager;
pub mod pinch;
mod recognizer;
pub mod rotation;
pub mod surface;
pub mod tap;

pub use delegate::{DragInfo, RecognizerDelegate};
pub use drag::{DragRecognizer, DragState};
pub use event::{InputEvent, PointerEventType};
pub use manager::RecognizerManager;
pub use pinch::PinchRecognizer;
pub use recognizer::{PointerRecognizer, SharedRecognizer, same_recognizer};
pub use rotation::RotationRecognizer;
pub use surface::{BindingError, InputSurface, NativeHook};
pub use tap::{TapConfig, TapRecognizer};
