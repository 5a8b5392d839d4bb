// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tap recognition with touch feedback and multi-tap counting.
//!
//! Touch feedback and tap counting run side by side:
//!
//! - A pointer start fires `did_touch`, unless the target is still showing
//!   feedback from the previous tap.
//! - A pointer end schedules `did_untouch` after [`TapConfig::unselect_delay`]
//!   and `did_tap(count, event)` after [`TapConfig::multi_tap_window`].
//! - A start arriving while the tap is still pending cancels it and bumps the
//!   count, so two quick clicks report a single `did_tap(2, …)`.
//! - Moving further than [`TapConfig::move_threshold`] from the start point,
//!   a cancel, or a second contact abandons the tap: `did_untouch` fires right
//!   away and no tap is reported.
//!
//! Timers run on a [`Scheduler`], so callbacks arrive from its service passes.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use kurbo::Point;
//! use understory_event_state::{InputEvent, PointerRecognizer, RecognizerDelegate, TapRecognizer};
//! use understory_pointer::{InputCapabilities, Normalizer, PointerEvent, PointerPhase, RawEvent};
//! use understory_timing::{ManualClock, Scheduler};
//!
//! #[derive(Default)]
//! struct Taps(Cell<u32>);
//!
//! impl RecognizerDelegate<u32> for Taps {
//!     fn did_tap(&self, count: u32, _event: &PointerEvent<u32>) {
//!         self.0.set(count);
//!     }
//! }
//!
//! let clock = ManualClock::new();
//! let scheduler = Scheduler::with_clock(clock.clone());
//! let taps = Rc::new(Taps::default());
//! let tap: TapRecognizer<u32> = TapRecognizer::new(scheduler.clone(), taps.clone());
//! let mut normalizer = Normalizer::new(InputCapabilities::empty());
//!
//! for phase in [PointerPhase::Start, PointerPhase::End] {
//!     let raw = RawEvent::mouse(phase, Point::new(10.0, 10.0), 7, 0);
//!     let event = normalizer.normalize(raw).unwrap();
//!     tap.handle_event(&InputEvent::Pointer(event));
//! }
//!
//! clock.advance(300);
//! scheduler.run_until_idle();
//! assert_eq!(taps.0.get(), 1);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use kurbo::Point;
use understory_pointer::{PointerEvent, PointerPhase};
use understory_timing::{ActionId, Scheduler};

use crate::delegate::RecognizerDelegate;
use crate::event::{InputEvent, PointerEventType};
use crate::recognizer::PointerRecognizer;

/// Timing and distance tolerances of tap recognition.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TapConfig {
    /// How long after a release another press still counts toward the same tap.
    pub multi_tap_window: Duration,
    /// How long touch feedback lingers after a release.
    pub unselect_delay: Duration,
    /// Distance from the start point, in pixels, past which the press is no
    /// longer a tap.
    pub move_threshold: f64,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            multi_tap_window: Duration::from_millis(250),
            unselect_delay: Duration::from_millis(200),
            move_threshold: 10.0,
        }
    }
}

#[derive(Default)]
struct TapState {
    /// A contact is down and still a tap candidate.
    pressed: bool,
    /// Feedback is showing (`did_touch` fired, `did_untouch` not yet).
    touched: bool,
    start: Point,
    count: u32,
    tap_timer: Option<ActionId>,
    untouch_timer: Option<ActionId>,
}

/// Recognizes single and multiple taps.
pub struct TapRecognizer<T> {
    config: TapConfig,
    scheduler: Scheduler,
    delegate: Rc<dyn RecognizerDelegate<T>>,
    state: Rc<RefCell<TapState>>,
}

impl<T> fmt::Debug for TapRecognizer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("TapRecognizer")
            .field("config", &self.config)
            .field("pressed", &state.pressed)
            .field("touched", &state.touched)
            .field("count", &state.count)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> TapRecognizer<T> {
    /// Creates a recognizer with the default [`TapConfig`].
    pub fn new(scheduler: Scheduler, delegate: Rc<dyn RecognizerDelegate<T>>) -> Self {
        Self::with_config(scheduler, delegate, TapConfig::default())
    }

    /// Creates a recognizer with explicit tolerances.
    pub fn with_config(
        scheduler: Scheduler,
        delegate: Rc<dyn RecognizerDelegate<T>>,
        config: TapConfig,
    ) -> Self {
        Self {
            config,
            scheduler,
            delegate,
            state: Rc::new(RefCell::new(TapState::default())),
        }
    }

    /// The tolerances in use.
    #[must_use]
    pub fn config(&self) -> TapConfig {
        self.config
    }

    /// Returns `true` while touch feedback is showing.
    #[must_use]
    pub fn is_touched(&self) -> bool {
        self.state.borrow().touched
    }

    /// Taps counted so far in the current sequence.
    #[must_use]
    pub fn tap_count(&self) -> u32 {
        self.state.borrow().count
    }

    fn on_pointer(&self, event: &PointerEvent<T>) {
        match event.phase {
            PointerPhase::Start if event.nb_pointers > 1 => self.abandon(),
            PointerPhase::Start => self.press(event),
            PointerPhase::Move => {
                let state = self.state.borrow();
                if !state.pressed {
                    return;
                }
                let Some(contact) = event.primary() else {
                    return;
                };
                let moved = (contact.page - state.start).hypot();
                drop(state);
                if moved > self.config.move_threshold {
                    log::trace!("tap abandoned after moving {moved:.1}px");
                    self.abandon();
                }
            }
            PointerPhase::End => self.release(event),
            PointerPhase::Cancel => self.abandon(),
        }
    }

    fn press(&self, event: &PointerEvent<T>) {
        let Some(contact) = event.primary() else {
            return;
        };
        let first_touch = {
            let mut state = self.state.borrow_mut();
            if let Some(id) = state.untouch_timer.take() {
                self.scheduler.cancel_action(id);
            }
            state.pressed = true;
            state.start = contact.page;
            match state.tap_timer.take() {
                // Inside the multi-tap window: count it, feedback stays as it is.
                Some(id) => {
                    self.scheduler.cancel_action(id);
                    state.count += 1;
                    false
                }
                None => {
                    state.count = 1;
                    !std::mem::replace(&mut state.touched, true)
                }
            }
        };
        if first_touch {
            self.delegate.did_touch(event);
        }
    }

    fn release(&self, event: &PointerEvent<T>) {
        let mut state = self.state.borrow_mut();
        if !state.pressed {
            return;
        }
        state.pressed = false;

        let weak = Rc::downgrade(&self.state);
        let delegate = self.delegate.clone();
        state.untouch_timer = Some(self.scheduler.schedule_action(
            move || fire_untouch(&weak, &*delegate),
            Some(self.config.unselect_delay),
        ));

        let weak = Rc::downgrade(&self.state);
        let delegate = self.delegate.clone();
        let event = event.clone();
        state.tap_timer = Some(self.scheduler.schedule_action(
            move || fire_tap(&weak, &*delegate, &event),
            Some(self.config.multi_tap_window),
        ));
    }

    /// Drops the tap candidate and ends feedback immediately.
    fn abandon(&self) {
        let was_touched = {
            let mut state = self.state.borrow_mut();
            self.cancel_timers(&mut state);
            let was_touched = state.touched;
            *state = TapState::default();
            was_touched
        };
        if was_touched {
            self.delegate.did_untouch();
        }
    }

    fn cancel_timers(&self, state: &mut TapState) {
        for id in [state.tap_timer.take(), state.untouch_timer.take()]
            .into_iter()
            .flatten()
        {
            self.scheduler.cancel_action(id);
        }
    }
}

fn fire_untouch<T>(state: &Weak<RefCell<TapState>>, delegate: &dyn RecognizerDelegate<T>) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let was_touched = {
        let mut state = state.borrow_mut();
        state.untouch_timer = None;
        std::mem::replace(&mut state.touched, false)
    };
    if was_touched {
        delegate.did_untouch();
    }
}

fn fire_tap<T>(
    state: &Weak<RefCell<TapState>>,
    delegate: &dyn RecognizerDelegate<T>,
    event: &PointerEvent<T>,
) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let count = {
        let mut state = state.borrow_mut();
        state.tap_timer = None;
        std::mem::take(&mut state.count)
    };
    if count > 0 {
        delegate.did_tap(count, event);
    }
}

impl<T: Clone + 'static> PointerRecognizer<T> for TapRecognizer<T> {
    fn event_types(&self) -> &'static [PointerEventType] {
        &PointerEventType::POINTER
    }

    fn handle_event(&self, event: &InputEvent<T>) {
        if let InputEvent::Pointer(event) = event {
            self.on_pointer(event);
        }
    }

    fn reset(&self) {
        let mut state = self.state.borrow_mut();
        self.cancel_timers(&mut state);
        *state = TapState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use understory_pointer::{EventFamily, Pointer, PointerId, PointerList, PointerType};
    use understory_timing::ManualClock;

    #[derive(Default)]
    struct Record {
        calls: RefCell<Vec<String>>,
    }

    impl RecognizerDelegate<u32> for Record {
        fn did_touch(&self, _event: &PointerEvent<u32>) {
            self.calls.borrow_mut().push("touch".into());
        }
        fn did_untouch(&self) {
            self.calls.borrow_mut().push("untouch".into());
        }
        fn did_tap(&self, count: u32, _event: &PointerEvent<u32>) {
            self.calls.borrow_mut().push(format!("tap {count}"));
        }
    }

    struct Fixture {
        clock: ManualClock,
        scheduler: Scheduler,
        record: Rc<Record>,
        tap: TapRecognizer<u32>,
    }

    impl Fixture {
        fn new() -> Self {
            let clock = ManualClock::new();
            let scheduler = Scheduler::with_clock(clock.clone());
            let record = Rc::new(Record::default());
            let tap: TapRecognizer<u32> = TapRecognizer::new(scheduler.clone(), record.clone());
            Self {
                clock,
                scheduler,
                record,
                tap,
            }
        }

        fn send(&self, phase: PointerPhase, at: Point, active: usize) {
            let contact = Pointer::new(PointerId(1), PointerType::Touch, at, 0);
            let list: PointerList<u32> = std::iter::repeat_n(contact.clone(), active).collect();
            let changed: PointerList<u32> = std::iter::once(contact).collect();
            let event = PointerEvent::new(phase, EventFamily::Touch, 0, 0, list, changed);
            self.tap.handle_event(&InputEvent::Pointer(event));
        }

        fn advance(&self, ms: u64) {
            self.clock.advance(ms);
            self.scheduler.run_until_idle();
        }

        fn calls(&self) -> Vec<String> {
            self.record.calls.borrow().clone()
        }
    }

    const ORIGIN: Point = Point::new(10.0, 10.0);

    #[test]
    fn single_tap_reports_after_window() {
        let f = Fixture::new();
        f.send(PointerPhase::Start, ORIGIN, 1);
        f.send(PointerPhase::End, ORIGIN, 0);
        assert_eq!(f.calls(), ["touch"]);
        assert!(f.tap.is_touched());

        f.advance(200);
        assert_eq!(f.calls(), ["touch", "untouch"]);
        f.advance(49);
        assert_eq!(f.calls(), ["touch", "untouch"]);
        f.advance(1);
        assert_eq!(f.calls(), ["touch", "untouch", "tap 1"]);
        assert_eq!(f.tap.tap_count(), 0);
    }

    #[test]
    fn quick_second_press_counts_as_double_tap() {
        let f = Fixture::new();
        f.send(PointerPhase::Start, ORIGIN, 1);
        f.send(PointerPhase::End, ORIGIN, 0);
        f.advance(100);
        f.send(PointerPhase::Start, ORIGIN, 1);
        assert_eq!(f.tap.tap_count(), 2);
        f.send(PointerPhase::End, ORIGIN, 0);
        f.advance(1_000);
        assert_eq!(f.calls(), ["touch", "untouch", "tap 2"]);
    }

    #[test]
    fn press_after_feedback_ended_but_inside_window_does_not_touch_again() {
        let f = Fixture::new();
        f.send(PointerPhase::Start, ORIGIN, 1);
        f.send(PointerPhase::End, ORIGIN, 0);
        // Past the unselect delay, still inside the multi-tap window.
        f.advance(220);
        assert!(!f.tap.is_touched());
        f.send(PointerPhase::Start, ORIGIN, 1);
        assert_eq!(f.tap.tap_count(), 2);
        f.send(PointerPhase::End, ORIGIN, 0);
        f.advance(1_000);
        assert_eq!(f.calls(), ["touch", "untouch", "tap 2"]);
    }

    #[test]
    fn slow_second_press_starts_a_new_sequence() {
        let f = Fixture::new();
        f.send(PointerPhase::Start, ORIGIN, 1);
        f.send(PointerPhase::End, ORIGIN, 0);
        f.advance(300);
        f.send(PointerPhase::Start, ORIGIN, 1);
        f.send(PointerPhase::End, ORIGIN, 0);
        f.advance(300);
        assert_eq!(
            f.calls(),
            ["touch", "untouch", "tap 1", "touch", "untouch", "tap 1"]
        );
    }

    #[test]
    fn small_moves_keep_the_tap() {
        let f = Fixture::new();
        f.send(PointerPhase::Start, ORIGIN, 1);
        f.send(PointerPhase::Move, Point::new(16.0, 18.0), 1);
        f.send(PointerPhase::End, Point::new(16.0, 18.0), 0);
        f.advance(300);
        assert_eq!(f.calls(), ["touch", "untouch", "tap 1"]);
    }

    #[test]
    fn moving_past_threshold_untouches_without_tap() {
        let f = Fixture::new();
        f.send(PointerPhase::Start, ORIGIN, 1);
        f.send(PointerPhase::Move, Point::new(25.0, 10.0), 1);
        assert_eq!(f.calls(), ["touch", "untouch"]);
        assert!(!f.tap.is_touched());

        f.send(PointerPhase::End, Point::new(25.0, 10.0), 0);
        f.advance(1_000);
        assert_eq!(f.calls(), ["touch", "untouch"]);
        assert!(f.scheduler.is_idle());
    }

    #[test]
    fn cancel_and_second_contact_abandon_the_tap() {
        let f = Fixture::new();
        f.send(PointerPhase::Start, ORIGIN, 1);
        f.send(PointerPhase::Cancel, ORIGIN, 0);
        f.send(PointerPhase::Start, ORIGIN, 1);
        f.send(PointerPhase::Start, ORIGIN, 2);
        f.advance(1_000);
        assert_eq!(f.calls(), ["touch", "untouch", "touch", "untouch"]);
    }

    #[test]
    fn reset_drops_pending_callbacks() {
        let f = Fixture::new();
        f.send(PointerPhase::Start, ORIGIN, 1);
        f.send(PointerPhase::End, ORIGIN, 0);
        f.tap.reset();
        f.advance(1_000);
        assert_eq!(f.calls(), ["touch"]);
        assert!(f.scheduler.is_idle());
    }

    #[test]
    fn dropped_recognizer_fires_nothing() {
        let f = Fixture::new();
        f.send(PointerPhase::Start, ORIGIN, 1);
        f.send(PointerPhase::End, ORIGIN, 0);
        let Fixture {
            clock,
            scheduler,
            record,
            tap,
        } = f;
        drop(tap);
        clock.advance(1_000);
        scheduler.run_until_idle();
        assert_eq!(*record.calls.borrow(), ["touch"]);
    }
}
