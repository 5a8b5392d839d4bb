// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end scenarios: native events in, recognizer callbacks out.

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::Point;
use understory_event_state::{
    DragInfo, DragRecognizer, InputEvent, InputSurface, PinchRecognizer, PointerEventType,
    RecognizerDelegate, RotationRecognizer, SharedRecognizer, TapRecognizer,
};
use understory_gesture::{GestureEvent, GesturePhase, NativeGesture};
use understory_pointer::{
    InputCapabilities, PointerEvent, PointerId, PointerPhase, RawEvent, RawTouch,
};
use understory_timing::{Clock, ManualClock, Scheduler, SharedListener};

const TARGET: u32 = 1;
const OTHER: u32 = 2;

/// Delegate that records every callback as a short string.
#[derive(Default)]
struct Recorder {
    calls: RefCell<Vec<String>>,
    scales: RefCell<Vec<f64>>,
    rotations: RefCell<Vec<f64>>,
}

impl Recorder {
    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

impl RecognizerDelegate<u32> for Recorder {
    fn did_touch(&self, _event: &PointerEvent<u32>) {
        self.calls.borrow_mut().push("touch".into());
    }
    fn did_untouch(&self) {
        self.calls.borrow_mut().push("untouch".into());
    }
    fn did_tap(&self, count: u32, _event: &PointerEvent<u32>) {
        self.calls.borrow_mut().push(format!("tap {count}"));
    }
    fn did_drag_start(&self, _event: &PointerEvent<u32>) {
        self.calls.borrow_mut().push("drag start".into());
    }
    fn did_drag(&self, info: DragInfo, _event: &PointerEvent<u32>) {
        self.calls
            .borrow_mut()
            .push(format!("drag {},{}", info.delta.x, info.delta.y));
    }
    fn did_drag_end(&self, _event: &PointerEvent<u32>) {
        self.calls.borrow_mut().push("drag end".into());
    }
    fn did_pinch_change(&self, scale: f64, _event: &GestureEvent<u32>) {
        self.scales.borrow_mut().push(scale);
    }
    fn did_rotation_change(&self, rotation: f64, _event: &GestureEvent<u32>) {
        self.rotations.borrow_mut().push(rotation);
    }
}

struct Harness {
    clock: ManualClock,
    scheduler: Scheduler,
    surface: InputSurface<u32>,
    delegate: Rc<Recorder>,
}

impl Harness {
    fn new(capabilities: InputCapabilities) -> Self {
        let clock = ManualClock::new();
        Self {
            scheduler: Scheduler::with_clock(clock.clone()),
            clock,
            surface: InputSurface::new(capabilities),
            delegate: Rc::new(Recorder::default()),
        }
    }

    fn attach(&mut self, recognizer: SharedRecognizer<u32>) {
        self.surface
            .add_pointer_recognizer(TARGET, recognizer)
            .unwrap();
    }

    fn tap(&self) -> SharedRecognizer<u32> {
        Rc::new(TapRecognizer::<u32>::new(
            self.scheduler.clone(),
            self.delegate.clone(),
        ))
    }

    fn drag(&self) -> SharedRecognizer<u32> {
        Rc::new(DragRecognizer::<u32>::new(self.delegate.clone()))
    }

    fn mouse(&mut self, phase: PointerPhase, x: f64, y: f64) {
        let now = self.now();
        self.surface
            .handle_native(RawEvent::mouse(phase, Point::new(x, y), TARGET, now));
    }

    fn touches(&mut self, phase: PointerPhase, active: &[(u64, Point)], changed: &[(u64, Point)]) {
        let convert = |list: &[(u64, Point)]| {
            list.iter()
                .map(|&(id, at)| RawTouch::new(id, at, TARGET))
                .collect::<Vec<_>>()
        };
        let now = self.now();
        assert!(self.surface.handle_native(RawEvent::Touch {
            phase,
            touches: convert(active),
            changed_touches: convert(changed),
            target: TARGET,
            timestamp: now,
        }));
    }

    /// Touches spread over several targets; `target` is where the changed contact is.
    fn touches_on(
        &mut self,
        phase: PointerPhase,
        target: u32,
        active: &[(u64, u32, Point)],
        changed: &[(u64, u32, Point)],
    ) {
        let convert = |list: &[(u64, u32, Point)]| {
            list.iter()
                .map(|&(id, on, at)| RawTouch::new(id, at, on))
                .collect::<Vec<_>>()
        };
        let now = self.now();
        assert!(self.surface.handle_native(RawEvent::Touch {
            phase,
            touches: convert(active),
            changed_touches: convert(changed),
            target,
            timestamp: now,
        }));
    }

    fn pen(&mut self, phase: PointerPhase, id: u64, x: f64, y: f64) {
        let now = self.now();
        assert!(self.surface.handle_native(RawEvent::pen(
            phase,
            id,
            Point::new(x, y),
            TARGET,
            now
        )));
    }

    fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    fn advance(&self, ms: u64) {
        self.clock.advance(ms);
        self.scheduler.run_until_idle();
    }

    fn record_events(&mut self, ty: PointerEventType) -> Rc<RefCell<Vec<InputEvent<u32>>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let listener: SharedListener<InputEvent<u32>> =
            Rc::new(move |e: &InputEvent<u32>| s.borrow_mut().push(e.clone()));
        self.surface
            .add_pointer_listener(TARGET, ty, listener)
            .unwrap();
        seen
    }
}

fn rotated(length: f64, degrees: f64) -> Point {
    let radians = degrees.to_radians();
    Point::new(length * radians.cos(), length * radians.sin())
}

#[test]
fn touch_identifiers_are_stable_across_moves() {
    let mut h = Harness::new(InputCapabilities::TOUCH);
    let moves = h.record_events(PointerEventType::PointerMove);

    h.touches(PointerPhase::Start, &[(42, Point::ZERO)], &[(42, Point::ZERO)]);
    for step in 1..=3 {
        let at = Point::new(f64::from(step) * 5.0, 0.0);
        h.touches(PointerPhase::Move, &[(42, at)], &[(42, at)]);
    }

    let moves = moves.borrow();
    assert_eq!(moves.len(), 3);
    for event in moves.iter() {
        let event = event.as_pointer().unwrap();
        assert_eq!(event.pointer_list[0].identifier, PointerId(42));
        assert_eq!(event.changed_pointer_list[0].identifier, PointerId(42));
    }
}

#[test]
fn mouse_uses_the_sentinel_and_counts_one_while_down() {
    let mut h = Harness::new(InputCapabilities::empty());
    let mut recorders = Vec::new();
    for ty in PointerEventType::POINTER {
        recorders.push(h.record_events(ty));
    }

    h.mouse(PointerPhase::Start, 10.0, 10.0);
    h.mouse(PointerPhase::Move, 12.0, 10.0);
    h.mouse(PointerPhase::End, 12.0, 10.0);

    let nb: Vec<usize> = recorders
        .iter()
        .flat_map(|r| r.borrow().clone())
        .map(|e| {
            let e = e.as_pointer().unwrap().clone();
            assert!(
                e.changed_pointer_list
                    .iter()
                    .all(|p| p.identifier == PointerId::MOUSE)
            );
            e.nb_pointers
        })
        .collect();
    // Recorders are grouped by type: start, move, end.
    assert_eq!(nb, [1, 1, 0]);
}

#[test]
fn gesture_start_fires_once_per_transition() {
    let mut h = Harness::new(InputCapabilities::TOUCH);
    let starts = h.record_events(PointerEventType::GestureStart);
    let changes = h.record_events(PointerEventType::GestureChange);
    let ends = h.record_events(PointerEventType::GestureEnd);

    let a = (1, Point::new(0.0, 0.0));
    let b = (2, Point::new(100.0, 0.0));
    let c = (3, Point::new(50.0, 50.0));
    h.touches(PointerPhase::Start, &[a], &[a]);
    h.touches(PointerPhase::Start, &[a, b], &[b]);
    h.touches(PointerPhase::Start, &[a, b, c], &[c]);
    h.touches(PointerPhase::End, &[a, b], &[c]);
    assert_eq!(starts.borrow().len(), 1);
    assert_eq!(changes.borrow().len(), 2);

    h.touches(PointerPhase::End, &[a], &[b]);
    assert_eq!(ends.borrow().len(), 1);
    let end = ends.borrow()[0].as_gesture().unwrap().clone();
    assert_eq!(end.scale, None);
    assert_eq!(end.rotation, None);
    assert_eq!(end.translation, None);

    // Back above two contacts: a fresh start.
    h.touches(PointerPhase::Start, &[a, b], &[b]);
    assert_eq!(starts.borrow().len(), 2);
}

#[test]
fn gesture_start_has_identity_baseline() {
    let mut h = Harness::new(InputCapabilities::TOUCH);
    let starts = h.record_events(PointerEventType::GestureStart);
    let a = (1, Point::new(10.0, 20.0));
    let b = (2, rotated(80.0, 45.0));
    h.touches(PointerPhase::Start, &[a], &[a]);
    h.touches(PointerPhase::Start, &[a, b], &[b]);

    let start = starts.borrow()[0].as_gesture().unwrap().clone();
    assert_eq!(start.phase, GesturePhase::Start);
    assert_eq!(start.scale, Some(1.0));
    assert_eq!(start.rotation, Some(0.0));
    assert_eq!(start.translation, Some(kurbo::Vec2::ZERO));
}

#[test]
fn pinch_and_rotation_observe_the_same_gesture() {
    let mut h = Harness::new(InputCapabilities::TOUCH);
    let pinch: SharedRecognizer<u32> = Rc::new(PinchRecognizer::<u32>::new(h.delegate.clone()));
    let rotation: SharedRecognizer<u32> =
        Rc::new(RotationRecognizer::<u32>::new(h.delegate.clone()));
    h.attach(pinch);
    h.attach(rotation);

    let a = (1, Point::ZERO);
    let b = (2, Point::new(100.0, 0.0));
    h.touches(PointerPhase::Start, &[a], &[a]);
    h.touches(PointerPhase::Start, &[a, b], &[b]);
    let b = (2, rotated(150.0, 30.0));
    h.touches(PointerPhase::Move, &[a, b], &[b]);
    h.touches(PointerPhase::End, &[a], &[b]);

    let scales = h.delegate.scales.borrow();
    let rotations = h.delegate.rotations.borrow();
    assert_eq!(scales.len(), 1);
    assert_eq!(rotations.len(), 1);
    assert!((scales[0] - 1.5).abs() < 1e-9, "scale {}", scales[0]);
    assert!((rotations[0] - 30.0).abs() < 1e-9, "rotation {}", rotations[0]);
}

#[test]
fn native_gestures_drive_the_same_recognizers() {
    let mut h = Harness::new(InputCapabilities::TOUCH | InputCapabilities::GESTURE_EVENTS);
    let pinch: SharedRecognizer<u32> = Rc::new(PinchRecognizer::<u32>::new(h.delegate.clone()));
    h.attach(pinch);

    for (phase, scale) in [
        (GesturePhase::Start, 1.0),
        (GesturePhase::Change, 0.5),
        (GesturePhase::End, 0.5),
    ] {
        h.surface.handle_native_gesture(NativeGesture {
                phase,
                scale,
                rotation: 0.0,
                target: TARGET,
                timestamp: 0,
            });
    }

    // Two contacts down do not synthesize anything on this platform.
    let a = (1, Point::ZERO);
    let b = (2, Point::new(10.0, 0.0));
    h.touches(PointerPhase::Start, &[a, b], &[a, b]);

    assert_eq!(*h.delegate.scales.borrow(), [0.5]);
}

#[test]
fn moving_past_the_threshold_turns_a_tap_into_a_drag() {
    let mut h = Harness::new(InputCapabilities::TOUCH);
    let tap = h.tap();
    let drag = h.drag();
    h.attach(tap);
    h.attach(drag);

    let start = (7, Point::new(10.0, 10.0));
    h.touches(PointerPhase::Start, &[start], &[start]);
    let near = (7, Point::new(14.0, 10.0));
    h.touches(PointerPhase::Move, &[near], &[near]);
    let far = (7, Point::new(40.0, 10.0));
    h.touches(PointerPhase::Move, &[far], &[far]);
    h.touches(PointerPhase::End, &[], &[far]);
    h.advance(1_000);

    assert_eq!(
        h.delegate.calls(),
        [
            "touch",
            "drag start",
            "drag 4,0",
            "untouch",
            "drag 30,0",
            "drag end",
        ]
    );
    assert_eq!(h.delegate.count("tap"), 0);
}

#[test]
fn double_click_reports_one_double_tap() {
    let mut h = Harness::new(InputCapabilities::empty());
    let tap = h.tap();
    h.attach(tap);

    h.mouse(PointerPhase::Start, 10.0, 10.0);
    h.advance(40);
    h.mouse(PointerPhase::End, 10.0, 10.0);
    h.advance(100);
    h.mouse(PointerPhase::Start, 10.0, 10.0);
    h.advance(40);
    h.mouse(PointerPhase::End, 10.0, 10.0);
    h.advance(1_000);

    assert_eq!(h.delegate.count("tap"), 1);
    assert_eq!(h.delegate.count("tap 2"), 1);
    assert_eq!(h.delegate.count("drag"), 0);
    assert_eq!(h.delegate.count("touch"), 1);
    assert!(h.scheduler.is_idle());
}

#[test]
fn removing_a_recognizer_stops_its_callbacks() {
    let mut h = Harness::new(InputCapabilities::empty());
    let drag = h.drag();
    h.attach(drag.clone());
    h.mouse(PointerPhase::Start, 0.0, 0.0);
    h.surface
        .remove_pointer_recognizer(&TARGET, &drag)
        .unwrap();
    h.mouse(PointerPhase::Move, 30.0, 0.0);
    h.mouse(PointerPhase::End, 30.0, 0.0);

    assert_eq!(h.delegate.calls(), ["drag start"]);
    assert_eq!(
        h.surface
            .listener_count(&TARGET, PointerEventType::PointerMove),
        0
    );
}

#[test]
fn surface_events_can_be_relayed_as_scheduler_bursts() {
    let mut h = Harness::new(InputCapabilities::empty());
    let delivered = Rc::new(RefCell::new(Vec::new()));

    let mut app_listeners: Vec<SharedListener<InputEvent<u32>>> = Vec::new();
    for name in ["first", "broken", "last"] {
        let d = delivered.clone();
        app_listeners.push(Rc::new(move |e: &InputEvent<u32>| {
            if name == "broken" {
                panic!("application listener failure");
            }
            d.borrow_mut().push(format!("{name} {:?}", e.event_type()));
        }));
    }

    let scheduler = h.scheduler.clone();
    let relay: SharedListener<InputEvent<u32>> = Rc::new(move |e: &InputEvent<u32>| {
        scheduler.propagate(e.clone(), app_listeners.iter().cloned());
    });
    for ty in [PointerEventType::PointerStart, PointerEventType::PointerEnd] {
        h.surface
            .add_pointer_listener(TARGET, ty, relay.clone())
            .unwrap();
    }

    h.mouse(PointerPhase::Start, 1.0, 1.0);
    h.mouse(PointerPhase::End, 1.0, 1.0);
    assert!(delivered.borrow().is_empty());
    assert_eq!(h.scheduler.pending_bursts(), 2);

    h.scheduler.run_until_idle();
    assert_eq!(
        *delivered.borrow(),
        [
            "first PointerStart",
            "last PointerStart",
            "first PointerEnd",
            "last PointerEnd",
        ]
    );
}

#[test]
fn contact_on_another_target_does_not_break_a_live_pinch() {
    let mut h = Harness::new(InputCapabilities::TOUCH);
    let pinch = Rc::new(PinchRecognizer::<u32>::new(h.delegate.clone()));
    h.attach(pinch.clone());
    let ends = h.record_events(PointerEventType::GestureEnd);
    let elsewhere = Rc::new(RefCell::new(Vec::new()));
    let seen = elsewhere.clone();
    let listener: SharedListener<InputEvent<u32>> = Rc::new(move |e: &InputEvent<u32>| {
        if let Some(event) = e.as_pointer() {
            seen.borrow_mut()
                .push((event.nb_pointers, event.target_pointer_list.len()));
        }
    });
    h.surface
        .add_pointer_listener(OTHER, PointerEventType::PointerStart, listener)
        .unwrap();

    let a = (1, TARGET, Point::ZERO);
    let b = (2, TARGET, Point::new(100.0, 0.0));
    let c = (3, OTHER, Point::new(500.0, 500.0));
    h.touches_on(PointerPhase::Start, TARGET, &[a], &[a]);
    h.touches_on(PointerPhase::Start, TARGET, &[a, b], &[b]);
    assert!(pinch.is_tracking());

    h.touches_on(PointerPhase::Start, OTHER, &[a, b, c], &[c]);
    assert_eq!(*elsewhere.borrow(), [(3, 1)]);
    assert!(pinch.is_tracking());

    let b = (2, TARGET, Point::new(200.0, 0.0));
    h.touches_on(PointerPhase::Move, TARGET, &[a, b, c], &[b]);
    h.touches_on(PointerPhase::End, OTHER, &[a, b], &[c]);
    assert_eq!(*h.delegate.scales.borrow(), [2.0]);
    assert!(ends.borrow().is_empty());

    h.touches_on(PointerPhase::End, TARGET, &[a], &[b]);
    assert_eq!(ends.borrow().len(), 1);
    assert!(!pinch.is_tracking());
}

#[test]
fn pen_contacts_pinch_through_the_surface() {
    let mut h = Harness::new(InputCapabilities::MS_POINTER);
    let pinch: SharedRecognizer<u32> = Rc::new(PinchRecognizer::<u32>::new(h.delegate.clone()));
    h.attach(pinch);
    let starts = h.record_events(PointerEventType::GestureStart);
    let lifts = h.record_events(PointerEventType::PointerEnd);

    h.pen(PointerPhase::Start, 10, 0.0, 0.0);
    h.pen(PointerPhase::Start, 11, 100.0, 0.0);
    h.pen(PointerPhase::Move, 11, 50.0, 0.0);
    h.pen(PointerPhase::End, 10, 0.0, 0.0);
    h.pen(PointerPhase::End, 11, 50.0, 0.0);

    assert_eq!(starts.borrow().len(), 1);
    assert_eq!(*h.delegate.scales.borrow(), [0.5]);
    let lifted: Vec<(usize, Vec<PointerId>)> = lifts
        .borrow()
        .iter()
        .filter_map(InputEvent::as_pointer)
        .map(|e| {
            let ids = e.changed_pointer_list.iter().map(|p| p.identifier).collect();
            (e.nb_pointers, ids)
        })
        .collect();
    assert_eq!(
        lifted,
        [(1, vec![PointerId(10)]), (0, vec![PointerId(11)])]
    );
}
