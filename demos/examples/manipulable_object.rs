// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Manipulable object basics.
//!
//! A photo that can be tapped, dragged, pinched and rotated. Touch input is
//! scripted on a platform without native gesture events, so pinch and rotation
//! are synthesized from the two-finger contact stream.
//!
//! Run:
//! - `cargo run -p understory_demos --example manipulable_object`
//! - `RUST_LOG=debug cargo run -p understory_demos --example manipulable_object`

use std::cell::Cell;
use std::rc::Rc;

use kurbo::{Point, Vec2};
use understory_event_state::{
    DragInfo, DragRecognizer, InputSurface, PinchRecognizer, RecognizerDelegate,
    RotationRecognizer, SharedRecognizer, TapRecognizer,
};
use understory_gesture::GestureEvent;
use understory_pointer::{InputCapabilities, PointerEvent, PointerPhase, RawEvent, RawTouch};
use understory_timing::{ManualClock, Scheduler};

const PHOTO: &str = "photo";

#[derive(Default)]
struct Photo {
    offset: Cell<Vec2>,
    drag_origin: Cell<Vec2>,
    scale: Cell<f64>,
    angle: Cell<f64>,
}

impl RecognizerDelegate<&'static str> for Photo {
    fn did_touch(&self, _event: &PointerEvent<&'static str>) {
        println!("  touch feedback on");
    }

    fn did_untouch(&self) {
        println!("  touch feedback off");
    }

    fn did_tap(&self, count: u32, _event: &PointerEvent<&'static str>) {
        println!("  tapped x{count}");
    }

    fn did_drag_start(&self, _event: &PointerEvent<&'static str>) {
        self.drag_origin.set(self.offset.get());
    }

    fn did_drag(&self, info: DragInfo, _event: &PointerEvent<&'static str>) {
        self.offset.set(self.drag_origin.get() + info.delta);
    }

    fn did_drag_end(&self, _event: &PointerEvent<&'static str>) {
        let offset = self.offset.get();
        println!("  dropped at ({:.0}, {:.0})", offset.x, offset.y);
    }

    fn did_pinch_change(&self, scale: f64, _event: &GestureEvent<&'static str>) {
        self.scale.set(scale);
    }

    fn did_rotation_change(&self, rotation: f64, _event: &GestureEvent<&'static str>) {
        self.angle.set(rotation);
    }
}

struct Script {
    clock: ManualClock,
    scheduler: Scheduler,
    surface: InputSurface<&'static str>,
}

impl Script {
    fn touch(&mut self, phase: PointerPhase, active: &[(u64, Point)], changed: &[(u64, Point)]) {
        let convert = |list: &[(u64, Point)]| {
            list.iter()
                .map(|&(id, at)| RawTouch::new(id, at, PHOTO))
                .collect::<Vec<_>>()
        };
        self.surface.handle_native(RawEvent::Touch {
            phase,
            touches: convert(active),
            changed_touches: convert(changed),
            target: PHOTO,
            timestamp: 0,
        });
    }

    fn wait(&self, ms: u64) {
        self.clock.advance(ms);
        self.scheduler.run_until_idle();
    }
}

fn main() {
    understory_demos::init_logging();

    let clock = ManualClock::new();
    let scheduler = Scheduler::with_clock(clock.clone());
    let mut script = Script {
        clock,
        scheduler: scheduler.clone(),
        surface: InputSurface::new(InputCapabilities::TOUCH),
    };

    let photo = Rc::new(Photo {
        scale: Cell::new(1.0),
        ..Photo::default()
    });
    let recognizers: [SharedRecognizer<&'static str>; 4] = [
        Rc::new(TapRecognizer::<&str>::new(scheduler, photo.clone())),
        Rc::new(DragRecognizer::<&str>::new(photo.clone())),
        Rc::new(PinchRecognizer::<&str>::new(photo.clone())),
        Rc::new(RotationRecognizer::<&str>::new(photo.clone())),
    ];
    for recognizer in recognizers {
        if let Err(err) = script.surface.add_pointer_recognizer(PHOTO, recognizer) {
            log::error!("could not attach recognizer: {err}");
        }
    }

    println!("Double tap:");
    let at = Point::new(50.0, 50.0);
    for _ in 0..2 {
        script.touch(PointerPhase::Start, &[(1, at)], &[(1, at)]);
        script.touch(PointerPhase::End, &[], &[(1, at)]);
        script.wait(100);
    }
    script.wait(500);

    println!("Drag:");
    script.touch(PointerPhase::Start, &[(2, at)], &[(2, at)]);
    for step in 1..=4 {
        let to = at + Vec2::new(f64::from(step) * 20.0, f64::from(step) * 5.0);
        script.touch(PointerPhase::Move, &[(2, to)], &[(2, to)]);
    }
    let end = at + Vec2::new(80.0, 20.0);
    script.touch(PointerPhase::End, &[], &[(2, end)]);
    script.wait(500);

    println!("Pinch and rotate:");
    let left = Point::new(100.0, 100.0);
    let right = Point::new(200.0, 100.0);
    script.touch(PointerPhase::Start, &[(3, left)], &[(3, left)]);
    script.touch(PointerPhase::Start, &[(3, left), (4, right)], &[(4, right)]);
    for step in 1..=3 {
        let t = f64::from(step) / 3.0;
        let radians = (t * 45.0).to_radians();
        let length = 100.0 + t * 100.0;
        let moved = left + Vec2::new(radians.cos(), radians.sin()) * length;
        script.touch(PointerPhase::Move, &[(3, left), (4, moved)], &[(4, moved)]);
        println!(
            "  scale {:.2}, rotation {:.1} deg",
            photo.scale.get(),
            photo.angle.get()
        );
    }
    script.touch(PointerPhase::End, &[(3, left)], &[(4, right)]);
    script.touch(PointerPhase::End, &[], &[(3, left)]);
    script.wait(500);
}
