// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cooperative scheduler basics.
//!
//! A tiny host loop servicing the scheduler: bursts fan out to listeners one
//! deferred call at a time, a panicking listener does not stop its siblings,
//! sync events replace each other and a self-rescheduling action does not keep
//! bursts waiting.
//!
//! Run:
//! - `cargo run -p understory_demos --example cooperative_loop`

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::Duration;

use understory_timing::{HostHook, ManualClock, Scheduler, SchedulerConfig, SharedListener};

/// Host side: asap requests are counted, timed ones kept in deadline order.
#[derive(Clone, Default)]
struct MessageQueue {
    asap: Rc<Cell<usize>>,
    timers: Rc<RefCell<BTreeSet<u64>>>,
}

impl HostHook for MessageQueue {
    fn request_pass(&self, at: Option<u64>) {
        match at {
            None => self.asap.set(self.asap.get() + 1),
            Some(at) => {
                self.timers.borrow_mut().insert(at);
            }
        }
    }
}

impl MessageQueue {
    /// Next pass to run, advancing `clock` to timer deadlines.
    fn next(&self, clock: &ManualClock, scheduler: &Scheduler) -> bool {
        if self.asap.get() > 0 {
            self.asap.set(self.asap.get() - 1);
            return true;
        }
        let Some(at) = self.timers.borrow_mut().pop_first() else {
            return false;
        };
        if at > scheduler.now_ms() {
            clock.set(at);
        }
        true
    }
}

fn named(name: &'static str) -> SharedListener<String> {
    Rc::new(move |event: &String| {
        if name == "flaky" {
            panic!("{name} cannot handle {event}");
        }
        println!("  {name} <- {event}");
    })
}

fn tick(scheduler: Scheduler, ticks: Rc<Cell<u32>>) {
    ticks.set(ticks.get() + 1);
    if ticks.get() < 20 {
        let next = scheduler.clone();
        scheduler.schedule_action(move || tick(next, ticks), None);
    }
}

fn main() {
    understory_demos::init_logging();

    let clock = ManualClock::new();
    let scheduler = Scheduler::with_clock_and_config(
        clock.clone(),
        SchedulerConfig {
            max_actions_per_pass: 8,
        },
    );
    let messages = MessageQueue::default();
    scheduler.set_host_hook(messages.clone());

    let listeners = [named("status bar"), named("flaky"), named("history")];
    scheduler.propagate("document saved".to_string(), listeners.clone());
    scheduler.propagate("document closed".to_string(), listeners);

    scheduler.propagate_sync("resize 800x600".to_string(), [named("layout")]);
    scheduler.propagate_sync("resize 1024x768".to_string(), [named("layout")]);

    // A chatty background job rescheduling itself.
    let ticks = Rc::new(Cell::new(0_u32));
    let (s, t) = (scheduler.clone(), ticks.clone());
    scheduler.schedule_action(move || tick(s, t), None);

    scheduler.schedule_action(
        || println!("  cursor blink"),
        Some(Duration::from_millis(500)),
    );
    scheduler.schedule_action(|| println!("  autosave"), Some(Duration::from_millis(200)));
    let reminder = scheduler.schedule_action(
        || println!("  never shown"),
        Some(Duration::from_millis(300)),
    );
    println!("reminder cancelled: {}", scheduler.cancel_action(reminder));

    let mut pass = 0;
    while messages.next(&clock, &scheduler) {
        pass += 1;
        println!("pass {pass} at t={}ms", scheduler.now_ms());
        let report = scheduler.service();
        println!(
            "  ran {} (sync: {}, burst: {}, background ticks so far: {})",
            report.ran_actions,
            report.delivered_sync,
            report.dispatched_burst,
            ticks.get()
        );
    }
    println!("idle: {}", scheduler.is_idle());
}
