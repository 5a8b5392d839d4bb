// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_timing --heading-base-level=0

//! Understory Timing: a cooperative scheduler for single-threaded UI runtimes.
//!
//! Event handling in a UI runtime is split in small units of work that must not
//! block the host loop. This crate queues that work and runs it in bounded
//! passes the host triggers:
//!
//! - **Bursts**: one event for an ordered list of [`Listener`]s, delivered
//!   asynchronously. Bursts never interleave, and a listener that panics does
//!   not keep the others from running.
//! - **Sync event**: a single replaceable slot, delivered before anything else
//!   on the next pass. Only the latest sync event is observed.
//! - **Actions**: deferred closures, optionally delayed on a [`Clock`], and
//!   cancellable through their [`ActionId`].
//!
//! The scheduler never spawns threads or sleeps. It calls a [`HostHook`] when it
//! needs a pass, and the host answers by calling [`Scheduler::service`].
//!
//! ## Minimal example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use std::time::Duration;
//! use understory_timing::{ManualClock, Scheduler};
//!
//! let clock = ManualClock::new();
//! let scheduler = Scheduler::with_clock(clock.clone());
//!
//! let fired = Rc::new(Cell::new(false));
//! let f = fired.clone();
//! scheduler.schedule_action(move || f.set(true), Some(Duration::from_millis(250)));
//!
//! scheduler.run_until_idle();
//! assert!(!fired.get());
//!
//! clock.advance(250);
//! scheduler.run_until_idle();
//! assert!(fired.get());
//! ```
//!
//! See [`scheduler`] for the exact order of work within a pass.

mod clock;
mod listener;
mod queue;
pub mod scheduler;
mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use listener::{Listener, SharedListener, same_listener};
pub use queue::{Action, ActionId};
pub use scheduler::{HostHook, Scheduler, SchedulerConfig, ServiceReport, run_isolated};
pub use state::LoopState;
