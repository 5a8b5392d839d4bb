// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The cooperative scheduler.
//!
//! ## Work kinds
//!
//! - **Bursts** ([`Scheduler::propagate`]): an event plus its ordered listener
//!   list. Bursts are dispatched strictly in submission order. Dispatching a
//!   burst turns each listener call into its own queued delivery, and the next
//!   burst is not dispatched before every delivery of the current one has run.
//! - **Sync event** ([`Scheduler::propagate_sync`]): a single slot. A newer sync
//!   event replaces a pending one; it is never queued behind it.
//! - **Actions** ([`Scheduler::schedule_action`]): deferred closures, run FIFO,
//!   optionally after a delay measured on the scheduler's [`Clock`].
//!
//! ## One pass
//!
//! [`Scheduler::service`] performs one pass:
//!
//! 1. Promote due timers to the ready queue.
//! 2. Deliver the pending sync event, if any.
//! 3. Dispatch the next burst if the previous one is fully delivered.
//! 4. Run the entries that are ready at this point, up to
//!    [`SchedulerConfig::max_actions_per_pass`]. Anything queued while the
//!    pass runs waits for the next pass.
//!
//! Step 4 bounds every pass, so a chain of self-scheduling actions cannot keep
//! a pending burst waiting: the burst is dispatched at the start of the next
//! pass and its deliveries queue up behind the actions already there.
//!
//! A panic inside a listener or action is caught and logged. The remaining
//! deliveries and actions still run.
//!
//! ## Minimal example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use understory_timing::{ManualClock, Scheduler, SharedListener};
//!
//! let clock = ManualClock::new();
//! let scheduler = Scheduler::with_clock(clock.clone());
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let s = seen.clone();
//! let listener: SharedListener<&'static str> = Rc::new(move |e: &&'static str| {
//!     s.borrow_mut().push(*e)
//! });
//! scheduler.propagate("hello", [listener]);
//!
//! let s = seen.clone();
//! scheduler.schedule_action(move || s.borrow_mut().push("later"), None);
//!
//! scheduler.run_until_idle();
//! assert_eq!(*seen.borrow(), vec!["later", "hello"]);
//! ```
//!
//! The action runs first because it was already queued when the burst was
//! dispatched.

use std::any::Any;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::listener::SharedListener;
use crate::queue::{Action, ActionId, ActionQueue, EntryKind};
use crate::state::LoopState;

/// Upper bound on passes made by [`Scheduler::run_until_idle`].
const RUN_UNTIL_IDLE_PASS_LIMIT: usize = 10_000;

/// Tuning for the scheduler loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Most actions or deliveries one pass runs before yielding to the host.
    pub max_actions_per_pass: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_actions_per_pass: 64,
        }
    }
}

/// Host side of the loop.
///
/// The scheduler never blocks or spawns; it asks the host to come back.
/// Hosts typically answer with their fastest deferral primitive (a posted
/// message, falling back to a zero-delay timer) and call
/// [`Scheduler::service`] from it.
pub trait HostHook {
    /// Requests a service pass.
    ///
    /// `at` is `None` for "as soon as possible", or the clock time at which a
    /// delayed action becomes due.
    fn request_pass(&self, at: Option<u64>);
}

/// Summary of one [`Scheduler::service`] pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceReport {
    /// Actions and burst deliveries that ran.
    pub ran_actions: usize,
    /// Whether a sync event was delivered.
    pub delivered_sync: bool,
    /// Whether a burst was dispatched.
    pub dispatched_burst: bool,
    /// Clock time of the earliest delayed action still waiting.
    pub next_deadline: Option<u64>,
    /// Whether work is runnable right now, so another pass is needed.
    pub pending: bool,
}

type Delivery = Box<dyn FnOnce()>;

struct Inner {
    config: SchedulerConfig,
    state: LoopState,
    sync_event: Option<Vec<Delivery>>,
    bursts: VecDeque<Vec<Delivery>>,
    /// Deliveries of the last dispatched burst that have not run yet.
    in_flight: usize,
    actions: ActionQueue,
    host: Option<Rc<dyn HostHook>>,
    pass_requested: bool,
}

impl Inner {
    fn has_runnable_work(&self) -> bool {
        self.sync_event.is_some()
            || self.actions.has_ready()
            || (self.in_flight == 0 && !self.bursts.is_empty())
    }
}

/// Single-threaded cooperative scheduler.
///
/// `Scheduler` is a cheap handle: clones share one loop, so listeners and
/// actions can hold a clone and schedule more work from inside a pass.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<RefCell<Inner>>,
    clock: Rc<dyn Clock>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Scheduler")
            .field("config", &inner.config)
            .field("state", &inner.state)
            .field("sync_pending", &inner.sync_event.is_some())
            .field("bursts", &inner.bursts.len())
            .field("in_flight", &inner.in_flight)
            .field("actions", &inner.actions)
            .finish_non_exhaustive()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Creates a scheduler on the wall clock with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock_and_config(SystemClock::new(), SchedulerConfig::default())
    }

    /// Creates a scheduler on the given clock.
    #[must_use]
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self::with_clock_and_config(clock, SchedulerConfig::default())
    }

    /// Creates a scheduler on the wall clock with the given configuration.
    #[must_use]
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self::with_clock_and_config(SystemClock::new(), config)
    }

    /// Creates a scheduler on the given clock with the given configuration.
    #[must_use]
    pub fn with_clock_and_config(clock: impl Clock + 'static, config: SchedulerConfig) -> Self {
        debug_assert!(config.max_actions_per_pass > 0, "pass budget must be positive");
        Self {
            inner: Rc::new(RefCell::new(Inner {
                config,
                state: LoopState::Idle,
                sync_event: None,
                bursts: VecDeque::new(),
                in_flight: 0,
                actions: ActionQueue::default(),
                host: None,
                pass_requested: false,
            })),
            clock: Rc::new(clock),
        }
    }

    /// Installs the hook used to request service passes from the host.
    pub fn set_host_hook(&self, hook: impl HostHook + 'static) {
        self.inner.borrow_mut().host = Some(Rc::new(hook));
    }

    /// Current time on the scheduler's clock.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// What the loop is doing right now.
    #[must_use]
    pub fn state(&self) -> LoopState {
        self.inner.borrow().state
    }

    /// Returns `true` if nothing is queued at all, delayed actions included.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        let inner = self.inner.borrow();
        inner.sync_event.is_none() && inner.bursts.is_empty() && inner.actions.len() == 0
    }

    /// Number of actions waiting, delayed ones and undelivered burst calls included.
    #[must_use]
    pub fn pending_actions(&self) -> usize {
        self.inner.borrow().actions.len()
    }

    /// Number of bursts not yet dispatched.
    #[must_use]
    pub fn pending_bursts(&self) -> usize {
        self.inner.borrow().bursts.len()
    }

    /// Enqueues `event` for asynchronous delivery to every listener, in order.
    ///
    /// The listener list is captured now; listeners added or removed later only
    /// affect later bursts.
    pub fn propagate<E: 'static>(
        &self,
        event: E,
        listeners: impl IntoIterator<Item = SharedListener<E>>,
    ) {
        let deliveries = Self::deliveries(event, listeners);
        if deliveries.is_empty() {
            log::trace!("propagate: no listeners, burst dropped");
            return;
        }
        self.inner.borrow_mut().bursts.push_back(deliveries);
        self.request_pass(None);
    }

    /// Puts `event` in the sync slot, delivered first thing on the next pass.
    ///
    /// A sync event still pending is replaced, not queued: only the most recent
    /// one is observed.
    pub fn propagate_sync<E: 'static>(
        &self,
        event: E,
        listeners: impl IntoIterator<Item = SharedListener<E>>,
    ) {
        let deliveries = Self::deliveries(event, listeners);
        let replaced = self
            .inner
            .borrow_mut()
            .sync_event
            .replace(deliveries)
            .is_some();
        if replaced {
            log::debug!("sync event replaced before delivery");
        }
        self.request_pass(None);
    }

    /// Defers `action`, optionally by `delay`.
    ///
    /// The delay counts from the scheduler's clock at the time of the call.
    pub fn schedule_action(
        &self,
        action: impl FnOnce() + 'static,
        delay: Option<Duration>,
    ) -> ActionId {
        let action: Action = Box::new(action);
        match delay {
            Some(delay) if !delay.is_zero() => {
                let ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
                let due = self.clock.now_ms().saturating_add(ms);
                let id = self.inner.borrow_mut().actions.push_at(due, action);
                self.request_pass(Some(due));
                id
            }
            _ => {
                let id = self
                    .inner
                    .borrow_mut()
                    .actions
                    .push(EntryKind::Action, action);
                self.request_pass(None);
                id
            }
        }
    }

    /// Cancels a scheduled action. Returns `false` if it already ran or was cancelled.
    pub fn cancel_action(&self, id: ActionId) -> bool {
        self.inner.borrow_mut().actions.cancel(id)
    }

    /// Performs one service pass.
    ///
    /// Calling this from inside a listener or action does nothing: the pass
    /// already running will get to the new work.
    pub fn service(&self) -> ServiceReport {
        let now = self.clock.now_ms();
        let mut report = ServiceReport::default();
        {
            let mut inner = self.inner.borrow_mut();
            if inner.state.is_busy() {
                log::trace!("service: re-entrant call while {:?} ignored", inner.state);
                report.pending = true;
                return report;
            }
            inner.pass_requested = false;
            inner.actions.promote_due(now);
        }

        let sync = self.inner.borrow_mut().sync_event.take();
        if let Some(deliveries) = sync {
            self.transition(LoopState::DrainingSync);
            for delivery in deliveries {
                run_isolated("sync listener", delivery);
            }
            self.transition(LoopState::Idle);
            report.delivered_sync = true;
        }

        let burst = {
            let mut inner = self.inner.borrow_mut();
            if inner.in_flight == 0 {
                inner.bursts.pop_front()
            } else {
                None
            }
        };
        if let Some(deliveries) = burst {
            self.transition(LoopState::DispatchingBurst);
            {
                let mut inner = self.inner.borrow_mut();
                inner.in_flight = deliveries.len();
                for delivery in deliveries {
                    inner.actions.push(EntryKind::Delivery, delivery);
                }
            }
            self.transition(LoopState::Idle);
            report.dispatched_burst = true;
        }

        let budget = {
            let inner = self.inner.borrow();
            inner
                .actions
                .ready_len()
                .min(inner.config.max_actions_per_pass)
        };
        for _ in 0..budget {
            let Some(entry) = self.inner.borrow_mut().actions.pop_ready() else {
                break;
            };
            self.transition(LoopState::RunningAction);
            let what = match entry.kind {
                EntryKind::Action => "action",
                EntryKind::Delivery => "listener",
            };
            run_isolated(what, entry.action);
            if entry.kind == EntryKind::Delivery {
                let mut inner = self.inner.borrow_mut();
                inner.in_flight = inner.in_flight.saturating_sub(1);
            }
            self.transition(LoopState::Idle);
            report.ran_actions += 1;
        }

        {
            let mut inner = self.inner.borrow_mut();
            report.next_deadline = inner.actions.next_deadline();
            report.pending = inner.has_runnable_work();
        }
        log::trace!("service pass at {now}: {report:?}");
        if report.pending {
            self.request_pass(None);
        } else if let Some(at) = report.next_deadline {
            self.request_pass(Some(at));
        }
        report
    }

    /// Services passes until nothing is runnable at the current clock time.
    ///
    /// Delayed actions that are not due yet stay queued. Returns the number of
    /// actions and deliveries that ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        for _ in 0..RUN_UNTIL_IDLE_PASS_LIMIT {
            let report = self.service();
            ran += report.ran_actions;
            if !report.pending || self.state().is_busy() {
                return ran;
            }
        }
        log::warn!("run_until_idle: gave up after {RUN_UNTIL_IDLE_PASS_LIMIT} passes");
        ran
    }

    fn deliveries<E: 'static>(
        event: E,
        listeners: impl IntoIterator<Item = SharedListener<E>>,
    ) -> Vec<Delivery> {
        let event = Rc::new(event);
        listeners
            .into_iter()
            .map(|listener| {
                let event = event.clone();
                Box::new(move || listener.handle_event(&event)) as Delivery
            })
            .collect()
    }

    fn transition(&self, next: LoopState) {
        let mut inner = self.inner.borrow_mut();
        let current = inner.state;
        let valid = current.can_transition_to(next);
        if !valid {
            log::error!("invalid scheduler transition {current:?} -> {next:?}");
        }
        debug_assert!(valid, "invalid scheduler transition {current:?} -> {next:?}");
        inner.state = next;
    }

    fn request_pass(&self, at: Option<u64>) {
        let host = {
            let mut inner = self.inner.borrow_mut();
            if at.is_none() {
                // One outstanding asap request is enough; a pass clears it.
                if inner.pass_requested || inner.state.is_busy() {
                    return;
                }
                inner.pass_requested = true;
            }
            inner.host.clone()
        };
        if let Some(host) = host {
            host.request_pass(at);
        }
    }
}

/// Runs `f`, catching a panic and logging it at `error`.
///
/// Returns `false` if `f` panicked. `what` names the callback in the log line.
/// This is the isolation every delivery and action gets; hosts dispatching
/// callbacks themselves can use it to get the same behavior.
///
/// ```
/// use understory_timing::run_isolated;
///
/// assert!(run_isolated("ok", || {}));
/// assert!(!run_isolated("broken", || panic!("boom")));
/// ```
pub fn run_isolated(what: &str, f: impl FnOnce()) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => true,
        Err(payload) => {
            log::error!("{what} panicked: {}", panic_message(payload.as_ref()));
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}
