// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input surface: from native events to bound listeners and recognizers.
//!
//! An [`InputSurface`] is the entry point a host feeds. It owns one pointer
//! [`Normalizer`], the [`GestureSynthesizer`] when the platform needs one, the
//! per-(target, type) listener bindings and the recognizer managers.
//!
//! ## Binding rules
//!
//! - Listeners of one (target, type) are called in registration order.
//! - Binding an already bound (target, type, listener) is a logged no-op that
//!   returns [`BindingError::Duplicate`]. Removing an unknown binding is a
//!   logged no-op that returns [`BindingError::NotRegistered`].
//! - The [`NativeHook`] is told to attach when the first listener of a
//!   (target, type) arrives and to detach when the last one leaves, so the host
//!   keeps exactly one native subscription per pair.
//! - Recognizers share one manager per target, bound once per event type.
//!
//! ## Delivery
//!
//! Delivery is synchronous. Each listener call is isolated: a listener that
//! panics is logged and the next one still runs. Timed behavior (tap windows,
//! feedback delays) goes through the [`Scheduler`](understory_timing::Scheduler)
//! the recognizers were built with.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use kurbo::Point;
//! use understory_event_state::{InputEvent, InputSurface, PointerEventType};
//! use understory_pointer::{InputCapabilities, PointerPhase, RawEvent};
//! use understory_timing::SharedListener;
//!
//! let mut surface = InputSurface::new(InputCapabilities::empty());
//! let downs = Rc::new(Cell::new(0));
//! let d = downs.clone();
//! let listener: SharedListener<InputEvent<&str>> = Rc::new(move |_: &InputEvent<&str>| {
//!     d.set(d.get() + 1)
//! });
//! surface
//!     .add_pointer_listener("button", PointerEventType::PointerStart, listener.clone())
//!     .unwrap();
//!
//! surface.handle_native(RawEvent::mouse(PointerPhase::Start, Point::new(1.0, 1.0), "button", 0));
//! surface.handle_native(RawEvent::mouse(PointerPhase::End, Point::new(1.0, 1.0), "button", 5));
//! assert_eq!(downs.get(), 1);
//!
//! // A second identical binding is rejected.
//! assert!(surface
//!     .add_pointer_listener("button", PointerEventType::PointerStart, listener)
//!     .is_err());
//! ```

use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use hashbrown::HashMap;
use smallvec::SmallVec;
use understory_gesture::{GestureEvent, GestureSynthesizer, NativeGesture};
use understory_pointer::{InputCapabilities, Normalizer, RawEvent};
use understory_timing::{SharedListener, run_isolated, same_listener};

use crate::event::{InputEvent, PointerEventType};
use crate::manager::RecognizerManager;
use crate::recognizer::SharedRecognizer;

/// A rejected binding change. Neither is fatal; the surface is left unchanged.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    /// The listener or recognizer is already registered there.
    #[error("already registered")]
    Duplicate,
    /// No such listener or recognizer is registered there.
    #[error("not registered")]
    NotRegistered,
}

/// Host side of native subscriptions.
pub trait NativeHook<T> {
    /// Subscribe to the native events producing `ty` on `target`.
    fn attach(&self, target: &T, ty: PointerEventType);

    /// Drop the native subscription for `ty` on `target`.
    fn detach(&self, target: &T, ty: PointerEventType);
}

type Listeners<T> = SmallVec<[SharedListener<InputEvent<T>>; 2]>;

/// Normalizes native input and dispatches it to bound listeners.
pub struct InputSurface<T> {
    normalizer: Normalizer<T>,
    synthesizer: Option<GestureSynthesizer<T>>,
    bindings: HashMap<(T, PointerEventType), Listeners<T>>,
    managers: HashMap<T, Rc<RecognizerManager<T>>>,
    hook: Option<Box<dyn NativeHook<T>>>,
}

impl<T: fmt::Debug> fmt::Debug for InputSurface<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputSurface")
            .field("capabilities", &self.normalizer.capabilities())
            .field("synthesizer", &self.synthesizer)
            .field("bindings", &self.bindings.len())
            .field("managers", &self.managers.len())
            .field("hook", &self.hook.is_some())
            .finish_non_exhaustive()
    }
}

impl<T> InputSurface<T>
where
    T: Clone + Eq + Hash + fmt::Debug + 'static,
{
    /// Creates a surface for a platform with the given capabilities.
    pub fn new(capabilities: InputCapabilities) -> Self {
        let synthesizer = capabilities
            .synthesizes_gestures()
            .then(GestureSynthesizer::new);
        Self {
            normalizer: Normalizer::new(capabilities),
            synthesizer,
            bindings: HashMap::new(),
            managers: HashMap::new(),
            hook: None,
        }
    }

    /// Installs the hook told about native subscriptions.
    pub fn set_native_hook(&mut self, hook: impl NativeHook<T> + 'static) {
        self.hook = Some(Box::new(hook));
    }

    /// The platform capabilities.
    #[must_use]
    pub fn capabilities(&self) -> InputCapabilities {
        self.normalizer.capabilities()
    }

    /// Number of listeners bound for `ty` on `target`, managers included.
    #[must_use]
    pub fn listener_count(&self, target: &T, ty: PointerEventType) -> usize {
        self.bindings
            .get(&(target.clone(), ty))
            .map_or(0, SmallVec::len)
    }

    /// Number of recognizers attached to `target`.
    #[must_use]
    pub fn recognizer_count(&self, target: &T) -> usize {
        self.managers.get(target).map_or(0, |m| m.len())
    }

    /// Binds `listener` to `ty` events on `target`.
    pub fn add_pointer_listener(
        &mut self,
        target: T,
        ty: PointerEventType,
        listener: SharedListener<InputEvent<T>>,
    ) -> Result<(), BindingError> {
        let key = (target, ty);
        let listeners = self.bindings.entry(key.clone()).or_default();
        if listeners.iter().any(|l| same_listener(l, &listener)) {
            log::warn!("duplicate {ty:?} listener on {:?} ignored", key.0);
            return Err(BindingError::Duplicate);
        }
        listeners.push(listener);
        if listeners.len() == 1 {
            if let Some(hook) = &self.hook {
                hook.attach(&key.0, ty);
            }
        }
        Ok(())
    }

    /// Unbinds `listener` from `ty` events on `target`.
    ///
    /// Only future deliveries are affected.
    pub fn remove_pointer_listener(
        &mut self,
        target: &T,
        ty: PointerEventType,
        listener: &SharedListener<InputEvent<T>>,
    ) -> Result<(), BindingError> {
        let key = (target.clone(), ty);
        let Some(listeners) = self.bindings.get_mut(&key) else {
            log::warn!("no {ty:?} listener on {target:?} to remove");
            return Err(BindingError::NotRegistered);
        };
        let Some(index) = listeners.iter().position(|l| same_listener(l, listener)) else {
            log::warn!("no such {ty:?} listener on {target:?} to remove");
            return Err(BindingError::NotRegistered);
        };
        listeners.remove(index);
        if listeners.is_empty() {
            self.bindings.remove(&key);
            if let Some(hook) = &self.hook {
                hook.detach(target, ty);
            }
        }
        Ok(())
    }

    /// Attaches `recognizer` to `target`, after the ones already there.
    pub fn add_pointer_recognizer(
        &mut self,
        target: T,
        recognizer: SharedRecognizer<T>,
    ) -> Result<(), BindingError> {
        let manager = self
            .managers
            .entry(target.clone())
            .or_insert_with(|| Rc::new(RecognizerManager::new(target.clone())))
            .clone();
        let Some(newly_needed) = manager.add(recognizer) else {
            log::warn!("duplicate recognizer on {target:?} ignored");
            return Err(BindingError::Duplicate);
        };
        for ty in newly_needed {
            let listener: SharedListener<InputEvent<T>> = manager.clone();
            // Cannot be a duplicate: the manager binds a type only on its first user.
            let _ = self.add_pointer_listener(target.clone(), ty, listener);
        }
        Ok(())
    }

    /// Detaches `recognizer` from `target` and resets it.
    pub fn remove_pointer_recognizer(
        &mut self,
        target: &T,
        recognizer: &SharedRecognizer<T>,
    ) -> Result<(), BindingError> {
        let released = self
            .managers
            .get(target)
            .and_then(|manager| manager.remove(recognizer).map(|r| (manager.clone(), r)));
        let Some((manager, released)) = released else {
            log::warn!("no such recognizer on {target:?} to remove");
            return Err(BindingError::NotRegistered);
        };
        let listener: SharedListener<InputEvent<T>> = manager.clone();
        for ty in released {
            let _ = self.remove_pointer_listener(target, ty, &listener);
        }
        if manager.is_empty() {
            self.managers.remove(target);
        }
        Ok(())
    }

    /// Feeds one native pointer event.
    ///
    /// Returns `false` if the event was dropped by normalization (an input
    /// model this platform does not handle, or an untracked pen contact).
    pub fn handle_native(&mut self, raw: RawEvent<T>) -> bool {
        let Some(event) = self.normalizer.normalize(raw) else {
            return false;
        };
        let gesture = self
            .synthesizer
            .as_mut()
            .and_then(|synthesizer| synthesizer.process(&event));
        self.dispatch(&InputEvent::Pointer(event));
        if let Some(gesture) = gesture {
            self.dispatch(&InputEvent::Gesture(gesture));
        }
        true
    }

    /// Feeds one native gesture callback.
    ///
    /// Returns `false`, dropping it, unless the platform reports
    /// [`InputCapabilities::GESTURE_EVENTS`].
    pub fn handle_native_gesture(&mut self, native: NativeGesture<T>) -> bool {
        if !self
            .capabilities()
            .contains(InputCapabilities::GESTURE_EVENTS)
        {
            log::debug!("native gesture on a platform without gesture events dropped");
            return false;
        }
        self.dispatch(&InputEvent::Gesture(GestureEvent::from_native(native)));
        true
    }

    /// Forgets every tracked contact and resets all recognizers.
    ///
    /// For when the host loses input, such as a window blur.
    pub fn reset(&mut self) {
        self.normalizer.reset();
        if let Some(synthesizer) = &mut self.synthesizer {
            synthesizer.reset();
        }
        for manager in self.managers.values() {
            manager.reset();
        }
    }

    fn dispatch(&self, event: &InputEvent<T>) {
        let ty = event.event_type();
        let key = (event.target().clone(), ty);
        let Some(listeners) = self.bindings.get(&key) else {
            log::trace!("no {ty:?} listener on {:?}", key.0);
            return;
        };
        for listener in listeners {
            run_isolated("pointer listener", || listener.handle_event(event));
        }
    }
}
