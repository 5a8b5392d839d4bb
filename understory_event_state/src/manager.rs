// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-target recognizer fan-out.
//!
//! A [`RecognizerManager`] is the single listener an
//! [`InputSurface`](crate::InputSurface) binds for all recognizers of one
//! target. It forwards every event it receives to **every** recognizer that
//! asked for its type, in registration order: Drag, Pinch and Rotation on the
//! same target all observe the full stream.
//!
//! The manager counts, per event type, how many recognizers need it. Adding a
//! recognizer reports the types whose count went from zero to one (the surface
//! binds those), removing one reports the types whose count dropped back to zero
//! (the surface unbinds those).

use std::cell::RefCell;
use std::fmt;

use hashbrown::HashMap;
use smallvec::SmallVec;
use understory_timing::{Listener, run_isolated};

use crate::event::{InputEvent, PointerEventType};
use crate::recognizer::{SharedRecognizer, same_recognizer};

/// Recognizers stored inline before spilling to the heap.
///
/// A manipulable object typically carries Tap, Drag, Pinch and Rotation.
const INLINE_RECOGNIZERS: usize = 4;

/// Event types touched by one add or remove.
pub type TypeChanges = SmallVec<[PointerEventType; 7]>;

/// Ordered recognizers of one target.
pub struct RecognizerManager<T> {
    target: T,
    recognizers: RefCell<SmallVec<[SharedRecognizer<T>; INLINE_RECOGNIZERS]>>,
    type_counts: RefCell<HashMap<PointerEventType, usize>>,
}

impl<T: fmt::Debug> fmt::Debug for RecognizerManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecognizerManager")
            .field("target", &self.target)
            .field("recognizers", &self.recognizers.borrow().len())
            .field("type_counts", &self.type_counts.borrow())
            .finish()
    }
}

impl<T> RecognizerManager<T> {
    /// Creates an empty manager for `target`.
    pub fn new(target: T) -> Self {
        Self {
            target,
            recognizers: RefCell::new(SmallVec::new()),
            type_counts: RefCell::new(HashMap::new()),
        }
    }

    /// The target this manager serves.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Number of attached recognizers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recognizers.borrow().len()
    }

    /// Returns `true` if no recognizer is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recognizers.borrow().is_empty()
    }

    /// Returns `true` if `recognizer` is attached.
    #[must_use]
    pub fn contains(&self, recognizer: &SharedRecognizer<T>) -> bool {
        self.recognizers
            .borrow()
            .iter()
            .any(|r| same_recognizer(r, recognizer))
    }

    /// Number of attached recognizers that need `ty`.
    #[must_use]
    pub fn type_count(&self, ty: PointerEventType) -> usize {
        self.type_counts.borrow().get(&ty).copied().unwrap_or(0)
    }

    /// Appends `recognizer` and returns the event types it newly requires.
    ///
    /// Returns `None` if it is already attached.
    pub fn add(&self, recognizer: SharedRecognizer<T>) -> Option<TypeChanges> {
        if self.contains(&recognizer) {
            return None;
        }
        let mut newly_needed = TypeChanges::new();
        let mut counts = self.type_counts.borrow_mut();
        for &ty in recognizer.event_types() {
            let count = counts.entry(ty).or_insert(0);
            *count += 1;
            if *count == 1 {
                newly_needed.push(ty);
            }
        }
        self.recognizers.borrow_mut().push(recognizer);
        Some(newly_needed)
    }

    /// Detaches `recognizer` and returns the event types no longer required.
    ///
    /// Returns `None` if it was not attached. The recognizer is reset.
    pub fn remove(&self, recognizer: &SharedRecognizer<T>) -> Option<TypeChanges> {
        let removed = {
            let mut recognizers = self.recognizers.borrow_mut();
            let index = recognizers
                .iter()
                .position(|r| same_recognizer(r, recognizer))?;
            recognizers.remove(index)
        };
        let mut released = TypeChanges::new();
        {
            let mut counts = self.type_counts.borrow_mut();
            for &ty in removed.event_types() {
                if let Some(count) = counts.get_mut(&ty) {
                    *count -= 1;
                    if *count == 0 {
                        counts.remove(&ty);
                        released.push(ty);
                    }
                }
            }
        }
        removed.reset();
        Some(released)
    }

    /// Resets every recognizer.
    pub fn reset(&self) {
        let recognizers = self.recognizers.borrow().clone();
        for recognizer in &recognizers {
            recognizer.reset();
        }
    }
}

impl<T> Listener<InputEvent<T>> for RecognizerManager<T> {
    fn handle_event(&self, event: &InputEvent<T>) {
        let ty = event.event_type();
        // Recognizer callbacks may reach back into this manager.
        let recognizers = self.recognizers.borrow().clone();
        for recognizer in recognizers
            .iter()
            .filter(|r| r.event_types().contains(&ty))
        {
            run_isolated("recognizer", || recognizer.handle_event(event));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use understory_gesture::GestureEvent;

    use crate::recognizer::PointerRecognizer;

    struct Probe {
        name: &'static str,
        types: &'static [PointerEventType],
        log: Rc<RefCell<Vec<String>>>,
    }

    impl PointerRecognizer<u32> for Probe {
        fn event_types(&self) -> &'static [PointerEventType] {
            self.types
        }
        fn handle_event(&self, event: &InputEvent<u32>) {
            if self.name == "boom" {
                panic!("recognizer failure");
            }
            self.log
                .borrow_mut()
                .push(format!("{}:{:?}", self.name, event.event_type()));
        }
        fn reset(&self) {
            self.log.borrow_mut().push(format!("{}:reset", self.name));
        }
    }

    fn probe(
        name: &'static str,
        types: &'static [PointerEventType],
        log: &Rc<RefCell<Vec<String>>>,
    ) -> SharedRecognizer<u32> {
        Rc::new(Probe {
            name,
            types,
            log: log.clone(),
        })
    }

    fn gesture_end() -> InputEvent<u32> {
        InputEvent::Gesture(GestureEvent::end(0, 0, 1))
    }

    #[test]
    fn counts_report_first_and_last_users() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let manager = RecognizerManager::new(0_u32);
        let drag = probe("drag", &PointerEventType::POINTER, &log);
        let tap = probe("tap", &PointerEventType::POINTER, &log);
        let pinch = probe("pinch", &PointerEventType::GESTURE, &log);

        assert_eq!(manager.add(drag.clone()).unwrap().len(), 4);
        assert!(manager.add(tap.clone()).unwrap().is_empty());
        assert_eq!(
            manager.add(pinch.clone()).unwrap().as_slice(),
            PointerEventType::GESTURE
        );
        assert!(manager.add(tap.clone()).is_none());
        assert_eq!(manager.type_count(PointerEventType::PointerMove), 2);

        assert!(manager.remove(&tap).unwrap().is_empty());
        assert_eq!(manager.remove(&drag).unwrap().len(), 4);
        assert!(manager.remove(&drag).is_none());
        assert_eq!(manager.len(), 1);
        assert_eq!(*log.borrow(), ["tap:reset", "drag:reset"]);
    }

    #[test]
    fn every_interested_recognizer_sees_the_event_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let manager = RecognizerManager::new(0_u32);
        manager.add(probe("pinch", &PointerEventType::GESTURE, &log));
        manager.add(probe("boom", &PointerEventType::GESTURE, &log));
        manager.add(probe("drag", &PointerEventType::POINTER, &log));
        manager.add(probe("rotation", &PointerEventType::GESTURE, &log));

        manager.handle_event(&gesture_end());

        assert_eq!(
            *log.borrow(),
            ["pinch:GestureEnd", "rotation:GestureEnd"]
        );
    }
}
