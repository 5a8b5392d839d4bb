// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Listener callbacks.

use std::rc::Rc;

/// Receives events delivered by the scheduler or an input surface.
///
/// Implement it on a type to keep state between calls (the object form), or
/// pass any `Fn(&E)` closure (the function form). Both are interchangeable.
///
/// Listeners run on the thread servicing the loop. They take `&self`; keep
/// mutable state behind a `Cell` or `RefCell`.
pub trait Listener<E: ?Sized> {
    /// Handles one event.
    fn handle_event(&self, event: &E);
}

impl<E: ?Sized, F: Fn(&E)> Listener<E> for F {
    fn handle_event(&self, event: &E) {
        self(event);
    }
}

/// A shared, type-erased listener.
pub type SharedListener<E> = Rc<dyn Listener<E>>;

/// Returns `true` if both handles point at the same listener.
///
/// Identity is the allocation, so two clones of one `Rc` are the same
/// listener while two separately boxed copies of a closure are not.
pub fn same_listener<E: ?Sized>(a: &SharedListener<E>, b: &SharedListener<E>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counter(Cell<u32>);

    impl Listener<u32> for Counter {
        fn handle_event(&self, event: &u32) {
            self.0.set(self.0.get() + event);
        }
    }

    #[test]
    fn closures_and_objects_are_listeners() {
        let seen = Rc::new(Cell::new(0));
        let s = seen.clone();
        let closure: SharedListener<u32> = Rc::new(move |e: &u32| s.set(*e));
        closure.handle_event(&7);
        assert_eq!(seen.get(), 7);

        let counter = Rc::new(Counter(Cell::new(0)));
        let object: SharedListener<u32> = counter.clone();
        object.handle_event(&2);
        object.handle_event(&3);
        assert_eq!(counter.0.get(), 5);
    }

    #[test]
    fn identity_is_the_allocation() {
        let a: SharedListener<u32> = Rc::new(|_: &u32| {});
        let b: SharedListener<u32> = Rc::new(|_: &u32| {});
        assert!(same_listener(&a, &a.clone()));
        assert!(!same_listener(&a, &b));
    }
}
