//! Integration tests for the public `Thunk` API.
//!
//! This suite exercises the crate from the outside, the way a dependent
//! would use it:
//!
//! ## Lifecycle Tests
//! - `stored_state_survives_moves`: Captured state keeps counting after the
//!   thunk is moved with `take`
//! - `calling_a_taken_thunk_panics`: The source of a `take` is empty
//! - `double_take_leaves_the_second_destination_empty`: Taking twice never
//!   duplicates or double-destroys the callable
//! - `reassignment_drops_the_previous_callable`: Overwriting a slot drops the
//!   old callable exactly once
//! - `clear_drops_the_callable_immediately`: `clear` destroys a spilled
//!   callable without waiting for the thunk to go away
//!
//! ## Receiver Tests
//! - `by_ref_thunks_can_be_called_through_a_shared_reference`
//! - `by_once_thunks_surrender_their_capture`
//! - `method_pointers_dispatch_like_closures`
//! - `reference_arguments_flow_through_untouched`
//!
//! ## Emptiness Tests
//! - `calling_an_empty_thunk_panics`
//! - `optional_callables_convert_to_thunks`
//!
//! ## Panic Tests
//! - `panics_propagate_through_may_unwind_thunks`: A panic unwinds out of
//!   `call` and the callable stays stored and usable
//! - `a_panicking_once_callable_is_still_consumed`: The capture of a
//!   panicking once-callable is dropped exactly once
//! - `no_unwind_thunks_run_normally_on_success`
//!
//! ## Thread and Marker Tests
//! - `sendable_thunks_cross_threads`
//! - `sendable_thunks_weaken_into_local`
//! - `marker_weakening_composes_through_from`
//!
//! ## Formatting Tests
//! - `debug_output_names_the_stored_callable`

use std::{
    cell::Cell,
    panic::{self, AssertUnwindSafe},
    rc::Rc,
    thread,
};

use thunkbox::{
    Thunk,
    markers::{ByMut, ByOnce, ByRef, Local, MayUnwind, NoUnwind, Sendable},
};

// Test helpers
struct DropTracker(Rc<Cell<u32>>);

impl DropTracker {
    fn new() -> (Self, Rc<Cell<u32>>) {
        let drops = Rc::new(Cell::new(0));
        (Self(drops.clone()), drops)
    }
}

impl Drop for DropTracker {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

struct Widget {
    factor: i32,
}

impl Widget {
    fn apply(&self, value: i32) -> i32 {
        self.factor * value
    }

    fn offset(self, value: i32) -> i32 {
        self.factor + value
    }
}

// Lifecycle tests
#[test]
fn stored_state_survives_moves() {
    let mut count = 0u64;
    let mut original: Thunk<(), u64> = Thunk::new(move || {
        count += 1;
        count
    });

    assert_eq!(original.call(), 1);
    assert_eq!(original.call(), 2);
    assert_eq!(original.call(), 3);

    let mut moved = original.take();
    assert!(original.is_empty());
    assert_eq!(moved.call(), 4);
}

#[test]
#[should_panic(expected = "attempted to invoke an empty `Thunk`")]
fn calling_a_taken_thunk_panics() {
    let mut original: Thunk<(), u32> = Thunk::new(|| 7);
    let _moved = original.take();
    original.call();
}

#[test]
fn double_take_leaves_the_second_destination_empty() {
    let (tracker, drops) = DropTracker::new();
    let mut source: Thunk<(), u32> = Thunk::new(move || {
        let _ = &tracker;
        1
    });

    let mut first = source.take();
    let second = source.take();
    assert!(second.is_empty());
    assert_eq!(first.call(), 1);

    drop(first);
    drop(second);
    assert_eq!(drops.get(), 1);
}

#[test]
fn reassignment_drops_the_previous_callable() {
    let (tracker, drops) = DropTracker::new();
    let mut slot: Thunk<(), u32> = Thunk::new(move || {
        let _ = &tracker;
        1
    });

    slot = Thunk::new(|| 2);
    assert_eq!(drops.get(), 1);
    assert_eq!(slot.call(), 2);
}

#[test]
fn clear_drops_the_callable_immediately() {
    let (tracker, drops) = DropTracker::new();
    let padding = [0u64; 4];
    let mut slot: Thunk<(), usize> = Thunk::new(move || {
        let _ = &tracker;
        padding.len()
    });

    slot.clear();
    assert_eq!(drops.get(), 1);
    assert!(slot.is_empty());
}

// Receiver tests
#[test]
fn by_ref_thunks_can_be_called_through_a_shared_reference() {
    fn poll(thunk: &Thunk<(u32,), u32, ByRef>) -> u32 {
        thunk.call(5)
    }

    let double: Thunk<(u32,), u32, ByRef> = Thunk::new(|v: u32| v * 2);
    assert_eq!(poll(&double), 10);
    assert_eq!(poll(&double), 10);
    assert_eq!(double.call(8), 16);
}

#[test]
fn by_once_thunks_surrender_their_capture() {
    let (tracker, drops) = DropTracker::new();
    let payload = String::from("handover");
    let deliver: Thunk<(), String, ByOnce> = Thunk::new(move || {
        let _ = &tracker;
        payload
    });

    assert_eq!(deliver.call(), "handover");
    assert_eq!(drops.get(), 1);
}

#[test]
fn method_pointers_dispatch_like_closures() {
    let widget = Widget { factor: 3 };
    let scale: Thunk<(&Widget, i32), i32, ByRef> = Thunk::new(Widget::apply);

    assert_eq!(scale.call(&widget, 7), 21);
    assert_eq!(scale.call(&widget, 10), widget.apply(10));

    // A by-value receiver is just the first argument.
    let shift: Thunk<(Widget, i32), i32, ByRef> = Thunk::new(Widget::offset);
    assert_eq!(shift.call(Widget { factor: 3 }, 4), 7);
}

#[test]
fn reference_arguments_flow_through_untouched() {
    let mut render: Thunk<(&str, usize), String> =
        Thunk::new(|name: &str, width: usize| format!("{name:>width$}"));
    assert_eq!(render.call("x", 3), "  x");
}

// Emptiness tests
#[test]
#[should_panic(expected = "attempted to invoke an empty `Thunk`")]
fn calling_an_empty_thunk_panics() {
    let mut empty: Thunk<(i32,), i32> = Thunk::empty();
    empty.call(1);
}

#[test]
fn optional_callables_convert_to_thunks() {
    let mut configured: Thunk<(u32,), u32> = Some(|v: u32| v * 2).into();
    let missing: Thunk<(u32,), u32> = None::<fn(u32) -> u32>.into();

    assert_eq!(configured.call(21), 42);
    assert!(!configured.is_empty());
    assert!(missing.is_empty());
}

// Panic tests
#[test]
fn panics_propagate_through_may_unwind_thunks() {
    let mut calls = 0u32;
    let mut fragile: Thunk<(bool,), u32> = Thunk::new(move |explode: bool| {
        calls += 1;
        assert!(!explode, "boom");
        calls
    });

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| fragile.call(true)));
    assert!(outcome.is_err());

    // The unwind leaves the callable stored and usable.
    assert!(!fragile.is_empty());
    assert_eq!(fragile.call(false), 2);
}

#[test]
fn a_panicking_once_callable_is_still_consumed() {
    let (tracker, drops) = DropTracker::new();
    let doomed: Thunk<(), (), ByOnce> = Thunk::new(move || {
        let _ = &tracker;
        panic!("gave up");
    });

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| doomed.call()));
    assert!(outcome.is_err());
    assert_eq!(drops.get(), 1);
}

#[test]
fn no_unwind_thunks_run_normally_on_success() {
    let mut guarded: Thunk<(u32,), u32, ByMut, Local, NoUnwind> = Thunk::new(|v: u32| v + 1);
    assert_eq!(guarded.call(41), 42);
}

// Thread and marker tests
#[test]
fn sendable_thunks_cross_threads() {
    let task: Thunk<(u64,), u64, ByOnce, Sendable> = Thunk::new(|seed: u64| seed.wrapping_mul(31));
    let handle = thread::spawn(move || task.call(129));
    assert_eq!(handle.join().unwrap(), 3999);
}

#[test]
fn sendable_thunks_weaken_into_local() {
    let sendable: Thunk<(), u32, ByMut, Sendable> = Thunk::new(|| 11);
    let mut local = sendable.into_local();
    assert_eq!(local.call(), 11);
}

#[test]
fn marker_weakening_composes_through_from() {
    let strict: Thunk<(), u32, ByMut, Sendable, NoUnwind> = Thunk::new(|| 17);
    let mut relaxed: Thunk<(), u32, ByMut, Local, MayUnwind> = strict.into();
    assert_eq!(relaxed.call(), 17);
}

// Formatting tests
#[test]
fn debug_output_names_the_stored_callable() {
    let full: Thunk<(), u32> = Thunk::new(|| 1);
    let empty: Thunk<(), u32> = Thunk::empty();

    let full_debug = format!("{full:?}");
    let empty_debug = format!("{empty:?}");

    assert!(full_debug.starts_with("Thunk"));
    assert!(full_debug.contains("closure"));
    assert_eq!(empty_debug, "Thunk { stored: \"<empty>\" }");
}
