//! Integration tests exercising the raw thunk through its public API.

use std::{
    any::TypeId,
    cell::Cell,
    mem,
    panic::{self, AssertUnwindSafe},
    rc::Rc,
};

use thunkbox_internals::{
    RawThunk,
    callable::{CallMut, CallOnce, CallRef},
};

/// Counts how many times it has been dropped.
struct DropTracker(Rc<Cell<u32>>);

impl DropTracker {
    fn new() -> (Self, Rc<Cell<u32>>) {
        let drops = Rc::new(Cell::new(0));
        (DropTracker(Rc::clone(&drops)), drops)
    }
}

impl Drop for DropTracker {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn counter_survives_moves() {
    let mut count = 0u32;
    let mut raw = RawThunk::new_mut::<_, ()>(move || {
        count += 1;
        count
    });

    // SAFETY: The thunk is non-empty, was created with `new_mut` for `()`
    // arguments, and the callable returns `u32`.
    let first = unsafe { raw.call_mut::<(), u32>(()) };
    // SAFETY: Same as above.
    let second = unsafe { raw.call_mut::<(), u32>(()) };
    assert_eq!((first, second), (1, 2));

    let mut moved = mem::replace(&mut raw, RawThunk::empty());
    assert!(raw.is_empty());

    // SAFETY: Same as above; moving the container does not disturb the
    // stored callable.
    let third = unsafe { moved.call_mut::<(), u32>(()) };
    assert_eq!(third, 3);
}

#[test]
fn once_callable_consumed_exactly_once() {
    let (tracker, drops) = DropTracker::new();
    let raw = RawThunk::new_once::<_, (String,)>(move |suffix: String| {
        let _ = &tracker;
        format!("ran-{suffix}")
    });

    // SAFETY: The thunk is non-empty, was created with `new_once` for
    // `(String,)` arguments, and the callable returns `String`.
    let value = unsafe { raw.call_once::<(String,), String>((String::from("ok"),)) };
    assert_eq!(value, "ran-ok");
    assert_eq!(drops.get(), 1);
}

#[test]
fn unwinding_once_callable_destroyed_exactly_once() {
    let (tracker, drops) = DropTracker::new();
    let raw = RawThunk::new_once::<_, (bool,)>(move |fail: bool| {
        drop(tracker);
        assert!(!fail, "requested failure");
    });

    // SAFETY: The thunk is non-empty, was created with `new_once` for
    // `(bool,)` arguments, and the callable returns `()`.
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| unsafe {
        raw.call_once::<(bool,), ()>((true,))
    }));
    assert!(outcome.is_err());
    assert_eq!(drops.get(), 1);
}

#[test]
fn reassignment_destroys_previous_callable() {
    let (tracker, drops) = DropTracker::new();
    let mut raw = RawThunk::new_mut::<_, ()>(move || {
        let _ = &tracker;
    });

    raw = RawThunk::new_mut::<_, ()>(|| ());
    assert_eq!(drops.get(), 1);
    assert!(!raw.is_empty());
}

#[test]
fn spilled_callable_reports_its_type() {
    let payload = [7u64; 4];
    let raw = RawThunk::new_ref::<_, ()>(move || payload[0]);

    assert!(!raw.is_empty());
    assert!(raw.stored_type_id().is_some());
    assert!(
        raw.stored_type_name()
            .is_some_and(|name| name.contains("closure"))
    );

    // SAFETY: The thunk is non-empty, was created with `new_ref` for `()`
    // arguments, and the callable returns `u64`.
    let value = unsafe { raw.call_ref::<(), u64>(()) };
    assert_eq!(value, 7);
}

#[test]
fn distinct_callables_have_distinct_type_ids() {
    let left = RawThunk::new_ref::<fn() -> i32, ()>(|| 1);
    let right = RawThunk::new_ref::<fn() -> u32, ()>(|| 1);
    assert_ne!(left.stored_type_id(), right.stored_type_id());
    assert_eq!(left.stored_type_id(), Some(TypeId::of::<fn() -> i32>()));
}

#[test]
fn empty_thunk_reports_nothing() {
    let raw = RawThunk::empty();
    assert!(raw.is_empty());
    assert_eq!(raw.stored_type_id(), None);
    assert_eq!(raw.stored_type_name(), None);
}

#[test]
fn invocation_traits_unpack_tuples() {
    // `call_once` and `call_mut` are also the names of the unstable `FnOnce`
    // and `FnMut` methods, so this test uses fully qualified calls to avoid
    // the name collision.
    let callable = |lhs: i64, rhs: i64| lhs * rhs;
    assert_eq!(callable.call_ref((6, 7)), 42);

    let mut tally = 0i64;
    let mut accumulate = move |step: i64| {
        tally += step;
        tally
    };
    assert_eq!(CallMut::call_mut(&mut accumulate, (5,)), 5);
    assert_eq!(CallMut::call_mut(&mut accumulate, (5,)), 10);

    let owned = String::from("consumed");
    let consume = move || owned;
    assert_eq!(CallOnce::call_once(consume, ()), "consumed");
}
