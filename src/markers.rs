//! Marker types and traits defining receiver, thread-safety and unwind
//! semantics.
//!
//! This module provides type-level markers that control how a
//! [`Thunk`](crate::Thunk) behaves: how the stored callable may be invoked,
//! whether the thunk may cross threads, and what happens when a call panics.
//! These markers appear as the trailing generic parameters in [`Thunk<A, R,
//! M, T, P>`](crate::Thunk) and encode compile-time guarantees about the
//! stored callable.
//!
//! # Design Philosophy
//!
//! The constraints encoded by these markers are enforced at construction
//! time. It is impossible to construct a thunk that violates the invariants
//! associated with its marker types. This means you can trust that a
//! `Thunk<_, _, _, Sendable>` truly holds a `Send` callable, and that a
//! `Thunk<_, _, ByRef>` truly holds a callable that supports shared-access
//! invocation.
//!
//! # Receiver Markers
//!
//! Receiver markers control which callables a thunk accepts and how
//! `call` borrows the thunk:
//!
//! - [`ByRef`]: Accepts [`Fn`] callables; `call` takes `&self`
//! - [`ByMut`] (the default): Accepts [`FnMut`] callables; `call` takes
//!   `&mut self`
//! - [`ByOnce`]: Accepts any [`FnOnce`] callable; `call` takes `self`
//!
//! All three markers implement the sealed [`ReceiverMarker`] trait, which
//! [`Thunk::new`](crate::Thunk::new) dispatches through to build the
//! dispatch table matching the receiver.
//!
//! There are deliberately no conversions between receiver markers. The
//! receiver discipline is baked into the stored dispatch table when the
//! callable is stored, so a thunk cannot be reinterpreted under a different
//! discipline after the fact.
//!
//! # Thread Safety Markers
//!
//! Thread safety markers control whether a thunk can be sent to another
//! thread:
//!
//! - [`Local`] (the default): The callable may capture non-thread-safe data
//!   (like `Rc` or raw pointers) and the thunk cannot leave its thread.
//! - [`Sendable`]: The callable must be `Send`, and in exchange the thunk
//!   itself is `Send`.
//!
//! Thunks are never `Sync`, regardless of marker: the API hands out no way
//! to prove the stored callable tolerates simultaneous access from several
//! threads.
//!
//! # Unwind Markers
//!
//! Unwind markers control what happens when the stored callable panics:
//!
//! - [`MayUnwind`] (the default): The panic unwinds out of `call` as usual.
//! - [`NoUnwind`]: A panic escaping the callable aborts the process.
//!
//! # Examples
//!
//! ```
//! use thunkbox::{
//!     Thunk,
//!     markers::{ByOnce, Sendable},
//! };
//!
//! // The defaults: repeatable via `&mut self`, thread-local, panics
//! // propagate.
//! let mut counter = 0u32;
//! let mut tick: Thunk<(), u32> = Thunk::new(move || {
//!     counter += 1;
//!     counter
//! });
//! assert_eq!(tick.call(), 1);
//! assert_eq!(tick.call(), 2);
//!
//! // A one-shot task that may cross threads.
//! let task: Thunk<(), u32, ByOnce, Sendable> = Thunk::new(|| 6 * 7);
//! let handle = std::thread::spawn(move || task.call());
//! assert_eq!(handle.join().unwrap(), 42);
//! ```

use thunkbox_internals::{
    RawThunk,
    callable::{CallMut, CallOnce, CallRef},
};

/// Marker type for thunks invoked through a shared reference.
///
/// Construction requires the callable to implement [`Fn`], and `call` takes
/// `&self`, so a by-ref thunk can be invoked any number of times without
/// exclusive access.
///
/// # Examples
///
/// ```
/// use thunkbox::{Thunk, markers::ByRef};
///
/// let parse: Thunk<(&str,), Option<i32>, ByRef> = Thunk::new(|s: &str| s.parse::<i32>().ok());
///
/// // No `mut` binding needed: invocation only borrows the thunk.
/// assert_eq!(parse.call("42"), Some(42));
/// assert_eq!(parse.call("nope"), None);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct ByRef;

/// Marker type for thunks invoked through a mutable reference.
///
/// This is the default receiver marker. Construction requires the callable
/// to implement [`FnMut`], and `call` takes `&mut self`, so the stored
/// callable may carry mutable state between invocations.
///
/// # Examples
///
/// ```
/// use thunkbox::Thunk;
///
/// let mut total = 0i64;
/// let mut add: Thunk<(i64,), i64> = Thunk::new(move |step: i64| {
///     total += step;
///     total
/// });
/// assert_eq!(add.call(3), 3);
/// assert_eq!(add.call(4), 7);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct ByMut;

/// Marker type for thunks invoked at most once.
///
/// Construction requires only [`FnOnce`], making this the receiver marker
/// that accepts the widest range of callables, and `call` takes `self`, so
/// the type system guarantees the callable cannot run twice.
///
/// # Examples
///
/// ```
/// use thunkbox::{Thunk, markers::ByOnce};
///
/// let payload = String::from("delivered");
/// let deliver: Thunk<(), String, ByOnce> = Thunk::new(move || payload);
/// assert_eq!(deliver.call(), "delivered");
/// // let again = deliver.call(); // ❌ Won't compile: `deliver` was consumed
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct ByOnce;

/// Marker type for thunks that stay on the thread that created them.
///
/// This is the default thread-safety marker. No `Send` requirement is placed
/// on the stored callable, so it may freely capture `Rc`, raw pointers and
/// other non-thread-safe data; in exchange the thunk is neither `Send` nor
/// `Sync`.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
///
/// use thunkbox::Thunk;
///
/// // Rc is not Send, so this callable only fits in a Local thunk.
/// let shared: Rc<u32> = Rc::new(5);
/// let mut read: Thunk<(), u32> = Thunk::new(move || *shared);
/// assert_eq!(read.call(), 5);
///
/// // The thunk cannot be sent to another thread:
/// // std::thread::spawn(move || read.call()); // ❌ Won't compile
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Local;

/// Marker type for thunks that may cross threads.
///
/// Construction requires the stored callable to be `Send`, and in exchange
/// the thunk itself is `Send`. A `Sendable` thunk can always be weakened
/// into a [`Local`] one via [`From`]; the reverse direction does not exist.
///
/// # When to Use
///
/// Use `Sendable` whenever the thunk is handed to an executor, a worker
/// thread, or any other consumer that might run it somewhere else. Most
/// callables qualify: a closure is `Send` unless it captures something that
/// is not.
///
/// # Examples
///
/// ```
/// use thunkbox::{
///     Thunk,
///     markers::{ByOnce, Sendable},
/// };
///
/// let work: Thunk<(u64,), u64, ByOnce, Sendable> = Thunk::new(|seed: u64| seed.wrapping_mul(31));
/// let handle = std::thread::spawn(move || work.call(99));
/// assert_eq!(handle.join().unwrap(), 3069);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Sendable;

/// Marker type for thunks whose panics propagate to the caller.
///
/// This is the default unwind marker. The thunk itself stays well-formed
/// when a call unwinds: a repeatable thunk can be invoked again afterwards,
/// and a consuming call cleans up the stored callable exactly once.
///
/// # Examples
///
/// ```
/// use thunkbox::Thunk;
///
/// let mut fragile: Thunk<(), ()> = Thunk::new(|| panic!("boom"));
/// let caught = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| fragile.call()));
/// assert!(caught.is_err());
///
/// // The thunk is still intact and callable.
/// assert!(!fragile.is_empty());
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct MayUnwind;

/// Marker type for thunks that must not unwind.
///
/// A panic escaping the stored callable aborts the process instead of
/// unwinding into the caller. Use this for callables invoked from contexts
/// that cannot tolerate unwinding, such as callbacks handed across an FFI
/// boundary. The abort is implemented by escalating the unwind into a nested
/// panic, so it works without `std`.
///
/// # Examples
///
/// ```
/// use thunkbox::{
///     Thunk,
///     markers::{ByMut, Local, NoUnwind},
/// };
///
/// let mut halve: Thunk<(u32,), u32, ByMut, Local, NoUnwind> = Thunk::new(|x: u32| x / 2);
///
/// // Calls that return normally behave exactly like MayUnwind calls; only a
/// // panicking callable would abort.
/// assert_eq!(halve.call(8), 4);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct NoUnwind;

mod sealed_unwind_marker {
    use super::*;

    pub trait Sealed: 'static {}

    impl Sealed for MayUnwind {}
    impl Sealed for NoUnwind {}
}

/// Marker trait for the unwind discipline of a thunk.
///
/// This trait is implemented for [`MayUnwind`] and [`NoUnwind`], the two
/// unwind markers that can be used with [`Thunk<A, R, M, T,
/// P>`](crate::Thunk). It exists so invocation code can select the right
/// behavior at compile time; the branch on [`PROPAGATES_PANIC`] is resolved
/// during monomorphization and costs nothing at runtime.
///
/// This trait is sealed and cannot be implemented outside of this crate.
///
/// [`PROPAGATES_PANIC`]: UnwindMarker::PROPAGATES_PANIC
pub trait UnwindMarker: sealed_unwind_marker::Sealed {
    /// Whether a panic in the stored callable unwinds out of `call`.
    const PROPAGATES_PANIC: bool;
}

impl UnwindMarker for MayUnwind {
    const PROPAGATES_PANIC: bool = true;
}

impl UnwindMarker for NoUnwind {
    const PROPAGATES_PANIC: bool = false;
}

mod sealed_receiver_marker {
    use super::*;

    pub trait Sealed: 'static {}

    impl Sealed for ByRef {}
    impl Sealed for ByMut {}
    impl Sealed for ByOnce {}
}

/// Marker trait for the receiver discipline of a thunk.
///
/// This trait is implemented for [`ByRef`], [`ByMut`] and [`ByOnce`], and
/// ties each receiver marker to the callables it can store: the
/// implementation for a marker requires exactly the invocation capability
/// that marker promises ([`Fn`], [`FnMut`] or [`FnOnce`]) and erases the
/// callable behind the dispatch table that invokes it with that capability.
/// [`Thunk::new`](crate::Thunk::new) is generic over this trait, which is
/// how a single constructor serves all three receiver disciplines without
/// naming the receiver at the call site.
///
/// This trait is sealed and cannot be implemented outside of this crate.
pub trait ReceiverMarker<F, Args>: sealed_receiver_marker::Sealed {
    /// Erases `callable` behind a dispatch table matching this receiver
    /// marker.
    fn erase(callable: F) -> RawThunk;
}

impl<F, Args> ReceiverMarker<F, Args> for ByRef
where
    F: CallRef<Args> + 'static,
{
    #[inline]
    fn erase(callable: F) -> RawThunk {
        RawThunk::new_ref::<F, Args>(callable)
    }
}

impl<F, Args> ReceiverMarker<F, Args> for ByMut
where
    F: CallMut<Args> + 'static,
{
    #[inline]
    fn erase(callable: F) -> RawThunk {
        RawThunk::new_mut::<F, Args>(callable)
    }
}

impl<F, Args> ReceiverMarker<F, Args> for ByOnce
where
    F: CallOnce<Args> + 'static,
{
    #[inline]
    fn erase(callable: F) -> RawThunk {
        RawThunk::new_once::<F, Args>(callable)
    }
}

/// Marker trait combining callable and thread-safety requirements.
///
/// This trait enforces thread-safety constraints on the stored callable at
/// construction time. A thunk can only be constructed when its callable
/// satisfies the requirements of the thread-safety marker.
///
/// # Implementations
///
/// - For `T = Local`: Implemented for all `Sized + 'static` types,
///   regardless of their `Send` status. This allows storing callables that
///   capture types like `Rc` in local thunks.
///
/// - For `T = Sendable`: Implemented only for `Sized + 'static` types that
///   are also `Send`. This ensures sendable thunks can only be constructed
///   with callables that may cross threads.
///
/// # Enforcement at Construction
///
/// The key insight is that this trait is used as a bound during thunk
/// construction. You cannot create a `Thunk<_, _, _, Sendable>` unless the
/// callable implements `CallableFor<Sendable>`, which requires it to be
/// `Send`. This makes it impossible to accidentally create an invalid thunk:
///
/// ```compile_fail
/// use std::rc::Rc;
///
/// use thunkbox::{
///     Thunk,
///     markers::{ByMut, Sendable},
/// };
///
/// // This won't compile because the callable captures an Rc, which is not
/// // Send.
/// let shared: Rc<u32> = Rc::new(5);
/// let thunk = Thunk::<(), u32, ByMut, Sendable>::new(move || *shared);
/// ```
///
/// Use [`Local`] instead for non-thread-safe callables:
///
/// ```
/// use std::rc::Rc;
///
/// use thunkbox::{
///     Thunk,
///     markers::{ByMut, Local},
/// };
///
/// let shared: Rc<u32> = Rc::new(5);
/// let mut thunk = Thunk::<(), u32, ByMut, Local>::new(move || *shared);
/// assert_eq!(thunk.call(), 5);
/// ```
pub trait CallableFor<T>: Sized + 'static {}

impl<F: Sized + 'static> CallableFor<Local> for F {}

impl<F: Sized + 'static> CallableFor<Sendable> for F where F: Send {}
