//! Construction and invocation for thunks.
//!
//! Construction is a single constructor generic over the receiver marker,
//! dispatching through [`ReceiverMarker`]. Associated functions are resolved
//! by path before the destination type is known, so `new` has to present
//! exactly one candidate for `Thunk::new(..)` to work with nothing but a
//! type annotation on the binding.
//!
//! Invocation unpacks the argument tuple into real parameters, so the
//! `thunk_impls!` macro at the bottom emits one `call` method per receiver
//! marker and arity, plus the `From<Option<F>>` conversion for the default
//! receiver. Those impl blocks attach to distinct tuple types and are only
//! reached through a typed receiver, which keeps the shared method name
//! unambiguous.

use thunkbox_internals::callable::CallOnce;

use crate::{
    markers::{ByMut, ByOnce, ByRef, CallableFor, ReceiverMarker, UnwindMarker},
    thunk::Thunk,
    util::{invoked_empty, unwind_shield},
};

impl<A, R, M, T, P> Thunk<A, R, M, T, P>
where
    P: UnwindMarker,
{
    /// Creates a thunk storing `callable`.
    ///
    /// The receiver marker decides which callables are accepted: [`ByRef`]
    /// requires [`Fn`], [`ByMut`] requires [`FnMut`], and [`ByOnce`] accepts
    /// any [`FnOnce`], always with the thunk's argument and output types.
    /// With `T = Sendable` the callable must additionally be `Send`.
    ///
    /// The callable is stored inline when it is no larger or more aligned
    /// than a pointer; otherwise it is moved to a single heap allocation.
    #[must_use]
    pub fn new<F>(callable: F) -> Self
    where
        F: CallOnce<A, Output = R> + CallableFor<T>,
        M: ReceiverMarker<F, A>,
    {
        let raw = M::erase(callable);
        // SAFETY: We must uphold the safety invariants of the raw field:
        // 1. `F: CallOnce<A, Output = R>` pins the callable's arguments and
        //    output to the thunk's signature, and each sealed
        //    `ReceiverMarker` impl erases through the `RawThunk` constructor
        //    matching its marker.
        // 2. `F: CallableFor<T>` requires `F: Send` whenever `T = Sendable`.
        unsafe { Self::from_raw(raw) }
    }
}

/// Implements invocation and the [`Option`] conversion for thunks of one
/// arity.
macro_rules! thunk_impls {
    ($($ty:ident $arg:ident),*) => {
        impl<R, $($ty,)* T, P> Thunk<($($ty,)*), R, ByRef, T, P>
        where
            P: UnwindMarker,
        {
            /// Invokes the stored callable through a shared reference.
            ///
            /// # Panics
            ///
            /// Panics if the thunk is empty.
            #[track_caller]
            pub fn call(&self, $($arg: $ty),*) -> R {
                if self.is_empty() {
                    invoked_empty();
                }
                // SAFETY: The thunk is not empty (checked above), it was
                // created with `new_ref` (safety invariant 1 on the raw
                // field), and the argument tuple and output types are
                // exactly the thunk's signature (safety invariant 1).
                unwind_shield::<P, R>(|| unsafe {
                    self.raw().call_ref::<($($ty,)*), R>(($($arg,)*))
                })
            }
        }

        impl<R, $($ty,)* T, P> Thunk<($($ty,)*), R, ByMut, T, P>
        where
            P: UnwindMarker,
        {
            /// Invokes the stored callable through a mutable reference.
            ///
            /// # Panics
            ///
            /// Panics if the thunk is empty.
            #[track_caller]
            pub fn call(&mut self, $($arg: $ty),*) -> R {
                if self.is_empty() {
                    invoked_empty();
                }
                // SAFETY: The thunk is not empty (checked above), it was
                // created with `new_mut` (safety invariant 1 on the raw
                // field), and the argument tuple and output types are
                // exactly the thunk's signature (safety invariant 1).
                unwind_shield::<P, R>(|| unsafe {
                    self.raw_mut().call_mut::<($($ty,)*), R>(($($arg,)*))
                })
            }
        }

        impl<R, $($ty,)* T, P> Thunk<($($ty,)*), R, ByOnce, T, P>
        where
            P: UnwindMarker,
        {
            /// Invokes the stored callable, consuming the thunk.
            ///
            /// # Panics
            ///
            /// Panics if the thunk is empty.
            #[track_caller]
            pub fn call(self, $($arg: $ty),*) -> R {
                if self.is_empty() {
                    invoked_empty();
                }
                let raw = self.into_raw();
                // SAFETY: The raw thunk is not empty (checked above), it was
                // created with `new_once` (safety invariant 1 on the raw
                // field), and the argument tuple and output types are
                // exactly the thunk's signature (safety invariant 1).
                unwind_shield::<P, R>(|| unsafe {
                    raw.call_once::<($($ty,)*), R>(($($arg,)*))
                })
            }
        }

        impl<F, R, $($ty,)* T, P> From<Option<F>> for Thunk<($($ty,)*), R, ByMut, T, P>
        where
            F: FnMut($($ty),*) -> R + CallableFor<T>,
            P: UnwindMarker,
        {
            #[inline]
            fn from(callable: Option<F>) -> Self {
                match callable {
                    Some(callable) => Self::new(callable),
                    None => Self::empty(),
                }
            }
        }
    };
}

thunk_impls!();
thunk_impls!(A0 a0);
thunk_impls!(A0 a0, A1 a1);
thunk_impls!(A0 a0, A1 a1, A2 a2);
thunk_impls!(A0 a0, A1 a1, A2 a2, A3 a3);
thunk_impls!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4);
thunk_impls!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
thunk_impls!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
thunk_impls!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
