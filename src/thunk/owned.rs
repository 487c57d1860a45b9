use core::{fmt, mem};

use thunkbox_internals::RawThunk;

use crate::markers::{Local, MayUnwind, NoUnwind, Sendable};

/// FIXME: Once rust-lang/rust#132922 gets resolved, we can make the `raw` field
/// an unsafe field and remove this module.
mod limit_field_access {
    use core::marker::PhantomData;

    use thunkbox_internals::RawThunk;

    use crate::markers::{ByMut, Local, MayUnwind};

    /// A move-only, type-erased container for a single callable.
    ///
    /// A `Thunk` owns "some callable with signature `fn(Args) -> Output`"
    /// whose concrete type has been erased. The container itself is always
    /// exactly two words: callables no larger or more aligned than a pointer
    /// are stored inline, and everything else is spilled to a single heap
    /// allocation.
    ///
    /// A thunk is either *empty* or holds exactly one callable. Freshly
    /// constructed thunks from [`Thunk::new`] are never empty; emptiness
    /// arises from [`Thunk::empty`], [`Thunk::take`], [`Thunk::clear`] or
    /// conversion from [`None`]. Invoking an empty thunk panics.
    ///
    /// # Type Parameters
    ///
    /// - `Args`: The arguments of the callable, packed into a tuple such as
    ///   `()`, `(i32,)` or `(&str, usize)`. Up to eight arguments are
    ///   supported.
    /// - `Output`: The value returned by invocation.
    /// - `Receiver`: How `call` borrows the thunk. Either
    ///   [`ByRef`](crate::markers::ByRef), [`ByMut`](crate::markers::ByMut)
    ///   or [`ByOnce`](crate::markers::ByOnce).
    /// - `ThreadSafety`: Whether the thunk may cross threads. Either
    ///   [`Local`](crate::markers::Local) or
    ///   [`Sendable`](crate::markers::Sendable).
    /// - `Unwind`: What happens when the stored callable panics. Either
    ///   [`MayUnwind`](crate::markers::MayUnwind) or
    ///   [`NoUnwind`](crate::markers::NoUnwind).
    ///
    /// # Examples
    ///
    /// ```
    /// use thunkbox::Thunk;
    ///
    /// let mut double: Thunk<(i32,), i32> = Thunk::new(|x: i32| x * 2);
    /// assert_eq!(double.call(7), 14);
    ///
    /// // Taking the callable out leaves the original thunk empty.
    /// let mut taken = double.take();
    /// assert!(double.is_empty());
    /// assert_eq!(taken.call(8), 16);
    /// ```
    pub struct Thunk<
        Args,
        Output,
        Receiver: 'static = ByMut,
        ThreadSafety: 'static = Local,
        Unwind: 'static = MayUnwind,
    > {
        /// # Safety
        ///
        /// The following safety invariants are guaranteed to be upheld as long
        /// as this struct exists:
        ///
        /// 1. If the [`RawThunk`] is non-empty, the stored callable takes the
        ///    argument tuple `Args`, returns `Output`, and the raw thunk was
        ///    created with the `RawThunk` constructor matching `Receiver`:
        ///    `new_ref` for `ByRef`, `new_mut` for `ByMut`, `new_once` for
        ///    `ByOnce`.
        /// 2. If `ThreadSafety = Sendable`: The stored callable is `Send`.
        raw: RawThunk,
        _signature: PhantomData<fn(Args) -> Output>,
        _receiver: PhantomData<Receiver>,
        _thread_safety: PhantomData<ThreadSafety>,
        _unwind: PhantomData<Unwind>,
    }

    impl<A, R, M, T, P> Thunk<A, R, M, T, P> {
        /// Creates a new [`Thunk`] from a raw thunk.
        ///
        /// # Safety
        ///
        /// The caller must ensure:
        ///
        /// 1. If the [`RawThunk`] is non-empty, the stored callable takes the
        ///    argument tuple `A`, returns `R`, and the raw thunk was created
        ///    with the `RawThunk` constructor matching `M`: `new_ref` for
        ///    `ByRef`, `new_mut` for `ByMut`, `new_once` for `ByOnce`.
        /// 2. If `T = Sendable`: The stored callable is `Send`.
        #[must_use]
        pub(crate) const unsafe fn from_raw(raw: RawThunk) -> Self {
            // SAFETY: We must uphold the safety invariants of the raw field:
            // 1. Guaranteed by caller
            // 2. Guaranteed by caller
            Thunk {
                raw,
                _signature: PhantomData,
                _receiver: PhantomData,
                _thread_safety: PhantomData,
                _unwind: PhantomData,
            }
        }

        /// Consumes the [`Thunk`] and returns the inner [`RawThunk`].
        #[must_use]
        pub(crate) fn into_raw(self) -> RawThunk {
            // SAFETY: We are destroying `self`, so we no longer
            // need to uphold any safety invariants.
            self.raw
        }

        /// Returns a reference to the inner [`RawThunk`].
        #[must_use]
        pub(crate) fn raw(&self) -> &RawThunk {
            // SAFETY: We must uphold the safety invariants of the raw field:
            // 1. Upheld as the type parameters do not change.
            // 2. No mutation is possible through the shared reference.
            &self.raw
        }

        /// Returns a mutable reference to the inner [`RawThunk`].
        #[must_use]
        pub(crate) fn raw_mut(&mut self) -> &mut RawThunk {
            // SAFETY: We must uphold the safety invariants of the raw field:
            // 1. Upheld as the type parameters do not change. Callers may
            //    invoke the raw thunk through the reference, but must not
            //    replace its contents with a differently-typed callable.
            // 2. Upheld as the stored callable itself cannot be swapped out
            //    through this reference.
            &mut self.raw
        }
    }
}
pub use limit_field_access::Thunk;

impl<A, R, M, T, P> Thunk<A, R, M, T, P> {
    /// Creates an empty thunk.
    ///
    /// Empty thunks own nothing, never allocate, and drop without side
    /// effects. Invoking one panics. This function is `const`, so empty
    /// thunks can serve as placeholders in constant expressions.
    ///
    /// # Examples
    ///
    /// ```
    /// use thunkbox::Thunk;
    ///
    /// const PLACEHOLDER: Thunk<(i32,), i32> = Thunk::empty();
    ///
    /// let thunk = PLACEHOLDER;
    /// assert!(thunk.is_empty());
    /// ```
    #[must_use]
    pub const fn empty() -> Self {
        // SAFETY: We must uphold the safety invariants of the raw field:
        // 1. Trivially upheld, as the raw thunk is empty.
        // 2. Trivially upheld, as the raw thunk is empty.
        unsafe { Thunk::from_raw(RawThunk::empty()) }
    }

    /// Returns `true` if the thunk does not currently hold a callable.
    ///
    /// # Examples
    ///
    /// ```
    /// use thunkbox::Thunk;
    ///
    /// let mut thunk: Thunk<(), ()> = Thunk::new(|| ());
    /// assert!(!thunk.is_empty());
    ///
    /// thunk.clear();
    /// assert!(thunk.is_empty());
    /// ```
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw().is_empty()
    }

    /// Destroys the stored callable, leaving the thunk empty.
    ///
    /// Has no effect on a thunk that is already empty.
    pub fn clear(&mut self) {
        *self = Thunk::empty();
    }

    /// Moves the stored callable into a new thunk, leaving this one empty.
    ///
    /// This is the explicit spelling of the move protocol: after a take, the
    /// source is empty and invoking it panics, while the returned thunk
    /// carries the callable along with all of its state.
    ///
    /// # Examples
    ///
    /// ```
    /// use thunkbox::Thunk;
    ///
    /// let mut counter = 0u32;
    /// let mut source: Thunk<(), u32> = Thunk::new(move || {
    ///     counter += 1;
    ///     counter
    /// });
    /// assert_eq!(source.call(), 1);
    ///
    /// let mut moved = source.take();
    /// assert!(source.is_empty());
    /// assert_eq!(moved.call(), 2);
    /// ```
    pub fn take(&mut self) -> Self {
        mem::replace(self, Thunk::empty())
    }

    /// Swaps the contents of two thunks of the same type.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }
}

impl<A, R, M, P> Thunk<A, R, M, Sendable, P> {
    /// Changes the thread-safety marker of the [`Thunk`] to [`Local`].
    ///
    /// Calling this method is equivalent to calling `thunk.into()`, however
    /// this method has been restricted to only change the thread-safety
    /// marker. This can help with type inference or improve code
    /// readability, as it more clearly communicates intent.
    ///
    /// This method does not actually modify the thunk in any way. It only
    /// has the effect of "forgetting" that the stored callable is [`Send`].
    /// There is no method for the opposite direction.
    ///
    /// [`Local`]: crate::markers::Local
    #[must_use]
    pub fn into_local(self) -> Thunk<A, R, M, Local, P> {
        let raw = self.into_raw();
        // SAFETY: We must uphold the safety invariants of the raw field:
        // 1. Upheld as the signature and receiver parameters do not change.
        // 2. Trivially upheld, as the thread-safety marker is now `Local`.
        unsafe { Thunk::from_raw(raw) }
    }
}

impl<A, R, M, T> Thunk<A, R, M, T, NoUnwind> {
    /// Changes the unwind marker of the [`Thunk`] to [`MayUnwind`].
    ///
    /// This method does not modify the thunk or the stored callable. It only
    /// drops the promise that an escaping panic aborts the process; panics
    /// from the returned thunk unwind into the caller as usual.
    ///
    /// [`MayUnwind`]: crate::markers::MayUnwind
    #[must_use]
    pub fn into_may_unwind(self) -> Thunk<A, R, M, T, MayUnwind> {
        let raw = self.into_raw();
        // SAFETY: We must uphold the safety invariants of the raw field:
        // 1. Upheld as the signature and receiver parameters do not change.
        // 2. Upheld as the thread-safety marker does not change.
        unsafe { Thunk::from_raw(raw) }
    }
}

/// Implements marker-weakening [`From`] conversions by chaining the named
/// conversion methods.
macro_rules! from_impls {
    ($(impl<$($gen:ident),*> From<$src:ty> for $dst:ty { $($method:ident),* })*) => {
        $(
            impl<$($gen),*> From<$src> for $dst {
                #[inline]
                fn from(thunk: $src) -> Self {
                    thunk$(.$method())*
                }
            }
        )*
    };
}

from_impls! {
    impl<A, R, M, P> From<Thunk<A, R, M, Sendable, P>>
        for Thunk<A, R, M, Local, P> { into_local }
    impl<A, R, M, T> From<Thunk<A, R, M, T, NoUnwind>>
        for Thunk<A, R, M, T, MayUnwind> { into_may_unwind }
    impl<A, R, M> From<Thunk<A, R, M, Sendable, NoUnwind>>
        for Thunk<A, R, M, Local, MayUnwind> { into_local, into_may_unwind }
}

impl<A, R, M, T, P> Default for Thunk<A, R, M, T, P> {
    #[inline]
    fn default() -> Self {
        Thunk::empty()
    }
}

impl<A, R, M, T, P> fmt::Debug for Thunk<A, R, M, T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stored = self.raw().stored_type_name().unwrap_or("<empty>");
        f.debug_struct("Thunk").field("stored", &stored).finish()
    }
}

// SAFETY: The `Sendable` marker guarantees the stored callable is `Send`
// (safety invariant 2 on the `raw` field), and the container adds no other
// thread-affine state.
unsafe impl<A, R, M, P> Send for Thunk<A, R, M, Sendable, P> {}

impl<A, R, M, T, P> Unpin for Thunk<A, R, M, T, P> {}

#[cfg(test)]
mod tests {
    use alloc::format;

    use static_assertions::{assert_eq_size, assert_impl_all, assert_not_impl_any};

    use super::*;
    use crate::markers::{ByMut, ByOnce, ByRef};

    #[allow(dead_code)]
    struct NonSend(*const ());

    assert_not_impl_any!(NonSend: Send, Sync);

    // Two words regardless of signature or markers.
    assert_eq_size!(Thunk<(), ()>, [usize; 2]);
    assert_eq_size!(Thunk<(u8, u16), u32, ByOnce, Sendable, NoUnwind>, [usize; 2]);

    assert_impl_all!(Thunk<(), (), ByMut, Sendable, MayUnwind>: Send);
    assert_impl_all!(Thunk<(), (), ByRef, Sendable, NoUnwind>: Send);
    assert_impl_all!(Thunk<(), (), ByOnce, Sendable, MayUnwind>: Send);
    assert_not_impl_any!(Thunk<(), (), ByMut, Local, MayUnwind>: Send, Sync);
    assert_not_impl_any!(Thunk<(), (), ByMut, Sendable, MayUnwind>: Sync);
    assert_impl_all!(Thunk<(), (), ByOnce, Local, NoUnwind>: Unpin);
    assert_not_impl_any!(Thunk<(), ()>: Copy, Clone);

    #[test]
    fn test_default_is_empty() {
        let thunk: Thunk<(u8,), u8> = Thunk::default();
        assert!(thunk.is_empty());
    }

    #[test]
    fn test_clear_empties() {
        let mut thunk: Thunk<(), u32> = Thunk::new(|| 1);
        assert!(!thunk.is_empty());
        thunk.clear();
        assert!(thunk.is_empty());
        thunk.clear();
        assert!(thunk.is_empty());
    }

    #[test]
    fn test_take_moves_state() {
        let mut count = 0u32;
        let mut source: Thunk<(), u32> = Thunk::new(move || {
            count += 1;
            count
        });
        assert_eq!(source.call(), 1);

        let mut moved = source.take();
        assert!(source.is_empty());
        assert_eq!(moved.call(), 2);
    }

    #[test]
    fn test_swap() {
        let mut left: Thunk<(), u32> = Thunk::new(|| 1);
        let mut right: Thunk<(), u32> = Thunk::empty();
        left.swap(&mut right);
        assert!(left.is_empty());
        assert_eq!(right.call(), 1);
    }

    #[test]
    fn test_from_weakens_markers() {
        let sendable: Thunk<(), u32, ByMut, Sendable> = Thunk::new(|| 5);
        let mut local: Thunk<(), u32, ByMut, Local> = sendable.into();
        assert_eq!(local.call(), 5);

        let shielded: Thunk<(), u32, ByMut, Local, NoUnwind> = Thunk::new(|| 6);
        let mut relaxed: Thunk<(), u32, ByMut, Local, MayUnwind> = shielded.into();
        assert_eq!(relaxed.call(), 6);

        let strict: Thunk<(), u32, ByMut, Sendable, NoUnwind> = Thunk::new(|| 7);
        let mut weakened: Thunk<(), u32, ByMut, Local, MayUnwind> = strict.into();
        assert_eq!(weakened.call(), 7);
    }

    #[test]
    fn test_debug_output() {
        let empty: Thunk<(), ()> = Thunk::empty();
        assert_eq!(format!("{empty:?}"), "Thunk { stored: \"<empty>\" }");

        let full: Thunk<(), ()> = Thunk::new(|| ());
        assert!(!format!("{full:?}").contains("<empty>"));
    }
}
