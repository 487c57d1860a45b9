//! Pointer-sized storage for a stored callable.
//!
//! This module encapsulates the [`Slot`] type, which holds the bytes of a
//! stored callable. The callable is either stored directly inside the slot
//! (the [`Strategy::Inline`] case) or behind a heap allocation whose pointer
//! is stored in the slot (the [`Strategy::Boxed`] case).
//!
//! # Safety Invariant
//!
//! A slot carries no information about which strategy was used to initialize
//! it, which type it holds, or whether it currently holds anything at all.
//! All of that is tracked by the [`ThunkVtable`] paired with the slot inside a
//! [`RawThunk`]. The methods of this module are sound only when called in
//! accordance with that pairing, which is why most of them are `unsafe` and
//! force the stored type to be spelled out via [`CastTo`].
//!
//! [`ThunkVtable`]: crate::thunk::vtable::ThunkVtable
//! [`RawThunk`]: crate::thunk::raw::RawThunk

use alloc::boxed::Box;
use core::mem::MaybeUninit;

use crate::util::CastTo;

/// The storage strategy used for a particular callable type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Strategy {
    /// The callable is stored directly in the slot bytes.
    Inline,
    /// The callable lives on the heap and the slot holds the pointer to it.
    Boxed,
}

impl Strategy {
    /// Selects the storage strategy for values of type `T`.
    ///
    /// Returns [`Strategy::Inline`] exactly when a `T` fits in the slot, so
    /// that storing it never needs to allocate.
    #[inline]
    pub(super) const fn select<T>() -> Self {
        if Slot::fits::<T>() {
            Strategy::Inline
        } else {
            Strategy::Boxed
        }
    }
}

/// Raw storage for a stored callable.
///
/// The slot is exactly one pointer in size and alignment. Depending on the
/// strategy chosen at initialization it holds either the callable itself or a
/// pointer obtained from [`Box::into_raw`].
#[repr(transparent)]
pub(crate) struct Slot {
    /// The slot bytes.
    ///
    /// # Safety
    ///
    /// Which interpretation of the bytes is valid is dictated by the vtable
    /// paired with this slot:
    ///
    /// 1. If the vtable was created for the inline strategy, the bytes hold a
    ///    live value of the vtable's callable type.
    /// 2. If the vtable was created for the boxed strategy, the bytes hold a
    ///    non-null pointer to a live heap allocation of the vtable's callable
    ///    type, created by [`Box::into_raw`].
    /// 3. If there is no paired vtable, the bytes are uninitialized and must
    ///    not be read.
    bytes: MaybeUninit<*mut ()>,
}

impl Slot {
    /// Returns `true` when values of type `T` can be stored directly in the
    /// slot bytes.
    ///
    /// Both the size and the alignment must fit: a type can only be smaller
    /// than a pointer yet more aligned than one when it is a zero-sized type
    /// with a raised alignment, and handing out references to such a type
    /// from the slot would still be unsound.
    #[inline]
    pub(super) const fn fits<T>() -> bool {
        size_of::<T>() <= size_of::<*mut ()>() && align_of::<T>() <= align_of::<*mut ()>()
    }

    /// Creates a slot with uninitialized bytes.
    ///
    /// Used for thunks that do not currently hold a callable. The returned
    /// slot must not be read until it has been overwritten by one of the
    /// initializing constructors.
    #[inline]
    pub(super) const fn uninit() -> Self {
        Slot {
            bytes: MaybeUninit::uninit(),
        }
    }

    /// Creates a slot holding `value` directly in its bytes.
    ///
    /// Callers must pair the returned slot with a vtable created for the
    /// inline strategy and the type `T`.
    #[inline]
    pub(super) fn with_inline<T>(value: T) -> Self {
        debug_assert!(Self::fits::<T>());
        let mut slot = Self::uninit();
        let ptr = slot.bytes.as_mut_ptr().cast::<T>();
        // SAFETY: `fits::<T>()` holds whenever the inline strategy is
        // selected, so the slot bytes provide enough space and alignment
        // to store a `T`.
        unsafe { ptr.write(value) };
        slot
    }

    /// Creates a slot holding a heap allocation containing `value`.
    ///
    /// Callers must pair the returned slot with a vtable created for the
    /// boxed strategy and the type `T`.
    #[inline]
    pub(super) fn with_boxed<T>(value: T) -> Self {
        let ptr: *mut T = Box::into_raw(Box::new(value));
        Slot {
            bytes: MaybeUninit::new(ptr.cast::<()>()),
        }
    }

    /// Returns a shared reference to the inline value.
    ///
    /// # Safety
    ///
    /// The slot must currently hold a live value of type `T` stored with the
    /// inline strategy.
    #[inline]
    pub(super) unsafe fn inline_ref<T: CastTo>(&self) -> &T::Target {
        let ptr = self.bytes.as_ptr().cast::<T::Target>();
        // SAFETY: The caller guarantees the slot bytes hold a live `T`.
        unsafe { &*ptr }
    }

    /// Returns a mutable reference to the inline value.
    ///
    /// # Safety
    ///
    /// The slot must currently hold a live value of type `T` stored with the
    /// inline strategy.
    #[inline]
    pub(super) unsafe fn inline_mut<T: CastTo>(&mut self) -> &mut T::Target {
        let ptr = self.bytes.as_mut_ptr().cast::<T::Target>();
        // SAFETY: The caller guarantees the slot bytes hold a live `T`.
        unsafe { &mut *ptr }
    }

    /// Moves the inline value out of the slot.
    ///
    /// # Safety
    ///
    /// The slot must currently hold a live value of type `T` stored with the
    /// inline strategy. Ownership of the value transfers to the caller, and
    /// the slot must be treated as uninitialized afterwards.
    #[inline]
    pub(super) unsafe fn inline_read<T: CastTo>(&mut self) -> T::Target {
        let ptr = self.bytes.as_ptr().cast::<T::Target>();
        // SAFETY: The caller guarantees the slot bytes hold a live `T` that
        // we are allowed to take ownership of.
        unsafe { ptr.read() }
    }

    /// Returns the heap pointer stored in the slot.
    ///
    /// # Safety
    ///
    /// The slot must have been initialized with the boxed strategy and the
    /// type `T`. Whether the returned pointer may be dereferenced, and for
    /// how long, is governed by the liveness of that allocation.
    #[inline]
    pub(super) unsafe fn boxed_ptr<T: CastTo>(&self) -> *mut T::Target {
        // SAFETY: The caller guarantees the slot was initialized with the
        // boxed strategy, so the bytes hold a valid pointer.
        let ptr = unsafe { self.bytes.assume_init() };
        ptr.cast::<T::Target>()
    }
}
