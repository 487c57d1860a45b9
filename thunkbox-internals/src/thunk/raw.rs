//! Type-erased storage and dispatch for a single callable.
//!
//! This module encapsulates the [`RawThunk`] type, which pairs a storage
//! [`Slot`] with the [`ThunkVtable`] describing how to invoke and destroy its
//! contents. Keeping the fields private to this module guarantees the pairing
//! stays consistent: every slot is only ever interpreted through the vtable
//! it was initialized with.

use core::{
    any::TypeId,
    mem::{ManuallyDrop, MaybeUninit},
    ptr::NonNull,
};

use crate::{
    callable::{CallMut, CallOnce, CallRef},
    thunk::{
        slot::{Slot, Strategy},
        vtable::ThunkVtable,
    },
};

/// A type-erased, move-only container for a single callable.
///
/// The container is two pointers wide: one word for the vtable and one for
/// the storage slot. Callables that fit in a pointer are stored inline in the
/// slot; larger or over-aligned ones are spilled to a single heap allocation.
///
/// A `RawThunk` is either *empty* (no vtable, uninitialized slot) or *full*
/// (vtable paired with a live callable). Emptiness is observable through
/// [`RawThunk::is_empty`], and all call methods require fullness as a safety
/// precondition. The receiver discipline and argument types are erased, so
/// the call methods are `unsafe`; the safe wrapper types in the `thunkbox`
/// crate re-attach that information at the type level.
pub struct RawThunk {
    /// The dispatch table of the stored callable.
    ///
    /// # Safety
    ///
    /// 1. If this field is `Some`, the vtable governs `self.slot`: the slot
    ///    holds a live callable of the vtable's callable type, stored with
    ///    the strategy the vtable was created for.
    /// 2. If this field is `None`, the thunk is empty and `self.slot` is
    ///    uninitialized.
    vtable: Option<&'static ThunkVtable>,
    /// The storage slot holding the callable, if any.
    ///
    /// # Safety
    ///
    /// See the invariants on the `vtable` field.
    slot: Slot,
}

impl RawThunk {
    /// Creates an empty thunk.
    ///
    /// Empty thunks own nothing, never allocate, and drop without side
    /// effects.
    #[inline]
    pub const fn empty() -> Self {
        RawThunk {
            vtable: None,
            slot: Slot::uninit(),
        }
    }

    /// Creates a thunk storing a callable that can be invoked through a
    /// shared reference.
    #[inline]
    pub fn new_ref<F, Args>(callable: F) -> Self
    where
        F: CallRef<Args> + 'static,
    {
        match Strategy::select::<F>() {
            Strategy::Inline => RawThunk {
                vtable: Some(ThunkVtable::new_inline_ref::<F, Args>()),
                slot: Slot::with_inline(callable),
            },
            Strategy::Boxed => RawThunk {
                vtable: Some(ThunkVtable::new_boxed_ref::<F, Args>()),
                slot: Slot::with_boxed(callable),
            },
        }
    }

    /// Creates a thunk storing a callable that can be invoked through a
    /// mutable reference.
    #[inline]
    pub fn new_mut<F, Args>(callable: F) -> Self
    where
        F: CallMut<Args> + 'static,
    {
        match Strategy::select::<F>() {
            Strategy::Inline => RawThunk {
                vtable: Some(ThunkVtable::new_inline_mut::<F, Args>()),
                slot: Slot::with_inline(callable),
            },
            Strategy::Boxed => RawThunk {
                vtable: Some(ThunkVtable::new_boxed_mut::<F, Args>()),
                slot: Slot::with_boxed(callable),
            },
        }
    }

    /// Creates a thunk storing a callable that can be invoked at most once.
    #[inline]
    pub fn new_once<F, Args>(callable: F) -> Self
    where
        F: CallOnce<Args> + 'static,
    {
        match Strategy::select::<F>() {
            Strategy::Inline => RawThunk {
                vtable: Some(ThunkVtable::new_inline_once::<F, Args>()),
                slot: Slot::with_inline(callable),
            },
            Strategy::Boxed => RawThunk {
                vtable: Some(ThunkVtable::new_boxed_once::<F, Args>()),
                slot: Slot::with_boxed(callable),
            },
        }
    }

    /// Returns `true` if the thunk does not currently hold a callable.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vtable.is_none()
    }

    /// Returns the [`TypeId`] of the stored callable, or `None` if the thunk
    /// is empty.
    #[inline]
    pub fn stored_type_id(&self) -> Option<TypeId> {
        self.vtable.map(ThunkVtable::type_id)
    }

    /// Returns the type name of the stored callable, or `None` if the thunk
    /// is empty.
    ///
    /// Only intended for diagnostics.
    #[inline]
    pub fn stored_type_name(&self) -> Option<&'static str> {
        self.vtable.map(ThunkVtable::type_name)
    }

    /// Invokes the stored callable through a shared reference.
    ///
    /// # Safety
    ///
    /// The caller must guarantee the following:
    ///
    /// 1. The thunk is not empty.
    /// 2. The thunk was created with [`RawThunk::new_ref`].
    /// 3. `Args` is exactly the argument tuple type the thunk was created
    ///    with, and `Ret` is exactly the output type of the stored callable.
    #[inline]
    pub unsafe fn call_ref<Args, Ret>(&self, args: Args) -> Ret {
        debug_assert!(!self.is_empty());
        // SAFETY: The thunk is not empty (caller requirement 1).
        let vtable = unsafe { self.vtable.unwrap_unchecked() };
        let mut args = ManuallyDrop::new(args);
        let mut output = MaybeUninit::<Ret>::uninit();
        // SAFETY: By the field invariants the slot holds a live callable
        // paired with `vtable`. The vtable is a by-ref table (caller
        // requirement 2), so shared access to the slot suffices and the
        // callable is not consumed. `args` holds a valid `Args` that we
        // never touch again (caller requirement 3), and `output` is
        // writable, uninitialized storage for a `Ret` (caller requirement 3).
        unsafe {
            vtable.call(
                NonNull::from(&self.slot),
                (&raw mut args).cast::<()>(),
                output.as_mut_ptr().cast::<()>(),
            )
        };
        // SAFETY: The call returned normally, so the output was initialized.
        unsafe { output.assume_init() }
    }

    /// Invokes the stored callable through a mutable reference.
    ///
    /// # Safety
    ///
    /// The caller must guarantee the following:
    ///
    /// 1. The thunk is not empty.
    /// 2. The thunk was created with [`RawThunk::new_ref`] or
    ///    [`RawThunk::new_mut`].
    /// 3. `Args` is exactly the argument tuple type the thunk was created
    ///    with, and `Ret` is exactly the output type of the stored callable.
    #[inline]
    pub unsafe fn call_mut<Args, Ret>(&mut self, args: Args) -> Ret {
        debug_assert!(!self.is_empty());
        // SAFETY: The thunk is not empty (caller requirement 1).
        let vtable = unsafe { self.vtable.unwrap_unchecked() };
        let mut args = ManuallyDrop::new(args);
        let mut output = MaybeUninit::<Ret>::uninit();
        // SAFETY: By the field invariants the slot holds a live callable
        // paired with `vtable`. The vtable is a by-ref or by-mut table
        // (caller requirement 2), we have exclusive access, and the callable
        // is not consumed. `args` holds a valid `Args` that we never touch
        // again (caller requirement 3), and `output` is writable,
        // uninitialized storage for a `Ret` (caller requirement 3).
        unsafe {
            vtable.call(
                NonNull::from(&mut self.slot),
                (&raw mut args).cast::<()>(),
                output.as_mut_ptr().cast::<()>(),
            )
        };
        // SAFETY: The call returned normally, so the output was initialized.
        unsafe { output.assume_init() }
    }

    /// Invokes the stored callable by value, consuming the thunk.
    ///
    /// The vtable is detached before the call, so the thunk counts as empty
    /// from that point on and dropping it destroys nothing. If the callable
    /// unwinds, its storage has already been handed to the call and is not
    /// destroyed a second time.
    ///
    /// # Safety
    ///
    /// The caller must guarantee the following:
    ///
    /// 1. The thunk is not empty.
    /// 2. The thunk was created with [`RawThunk::new_once`].
    /// 3. `Args` is exactly the argument tuple type the thunk was created
    ///    with, and `Ret` is exactly the output type of the stored callable.
    #[inline]
    pub unsafe fn call_once<Args, Ret>(mut self, args: Args) -> Ret {
        debug_assert!(!self.is_empty());
        // SAFETY: The thunk is not empty (caller requirement 1).
        let vtable = unsafe { self.vtable.take().unwrap_unchecked() };
        let mut args = ManuallyDrop::new(args);
        let mut output = MaybeUninit::<Ret>::uninit();
        // SAFETY: By the field invariants the slot holds a live callable
        // paired with `vtable`, and we own it outright. The vtable is a
        // by-once table (caller requirement 2), so the call takes ownership
        // of the callable out of the slot, whether it returns or unwinds.
        // The vtable was detached above, so our `Drop` will not run
        // `destroy` on the dead slot and the slot is never interpreted
        // through the table again. `args` holds a valid `Args` that we never
        // touch again, and `output` is writable, uninitialized storage for a
        // `Ret` (caller requirement 3).
        unsafe {
            vtable.call(
                NonNull::from(&mut self.slot),
                (&raw mut args).cast::<()>(),
                output.as_mut_ptr().cast::<()>(),
            )
        };
        // SAFETY: The call returned normally, so the output was initialized.
        unsafe { output.assume_init() }
    }
}

impl Drop for RawThunk {
    fn drop(&mut self) {
        let Some(vtable) = self.vtable else {
            return;
        };
        // SAFETY: By the field invariants the slot holds a live callable
        // paired with `vtable`, we have exclusive access, and the slot is
        // never used again after this.
        unsafe { vtable.destroy(NonNull::from(&mut self.slot)) }
    }
}
