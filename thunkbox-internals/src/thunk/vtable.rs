//! Per-type dispatch tables for stored callables.
//!
//! This module encapsulates the [`ThunkVtable`] type. Each vtable is created
//! for one combination of callable type, argument tuple, storage strategy and
//! receiver discipline, and its function pointers capture everything needed
//! to invoke, inspect and destroy a callable whose type has been erased.
//!
//! # Safety Invariant
//!
//! The fields of the vtable are kept private to this module, and the vtable
//! is only ever created through the `new_*` constructors below. This gives us
//! a crate-level guarantee: whenever we hold a `&ThunkVtable`, its function
//! pointers point to the shim functions at the bottom of this module,
//! instantiated with the type parameters the vtable was created with. The
//! unsafe methods of this module rely on that guarantee.

use alloc::boxed::Box;
use core::{any::TypeId, ptr::NonNull};

use crate::{
    callable::{CallMut, CallOnce, CallRef},
    thunk::slot::Slot,
};

/// A table of operations for a specific callable type.
///
/// The table does not record which receiver discipline or storage strategy it
/// was built for; those are baked into the function pointers themselves. The
/// [`RawThunk`] holding the table guarantees it only ever pairs the table
/// with a slot initialized to match.
///
/// [`RawThunk`]: crate::thunk::raw::RawThunk
pub(crate) struct ThunkVtable {
    /// Returns the [`TypeId`] of the stored callable type.
    type_id: fn() -> TypeId,
    /// Returns the type name of the stored callable type.
    ///
    /// Only intended for diagnostics.
    type_name: fn() -> &'static str,
    /// Invokes the stored callable.
    ///
    /// # Safety
    ///
    /// See [`ThunkVtable::call`].
    call: unsafe fn(NonNull<Slot>, *mut (), *mut ()),
    /// Destroys the stored callable without invoking it.
    ///
    /// # Safety
    ///
    /// See [`ThunkVtable::destroy`].
    destroy: unsafe fn(NonNull<Slot>),
}

impl ThunkVtable {
    /// Creates a vtable for a by-ref callable stored with the inline
    /// strategy.
    pub(super) const fn new_inline_ref<F, Args>() -> &'static Self
    where
        F: CallRef<Args> + 'static,
    {
        const {
            &Self {
                type_id: TypeId::of::<F>,
                type_name: core::any::type_name::<F>,
                call: call_inline_ref::<F, Args>,
                destroy: destroy_inline::<F>,
            }
        }
    }

    /// Creates a vtable for a by-mut callable stored with the inline
    /// strategy.
    pub(super) const fn new_inline_mut<F, Args>() -> &'static Self
    where
        F: CallMut<Args> + 'static,
    {
        const {
            &Self {
                type_id: TypeId::of::<F>,
                type_name: core::any::type_name::<F>,
                call: call_inline_mut::<F, Args>,
                destroy: destroy_inline::<F>,
            }
        }
    }

    /// Creates a vtable for a by-once callable stored with the inline
    /// strategy.
    pub(super) const fn new_inline_once<F, Args>() -> &'static Self
    where
        F: CallOnce<Args> + 'static,
    {
        const {
            &Self {
                type_id: TypeId::of::<F>,
                type_name: core::any::type_name::<F>,
                call: call_inline_once::<F, Args>,
                destroy: destroy_inline::<F>,
            }
        }
    }

    /// Creates a vtable for a by-ref callable stored with the boxed strategy.
    pub(super) const fn new_boxed_ref<F, Args>() -> &'static Self
    where
        F: CallRef<Args> + 'static,
    {
        const {
            &Self {
                type_id: TypeId::of::<F>,
                type_name: core::any::type_name::<F>,
                call: call_boxed_ref::<F, Args>,
                destroy: destroy_boxed::<F>,
            }
        }
    }

    /// Creates a vtable for a by-mut callable stored with the boxed strategy.
    pub(super) const fn new_boxed_mut<F, Args>() -> &'static Self
    where
        F: CallMut<Args> + 'static,
    {
        const {
            &Self {
                type_id: TypeId::of::<F>,
                type_name: core::any::type_name::<F>,
                call: call_boxed_mut::<F, Args>,
                destroy: destroy_boxed::<F>,
            }
        }
    }

    /// Creates a vtable for a by-once callable stored with the boxed
    /// strategy.
    pub(super) const fn new_boxed_once<F, Args>() -> &'static Self
    where
        F: CallOnce<Args> + 'static,
    {
        const {
            &Self {
                type_id: TypeId::of::<F>,
                type_name: core::any::type_name::<F>,
                call: call_boxed_once::<F, Args>,
                destroy: destroy_boxed::<F>,
            }
        }
    }

    /// Returns the [`TypeId`] of the stored callable type.
    #[inline]
    pub(super) fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Returns the type name of the stored callable type.
    #[inline]
    pub(super) fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Invokes the stored callable.
    ///
    /// # Safety
    ///
    /// The caller must guarantee the following:
    ///
    /// 1. `slot` points to a slot that was initialized together with this
    ///    vtable and currently holds a live callable.
    /// 2. The access matches the vtable's receiver discipline: shared access
    ///    suffices for by-ref vtables, by-mut and by-once vtables require
    ///    exclusive access, and a by-once call takes ownership, after which
    ///    the slot is dead and must be neither used nor destroyed.
    /// 3. `args` points to a valid value of the argument tuple type this
    ///    vtable was created with. The call takes ownership of that value:
    ///    it is read exactly once, and the caller must not drop it
    ///    afterwards.
    /// 4. `output` points to writable, uninitialized storage for the output
    ///    type of the callable. If the call returns normally, the storage is
    ///    initialized and ownership of the output passes to the caller. If
    ///    the call unwinds, the storage remains uninitialized.
    #[inline]
    pub(super) unsafe fn call(&self, slot: NonNull<Slot>, args: *mut (), output: *mut ()) {
        // SAFETY: We know that `self.call` points to one of the `call_*`
        // functions below, instantiated with the types this vtable was
        // created with. That function's safety requirements are upheld:
        //
        // 1. Guaranteed by the caller of this function
        // 2. Guaranteed by the caller of this function
        // 3. Guaranteed by the caller of this function
        // 4. Guaranteed by the caller of this function
        unsafe { (self.call)(slot, args, output) }
    }

    /// Destroys the stored callable without invoking it.
    ///
    /// # Safety
    ///
    /// The caller must guarantee the following:
    ///
    /// 1. `slot` points to a slot that was initialized together with this
    ///    vtable and currently holds a live callable, with exclusive access.
    /// 2. After this call the slot is dead and must not be used again.
    #[inline]
    pub(super) unsafe fn destroy(&self, slot: NonNull<Slot>) {
        // SAFETY: We know that `self.destroy` points to either
        // `destroy_inline::<F>` or `destroy_boxed::<F>` below, matching the
        // strategy the paired slot was initialized with. That function's
        // safety requirements are upheld:
        //
        // 1. Guaranteed by the caller of this function
        // 2. Guaranteed by the caller of this function
        unsafe { (self.destroy)(slot) }
    }
}

/// Invokes an inline-stored callable through a shared reference.
///
/// # Safety
///
/// The caller must guarantee the following:
///
/// 1. `slot` points to a slot holding a live `F` stored with the inline
///    strategy, valid for shared access.
/// 2. `args` points to a valid `Args` that this function may take ownership
///    of.
/// 3. `output` points to writable, uninitialized storage for an `F::Output`.
unsafe fn call_inline_ref<F, Args>(slot: NonNull<Slot>, args: *mut (), output: *mut ())
where
    F: CallRef<Args> + 'static,
{
    // SAFETY: `args` points to a valid `Args` that we may read exactly once
    // (caller requirement 2).
    let args = unsafe { args.cast::<Args>().read() };
    // SAFETY: The slot pointer is valid for shared access (caller
    // requirement 1).
    let slot = unsafe { slot.as_ref() };
    // SAFETY: The slot holds a live `F` stored inline (caller requirement 1).
    let callable = unsafe { slot.inline_ref::<F>() };
    let value = callable.call_ref(args);
    // SAFETY: `output` points to uninitialized storage for an `F::Output`
    // (caller requirement 3).
    unsafe { output.cast::<F::Output>().write(value) };
}

/// Invokes an inline-stored callable through a mutable reference.
///
/// # Safety
///
/// The caller must guarantee the following:
///
/// 1. `slot` points to a slot holding a live `F` stored with the inline
///    strategy, valid for exclusive access.
/// 2. `args` points to a valid `Args` that this function may take ownership
///    of.
/// 3. `output` points to writable, uninitialized storage for an `F::Output`.
unsafe fn call_inline_mut<F, Args>(mut slot: NonNull<Slot>, args: *mut (), output: *mut ())
where
    F: CallMut<Args> + 'static,
{
    // SAFETY: `args` points to a valid `Args` that we may read exactly once
    // (caller requirement 2).
    let args = unsafe { args.cast::<Args>().read() };
    // SAFETY: The slot pointer is valid for exclusive access (caller
    // requirement 1).
    let slot = unsafe { slot.as_mut() };
    // SAFETY: The slot holds a live `F` stored inline (caller requirement 1).
    let callable = unsafe { slot.inline_mut::<F>() };
    let value = callable.call_mut(args);
    // SAFETY: `output` points to uninitialized storage for an `F::Output`
    // (caller requirement 3).
    unsafe { output.cast::<F::Output>().write(value) };
}

/// Invokes an inline-stored callable by value, consuming it.
///
/// # Safety
///
/// The caller must guarantee the following:
///
/// 1. `slot` points to a slot holding a live `F` stored with the inline
///    strategy, valid for exclusive access. Ownership of the `F` transfers
///    to this function, and the caller must treat the slot as dead
///    afterwards, even if the call unwinds.
/// 2. `args` points to a valid `Args` that this function may take ownership
///    of.
/// 3. `output` points to writable, uninitialized storage for an `F::Output`.
unsafe fn call_inline_once<F, Args>(mut slot: NonNull<Slot>, args: *mut (), output: *mut ())
where
    F: CallOnce<Args> + 'static,
{
    // SAFETY: `args` points to a valid `Args` that we may read exactly once
    // (caller requirement 2).
    let args = unsafe { args.cast::<Args>().read() };
    // SAFETY: The slot pointer is valid for exclusive access (caller
    // requirement 1).
    let slot = unsafe { slot.as_mut() };
    // SAFETY: The slot holds a live `F` stored inline, and ownership of it
    // transfers to us (caller requirement 1).
    let callable = unsafe { slot.inline_read::<F>() };
    let value = callable.call_once(args);
    // SAFETY: `output` points to uninitialized storage for an `F::Output`
    // (caller requirement 3).
    unsafe { output.cast::<F::Output>().write(value) };
}

/// Invokes a boxed callable through a shared reference.
///
/// # Safety
///
/// The caller must guarantee the following:
///
/// 1. `slot` points to a slot holding a live `F` stored with the boxed
///    strategy, valid for shared access.
/// 2. `args` points to a valid `Args` that this function may take ownership
///    of.
/// 3. `output` points to writable, uninitialized storage for an `F::Output`.
unsafe fn call_boxed_ref<F, Args>(slot: NonNull<Slot>, args: *mut (), output: *mut ())
where
    F: CallRef<Args> + 'static,
{
    // SAFETY: `args` points to a valid `Args` that we may read exactly once
    // (caller requirement 2).
    let args = unsafe { args.cast::<Args>().read() };
    // SAFETY: The slot pointer is valid for shared access (caller
    // requirement 1).
    let slot = unsafe { slot.as_ref() };
    // SAFETY: The slot was initialized with the boxed strategy for `F`
    // (caller requirement 1).
    let ptr = unsafe { slot.boxed_ptr::<F>() };
    // SAFETY: The heap allocation is live and valid for shared access
    // (caller requirement 1).
    let callable = unsafe { &*ptr };
    let value = callable.call_ref(args);
    // SAFETY: `output` points to uninitialized storage for an `F::Output`
    // (caller requirement 3).
    unsafe { output.cast::<F::Output>().write(value) };
}

/// Invokes a boxed callable through a mutable reference.
///
/// # Safety
///
/// The caller must guarantee the following:
///
/// 1. `slot` points to a slot holding a live `F` stored with the boxed
///    strategy, valid for exclusive access.
/// 2. `args` points to a valid `Args` that this function may take ownership
///    of.
/// 3. `output` points to writable, uninitialized storage for an `F::Output`.
unsafe fn call_boxed_mut<F, Args>(slot: NonNull<Slot>, args: *mut (), output: *mut ())
where
    F: CallMut<Args> + 'static,
{
    // SAFETY: `args` points to a valid `Args` that we may read exactly once
    // (caller requirement 2).
    let args = unsafe { args.cast::<Args>().read() };
    // SAFETY: The slot pointer is valid for exclusive access (caller
    // requirement 1).
    let slot = unsafe { slot.as_ref() };
    // SAFETY: The slot was initialized with the boxed strategy for `F`
    // (caller requirement 1).
    let ptr = unsafe { slot.boxed_ptr::<F>() };
    // SAFETY: The heap allocation is live and valid for exclusive access
    // (caller requirement 1).
    let callable = unsafe { &mut *ptr };
    let value = callable.call_mut(args);
    // SAFETY: `output` points to uninitialized storage for an `F::Output`
    // (caller requirement 3).
    unsafe { output.cast::<F::Output>().write(value) };
}

/// Invokes a boxed callable by value, consuming it and freeing its
/// allocation.
///
/// # Safety
///
/// The caller must guarantee the following:
///
/// 1. `slot` points to a slot holding a live `F` stored with the boxed
///    strategy. Ownership of the allocation transfers to this function, and
///    the caller must treat the slot as dead afterwards, even if the call
///    unwinds.
/// 2. `args` points to a valid `Args` that this function may take ownership
///    of.
/// 3. `output` points to writable, uninitialized storage for an `F::Output`.
unsafe fn call_boxed_once<F, Args>(slot: NonNull<Slot>, args: *mut (), output: *mut ())
where
    F: CallOnce<Args> + 'static,
{
    // SAFETY: `args` points to a valid `Args` that we may read exactly once
    // (caller requirement 2).
    let args = unsafe { args.cast::<Args>().read() };
    // SAFETY: The slot pointer is valid for reading the heap pointer (caller
    // requirement 1).
    let slot = unsafe { slot.as_ref() };
    // SAFETY: The slot was initialized with the boxed strategy for `F`
    // (caller requirement 1).
    let ptr = unsafe { slot.boxed_ptr::<F>() };
    // SAFETY: The pointer came from `Box::into_raw` and ownership of the
    // allocation transfers to us (caller requirement 1).
    let boxed = unsafe { Box::from_raw(ptr) };
    let callable = *boxed;
    let value = callable.call_once(args);
    // SAFETY: `output` points to uninitialized storage for an `F::Output`
    // (caller requirement 3).
    unsafe { output.cast::<F::Output>().write(value) };
}

/// Destroys an inline-stored callable.
///
/// # Safety
///
/// The caller must guarantee the following:
///
/// 1. `slot` points to a slot holding a live `F` stored with the inline
///    strategy, valid for exclusive access.
/// 2. After this call the slot is dead and must not be used again.
unsafe fn destroy_inline<F: 'static>(mut slot: NonNull<Slot>) {
    // SAFETY: The slot pointer is valid for exclusive access (caller
    // requirement 1).
    let slot = unsafe { slot.as_mut() };
    // SAFETY: The slot holds a live `F` stored inline, and ownership of it
    // transfers to us (caller requirements 1 and 2).
    let callable = unsafe { slot.inline_read::<F>() };
    drop(callable);
}

/// Destroys a boxed callable and frees its allocation.
///
/// # Safety
///
/// The caller must guarantee the following:
///
/// 1. `slot` points to a slot holding a live `F` stored with the boxed
///    strategy.
/// 2. After this call the slot is dead and must not be used again.
unsafe fn destroy_boxed<F: 'static>(slot: NonNull<Slot>) {
    // SAFETY: The slot pointer is valid for reading the heap pointer (caller
    // requirement 1).
    let slot = unsafe { slot.as_ref() };
    // SAFETY: The slot was initialized with the boxed strategy for `F`
    // (caller requirement 1).
    let ptr = unsafe { slot.boxed_ptr::<F>() };
    // SAFETY: The pointer came from `Box::into_raw` and ownership of the
    // allocation transfers to us (caller requirements 1 and 2).
    let boxed = unsafe { Box::from_raw(ptr) };
    drop(boxed);
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use core::mem::{ManuallyDrop, MaybeUninit};

    use super::*;

    #[test]
    fn test_thunk_vtable_eq() {
        let left = ThunkVtable::new_inline_mut::<fn(i32) -> i32, (i32,)>();
        let right = ThunkVtable::new_inline_mut::<fn(i32) -> i32, (i32,)>();
        assert!(core::ptr::eq(left, right));
    }

    #[test]
    fn test_thunk_vtable_distinct_per_mode() {
        let by_ref = ThunkVtable::new_inline_ref::<fn(i32) -> i32, (i32,)>();
        let by_mut = ThunkVtable::new_inline_mut::<fn(i32) -> i32, (i32,)>();
        let boxed = ThunkVtable::new_boxed_mut::<fn(i32) -> i32, (i32,)>();
        assert!(!core::ptr::eq(by_ref, by_mut));
        assert!(!core::ptr::eq(by_mut, boxed));
    }

    #[test]
    fn test_thunk_vtable_type_metadata() {
        let vtable = ThunkVtable::new_inline_ref::<fn(u8) -> u8, (u8,)>();
        assert_eq!(vtable.type_id(), TypeId::of::<fn(u8) -> u8>());
        assert!(vtable.type_name().contains("fn(u8) -> u8"));
    }

    #[test]
    fn test_inline_mut_dispatch() {
        fn bump(value: i32) -> i32 {
            value + 1
        }
        let ptr: fn(i32) -> i32 = bump;
        let mut slot = Slot::with_inline(ptr);
        let vtable = ThunkVtable::new_inline_mut::<fn(i32) -> i32, (i32,)>();

        let mut args = ManuallyDrop::new((41,));
        let mut output = MaybeUninit::<i32>::uninit();
        // SAFETY: The slot and vtable were created as a pair for
        // `fn(i32) -> i32` with the inline strategy, `args` holds a valid
        // `(i32,)` that we never touch again, and `output` is uninitialized
        // storage for the output type.
        unsafe {
            vtable.call(
                NonNull::from(&mut slot),
                (&raw mut args).cast::<()>(),
                output.as_mut_ptr().cast::<()>(),
            )
        };
        // SAFETY: The call returned normally, so the output was initialized.
        let value = unsafe { output.assume_init() };
        assert_eq!(value, 42);

        // SAFETY: A by-mut call does not consume the callable, so the slot
        // still holds it and we destroy it exactly once.
        unsafe { vtable.destroy(NonNull::from(&mut slot)) };
    }

    #[test]
    fn test_boxed_once_dispatch() {
        fn make() -> String {
            String::from("made")
        }
        let ptr: fn() -> String = make;
        let mut slot = Slot::with_boxed(ptr);
        let vtable = ThunkVtable::new_boxed_once::<fn() -> String, ()>();

        let mut args = ManuallyDrop::new(());
        let mut output = MaybeUninit::<String>::uninit();
        // SAFETY: The slot and vtable were created as a pair for
        // `fn() -> String` with the boxed strategy. The once-call consumes
        // the allocation, and we neither use nor destroy the slot afterwards.
        unsafe {
            vtable.call(
                NonNull::from(&mut slot),
                (&raw mut args).cast::<()>(),
                output.as_mut_ptr().cast::<()>(),
            )
        };
        // SAFETY: The call returned normally, so the output was initialized.
        let value = unsafe { output.assume_init() };
        assert_eq!(value, "made");
    }
}
