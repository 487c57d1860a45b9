//! Internal helpers shared by the invocation paths.

use crate::markers::UnwindMarker;

/// Panics after an attempt to invoke an empty thunk.
///
/// Kept out of line so the emptiness check in `call` stays cheap; the
/// `#[track_caller]` chain makes the panic point at the offending call site.
#[cold]
#[track_caller]
pub(crate) fn invoked_empty() -> ! {
    panic!("attempted to invoke an empty `Thunk`")
}

/// Runs `body` under the unwind discipline selected by `P`.
///
/// For [`MayUnwind`](crate::markers::MayUnwind) this is transparent: panics
/// unwind out unchanged. For [`NoUnwind`](crate::markers::NoUnwind) an
/// escaping panic is escalated into a nested panic, which aborts the
/// process. The branch is resolved at monomorphization time.
#[inline(always)]
pub(crate) fn unwind_shield<P: UnwindMarker, R>(body: impl FnOnce() -> R) -> R {
    if P::PROPAGATES_PANIC {
        body()
    } else {
        let guard = AbortOnUnwind;
        let value = body();
        core::mem::forget(guard);
        value
    }
}

/// Guard that turns an unwind into a process abort.
///
/// The guard is forgotten on the success path, so its `Drop` only runs while
/// an unwind is already in progress, and panicking at that point aborts.
struct AbortOnUnwind;

impl Drop for AbortOnUnwind {
    fn drop(&mut self) {
        panic!("a `NoUnwind` thunk panicked");
    }
}
