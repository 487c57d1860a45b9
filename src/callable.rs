//! Invocation traits for callables taking their arguments as a packed tuple.
//!
//! The traits re-exported here mirror the [`Fn`]/[`FnMut`]/[`FnOnce`]
//! hierarchy, but receive their arguments as a single tuple. That is the form
//! a type-erased container works with, and it is the form the bounds on
//! [`Thunk`](crate::Thunk) are written in: [`Thunk::new`](crate::Thunk::new)
//! pins the callable's signature with a [`CallOnce`] bound, and each receiver
//! marker in [`markers`](crate::markers) demands the capability it stands for
//! ([`CallRef`] for [`ByRef`](crate::markers::ByRef), [`CallMut`] for
//! [`ByMut`](crate::markers::ByMut)).
//!
//! Every closure, function and function pointer of arity up to eight
//! implements these traits through blanket implementations, so they never
//! need to be implemented by hand. They matter when writing code that is
//! generic over the callable itself:
//!
//! ```
//! use thunkbox::{Thunk, callable::CallMut};
//!
//! fn store<F>(callable: F) -> Thunk<(), u32>
//! where
//!     F: CallMut<(), Output = u32> + 'static,
//! {
//!     Thunk::new(callable)
//! }
//!
//! let mut count = 0u32;
//! let mut tick = store(move || {
//!     count += 1;
//!     count
//! });
//! assert_eq!(tick.call(), 1);
//! assert_eq!(tick.call(), 2);
//! ```

pub use thunkbox_internals::callable::{CallMut, CallOnce, CallRef};
