#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::as_ptr_cast_mut,
    clippy::ptr_as_ptr,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Extra checks on nightly
#![cfg_attr(nightly_extra_checks, feature(rustdoc_missing_doc_code_examples))]
#![cfg_attr(nightly_extra_checks, forbid(rustdoc::missing_doc_code_examples))]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A lightweight, move-only, type-erased callable container for Rust.
//!
//! ## Overview
//!
//! This crate provides [`Thunk`], a container that stores any callable with a
//! matching signature behind a fixed-size handle. Like `Box<dyn FnMut(..)>`,
//! a [`Thunk`] erases the concrete callable type; unlike it, a [`Thunk`]
//! stores pointer-sized callables inline without touching the heap, can
//! represent the absence of a callable, and comes in variants for all three
//! calling disciplines (`Fn`, `FnMut`, and `FnOnce`).
//!
//! ## Quick Example
//!
//! ```
//! use thunkbox::Thunk;
//!
//! let mut total = 0u32;
//! let mut tick: Thunk<(u32,), u32> = Thunk::new(move |amount: u32| {
//!     total += amount;
//!     total
//! });
//!
//! assert_eq!(tick.call(1), 1);
//! assert_eq!(tick.call(2), 3);
//!
//! // Thunks are move-only: hand them off instead of cloning them.
//! let mut elsewhere = tick.take();
//! assert!(tick.is_empty());
//! assert_eq!(elsewhere.call(3), 6);
//! ```
//!
//! ## Storage Model
//!
//! A [`Thunk`] is two pointers wide: one word of dispatch metadata and one
//! word of storage. Callables that are no larger and no more strictly aligned
//! than a pointer (function pointers, zero-capture closures, closures
//! capturing a single reference) live directly in the storage word. Larger
//! callables are moved to a single heap allocation, and the storage word
//! holds the pointer to it. Both representations behave identically; the
//! split is purely an allocation optimization.
//!
//! For implementation details, see the [`thunkbox-internals`] crate.
//!
//! [`thunkbox-internals`]: thunkbox_internals
//!
//! ## Project Goals
//!
//! - **Lightweight**: A `Thunk` is two words, its empty state lives in a
//!   pointer niche rather than an extra flag, and small callables never
//!   allocate.
//! - **Move-only**: Callables are never required to be `Clone`, so a `Thunk`
//!   can hold resources like file handles or channel endpoints.
//! - **Explicitly empty**: A `Thunk` can be empty, checked with
//!   [`Thunk::is_empty`]. This supports callback slots that are set and
//!   cleared over time without wrapping in `Option`.
//! - **Typed thread safety**: Whether a thunk may cross threads is tracked in
//!   the type system rather than decided at runtime.
//! - **`no_std` friendly**: Only `alloc` is required.
//!
//! ## Type Parameters
//!
//! The [`Thunk`] type is generic over five parameters:
//! `Thunk<Args, Output, Receiver, ThreadSafety, Unwind>`. The first two are
//! the call signature; the rest are markers with sensible defaults.
//!
//! ### Receiver: How the Callable Is Borrowed
//!
//! **[`ByMut`]** (default) requires `FnMut` and invokes through `&mut self`.
//! This fits most callback slots.
//!
//! **[`ByRef`]** requires `Fn` and invokes through `&self`, so a thunk can be
//! shared while being called.
//!
//! **[`ByOnce`]** requires only `FnOnce` and consumes the thunk on
//! invocation, which lets the callable give away its captured state:
//!
//! ```
//! use thunkbox::{Thunk, markers::ByOnce};
//!
//! let message = String::from("deferred");
//! let deliver: Thunk<(), String, ByOnce> = Thunk::new(move || message);
//! assert_eq!(deliver.call(), "deferred");
//! // deliver.call(); // ❌ Won't compile: `deliver` was consumed above
//! ```
//!
//! ### Thread Safety: Local vs Sendable
//!
//! **[`Local`]** (default) accepts any callable, including ones capturing
//! `Rc` or other `!Send` state, and pins the thunk to its thread.
//!
//! **[`Sendable`]** only accepts `Send` callables and makes the thunk itself
//! `Send`:
//!
//! ```
//! use thunkbox::{
//!     Thunk,
//!     markers::{ByOnce, Sendable},
//! };
//!
//! let task: Thunk<(), u32, ByOnce, Sendable> = Thunk::new(|| 6 * 7);
//! let handle = std::thread::spawn(move || task.call());
//! assert_eq!(handle.join().unwrap(), 42);
//! ```
//!
//! ### Unwind Behavior: MayUnwind vs NoUnwind
//!
//! **[`MayUnwind`]** (default) lets panics propagate out of
//! [`call`](Thunk::call) like they would out of a plain closure.
//!
//! **[`NoUnwind`]** aborts the process if the callable panics. Use it where
//! an unwinding callable cannot be tolerated, such as callbacks invoked from
//! foreign code.
//!
//! ## Emptiness
//!
//! A [`Thunk`] either holds a callable or is empty. [`Thunk::empty`] (also
//! [`Default`]) creates an empty thunk, [`Thunk::is_empty`] checks for one,
//! and [`Thunk::take`] moves the callable out while leaving the source
//! empty. Invoking an empty thunk panics:
//!
//! ```should_panic
//! use thunkbox::Thunk;
//!
//! let mut slot: Thunk<(), ()> = Thunk::empty();
//! slot.call(); // panics: attempted to invoke an empty `Thunk`
//! ```
//!
//! ## Converting Between Thunk Variants
//!
//! Markers can always be weakened, never strengthened: a `Sendable` thunk
//! converts into a `Local` one, and a `NoUnwind` thunk into a `MayUnwind`
//! one, either through the [`From`] trait or through named methods that can
//! help with type inference and more clearly communicate intent:
//!
//! - [`Thunk::into_local`] converts from `Thunk<*, *, *, Sendable, *>` to
//!   `Thunk<*, *, *, Local, *>`.
//! - [`Thunk::into_may_unwind`] converts from `Thunk<*, *, *, *, NoUnwind>`
//!   to `Thunk<*, *, *, *, MayUnwind>`.
//!
//! Conversions in the other direction do not exist: there is no way to prove
//! after the fact that an erased callable is `Send`, so a sendable thunk must
//! be constructed as one.
//!
//! [`ByRef`]: crate::markers::ByRef
//! [`ByMut`]: crate::markers::ByMut
//! [`ByOnce`]: crate::markers::ByOnce
//! [`Local`]: crate::markers::Local
//! [`Sendable`]: crate::markers::Sendable
//! [`MayUnwind`]: crate::markers::MayUnwind
//! [`NoUnwind`]: crate::markers::NoUnwind

extern crate alloc;

pub mod callable;
pub mod markers;

mod thunk;
mod util;

pub use self::thunk::Thunk;
