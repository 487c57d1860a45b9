#![no_std]
#![forbid(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::missing_docs_in_private_items,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`thunkbox`].
//!
//! # Overview
//!
//! This crate contains the type-erased storage and unsafe dispatch machinery
//! that power the [`thunkbox`] callable container. It exists so that the
//! unsafe core lives in one small, auditable place.
//!
//! **This crate is an implementation detail.** No semantic versioning
//! guarantees are provided. Users should depend on the [`thunkbox`] crate,
//! not this one.
//!
//! # Architecture
//!
//! The crate is built around three types:
//!
//! - `Slot`: a pointer-sized, pointer-aligned chunk of storage. Callables no
//!   larger or more strictly aligned than a pointer live directly in it;
//!   everything else is spilled to a single heap allocation whose pointer is
//!   stored instead.
//! - `ThunkVtable`: a `&'static` table of function pointers, one table per
//!   combination of callable type, argument tuple, storage strategy and
//!   receiver discipline.
//! - [`RawThunk`]: the pairing of a slot with the vtable governing it. A
//!   missing vtable means the thunk is empty, so the whole container is two
//!   words wide with no separate liveness flag.
//!
//! The [`callable`] module provides the tuple-based invocation traits the
//! vtable shims dispatch through. The `thunkbox` facade re-attaches at the
//! type level everything this crate erases: argument types, output type and
//! receiver discipline.
//!
//! # Safety Strategy
//!
//! Type erasure requires careful handling to maintain Rust's type safety
//! guarantees. Once a callable is written into a slot, nothing about the slot
//! remembers its type; the vtable paired with it is the only record of how
//! those bytes must be interpreted.
//!
//! This crate maintains safety through:
//!
//! - **Module-based encapsulation**: Safety-critical types keep fields
//!   module-private, making invariants locally verifiable within a single
//!   file
//! - **Paired construction**: Each vtable constructor bakes its function
//!   pointers from the exact type parameters it was instantiated with, and
//!   each [`RawThunk`] constructor pairs such a vtable with a slot
//!   initialized for the same type and strategy
//! - **Documented contracts**: Every `unsafe fn` states its requirements as a
//!   numbered list, and every unsafe block discharges them explicitly
//!
//! [`thunkbox`]: https://docs.rs/thunkbox/latest/thunkbox/

extern crate alloc;

pub mod callable;
mod thunk;
mod util;

pub use thunk::RawThunk;
