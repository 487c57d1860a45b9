//! Storage, dispatch tables and the type-erased container for callables.
//!
//! The types in this module split the problem of owning a type-erased
//! callable into three pieces:
//!
//! - [`slot::Slot`]: a pointer-sized chunk of storage holding either the
//!   callable itself or a pointer to its heap allocation.
//! - [`vtable::ThunkVtable`]: a per-type table of function pointers that
//!   knows how to invoke and destroy the slot's contents.
//! - [`raw::RawThunk`]: the pairing of the two, which is the only type
//!   exposed outside this module.

mod raw;
mod slot;
mod vtable;

pub use raw::RawThunk;
