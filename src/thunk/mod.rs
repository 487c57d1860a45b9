//! The [`Thunk`] type and its inherent API.
//!
//! The type itself, its lifecycle methods and its marker conversions live in
//! [`owned`], while construction from closures and the `call` methods are
//! generated per arity in [`calls`].

mod calls;
mod owned;

pub use owned::Thunk;
