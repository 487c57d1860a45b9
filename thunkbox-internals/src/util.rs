//! Internal utility types

/// A helper trait used to force turbofish syntax in unsafe casting methods.
///
/// Methods that reinterpret the bytes of a storage slot are only sound when
/// the caller names the exact type the slot was initialized with. Taking the
/// type as a normal generic parameter would allow it to be chosen silently by
/// type inference. By going through this trait and returning
/// [`CastTo::Target`] instead of the parameter itself, inference has nothing
/// to latch onto, and callers are forced to spell the type out explicitly.
pub(crate) trait CastTo: 'static {
    /// The type the cast produces. Always equal to `Self`.
    type Target: 'static;
}

impl<T: 'static> CastTo for T {
    type Target = T;
}
