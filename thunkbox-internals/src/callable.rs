//! Receiver-capability traits describing how a stored callable may be invoked.
//!
//! The traits in this module mirror the [`Fn`]/[`FnMut`]/[`FnOnce`] hierarchy,
//! but take their arguments as a single packed tuple instead of an unpacked
//! argument list. The dispatch functions stored in a thunk vtable are generic
//! over the argument tuple type, so they cannot unpack it themselves. They
//! instead forward the whole tuple to one of these traits, and the per-arity
//! blanket implementations below do the unpacking.
//!
//! The traits form a hierarchy matching the standard one:
//!
//! - [`CallOnce`]: the callable can be invoked at most once, by value.
//! - [`CallMut`]: the callable can be invoked repeatedly through `&mut self`.
//! - [`CallRef`]: the callable can be invoked repeatedly through `&self`.

/// A callable that can be invoked at most once, consuming itself.
///
/// Implemented for every [`FnOnce`] closure or function of arity up to eight,
/// with `Args` being the packed argument tuple. The `Sized` supertrait is
/// deliberate: stored callables are always concrete sized values, never trait
/// objects.
pub trait CallOnce<Args>: Sized {
    /// The type returned by invoking the callable.
    type Output;

    /// Invokes the callable with the packed argument tuple, consuming it.
    fn call_once(self, args: Args) -> Self::Output;
}

/// A callable that can be invoked repeatedly through a mutable reference.
///
/// Implemented for every [`FnMut`] closure or function of arity up to eight.
pub trait CallMut<Args>: CallOnce<Args> {
    /// Invokes the callable with the packed argument tuple.
    fn call_mut(&mut self, args: Args) -> Self::Output;
}

/// A callable that can be invoked repeatedly through a shared reference.
///
/// Implemented for every [`Fn`] closure or function of arity up to eight.
pub trait CallRef<Args>: CallMut<Args> {
    /// Invokes the callable with the packed argument tuple.
    fn call_ref(&self, args: Args) -> Self::Output;
}

/// Implements [`CallOnce`], [`CallMut`] and [`CallRef`] for closures of a
/// fixed arity, unpacking the argument tuple into a normal argument list.
macro_rules! impl_callable {
    ($($ty:ident $arg:ident),*) => {
        impl<Func, Ret, $($ty),*> CallOnce<($($ty,)*)> for Func
        where
            Func: FnOnce($($ty),*) -> Ret,
        {
            type Output = Ret;

            #[inline]
            fn call_once(self, ($($arg,)*): ($($ty,)*)) -> Ret {
                self($($arg),*)
            }
        }

        impl<Func, Ret, $($ty),*> CallMut<($($ty,)*)> for Func
        where
            Func: FnMut($($ty),*) -> Ret,
        {
            #[inline]
            fn call_mut(&mut self, ($($arg,)*): ($($ty,)*)) -> Ret {
                self($($arg),*)
            }
        }

        impl<Func, Ret, $($ty),*> CallRef<($($ty,)*)> for Func
        where
            Func: Fn($($ty),*) -> Ret,
        {
            #[inline]
            fn call_ref(&self, ($($arg,)*): ($($ty,)*)) -> Ret {
                self($($arg),*)
            }
        }
    };
}

impl_callable!();
impl_callable!(A0 a0);
impl_callable!(A0 a0, A1 a1);
impl_callable!(A0 a0, A1 a1, A2 a2);
impl_callable!(A0 a0, A1 a1, A2 a2, A3 a3);
impl_callable!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4);
impl_callable!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_callable!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
impl_callable!(A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
