//! Call signatures, spelled as function pointer types.
//!
//! A [`Signal`](`crate::Signal`) is parameterised by a plain function pointer type like
//! `fn(i32, i32) -> i32`. Anything [`Copy`] that can be called like that is a [`Function`]
//! of the signature, and anything callable with an additional leading `&T` is a [`Method`]
//! of `T`.
//!
//! Arguments are passed to [`emit`](`crate::Signal::emit`) as a tuple ([`Signature::Args`])
//! and are cloned once per slot except the last.
//!
//! Implemented for owned argument types (`A: 'static`) with up to eight parameters.

/// A function pointer type usable as the call signature of a signal.
///
/// [`address`](`Signature::address`) and [`method_address`](`Signature::method_address`) feed
/// [`Callee::Pointer`](`crate::Callee::Pointer`), so they must be pure.
pub trait Signature: 'static + Copy {
	/// The arguments as a tuple, i.e. `(A, B)` for `fn(A, B) -> R`.
	type Args;

	/// The return type, i.e. `R` for `fn(A, B) -> R`.
	type Output;

	/// The method pointer type for receivers of type `T`, i.e. `fn(&T, A, B) -> R`.
	type MethodPointer<T: 'static + ?Sized>: 'static + Copy;

	/// The erased closure type, i.e. `dyn Fn(A, B) -> R`.
	type Closure: 'static + ?Sized;

	/// Calls `closure` with the unpacked `args`.
	fn call_closure(closure: &Self::Closure, args: Self::Args) -> Self::Output;

	/// The code address of `self`.
	fn address(self) -> usize;

	/// The code address of `method`.
	fn method_address<T: 'static + ?Sized>(method: Self::MethodPointer<T>) -> usize;
}

/// A free function (or other [`Copy`] callable) with signature `S`.
///
/// Implemented for function items, function pointers and closures that are [`Copy`].
pub trait Function<S: Signature>: 'static + Copy {
	/// Calls `self` with the unpacked `args`.
	fn call(self, args: S::Args) -> S::Output;
}

/// A method of `T` (or other [`Copy`] callable taking `&T` first) with signature `S`.
pub trait Method<T: 'static + ?Sized, S: Signature>: 'static + Copy {
	/// Calls `self` on `receiver` with the unpacked `args`.
	fn call(self, receiver: &T, args: S::Args) -> S::Output;
}

macro_rules! signature {
	($($arg:ident: $Arg:ident),*) => {
		impl<R: 'static, $($Arg: 'static),*> Signature for fn($($Arg),*) -> R {
			type Args = ($($Arg,)*);
			type Output = R;
			type MethodPointer<T: 'static + ?Sized> = fn(&T $(, $Arg)*) -> R;
			type Closure = dyn Fn($($Arg),*) -> R;

			fn call_closure(closure: &Self::Closure, ($($arg,)*): Self::Args) -> R {
				closure($($arg),*)
			}

			fn address(self) -> usize {
				self as usize
			}

			fn method_address<T: 'static + ?Sized>(method: Self::MethodPointer<T>) -> usize {
				method as usize
			}
		}

		impl<Callable, R: 'static, $($Arg: 'static),*> Function<fn($($Arg),*) -> R> for Callable
		where
			Callable: 'static + Copy + Fn($($Arg),*) -> R,
		{
			fn call(self, ($($arg,)*): ($($Arg,)*)) -> R {
				self($($arg),*)
			}
		}

		impl<Callable, T: 'static + ?Sized, R: 'static, $($Arg: 'static),*> Method<T, fn($($Arg),*) -> R>
			for Callable
		where
			Callable: 'static + Copy + Fn(&T $(, $Arg)*) -> R,
		{
			fn call(self, receiver: &T, ($($arg,)*): ($($Arg,)*)) -> R {
				self(receiver $(, $arg)*)
			}
		}
	};
}

signature!();
signature!(a: A);
signature!(a: A, b: B);
signature!(a: A, b: B, c: C);
signature!(a: A, b: B, c: C, d: D);
signature!(a: A, b: B, c: C, d: D, e: E);
signature!(a: A, b: B, c: C, d: D, e: E, f: F);
signature!(a: A, b: B, c: C, d: D, e: E, f: F, g: G);
signature!(a: A, b: B, c: C, d: D, e: E, f: F, g: G, h: H);
