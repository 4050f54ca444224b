//! Type-erased call targets.
//!
//! [`Slot`] is the one interface a signal dispatches through. The three implementations here
//! cover free functions, methods bound to a weakly held receiver and boxed closures.
//! Signals construct and own these, so most code never names them directly.

use std::{
	fmt::{self, Debug, Formatter},
	marker::PhantomData,
};

use crate::{
	receiver::{Receiver, WeakReceiver},
	signature::{Function, Method},
	Expired, Signature, SlotKey,
};

/// A call target with signature `S`.
pub trait Slot<S: Signature> {
	/// This slot's identity within a signal.
	fn key(&self) -> SlotKey;

	/// Calls the target once.
	///
	/// # Errors
	///
	/// Iff the target is a method whose receiver was dropped.
	/// The method is not called in that case.
	fn invoke(&self, args: S::Args) -> Result<S::Output, Expired>;

	/// Whether [`invoke`](`Slot::invoke`) would reach the target.
	fn is_live(&self) -> bool {
		true
	}
}

/// Calls a free function.
pub struct FunctionSlot<S: Signature, F: Function<S>> {
	function: F,
	key: SlotKey,
	_phantom: PhantomData<S>,
}

impl<S: Signature, F: Function<S>> FunctionSlot<S, F> {
	/// Wraps `function`.
	pub fn new(function: F) -> Self {
		Self {
			key: SlotKey::of_function::<S>(function),
			function,
			_phantom: PhantomData,
		}
	}
}

impl<S: Signature, F: Function<S>> Slot<S> for FunctionSlot<S, F> {
	fn key(&self) -> SlotKey {
		self.key
	}

	fn invoke(&self, args: S::Args) -> Result<S::Output, Expired> {
		Ok(<F as Function<S>>::call(self.function, args))
	}
}

impl<S: Signature, F: Function<S>> Debug for FunctionSlot<S, F> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("FunctionSlot").field(&self.key).finish()
	}
}

/// Calls a method on a weakly held receiver.
pub struct MethodSlot<T: 'static + ?Sized, W: WeakReceiver<T>, S: Signature, M: Method<T, S>> {
	receiver: W,
	method: M,
	key: SlotKey,
	_phantom: PhantomData<(fn(&T), S)>,
}

impl<T: 'static + ?Sized, W: WeakReceiver<T>, S: Signature, M: Method<T, S>> MethodSlot<T, W, S, M> {
	/// Binds `method` to `receiver` without keeping the receiver alive.
	pub fn new(receiver: &impl Receiver<T, Weak = W>, method: M) -> Self {
		Self {
			key: SlotKey::of_method::<S, T>(receiver, method),
			receiver: receiver.downgrade(),
			method,
			_phantom: PhantomData,
		}
	}
}

impl<T: 'static + ?Sized, W: WeakReceiver<T>, S: Signature, M: Method<T, S>> Slot<S>
	for MethodSlot<T, W, S, M>
{
	fn key(&self) -> SlotKey {
		self.key
	}

	fn invoke(&self, args: S::Args) -> Result<S::Output, Expired> {
		// The strong handle lives until the method returns, so the receiver
		// can't be dropped out from under it by the method itself.
		let receiver = self.receiver.upgrade().ok_or(Expired { key: self.key })?;
		Ok(<M as Method<T, S>>::call(self.method, &*receiver, args))
	}

	fn is_live(&self) -> bool {
		self.receiver.is_live()
	}
}

impl<T: 'static + ?Sized, W: WeakReceiver<T>, S: Signature, M: Method<T, S>> Debug
	for MethodSlot<T, W, S, M>
{
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("MethodSlot")
			.field("key", &self.key)
			.field("live", &self.is_live())
			.finish_non_exhaustive()
	}
}

/// Calls a boxed closure.
///
/// Closures have no identity of their own, so the key is assigned at construction.
pub struct ClosureSlot<S: Signature> {
	id: u64,
	closure: Box<S::Closure>,
}

impl<S: Signature> ClosureSlot<S> {
	/// Wraps `closure` under [`SlotKey::Closure`] with the given `id`.
	pub fn new(id: u64, closure: Box<S::Closure>) -> Self {
		Self { id, closure }
	}
}

impl<S: Signature> Slot<S> for ClosureSlot<S> {
	fn key(&self) -> SlotKey {
		SlotKey::Closure { id: self.id }
	}

	fn invoke(&self, args: S::Args) -> Result<S::Output, Expired> {
		Ok(S::call_closure(&self.closure, args))
	}
}

impl<S: Signature> Debug for ClosureSlot<S> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ClosureSlot").field(&self.key()).finish()
	}
}
