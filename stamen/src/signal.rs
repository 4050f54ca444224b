use std::{
	cell::{Cell, RefCell},
	fmt::{self, Debug, Formatter},
	rc::Rc,
};

use scopeguard::guard;
use tracing::trace;

use crate::{
	raw::{dispatch, skip_expired, RawSignal, SlotRc},
	receiver::Receiver,
	signature::{Function, Method},
	slot::{FunctionSlot, MethodSlot},
	Connection, Expired, Signature, SlotKey,
};

/// A set of slots with signature `S` that are all called by [`emit`](`Signal::emit`).
///
/// `S` is a function pointer type, for example `Signal<fn(i32, i32) -> i32>`.
///
/// Unlike [`RawSignal`], all operations take `&self`, so slots may connect and disconnect
/// (on this or any other signal) while being called. Each emission calls exactly the slots
/// that were connected when it started:
///
/// - Slots connected during an emission are first called by the next one.
/// - Slots disconnected during an emission are still called by the current one,
///   if it hadn't reached them yet.
///
/// Slots are released when disconnected or when the [`Signal`] is dropped,
/// but never while this [`Signal`] is borrowed internally, so their [`Drop`]
/// implementations may use it too.
///
/// [`Signal`] is neither [`Send`] nor [`Sync`].
pub struct Signal<S: Signature> {
	raw: Rc<RefCell<RawSignal<S>>>,
	depth: Cell<usize>,
}

impl<S: Signature> Default for Signal<S> {
	fn default() -> Self {
		Self::new()
	}
}

impl<S: Signature> Debug for Signal<S> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Signal")
			.field("slots", &self.keys())
			.field("depth", &self.depth.get())
			.finish()
	}
}

impl<S: Signature> From<RawSignal<S>> for Signal<S> {
	fn from(raw: RawSignal<S>) -> Self {
		Self {
			raw: Rc::new(RefCell::new(raw)),
			depth: Cell::new(0),
		}
	}
}

impl<S: Signature> Signal<S> {
	/// Creates a new [`Signal`] without slots.
	#[must_use]
	pub fn new() -> Self {
		RawSignal::new().into()
	}

	/// Connects a free function.
	///
	/// Connecting the same function again replaces the existing slot.
	pub fn connect(&self, function: impl Function<S>) -> Connection<S> {
		let (key, replaced) = self
			.raw
			.borrow_mut()
			.replace(Rc::new(FunctionSlot::<S, _>::new(function)));
		drop(replaced);
		self.connection(key)
	}

	/// Connects `method`, bound to `receiver`.
	///
	/// Only a weak reference to the receiver is kept: Once it is dropped,
	/// [`emit`](`Signal::emit`) skips the slot and [`try_emit`](`Signal::try_emit`) fails.
	///
	/// Connecting the same method to the same receiver again replaces the existing slot.
	pub fn connect_method<T: 'static + ?Sized, R: Receiver<T>, M: Method<T, S>>(
		&self,
		receiver: &R,
		method: M,
	) -> Connection<S> {
		let (key, replaced) = self
			.raw
			.borrow_mut()
			.replace(Rc::new(MethodSlot::<T, R::Weak, S, M>::new(receiver, method)));
		drop(replaced);
		self.connection(key)
	}

	/// Connects a closure.
	///
	/// Each closure gets a new key, ordered after all functions and methods.
	pub fn connect_closure(&self, closure: Box<S::Closure>) -> Connection<S> {
		let key = self.raw.borrow_mut().connect_closure(closure);
		self.connection(key)
	}

	fn connection(&self, key: SlotKey) -> Connection<S> {
		Connection::new(key, Rc::downgrade(&self.raw))
	}

	/// Disconnects a free function.
	///
	/// # Returns
	///
	/// Whether it was connected. Disconnecting an absent slot is a no-op.
	pub fn disconnect(&self, function: impl Function<S>) -> bool {
		self.disconnect_key(SlotKey::of_function::<S>(function))
	}

	/// Disconnects `method` bound to `receiver`.
	///
	/// # Returns
	///
	/// Whether it was connected. Disconnecting an absent slot is a no-op.
	pub fn disconnect_method<T: 'static + ?Sized>(
		&self,
		receiver: &impl Receiver<T>,
		method: impl Method<T, S>,
	) -> bool {
		self.disconnect_key(SlotKey::of_method::<S, T>(receiver, method))
	}

	/// Disconnects the slot with the given `key`.
	///
	/// # Returns
	///
	/// Whether it was connected. Disconnecting an absent slot is a no-op.
	pub fn disconnect_key(&self, key: SlotKey) -> bool {
		let removed = self.raw.borrow_mut().remove(key);
		removed.is_some()
	}

	/// Disconnects and releases all slots.
	pub fn disconnect_all(&self) {
		let slots = self.raw.borrow_mut().take_all();
		drop(slots);
	}

	/// Disconnects all method slots whose receiver is gone.
	///
	/// # Returns
	///
	/// How many slots were disconnected.
	pub fn prune_expired(&self) -> usize {
		let expired = self.raw.borrow_mut().take_expired();
		expired.len()
	}

	/// Calls each live slot once, in key order.
	///
	/// Method slots whose receiver was dropped are skipped.
	/// A panic in a slot propagates to the caller and the remaining slots are not called.
	///
	/// # Returns
	///
	/// The output of the last slot called, or [`Default::default()`] if none was.
	pub fn emit(&self, args: S::Args) -> S::Output
	where
		S::Args: Clone,
		S::Output: Default,
	{
		self.emission(|slots| {
			let Ok(output) = dispatch(slots, args, skip_expired);
			output.unwrap_or_default()
		})
	}

	/// Calls each slot once, in key order, stopping at the first expired one.
	///
	/// # Returns
	///
	/// The output of the last slot, or [`Default::default()`] if there are none.
	///
	/// # Errors
	///
	/// Iff a method slot's receiver was dropped. No further slots are called in that case.
	pub fn try_emit(&self, args: S::Args) -> Result<S::Output, Expired>
	where
		S::Args: Clone,
		S::Output: Default,
	{
		self.emission(|slots| dispatch(slots, args, Err).map(Option::unwrap_or_default))
	}

	fn emission<U>(&self, f: impl FnOnce(&[SlotRc<S>]) -> U) -> U {
		let snapshot = self.raw.borrow().snapshot();
		let depth = guard(&self.depth, |depth| depth.set(depth.get() - 1));
		depth.set(depth.get() + 1);
		trace!(slots = snapshot.len(), depth = depth.get(), "emitting");
		f(&snapshot)
	}

	/// Whether an emission of this [`Signal`] is in progress, i.e. whether this is called from a slot.
	#[must_use]
	pub fn is_emitting(&self) -> bool {
		self.depth.get() > 0
	}

	/// The number of connected slots, expired ones included.
	#[must_use]
	pub fn len(&self) -> usize {
		self.raw.borrow().len()
	}

	/// Whether no slots are connected.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.raw.borrow().is_empty()
	}

	/// Whether a slot with the given `key` is connected.
	#[must_use]
	pub fn contains(&self, key: SlotKey) -> bool {
		self.raw.borrow().contains(key)
	}

	/// The keys of all connected slots, in emission order.
	#[must_use]
	pub fn keys(&self) -> Vec<SlotKey> {
		self.raw.borrow().keys().collect()
	}
}
