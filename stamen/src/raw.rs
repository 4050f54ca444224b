//! The registry underlying [`Signal`](`crate::Signal`).
//!
//! [`RawSignal`] is a plain key-ordered map from [`SlotKey`] to owned slot objects with
//! `&mut self` mutators. It can't be modified during its own emission at all, which makes it
//! the right choice when the connection set is built once and then only emitted.

use std::{
	collections::BTreeMap,
	convert::Infallible,
	fmt::{self, Debug, Formatter},
	rc::Rc,
};

use tracing::{debug, trace};

use crate::{
	receiver::Receiver,
	signature::{Function, Method},
	slot::{ClosureSlot, FunctionSlot, MethodSlot, Slot},
	Expired, Signature, SlotKey,
};

pub(crate) type SlotRc<S> = Rc<dyn Slot<S>>;

/// A key-ordered set of slots sharing the signature `S`.
///
/// At most one slot is stored per [`SlotKey`]. Connecting the same function, or the same
/// receiver and method, again replaces the previous slot.
pub struct RawSignal<S: Signature> {
	slots: BTreeMap<SlotKey, SlotRc<S>>,
	next_closure_id: u64,
}

impl<S: Signature> Default for RawSignal<S> {
	fn default() -> Self {
		Self::new()
	}
}

impl<S: Signature> Debug for RawSignal<S> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("RawSignal")
			.field("slots", &self.slots.keys().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}

impl<S: Signature> RawSignal<S> {
	/// Creates a new empty [`RawSignal`].
	#[must_use]
	pub fn new() -> Self {
		Self {
			slots: BTreeMap::new(),
			next_closure_id: 0,
		}
	}

	/// Connects a free function.
	pub fn connect(&mut self, function: impl Function<S>) -> SlotKey {
		self.replace(Rc::new(FunctionSlot::<S, _>::new(function))).0
	}

	/// Connects `method`, bound to `receiver`.
	///
	/// Only a weak reference to the receiver is kept.
	pub fn connect_method<T: 'static + ?Sized, R: Receiver<T>, M: Method<T, S>>(
		&mut self,
		receiver: &R,
		method: M,
	) -> SlotKey {
		self.replace(Rc::new(MethodSlot::<T, R::Weak, S, M>::new(receiver, method)))
			.0
	}

	/// Connects a closure under a fresh [`SlotKey::Closure`].
	///
	/// The returned key is the only way to disconnect it individually.
	pub fn connect_closure(&mut self, closure: Box<S::Closure>) -> SlotKey {
		let id = self.next_closure_id;
		self.next_closure_id += 1;
		self.replace(Rc::new(ClosureSlot::new(id, closure))).0
	}

	/// Inserts `slot`, returning its key and the slot it replaced.
	pub(crate) fn replace(&mut self, slot: SlotRc<S>) -> (SlotKey, Option<SlotRc<S>>) {
		let key = slot.key();
		let replaced = self.slots.insert(key, slot);
		trace!(key = %key, replaced = replaced.is_some(), "connected slot");
		(key, replaced)
	}

	/// Disconnects a free function.
	///
	/// # Returns
	///
	/// Whether it was connected. Disconnecting an absent slot is a no-op.
	pub fn disconnect(&mut self, function: impl Function<S>) -> bool {
		self.disconnect_key(SlotKey::of_function::<S>(function))
	}

	/// Disconnects `method` bound to `receiver`.
	///
	/// This works after the receiver was dropped too, as long as a weak handle to it remains.
	///
	/// # Returns
	///
	/// Whether it was connected. Disconnecting an absent slot is a no-op.
	pub fn disconnect_method<T: 'static + ?Sized>(
		&mut self,
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
	pub fn disconnect_key(&mut self, key: SlotKey) -> bool {
		self.remove(key).is_some()
	}

	pub(crate) fn remove(&mut self, key: SlotKey) -> Option<SlotRc<S>> {
		let removed = self.slots.remove(&key);
		if removed.is_some() {
			trace!(key = %key, "disconnected slot");
		}
		removed
	}

	/// Disconnects and drops all slots.
	pub fn disconnect_all(&mut self) {
		drop(self.take_all());
	}

	pub(crate) fn take_all(&mut self) -> BTreeMap<SlotKey, SlotRc<S>> {
		let slots = std::mem::take(&mut self.slots);
		if !slots.is_empty() {
			trace!(count = slots.len(), "disconnected all slots");
		}
		slots
	}

	/// Drops all method slots whose receiver is gone.
	///
	/// # Returns
	///
	/// How many slots were dropped.
	pub fn prune_expired(&mut self) -> usize {
		self.take_expired().len()
	}

	pub(crate) fn take_expired(&mut self) -> Vec<SlotRc<S>> {
		let expired: Vec<SlotKey> = self
			.slots
			.iter()
			.filter(|(_, slot)| !slot.is_live())
			.map(|(key, _)| *key)
			.collect();
		expired
			.into_iter()
			.filter_map(|key| {
				debug!(key = %key, "pruned expired slot");
				self.slots.remove(&key)
			})
			.collect()
	}

	/// Calls each live slot once, in key order.
	///
	/// Method slots whose receiver was dropped are skipped.
	///
	/// # Returns
	///
	/// The output of the last slot called, or [`Default::default()`] if none was.
	pub fn emit(&self, args: S::Args) -> S::Output
	where
		S::Args: Clone,
		S::Output: Default,
	{
		let Ok(output) = dispatch(self.slots.values(), args, skip_expired);
		output.unwrap_or_default()
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
		dispatch(self.slots.values(), args, Err).map(Option::unwrap_or_default)
	}

	/// The number of connected slots, expired ones included.
	#[must_use]
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	/// Whether no slots are connected.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// Whether a slot with the given `key` is connected.
	#[must_use]
	pub fn contains(&self, key: SlotKey) -> bool {
		self.slots.contains_key(&key)
	}

	/// The keys of all connected slots, in emission order.
	pub fn keys(&self) -> impl '_ + ExactSizeIterator<Item = SlotKey> {
		self.slots.keys().copied()
	}

	/// Clones the current slot set, in emission order.
	pub(crate) fn snapshot(&self) -> Vec<SlotRc<S>> {
		self.slots.values().cloned().collect()
	}
}

impl<S: Signature> Drop for RawSignal<S> {
	fn drop(&mut self) {
		self.disconnect_all();
	}
}

/// Calls each of `slots` once with a clone of `args` (the last one receives `args` itself).
///
/// `on_expired` decides whether an expired slot aborts the emission.
/// Panics inside a slot unwind through this function, so later slots are not called.
pub(crate) fn dispatch<'a, S: Signature, E>(
	slots: impl IntoIterator<Item = &'a SlotRc<S>>,
	args: S::Args,
	mut on_expired: impl FnMut(Expired) -> Result<(), E>,
) -> Result<Option<S::Output>, E>
where
	S::Args: Clone,
{
	let mut output = None;
	let mut deliver = |slot: &SlotRc<S>, args: S::Args| -> Result<(), E> {
		match slot.invoke(args) {
			Ok(value) => output = Some(value),
			Err(expired) => on_expired(expired)?,
		}
		Ok(())
	};

	let mut slots = slots.into_iter();
	let Some(mut current) = slots.next() else {
		return Ok(None);
	};
	for next in slots {
		deliver(current, args.clone())?;
		current = next;
	}
	deliver(current, args)?;

	Ok(output)
}

#[allow(clippy::unnecessary_wraps)]
pub(crate) fn skip_expired(expired: Expired) -> Result<(), Infallible> {
	debug!(key = %expired.key, "skipped expired slot");
	Ok(())
}
