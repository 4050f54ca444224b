use std::{
	cell::RefCell,
	fmt::{self, Debug, Formatter},
	mem,
	ops::Deref,
	rc::Weak,
};

use crate::{raw::RawSignal, Signature, SlotKey};

/// A handle to one slot of a [`Signal`](`crate::Signal`).
///
/// Doesn't keep the [`Signal`](`crate::Signal`) alive. Once it is gone,
/// the [`Connection`] reports itself as disconnected.
///
/// A [`Connection`] refers to its [`SlotKey`], not to one particular slot. It also controls
/// any later slot connected under the same key:
///
/// - a slot that replaced the original one by connecting the same function or method again,
/// - a method slot whose receiver was allocated at the address of an earlier, fully released receiver
///   (after the original slot was disconnected or pruned).
///
/// Drop [`Connection`]s whose slot is gone to avoid the latter.
pub struct Connection<S: Signature> {
	key: SlotKey,
	signal: Weak<RefCell<RawSignal<S>>>,
}

impl<S: Signature> Clone for Connection<S> {
	fn clone(&self) -> Self {
		Self {
			key: self.key,
			signal: Weak::clone(&self.signal),
		}
	}
}

impl<S: Signature> Debug for Connection<S> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Connection")
			.field("key", &self.key)
			.field("connected", &self.is_connected())
			.finish()
	}
}

impl<S: Signature> Connection<S> {
	pub(crate) fn new(key: SlotKey, signal: Weak<RefCell<RawSignal<S>>>) -> Self {
		Self { key, signal }
	}

	/// The key of the connected slot.
	#[must_use]
	pub fn key(&self) -> SlotKey {
		self.key
	}

	/// Whether the signal still exists and has a slot with this [`Connection`]'s key.
	#[must_use]
	pub fn is_connected(&self) -> bool {
		self.signal
			.upgrade()
			.is_some_and(|signal| signal.borrow().contains(self.key))
	}

	/// Disconnects the slot.
	///
	/// # Returns
	///
	/// Whether it was connected. Disconnecting again or after the signal was dropped is a no-op.
	pub fn disconnect(&self) -> bool {
		let Some(signal) = self.signal.upgrade() else {
			return false;
		};
		let removed = signal.borrow_mut().remove(self.key);
		removed.is_some()
	}

	/// Converts this [`Connection`] into one that disconnects when dropped.
	pub fn scoped(self) -> ScopedConnection<S> {
		ScopedConnection(self)
	}
}

/// A [`Connection`] that disconnects its slot when dropped.
#[must_use = "Scoped connections disconnect when dropped."]
pub struct ScopedConnection<S: Signature>(Connection<S>);

impl<S: Signature> ScopedConnection<S> {
	/// Stops this [`ScopedConnection`] from disconnecting its slot.
	#[must_use]
	pub fn release(mut self) -> Connection<S> {
		let detached = Connection::new(self.0.key, Weak::new());
		mem::replace(&mut self.0, detached)
	}
}

impl<S: Signature> Deref for ScopedConnection<S> {
	type Target = Connection<S>;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl<S: Signature> Debug for ScopedConnection<S> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ScopedConnection").field(&self.0).finish()
	}
}

impl<S: Signature> Drop for ScopedConnection<S> {
	fn drop(&mut self) {
		self.0.disconnect();
	}
}
