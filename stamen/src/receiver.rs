//! Non-owning back-references to method receivers.
//!
//! Signals never keep their subscribers alive. A bound method holds a [`Receiver::Weak`]
//! and upgrades it only for the duration of one call, so dropping the receiver's last strong
//! handle turns the slot into an expired no-op instead of a dangling reference.

use std::{
	ops::Deref,
	rc::{self, Rc},
	sync::{self, Arc},
};

/// A (strong or weak) handle to a shared receiver of type `T`.
pub trait Receiver<T: ?Sized> {
	/// The weak handle stored in method slots.
	type Weak: WeakReceiver<T>;

	/// Creates a weak handle to the receiver.
	fn downgrade(&self) -> Self::Weak;

	/// The address of the receiver's allocation.
	///
	/// Stable for as long as any handle (strong or weak) to it exists.
	fn address(&self) -> usize;
}

/// A weak handle to a receiver of type `T`.
pub trait WeakReceiver<T: ?Sized>: 'static {
	/// The temporary strong handle obtained by [`upgrade`](`WeakReceiver::upgrade`).
	type Strong: Deref<Target = T>;

	/// Obtains a strong handle, if the receiver is still alive.
	fn upgrade(&self) -> Option<Self::Strong>;

	/// Whether the receiver is still alive.
	fn is_live(&self) -> bool;

	/// The address of the receiver's allocation.
	fn address(&self) -> usize;
}

impl<T: 'static + ?Sized> Receiver<T> for Rc<T> {
	type Weak = rc::Weak<T>;

	fn downgrade(&self) -> Self::Weak {
		Rc::downgrade(self)
	}

	fn address(&self) -> usize {
		Rc::as_ptr(self).cast::<()>().addr()
	}
}

impl<T: 'static + ?Sized> Receiver<T> for rc::Weak<T> {
	type Weak = rc::Weak<T>;

	fn downgrade(&self) -> Self::Weak {
		self.clone()
	}

	fn address(&self) -> usize {
		self.as_ptr().cast::<()>().addr()
	}
}

impl<T: 'static + ?Sized> WeakReceiver<T> for rc::Weak<T> {
	type Strong = Rc<T>;

	fn upgrade(&self) -> Option<Self::Strong> {
		rc::Weak::upgrade(self)
	}

	fn is_live(&self) -> bool {
		self.strong_count() > 0
	}

	fn address(&self) -> usize {
		self.as_ptr().cast::<()>().addr()
	}
}

impl<T: 'static + ?Sized> Receiver<T> for Arc<T> {
	type Weak = sync::Weak<T>;

	fn downgrade(&self) -> Self::Weak {
		Arc::downgrade(self)
	}

	fn address(&self) -> usize {
		Arc::as_ptr(self).cast::<()>().addr()
	}
}

impl<T: 'static + ?Sized> Receiver<T> for sync::Weak<T> {
	type Weak = sync::Weak<T>;

	fn downgrade(&self) -> Self::Weak {
		self.clone()
	}

	fn address(&self) -> usize {
		self.as_ptr().cast::<()>().addr()
	}
}

impl<T: 'static + ?Sized> WeakReceiver<T> for sync::Weak<T> {
	type Strong = Arc<T>;

	fn upgrade(&self) -> Option<Self::Strong> {
		sync::Weak::upgrade(self)
	}

	fn is_live(&self) -> bool {
		self.strong_count() > 0
	}

	fn address(&self) -> usize {
		self.as_ptr().cast::<()>().addr()
	}
}
