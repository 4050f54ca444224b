use std::{
	any::{type_name, Any, TypeId},
	cmp::Ordering,
	fmt::{self, Display, Formatter},
	hash::{Hash, Hasher},
};

use crate::{
	receiver::Receiver,
	signature::{Function, Method},
	Signature,
};

/// Identity of the code a slot calls.
///
/// Every function item and closure has its own type, so those are identified by [`TypeId`].
/// This keeps distinct functions apart even when the compiler merges their machine code.
/// Only function pointers, whose type is shared, fall back to their address.
///
/// A function item and a pointer to it are different [`Callee`]s.
/// A [`Copy`] closure is identified by its type alone, regardless of what it captured.
#[derive(Debug, Clone, Copy)]
pub enum Callee {
	/// A function item or closure.
	Item {
		/// The callable's type.
		type_id: TypeId,
		/// The callable's type name, for display only.
		name: &'static str,
	},
	/// A function pointer.
	Pointer {
		/// The pointer's code address.
		address: usize,
	},
}

impl Callee {
	/// Derives the identity of `function`.
	#[must_use]
	pub fn of_function<S: Signature>(function: impl Function<S>) -> Self {
		match (&function as &dyn Any).downcast_ref::<S>() {
			Some(pointer) => Self::Pointer {
				address: pointer.address(),
			},
			None => Self::of_item(&function),
		}
	}

	/// Derives the identity of `method`.
	#[must_use]
	pub fn of_method<S: Signature, T: 'static + ?Sized>(method: impl Method<T, S>) -> Self {
		match (&method as &dyn Any).downcast_ref::<S::MethodPointer<T>>() {
			Some(pointer) => Self::Pointer {
				address: S::method_address(*pointer),
			},
			None => Self::of_item(&method),
		}
	}

	fn of_item<F: 'static>(_: &F) -> Self {
		Self::Item {
			type_id: TypeId::of::<F>(),
			name: type_name::<F>(),
		}
	}
}

impl PartialEq for Callee {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}

impl Eq for Callee {}

impl PartialOrd for Callee {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

/// Items before pointers. `name` is ignored.
impl Ord for Callee {
	fn cmp(&self, other: &Self) -> Ordering {
		match (self, other) {
			(Self::Item { type_id: a, .. }, Self::Item { type_id: b, .. }) => a.cmp(b),
			(Self::Pointer { address: a }, Self::Pointer { address: b }) => a.cmp(b),
			(Self::Item { .. }, Self::Pointer { .. }) => Ordering::Less,
			(Self::Pointer { .. }, Self::Item { .. }) => Ordering::Greater,
		}
	}
}

impl Hash for Callee {
	fn hash<H: Hasher>(&self, state: &mut H) {
		match self {
			Self::Item { type_id, .. } => {
				state.write_u8(0);
				type_id.hash(state);
			}
			Self::Pointer { address } => {
				state.write_u8(1);
				address.hash(state);
			}
		}
	}
}

impl Display for Callee {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::Item { name, .. } => f.write_str(name),
			Self::Pointer { address } => write!(f, "{address:#x}"),
		}
	}
}

/// Identity of a connected slot.
///
/// Keys are derived from what a slot calls, never from the slot object itself,
/// so deriving a key twice from the same function, or the same receiver and method,
/// yields equal keys. This is what makes disconnecting by identity work.
///
/// The [`Ord`] implementation is the emission order of a [`Signal`](`crate::Signal`):
/// all functions (by [`Callee`]), then all methods (by receiver allocation, then [`Callee`]),
/// then all closures (by connection order).
/// The order between different [`Callee`]s is arbitrary but fixed for a given build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotKey {
	/// A free function.
	Function {
		/// The function's identity.
		function: Callee,
	},
	/// A method bound to a receiver.
	Method {
		/// The address of the receiver's allocation.
		receiver: usize,
		/// The method's identity.
		method: Callee,
	},
	/// A boxed closure, which has no identity of its own.
	Closure {
		/// Assigned by the signal in connection order.
		id: u64,
	},
}

impl SlotKey {
	/// Derives the key of `function`.
	#[must_use]
	pub fn of_function<S: Signature>(function: impl Function<S>) -> Self {
		Self::Function {
			function: Callee::of_function::<S>(function),
		}
	}

	/// Derives the key of `method` bound to `receiver`.
	///
	/// `receiver` may be a strong or a weak handle. Both yield the same key.
	#[must_use]
	pub fn of_method<S: Signature, T: 'static + ?Sized>(
		receiver: &impl Receiver<T>,
		method: impl Method<T, S>,
	) -> Self {
		Self::Method {
			receiver: receiver.address(),
			method: Callee::of_method::<S, T>(method),
		}
	}

	/// Whether this key identifies a free function.
	#[must_use]
	pub fn is_function(&self) -> bool {
		matches!(self, Self::Function { .. })
	}

	/// Whether this key identifies a bound method.
	#[must_use]
	pub fn is_method(&self) -> bool {
		matches!(self, Self::Method { .. })
	}

	/// Whether this key identifies a closure.
	#[must_use]
	pub fn is_closure(&self) -> bool {
		matches!(self, Self::Closure { .. })
	}
}

impl Display for SlotKey {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::Function { function } => write!(f, "fn {function}"),
			Self::Method { receiver, method } => write!(f, "method {method} on {receiver:#x}"),
			Self::Closure { id } => write!(f, "closure#{id}"),
		}
	}
}
