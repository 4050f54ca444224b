use thiserror::Error;

use crate::SlotKey;

/// A method slot was invoked after its receiver was dropped.
///
/// Returned by [`Signal::try_emit`](`crate::Signal::try_emit`), which stops at the first expired slot.
/// [`Signal::emit`](`crate::Signal::emit`) skips expired slots instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("receiver of slot {key} was dropped")]
pub struct Expired {
	/// The key of the expired slot.
	pub key: SlotKey,
}
