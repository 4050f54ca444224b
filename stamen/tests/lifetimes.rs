use std::{cell::Cell, rc::Rc};

use stamen::{Connection, Expired, Signal, SlotKey};
use _validator::Validator;

type Tick = fn(u8) -> u8;

thread_local! {
	static LOG: Validator<&'static str> = const { Validator::new() };
}

fn tick(n: u8) -> u8 {
	LOG.with(|v| v.push("tick"));
	n
}

struct Listener;

impl Listener {
	fn listen(&self, n: u8) -> u8 {
		LOG.with(|v| v.push("listen"));
		n * 2
	}
}

#[test]
fn receivers_are_not_kept_alive() {
	let listener = Rc::new(Listener);

	let signal = Signal::<Tick>::new();
	signal.connect_method(&listener, Listener::listen);
	assert_eq!(Rc::strong_count(&listener), 1);
	assert_eq!(Rc::weak_count(&listener), 1);

	// Replacing the slot releases the old one.
	signal.connect_method(&listener, Listener::listen);
	assert_eq!(Rc::weak_count(&listener), 1);

	signal.disconnect_method(&listener, Listener::listen);
	assert_eq!(Rc::weak_count(&listener), 0);

	signal.connect_method(&listener, Listener::listen);
	drop(signal);
	assert_eq!(Rc::weak_count(&listener), 0);
}

#[test]
fn expired_receivers_are_skipped() {
	let listener = Rc::new(Listener);

	let signal = Signal::<Tick>::new();
	signal.connect(tick);
	let connection = signal.connect_method(&listener, Listener::listen);

	assert_eq!(signal.emit((3,)), 6);
	LOG.with(|v| v.expect(["tick", "listen"]));

	drop(listener);
	assert_eq!(signal.emit((3,)), 3);
	LOG.with(|v| v.expect(["tick"]));

	// Still connected until pruned or disconnected.
	assert_eq!(signal.len(), 2);
	assert!(connection.is_connected());

	assert_eq!(signal.prune_expired(), 1);
	assert_eq!(signal.prune_expired(), 0);
	assert!(!connection.is_connected());
	assert_eq!(signal.keys(), [SlotKey::of_function::<Tick>(tick)]);
}

#[test]
fn only_expired_slots_emit_nothing() {
	let listener = Rc::new(Listener);

	let signal = Signal::<Tick>::new();
	signal.connect_method(&listener, Listener::listen);
	drop(listener);

	assert_eq!(signal.emit((3,)), 0);
	LOG.with(|v| v.expect([]));
}

#[test]
fn try_emit_stops_at_expired_receivers() {
	let listener = Rc::new(Listener);

	let signal = Signal::<Tick>::new();
	signal.connect(tick);
	let method = signal.connect_method(&listener, Listener::listen);
	signal.connect_closure(Box::new(|n| {
		LOG.with(|v| v.push("closure"));
		n + 1
	}));

	assert_eq!(signal.try_emit((1,)), Ok(2));
	LOG.with(|v| v.expect(["tick", "listen", "closure"]));

	drop(listener);
	let error = signal.try_emit((1,)).unwrap_err();
	assert_eq!(error, Expired { key: method.key() });
	assert!(error.to_string().starts_with("receiver of slot method "));
	LOG.with(|v| v.expect(["tick"]));

	assert!(method.disconnect());
	assert_eq!(signal.try_emit((1,)), Ok(2));
	LOG.with(|v| v.expect(["tick", "closure"]));
}

#[test]
fn try_emit_on_empty_signal() {
	assert_eq!(Signal::<Tick>::new().try_emit((1,)), Ok(0));
}

#[test]
fn connections_outlive_their_signal() {
	let signal = Signal::<Tick>::new();
	let connection = signal.connect(tick);
	assert!(connection.is_connected());

	drop(signal);
	assert!(!connection.is_connected());
	assert!(!connection.disconnect());
}

#[test]
fn connection_handles() {
	let signal = Signal::<Tick>::new();
	let connection = signal.connect(tick);
	let clone = connection.clone();
	assert_eq!(clone.key(), SlotKey::of_function::<Tick>(tick));

	assert!(clone.disconnect());
	assert!(!connection.is_connected());
	assert!(!connection.disconnect());
	assert!(signal.is_empty());
}

#[test]
fn connections_follow_their_key() {
	let signal = Signal::<Tick>::new();
	let first = signal.connect(tick);
	let second = signal.connect(tick);
	assert_eq!(signal.len(), 1);

	// Both refer to the replacing slot.
	assert!(first.is_connected());
	assert!(first.disconnect());
	assert!(!second.is_connected());

	// Also after reconnecting.
	signal.connect(tick);
	assert!(second.is_connected());
	assert!(first.disconnect());
	assert!(signal.is_empty());
}

#[test]
fn scoped_connections() {
	let signal = Signal::<Tick>::new();

	{
		let scoped = signal.connect(tick).scoped();
		assert!(scoped.is_connected());
		assert_eq!(signal.emit((4,)), 4);
	}
	assert!(signal.is_empty());

	let released = signal.connect(tick).scoped().release();
	assert!(released.is_connected());
	assert_eq!(signal.emit((4,)), 4);
	LOG.with(|v| v.expect(["tick", "tick"]));

	let scoped = signal.connect(tick).scoped();
	drop(signal);
	drop(scoped);
}

#[test]
fn closures_are_released() {
	let drops = Rc::new(Cell::new(0));

	struct DropCounter(Rc<Cell<u32>>);
	impl Drop for DropCounter {
		fn drop(&mut self) {
			self.0.set(self.0.get() + 1);
		}
	}

	let closure = |drops: &Rc<Cell<u32>>| -> Box<dyn Fn(u8) -> u8> {
		let counter = DropCounter(Rc::clone(drops));
		Box::new(move |n| {
			let _ = &counter;
			n
		})
	};

	let signal = Signal::<Tick>::new();
	let a = signal.connect_closure(closure(&drops));
	signal.connect_closure(closure(&drops));
	signal.connect_closure(closure(&drops));
	assert_eq!(drops.get(), 0);

	assert!(a.disconnect());
	assert_eq!(drops.get(), 1);

	signal.disconnect_all();
	assert_eq!(drops.get(), 3);

	signal.connect_closure(closure(&drops));
	drop(signal);
	assert_eq!(drops.get(), 4);
}

#[test]
fn released_slots_may_use_their_signal() {
	struct DisconnectOnDrop(Connection<Tick>);
	impl Drop for DisconnectOnDrop {
		fn drop(&mut self) {
			self.0.disconnect();
		}
	}

	let signal = Signal::<Tick>::new();
	let other = signal.connect(tick);
	let guard = DisconnectOnDrop(other.clone());
	let first = signal.connect_closure(Box::new(move |n| {
		let _ = &guard;
		n
	}));
	assert_eq!(signal.len(), 2);

	// Dropping the closure disconnects `tick`.
	assert!(first.disconnect());
	assert!(!other.is_connected());
	assert!(signal.is_empty());

	let guard = DisconnectOnDrop(signal.connect(tick));
	signal.connect_closure(Box::new(move |n| {
		let _ = &guard;
		n
	}));
	signal.disconnect_all();
	assert!(signal.is_empty());

	let guard = DisconnectOnDrop(signal.connect(tick));
	signal.connect_closure(Box::new(move |n| {
		let _ = &guard;
		n
	}));
	drop(signal);
}
