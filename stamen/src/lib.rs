#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]
#![doc = include_str!("../README.md")]
//!
//! # Threading Notes
//!
//! [`Signal`] is built on [`Rc`](`std::rc::Rc`) and [`RefCell`](`std::cell::RefCell`) and stays on one thread.
//! Receivers may be [`Arc`](`std::sync::Arc`)s regardless, but are only ever upgraded on that thread.

mod connection;
pub use connection::{Connection, ScopedConnection};

mod error;
pub use error::Expired;

mod key;
pub use key::{Callee, SlotKey};

mod signal;
pub use signal::Signal;

mod signature;
pub use signature::{Function, Method, Signature};

pub mod raw;
pub mod receiver;
pub mod slot;
