#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]
#![doc = include_str!("../README.md")]
//!
//! # Threading Notes
//!
//! Signals never move work to another thread by themselves. [`Signal::emit`] runs every slot
//! on the emitting thread; [`Signal::emit_with`] hands them to an [`Executor`] of the caller's
//! choosing.

mod connection;
mod signal;
mod signal_core;

pub use connection::{Connection, ScopedConnection};
pub use signal::Signal;
pub use signal_core::SignalCore;

pub use cadence_executors::{
	Executor, InlineExecutor, LoopExecutor, SubmitError, TaskError, TaskFuture, ThreadPool,
};

#[cfg(feature = "default_executor")]
pub use cadence_executors::{default_executor, set_default_executor, shutdown_default_executor};

#[doc = include_str!("../README.md")]
mod readme {}
