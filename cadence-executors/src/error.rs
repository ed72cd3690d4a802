//! Error types shared by the executors.

use std::{fmt, io};

use thiserror::Error;

/// Returned when work is submitted to an executor that no longer accepts any.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
	/// The executor's work queue is closed.
	///
	/// This is the case for a [`ThreadPool`](`crate::ThreadPool`) created with zero threads,
	/// and for any executor that is shutting down. The rejected work was dropped unrun.
	#[error("executor is closed and no longer accepts work")]
	Closed,
}

/// Failure to bring up a [`ThreadPool`](`crate::ThreadPool`).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PoolError {
	/// The operating system refused to start a worker thread.
	///
	/// Workers started before this one have already been shut down again.
	#[error("failed to spawn worker thread {index}")]
	Spawn {
		/// Zero-based index of the worker that failed to start.
		index: usize,
		/// The underlying spawn error.
		#[source]
		source: io::Error,
	},
}

/// Why a [`TaskFuture`](`crate::TaskFuture`) did not produce a value.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
	/// The task panicked. Carries the panic message, if it was a string.
	#[error("task panicked: {0}")]
	Panicked(String),
	/// The task was interrupted or dropped before it ran.
	#[error("task was cancelled before completing")]
	Cancelled,
}

/// A push into a closed [`WorkQueue`](`crate::WorkQueue`). Gives the item back.
#[derive(Error, Clone, Copy, PartialEq, Eq)]
#[error("work queue is closed")]
pub struct QueueClosed<T>(pub T);

impl<T> fmt::Debug for QueueClosed<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("QueueClosed(..)")
	}
}

impl<T> QueueClosed<T> {
	/// Takes back the rejected item.
	pub fn into_inner(self) -> T {
		self.0
	}
}

/// Result of a non-blocking pull from a [`WorkQueue`](`crate::WorkQueue`).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryPullError {
	/// Nothing is queued right now, but more may arrive.
	#[error("work queue is empty")]
	Empty,
	/// Nothing is queued and the queue is closed, so nothing ever will be.
	#[error("work queue is closed and drained")]
	Closed,
}
