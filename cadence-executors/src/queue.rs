//! A closable, blocking FIFO shared between producers and workers.

use std::{
	collections::VecDeque,
	fmt::{self, Debug, Formatter},
	sync::atomic::{AtomicBool, Ordering},
};

use parking_lot::{Condvar, Mutex};

use crate::{QueueClosed, TryPullError};

/// Thread-safe FIFO queue that can be closed.
///
/// While open, [`push`](`WorkQueue::push`) accepts items and [`wait_pull`](`WorkQueue::wait_pull`)
/// blocks until one arrives. Once [closed](`WorkQueue::close`), pushes are rejected but items
/// already queued can still be pulled, so nothing present at closure is lost silently.
pub struct WorkQueue<T> {
	state: Mutex<QueueState<T>>,
	available: Condvar,
}

struct QueueState<T> {
	items: VecDeque<T>,
	closed: bool,
}

impl<T> Debug for WorkQueue<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let state = self.state.lock();
		f.debug_struct("WorkQueue")
			.field("len", &state.items.len())
			.field("closed", &state.closed)
			.finish()
	}
}

impl<T> Default for WorkQueue<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> WorkQueue<T> {
	/// Creates an empty, open queue.
	#[must_use]
	pub fn new() -> Self {
		Self {
			state: Mutex::new(QueueState {
				items: VecDeque::new(),
				closed: false,
			}),
			available: Condvar::new(),
		}
	}

	/// Appends `item` and wakes one waiting puller.
	///
	/// # Errors
	///
	/// Iff the queue is closed, in which case `item` is handed back.
	pub fn push(&self, item: T) -> Result<(), QueueClosed<T>> {
		let mut state = self.state.lock();
		if state.closed {
			return Err(QueueClosed(item));
		}
		state.items.push_back(item);
		drop(state);
		self.available.notify_one();
		Ok(())
	}

	/// Takes the front item, blocking while the queue is open and empty.
	///
	/// **Returns** [`None`] only once the queue is closed *and* drained.
	pub fn wait_pull(&self) -> Option<T> {
		let mut state = self.state.lock();
		loop {
			if let Some(item) = state.items.pop_front() {
				return Some(item);
			}
			if state.closed {
				return None;
			}
			self.available.wait(&mut state);
		}
	}

	/// Like [`wait_pull`](`WorkQueue::wait_pull`), but also gives up once `stop` is set.
	///
	/// Whoever sets `stop` must call [`wake_all`](`WorkQueue::wake_all`) afterwards.
	pub fn wait_pull_unless(&self, stop: &AtomicBool) -> Option<T> {
		let mut state = self.state.lock();
		loop {
			if stop.load(Ordering::Acquire) {
				return None;
			}
			if let Some(item) = state.items.pop_front() {
				return Some(item);
			}
			if state.closed {
				return None;
			}
			self.available.wait(&mut state);
		}
	}

	/// Takes the front item without blocking.
	///
	/// # Errors
	///
	/// [`TryPullError::Empty`] if nothing is queued yet,
	/// [`TryPullError::Closed`] if nothing is queued and the queue is closed.
	pub fn try_pull(&self) -> Result<T, TryPullError> {
		let mut state = self.state.lock();
		match state.items.pop_front() {
			Some(item) => Ok(item),
			None if state.closed => Err(TryPullError::Closed),
			None => Err(TryPullError::Empty),
		}
	}

	/// Stops accepting items and wakes all blocked pullers.
	///
	/// **Idempotent.**
	pub fn close(&self) {
		self.state.lock().closed = true;
		self.available.notify_all();
	}

	/// Wakes all blocked pullers so they can re-check their stop condition.
	pub fn wake_all(&self) {
		// Taking the lock orders this after any puller's stop-check.
		drop(self.state.lock());
		self.available.notify_all();
	}

	/// Removes and returns everything currently queued, in order.
	pub fn drain(&self) -> Vec<T> {
		self.state.lock().items.drain(..).collect()
	}

	/// Whether [`close`](`WorkQueue::close`) was called.
	#[must_use]
	pub fn is_closed(&self) -> bool {
		self.state.lock().closed
	}

	/// Number of queued items.
	#[must_use]
	pub fn len(&self) -> usize {
		self.state.lock().items.len()
	}

	/// Whether no items are queued.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
