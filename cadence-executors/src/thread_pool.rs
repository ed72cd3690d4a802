use std::{
	fmt::{self, Debug, Formatter},
	sync::{
		atomic::{AtomicU64, AtomicUsize, Ordering},
		Arc,
	},
	thread::{self, JoinHandle},
};

use scopeguard::guard;
use tracing::{debug, error, trace, warn};

use crate::{
	work::{is_interrupted, panic_message, Outcome},
	Executor, PoolError, SubmitError, ThreadPoolConfig, Work, WorkQueue,
};

/// A fixed set of worker threads serving one shared [`WorkQueue`].
///
/// Each worker pulls work in FIFO order and runs it. A panicking work item is logged, counted
/// (see [`failed_count`](`ThreadPool::failed_count`)) and otherwise ignored, so it never takes
/// down its worker or the pool. [`Interrupted`](`crate::Interrupted`) is the exception: it ends
/// the worker that raised it.
///
/// # Shutdown
///
/// Dropping the pool closes the queue, lets the workers drain everything that was already
/// queued and then joins them. Work is only ever rejected after the close.
pub struct ThreadPool {
	queue: Arc<WorkQueue<Work>>,
	workers: Vec<JoinHandle<()>>,
	stats: Arc<PoolStats>,
}

#[derive(Default)]
struct PoolStats {
	failed: AtomicU64,
	live: AtomicUsize,
}

impl Debug for ThreadPool {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("ThreadPool")
			.field("thread_count", &self.workers.len())
			.field("live_thread_count", &self.live_thread_count())
			.field("queue", &self.queue)
			.field("failed_count", &self.failed_count())
			.finish()
	}
}

impl ThreadPool {
	/// Starts a pool of `thread_count` workers with otherwise default configuration.
	///
	/// With `thread_count == 0`, the pool is closed from the start: submissions are rejected
	/// and nothing ever runs.
	///
	/// # Errors
	///
	/// Iff a worker thread fails to spawn.
	pub fn new(thread_count: usize) -> Result<Self, PoolError> {
		Self::with_config(&ThreadPoolConfig::default().with_thread_count(thread_count))
	}

	/// Starts a pool as described by `config`.
	///
	/// # Errors
	///
	/// Iff a worker thread fails to spawn. Already-started workers are joined before returning.
	pub fn with_config(config: &ThreadPoolConfig) -> Result<Self, PoolError> {
		let mut pool = Self {
			queue: Arc::new(WorkQueue::new()),
			workers: Vec::with_capacity(config.thread_count),
			stats: Arc::default(),
		};
		if config.thread_count == 0 {
			pool.queue.close();
		}

		for index in 0..config.thread_count {
			let mut builder =
				thread::Builder::new().name(format!("{}-{index}", config.thread_name));
			if let Some(stack_size) = config.stack_size {
				builder = builder.stack_size(stack_size);
			}

			let worker = Worker {
				index,
				queue: Arc::clone(&pool.queue),
				stats: Arc::clone(&pool.stats),
			};
			pool.stats.live.fetch_add(1, Ordering::AcqRel);
			match builder.spawn(move || worker.run()) {
				Ok(handle) => pool.workers.push(handle),
				Err(source) => {
					pool.stats.live.fetch_sub(1, Ordering::AcqRel);
					// Dropping `pool` joins the workers started so far.
					return Err(PoolError::Spawn { index, source });
				}
			}
		}

		debug!(threads = config.thread_count, "thread pool started");
		Ok(pool)
	}

	/// Closes the pool, runs all queued work and joins the workers.
	///
	/// This is what dropping the pool does, spelled out.  
	/// **Returns** the final [`failed_count`](`ThreadPool::failed_count`).
	pub fn shutdown(self) -> u64 {
		let stats = Arc::clone(&self.stats);
		drop(self);
		stats.failed.load(Ordering::Acquire)
	}

	/// Number of worker threads the pool was started with.
	#[must_use]
	pub fn thread_count(&self) -> usize {
		self.workers.len()
	}

	/// Number of workers that have not exited yet.
	///
	/// Lower than [`thread_count`](`ThreadPool::thread_count`) only after workers were
	/// [interrupted](`crate::interrupt`) or during shutdown.
	#[must_use]
	pub fn live_thread_count(&self) -> usize {
		self.stats.live.load(Ordering::Acquire)
	}

	/// Number of submitted work items that no worker has picked up yet.
	#[must_use]
	pub fn queued_count(&self) -> usize {
		self.queue.len()
	}

	/// Number of work items that panicked so far. Interruptions are not counted.
	#[must_use]
	pub fn failed_count(&self) -> u64 {
		self.stats.failed.load(Ordering::Acquire)
	}
}

impl Executor for ThreadPool {
	fn execute(&self, work: Work) -> Result<(), SubmitError> {
		self.queue.push(work).map_err(|_| SubmitError::Closed)
	}
}

impl Drop for ThreadPool {
	fn drop(&mut self) {
		self.queue.close();

		let current = thread::current().id();
		let mut detached = false;
		for handle in self.workers.drain(..) {
			if handle.thread().id() == current {
				// The last handle was dropped by work running on this very worker.
				// It drains the queue and exits on its own.
				detached = true;
				continue;
			}
			match handle.join() {
				Ok(()) => (),
				Err(payload) if is_interrupted(&*payload) => {
					trace!("joined interrupted worker");
				}
				Err(payload) => {
					error!(message = %panic_message(&*payload), "worker thread panicked");
				}
			}
		}

		let discarded = if detached { 0 } else { self.queue.drain().len() };
		if discarded > 0 {
			warn!(discarded, "discarding work left behind by interrupted workers");
		}
		debug!(failed = self.failed_count(), "thread pool shut down");
	}
}

struct Worker {
	index: usize,
	queue: Arc<WorkQueue<Work>>,
	stats: Arc<PoolStats>,
}

impl Worker {
	fn run(self) {
		let index = self.index;
		let _live = guard(Arc::clone(&self.stats), move |stats| {
			stats.live.fetch_sub(1, Ordering::AcqRel);
			trace!(worker = index, "worker exited");
		});
		trace!(worker = index, "worker started");

		// Closed queues still yield what they hold, so this drains before returning.
		while let Some(work) = self.queue.wait_pull() {
			if let Outcome::Panicked(message) = work.run_contained() {
				self.stats.failed.fetch_add(1, Ordering::AcqRel);
				error!(worker = index, %message, "work item panicked");
			}
		}
	}
}
