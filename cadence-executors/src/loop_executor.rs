use std::{
	fmt::{self, Debug, Formatter},
	sync::atomic::{AtomicBool, AtomicU64, Ordering},
	thread,
};

use parking_lot::Mutex;
use tracing::{error, trace, warn};

use crate::{work::Outcome, Executor, SubmitError, TryPullError, Work, WorkQueue};

/// How [`LoopExecutor::run_loop`] waits for work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoopMode {
	/// Block on the queue until work arrives.
	#[default]
	WaitSleep,
	/// Poll the queue, yielding the thread whenever it is empty.
	TryYield,
}

/// An executor driven by a thread that lends itself to it.
///
/// Submitted work queues up until some thread calls [`run_loop`](`LoopExecutor::run_loop`),
/// [`run_queued_closures`](`LoopExecutor::run_queued_closures`) or
/// [`try_run_one_closure`](`LoopExecutor::try_run_one_closure`). Only one thread drives the
/// executor at a time; concurrent callers wait their turn. (Calling these from work running
/// on the same executor therefore deadlocks.)
///
/// Panicking work is logged and skipped. [`Interrupted`](`crate::Interrupted`) unwinds into
/// the driving thread.
pub struct LoopExecutor {
	queue: WorkQueue<Work>,
	mode: LoopMode,
	exit_loop: AtomicBool,
	in_loop: Mutex<()>,
	failed: AtomicU64,
}

impl Debug for LoopExecutor {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("LoopExecutor")
			.field("mode", &self.mode)
			.field("queue", &self.queue)
			.field("in_loop", &self.in_loop.is_locked())
			.finish_non_exhaustive()
	}
}

impl Default for LoopExecutor {
	fn default() -> Self {
		Self::new()
	}
}

impl LoopExecutor {
	/// Creates a [`LoopMode::WaitSleep`] executor.
	#[must_use]
	pub fn new() -> Self {
		Self::with_mode(LoopMode::default())
	}

	/// Creates an executor whose [`run_loop`](`LoopExecutor::run_loop`) waits as `mode` says.
	#[must_use]
	pub fn with_mode(mode: LoopMode) -> Self {
		Self {
			queue: WorkQueue::new(),
			mode,
			exit_loop: AtomicBool::new(false),
			in_loop: Mutex::new(()),
			failed: AtomicU64::new(0),
		}
	}

	/// The configured [`LoopMode`].
	#[must_use]
	pub fn mode(&self) -> LoopMode {
		self.mode
	}

	/// Runs queued and incoming work on the current thread.
	///
	/// Returns once [`make_loop_exit`](`LoopExecutor::make_loop_exit`) was called (during this
	/// loop) or the executor is [closed](`LoopExecutor::close`).
	pub fn run_loop(&self) {
		let _in_loop = self.in_loop.lock();
		self.exit_loop.store(false, Ordering::Release);
		trace!(mode = ?self.mode, "entering executor loop");

		match self.mode {
			LoopMode::WaitSleep => {
				while let Some(work) = self.queue.wait_pull_unless(&self.exit_loop) {
					self.run(work);
				}
			}
			LoopMode::TryYield => {
				while !self.exit_loop.load(Ordering::Acquire) {
					match self.queue.try_pull() {
						Ok(work) => {
							self.run(work);
						}
						Err(TryPullError::Empty) => thread::yield_now(),
						Err(TryPullError::Closed) => break,
					}
				}
			}
		}
		trace!("left executor loop");
	}

	/// Runs the work that is queued right now, but nothing submitted meanwhile.
	///
	/// Stops early if a work item calls [`make_loop_exit`](`LoopExecutor::make_loop_exit`);
	/// the rest stays queued.
	pub fn run_queued_closures(&self) {
		let _in_loop = self.in_loop.lock();
		self.exit_loop.store(false, Ordering::Release);

		for _ in 0..self.queue.len() {
			if self.exit_loop.load(Ordering::Acquire) {
				return;
			}
			match self.queue.try_pull() {
				Ok(work) => {
					self.run(work);
				}
				Err(_) => return,
			}
		}
	}

	/// Runs at most one queued work item.
	///
	/// **Returns** whether a work item ran to completion.
	pub fn try_run_one_closure(&self) -> bool {
		let _in_loop = self.in_loop.lock();
		match self.queue.try_pull() {
			Ok(work) => self.run(work),
			Err(_) => false,
		}
	}

	/// Asks the current [`run_loop`](`LoopExecutor::run_loop`) to return after its current
	/// work item.
	///
	/// Has no effect on loops started afterwards.
	pub fn make_loop_exit(&self) {
		self.exit_loop.store(true, Ordering::Release);
		self.queue.wake_all();
	}

	/// Stops accepting work. A running loop returns once it has drained the queue.
	pub fn close(&self) {
		self.queue.close();
	}

	/// Number of submitted work items that have not started yet.
	#[must_use]
	pub fn uninitiated_task_count(&self) -> usize {
		self.queue.len()
	}

	/// Number of work items that panicked so far.
	#[must_use]
	pub fn failed_count(&self) -> u64 {
		self.failed.load(Ordering::Acquire)
	}

	fn run(&self, work: Work) -> bool {
		match work.run_contained() {
			Outcome::Completed => true,
			Outcome::Panicked(message) => {
				self.failed.fetch_add(1, Ordering::AcqRel);
				error!(%message, "work item panicked");
				false
			}
		}
	}
}

impl Executor for LoopExecutor {
	fn execute(&self, work: Work) -> Result<(), SubmitError> {
		self.queue.push(work).map_err(|_| SubmitError::Closed)
	}
}

impl Drop for LoopExecutor {
	fn drop(&mut self) {
		self.queue.close();
		let discarded = self.queue.drain().len();
		if discarded > 0 {
			warn!(discarded, "dropping loop executor with unrun work");
		}
	}
}
