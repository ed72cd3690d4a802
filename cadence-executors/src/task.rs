//! Packaged tasks: work paired with a future for its outcome.

use std::{
	fmt::{self, Debug, Formatter},
	future::Future,
	panic::{catch_unwind, resume_unwind, AssertUnwindSafe},
	pin::Pin,
	sync::Arc,
	task::{Context, Poll, Wake, Waker},
	thread::{self, Thread},
	time::{Duration, Instant},
};

use futures_channel::oneshot;

use crate::{
	work::{is_interrupted, panic_message},
	TaskError, Work,
};

/// Wraps `f` into a [`Work`] item and a [`TaskFuture`] that receives its outcome.
///
/// The work catches panics from `f` and forwards them to the future as
/// [`TaskError::Panicked`], so executors never see them.
/// [`Interrupted`](`crate::Interrupted`) still unwinds through; the future then reports
/// [`TaskError::Cancelled`], as it does if the work is dropped without running.
pub fn packaged_task<T, F>(f: F) -> (Work, TaskFuture<T>)
where
	T: 'static + Send,
	F: 'static + Send + FnOnce() -> T,
{
	let (sender, receiver) = oneshot::channel();
	let work = Work::new(move || match catch_unwind(AssertUnwindSafe(f)) {
		Err(payload) if is_interrupted(&*payload) => resume_unwind(payload),
		result => {
			// The caller may have stopped caring.
			let _ = sender.send(result);
		}
	});
	(work, TaskFuture { receiver })
}

/// The result channel of a [`packaged_task`].
///
/// Await it, or block on it with [`wait`](`TaskFuture::wait`) or
/// [`wait_timeout`](`TaskFuture::wait_timeout`).
#[must_use = "Dropping a `TaskFuture` discards the task's result (but not the task)."]
pub struct TaskFuture<T> {
	receiver: oneshot::Receiver<thread::Result<T>>,
}

impl<T> Debug for TaskFuture<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("TaskFuture").finish_non_exhaustive()
	}
}

impl<T> Future for TaskFuture<T> {
	type Output = Result<T, TaskError>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		Pin::new(&mut self.receiver).poll(cx).map(|received| match received {
			Ok(Ok(value)) => Ok(value),
			Ok(Err(payload)) => Err(TaskError::Panicked(panic_message(&*payload))),
			Err(oneshot::Canceled) => Err(TaskError::Cancelled),
		})
	}
}

impl<T> TaskFuture<T> {
	/// Takes the outcome if the task has finished, without blocking.
	///
	/// **Returns** [`None`] while the task is still pending.  
	/// After the outcome was taken once, further calls report [`TaskError::Cancelled`].
	pub fn try_take(&mut self) -> Option<Result<T, TaskError>> {
		match self.receiver.try_recv() {
			Ok(Some(Ok(value))) => Some(Ok(value)),
			Ok(Some(Err(payload))) => Some(Err(TaskError::Panicked(panic_message(&*payload)))),
			Ok(None) => None,
			Err(oneshot::Canceled) => Some(Err(TaskError::Cancelled)),
		}
	}

	/// Blocks the current thread until the task finishes.
	///
	/// # Errors
	///
	/// As described on [`TaskError`].
	pub fn wait(self) -> Result<T, TaskError> {
		futures_lite::future::block_on(self)
	}

	/// Blocks the current thread until the task finishes or `timeout` elapses.
	///
	/// **Returns** [`None`] on timeout. The future stays usable.
	pub fn wait_timeout(&mut self, timeout: Duration) -> Option<Result<T, TaskError>> {
		let deadline = Instant::now() + timeout;
		let waker = Waker::from(Arc::new(Unparker(thread::current())));
		let mut cx = Context::from_waker(&waker);
		loop {
			if let Poll::Ready(outcome) = Pin::new(&mut *self).poll(&mut cx) {
				return Some(outcome);
			}
			let now = Instant::now();
			if now >= deadline {
				return None;
			}
			thread::park_timeout(deadline - now);
		}
	}
}

struct Unparker(Thread);

impl Wake for Unparker {
	fn wake(self: Arc<Self>) {
		self.0.unpark();
	}

	fn wake_by_ref(self: &Arc<Self>) {
		self.0.unpark();
	}
}
