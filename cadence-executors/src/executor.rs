use std::sync::Arc;

use crate::{packaged_task, SubmitError, TaskFuture, Work};

/// Anything that work can be submitted to.
///
/// Implementors only provide [`execute`](`Executor::execute`). [`submit`](`Executor::submit`)
/// and [`submit_task`](`Executor::submit_task`) are conveniences on top of it.
///
/// An executor guarantees that accepted work is invoked at most once. What happens to a panic
/// from that work is up to the executor; results that matter to the caller should travel
/// through a [`TaskFuture`] instead.
pub trait Executor {
	/// Accepts an already-erased work item.
	///
	/// # Errors
	///
	/// [`SubmitError::Closed`] iff the executor no longer accepts work. `work` is dropped unrun.
	fn execute(&self, work: Work) -> Result<(), SubmitError>;

	/// Erases `work` and [executes](`Executor::execute`) it.
	///
	/// # Errors
	///
	/// [`SubmitError::Closed`] iff the executor no longer accepts work.
	fn submit<W>(&self, work: W) -> Result<(), SubmitError>
	where
		W: 'static + Send + FnOnce(),
		Self: Sized,
	{
		self.execute(Work::new(work))
	}

	/// Submits `f` paired with a [`TaskFuture`] that receives its result or panic.
	///
	/// # Errors
	///
	/// [`SubmitError::Closed`] iff the executor no longer accepts work.
	fn submit_task<T, F>(&self, f: F) -> Result<TaskFuture<T>, SubmitError>
	where
		T: 'static + Send,
		F: 'static + Send + FnOnce() -> T,
		Self: Sized,
	{
		let (work, future) = packaged_task(f);
		self.execute(work)?;
		Ok(future)
	}
}

impl<E: ?Sized + Executor> Executor for &E {
	fn execute(&self, work: Work) -> Result<(), SubmitError> {
		(**self).execute(work)
	}
}

impl<E: ?Sized + Executor> Executor for Arc<E> {
	fn execute(&self, work: Work) -> Result<(), SubmitError> {
		(**self).execute(work)
	}
}

/// Runs submitted work synchronously on the submitting thread.
///
/// For contexts that need an [`Executor`] but no concurrency, like tests.
/// Panics from the work propagate straight out of [`submit`](`Executor::submit`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineExecutor;

impl InlineExecutor {
	/// Creates an [`InlineExecutor`].
	#[must_use]
	pub const fn new() -> Self {
		Self
	}
}

impl Executor for InlineExecutor {
	fn execute(&self, work: Work) -> Result<(), SubmitError> {
		work.run();
		Ok(())
	}
}
