//! Type-erased work items and the [`Interrupted`] unwinding marker.

use std::{
	any::Any,
	fmt::{self, Debug, Display, Formatter},
	panic::{catch_unwind, resume_unwind, AssertUnwindSafe},
};

/// One unit of deferred work, invoked at most once.
///
/// Wraps any `'static + Send + FnOnce()`. Executors box submitted closures into this
/// before queueing them.
pub struct Work(Box<dyn 'static + Send + FnOnce()>);

impl Debug for Work {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Work").finish_non_exhaustive()
	}
}

impl Work {
	/// Erases `f` into a [`Work`] item.
	pub fn new(f: impl 'static + Send + FnOnce()) -> Self {
		Self(Box::new(f))
	}

	/// Runs the work on the current thread, consuming it.
	///
	/// Panics from the work propagate.
	pub fn run(self) {
		(self.0)();
	}

	/// Runs the work, containing any panic except [`Interrupted`].
	pub(crate) fn run_contained(self) -> Outcome {
		match catch_unwind(AssertUnwindSafe(self.0)) {
			Ok(()) => Outcome::Completed,
			Err(payload) if is_interrupted(&*payload) => resume_unwind(payload),
			Err(payload) => Outcome::Panicked(panic_message(&*payload)),
		}
	}
}

pub(crate) enum Outcome {
	Completed,
	Panicked(String),
}

/// Panic payload that stops the worker running the current work item.
///
/// Executors let this unwind out of their loops instead of containing it like other panics.
/// Raise it with [`interrupt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Interrupted;

impl Display for Interrupted {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str("worker interrupted")
	}
}

/// Unwinds with an [`Interrupted`] payload.
///
/// Called from within work on a [`ThreadPool`](`crate::ThreadPool`), this ends that worker
/// thread; the pool keeps serving with its remaining workers. Called within
/// [`LoopExecutor::run_loop`](`crate::LoopExecutor::run_loop`), it unwinds out of the loop
/// into its caller.
///
/// The panic hook is not invoked.
pub fn interrupt() -> ! {
	resume_unwind(Box::new(Interrupted))
}

pub(crate) fn is_interrupted(payload: &(dyn Any + Send)) -> bool {
	payload.is::<Interrupted>()
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&'static str>() {
		(*message).to_owned()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"Box<dyn Any>".to_owned()
	}
}
