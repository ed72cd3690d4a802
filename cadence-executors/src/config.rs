use std::{num::NonZeroUsize, thread};

/// Construction parameters for a [`ThreadPool`](`crate::ThreadPool`).
///
/// The [`Default`] uses [`hardware_concurrency`] workers named `cadence-worker-{index}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadPoolConfig {
	/// Number of worker threads. `0` creates a closed pool that never runs anything.
	pub thread_count: usize,
	/// Prefix of each worker's thread name. The worker index is appended.
	pub thread_name: String,
	/// Stack size for worker threads, or [`None`] for the platform default.
	pub stack_size: Option<usize>,
}

impl Default for ThreadPoolConfig {
	fn default() -> Self {
		Self {
			thread_count: hardware_concurrency(),
			thread_name: "cadence-worker".to_owned(),
			stack_size: None,
		}
	}
}

impl ThreadPoolConfig {
	/// Sets [`thread_count`](`ThreadPoolConfig::thread_count`).
	#[must_use]
	pub fn with_thread_count(self, thread_count: usize) -> Self {
		Self {
			thread_count,
			..self
		}
	}

	/// Sets [`thread_name`](`ThreadPoolConfig::thread_name`).
	#[must_use]
	pub fn with_thread_name(self, thread_name: impl Into<String>) -> Self {
		Self {
			thread_name: thread_name.into(),
			..self
		}
	}

	/// Sets [`stack_size`](`ThreadPoolConfig::stack_size`).
	#[must_use]
	pub fn with_stack_size(self, stack_size: usize) -> Self {
		Self {
			stack_size: Some(stack_size),
			..self
		}
	}
}

/// The number of threads the platform can run in parallel, or `1` if unknown.
#[must_use]
pub fn hardware_concurrency() -> usize {
	thread::available_parallelism().map_or(1, NonZeroUsize::get)
}
