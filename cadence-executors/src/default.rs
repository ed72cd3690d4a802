//! The process-wide [`ThreadPool`] shared by components that don't bring their own.
//!
//! Created on first use of [`default_executor`]. Statics are never dropped, so the pool's
//! workers only join if it is taken out with [`shutdown_default_executor`] (or replaced with
//! [`set_default_executor`]) and the last [`Arc`] to it goes away.

use std::sync::Arc;

use parking_lot::{const_rwlock, RwLock};
use tracing::debug;

use crate::{PoolError, ThreadPool, ThreadPoolConfig};

static DEFAULT_EXECUTOR: RwLock<Option<Arc<ThreadPool>>> = const_rwlock(None);

/// Returns the shared default pool, creating it with [`ThreadPoolConfig::default`] if needed.
///
/// # Errors
///
/// Iff the pool had to be created and a worker failed to spawn.
pub fn default_executor() -> Result<Arc<ThreadPool>, PoolError> {
	if let Some(pool) = &*DEFAULT_EXECUTOR.read() {
		return Ok(Arc::clone(pool));
	}

	let mut slot = DEFAULT_EXECUTOR.write();
	if let Some(pool) = &*slot {
		return Ok(Arc::clone(pool));
	}
	let pool = Arc::new(ThreadPool::with_config(&ThreadPoolConfig::default())?);
	debug!(threads = pool.thread_count(), "created default executor");
	*slot = Some(Arc::clone(&pool));
	Ok(pool)
}

/// Installs `pool` as the default executor, e.g. a small or closed pool for tests.
///
/// **Returns** the previous default, if one was created.
pub fn set_default_executor(pool: Arc<ThreadPool>) -> Option<Arc<ThreadPool>> {
	DEFAULT_EXECUTOR.write().replace(pool)
}

/// Removes the default executor. The next [`default_executor`] call creates a fresh one.
///
/// **Returns** the removed pool. Dropping the last [`Arc`] to it shuts it down and joins its
/// workers.
pub fn shutdown_default_executor() -> Option<Arc<ThreadPool>> {
	DEFAULT_EXECUTOR.write().take()
}
