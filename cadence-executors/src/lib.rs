#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]
#![doc = include_str!("../README.md")]
//!
//! # Panics in Work
//!
//! Pooled executors ([`ThreadPool`], [`LoopExecutor`]) catch panics from work items, log
//! them and carry on. The one exception is [`Interrupted`], raised via [`interrupt`],
//! which unwinds out of the worker loop instead.  
//! [`InlineExecutor`] catches nothing.

mod config;
mod error;
mod executor;
mod loop_executor;
mod queue;
mod task;
mod thread_pool;
mod work;

#[cfg(feature = "default_executor")]
mod default;

pub use config::{hardware_concurrency, ThreadPoolConfig};
pub use error::{PoolError, QueueClosed, SubmitError, TaskError, TryPullError};
pub use executor::{Executor, InlineExecutor};
pub use loop_executor::{LoopExecutor, LoopMode};
pub use queue::WorkQueue;
pub use task::{packaged_task, TaskFuture};
pub use thread_pool::ThreadPool;
pub use work::{interrupt, Interrupted, Work};

#[cfg(feature = "default_executor")]
pub use default::{default_executor, set_default_executor, shutdown_default_executor};

#[doc = include_str!("../README.md")]
mod readme {}
