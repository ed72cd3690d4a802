#![cfg(feature = "default_executor")]

use std::sync::Arc;

use cadence_executors::{
	default_executor, set_default_executor, shutdown_default_executor, Executor, ThreadPool,
	ThreadPoolConfig,
};

// One test, since the default executor is process-wide state.
#[test]
fn lifecycle() {
	let first = default_executor().unwrap();
	assert!(Arc::ptr_eq(&first, &default_executor().unwrap()));
	assert_eq!(first.submit_task(|| 6 * 7).unwrap().wait(), Ok(42));

	let injected = Arc::new(
		ThreadPool::with_config(
			&ThreadPoolConfig::default()
				.with_thread_count(1)
				.with_thread_name("injected"),
		)
		.unwrap(),
	);
	let previous = set_default_executor(Arc::clone(&injected)).unwrap();
	assert!(Arc::ptr_eq(&previous, &first));
	drop(previous);

	let name = default_executor()
		.unwrap()
		.submit_task(|| std::thread::current().name().map(str::to_owned))
		.unwrap()
		.wait();
	assert_eq!(name, Ok(Some("injected-0".to_owned())));

	let removed = shutdown_default_executor().unwrap();
	assert!(Arc::ptr_eq(&removed, &injected));
	drop((removed, injected));
	assert!(shutdown_default_executor().is_none());

	let fresh = default_executor().unwrap();
	assert!(!Arc::ptr_eq(&fresh, &first));
	assert!(fresh.thread_count() > 0);
	drop(shutdown_default_executor());
}
