use std::{
	panic::{catch_unwind, AssertUnwindSafe},
	sync::{
		atomic::{AtomicI32, Ordering},
		Arc, Barrier,
	},
	thread,
	time::Duration,
};

use cadence_executors::{interrupt, Executor, Interrupted, LoopExecutor, LoopMode, TaskError};

const TIMEOUT: Duration = Duration::from_millis(250);

fn set(i: &Arc<AtomicI32>, value: i32) -> impl 'static + Send + FnOnce() {
	let i = Arc::clone(i);
	move || i.store(value, Ordering::SeqCst)
}

fn increment(i: &Arc<AtomicI32>) -> impl 'static + Send + FnOnce() {
	let i = Arc::clone(i);
	move || {
		i.fetch_add(1, Ordering::SeqCst);
	}
}

fn exit(executor: &Arc<LoopExecutor>) -> impl 'static + Send + FnOnce() {
	let executor = Arc::clone(executor);
	move || executor.make_loop_exit()
}

fn for_each_mode(test: impl Fn(LoopMode)) {
	test(LoopMode::WaitSleep);
	test(LoopMode::TryYield);
}

#[test]
fn basic_execution() {
	for_each_mode(|mode| {
		let executor = LoopExecutor::with_mode(mode);
		let i = Arc::new(AtomicI32::new(0));

		executor.submit(increment(&i)).unwrap();
		assert_eq!(executor.uninitiated_task_count(), 1);

		assert!(executor.try_run_one_closure());
		assert_eq!(i.load(Ordering::SeqCst), 1);
		assert!(!executor.try_run_one_closure());
	});
}

#[test]
fn serial_execution() {
	for_each_mode(|mode| {
		let executor = Arc::new(LoopExecutor::with_mode(mode));
		let i = Arc::new(AtomicI32::new(0));

		executor.submit(set(&i, 5)).unwrap();
		executor.submit(increment(&i)).unwrap();
		executor.submit(exit(&executor)).unwrap();
		assert_eq!(executor.uninitiated_task_count(), 3);
		executor.run_loop();
		assert_eq!(i.load(Ordering::SeqCst), 6);
		assert!(!executor.try_run_one_closure());

		// Again, on the same executor.
		executor.submit(set(&i, 65)).unwrap();
		executor.submit(increment(&i)).unwrap();
		executor.submit(exit(&executor)).unwrap();
		assert_eq!(executor.uninitiated_task_count(), 3);
		executor.run_loop();
		assert_eq!(i.load(Ordering::SeqCst), 66);
	});
}

#[test]
fn serial_queued_execution() {
	for_each_mode(|mode| {
		let executor = LoopExecutor::with_mode(mode);
		let i = Arc::new(AtomicI32::new(0));

		executor.submit(set(&i, 5)).unwrap();
		executor.submit(increment(&i)).unwrap();
		assert_eq!(executor.uninitiated_task_count(), 2);
		executor.run_queued_closures();
		assert_eq!(i.load(Ordering::SeqCst), 6);
		assert!(!executor.try_run_one_closure());

		executor.submit(set(&i, 65)).unwrap();
		executor.submit(increment(&i)).unwrap();
		executor.run_queued_closures();
		assert_eq!(i.load(Ordering::SeqCst), 66);
	});
}

#[test]
fn trailing_loop_exit_in_queued_run_does_not_stop_next_loop() {
	for_each_mode(|mode| {
		let executor = Arc::new(LoopExecutor::with_mode(mode));
		let i = Arc::new(AtomicI32::new(0));

		executor.submit(set(&i, 5)).unwrap();
		executor.submit(increment(&i)).unwrap();
		executor.submit(exit(&executor)).unwrap();
		executor.run_queued_closures();
		assert_eq!(i.load(Ordering::SeqCst), 6);
		assert!(!executor.try_run_one_closure());

		executor.submit(set(&i, 65)).unwrap();
		executor.submit(increment(&i)).unwrap();
		executor.submit(exit(&executor)).unwrap();
		executor.run_loop();
		assert_eq!(i.load(Ordering::SeqCst), 66);
	});
}

#[test]
fn queued_run_skips_work_submitted_meanwhile() {
	let executor = Arc::new(LoopExecutor::new());
	let i = Arc::new(AtomicI32::new(0));

	executor
		.submit({
			let executor = Arc::clone(&executor);
			let i = Arc::clone(&i);
			move || executor.submit(increment(&i)).unwrap()
		})
		.unwrap();
	executor.run_queued_closures();

	assert_eq!(i.load(Ordering::SeqCst), 0);
	assert_eq!(executor.uninitiated_task_count(), 1);
}

#[test]
fn task_result() {
	for_each_mode(|mode| {
		let executor = LoopExecutor::with_mode(mode);
		let (a, b) = (46_341_i32, 46_349_i32);

		let mut future = executor
			.submit_task(move || i64::from(a) * i64::from(b))
			.unwrap();
		assert_eq!(executor.uninitiated_task_count(), 1);
		assert_eq!(future.try_take(), None);

		assert!(executor.try_run_one_closure());
		assert_eq!(future.try_take(), Some(Ok(i64::from(a) * i64::from(b))));
	});
}

#[test]
fn task_panic() {
	let executor = LoopExecutor::new();

	let mut future = executor.submit_task(|| panic!("loop task failed")).unwrap();
	// The packaged task contains the panic and completes normally.
	assert!(executor.try_run_one_closure());
	assert_eq!(
		future.try_take(),
		Some(Err(TaskError::Panicked("loop task failed".to_owned())))
	);
	assert_eq!(executor.failed_count(), 0);
}

#[test]
fn plain_panic_is_swallowed_by_the_loop() {
	let executor = Arc::new(LoopExecutor::new());
	let i = Arc::new(AtomicI32::new(0));

	executor.submit(|| panic!("plain work failed")).unwrap();
	executor.submit(increment(&i)).unwrap();
	executor.submit(exit(&executor)).unwrap();
	executor.run_loop();

	assert_eq!(i.load(Ordering::SeqCst), 1);
	assert_eq!(executor.failed_count(), 1);
}

#[test]
fn interrupt_unwinds_out_of_the_loop() {
	let executor = LoopExecutor::new();
	let i = Arc::new(AtomicI32::new(0));

	executor.submit(|| interrupt()).unwrap();
	executor.submit(increment(&i)).unwrap();

	let payload = catch_unwind(AssertUnwindSafe(|| executor.run_loop())).unwrap_err();
	assert!(payload.is::<Interrupted>());
	assert_eq!(i.load(Ordering::SeqCst), 0);

	// Still usable afterwards.
	assert!(executor.try_run_one_closure());
	assert_eq!(i.load(Ordering::SeqCst), 1);
}

#[test]
fn threaded_execution() {
	for_each_mode(|mode| {
		let executor = LoopExecutor::with_mode(mode);
		let barrier = Arc::new(Barrier::new(2));
		let i = Arc::new(AtomicI32::new(0));

		thread::scope(|s| {
			s.spawn(|| executor.run_loop());

			executor
				.submit({
					let barrier = Arc::clone(&barrier);
					let i = Arc::clone(&i);
					move || {
						thread::sleep(Duration::from_millis(100));
						i.fetch_add(1, Ordering::SeqCst);
						barrier.wait();
					}
				})
				.unwrap();
			barrier.wait();
			assert_eq!(i.load(Ordering::SeqCst), 1);

			let mut future = executor.submit_task(|| 6_i64 * 7).unwrap();
			assert_eq!(future.wait_timeout(TIMEOUT), Some(Ok(42)));

			let mut failing = executor.submit_task(|| panic!("threaded task failed")).unwrap();
			assert!(matches!(
				failing.wait_timeout(TIMEOUT),
				Some(Err(TaskError::Panicked(_)))
			));

			executor.close();
		});
	});
}

#[test]
fn closed_executor_rejects_work() {
	let executor = LoopExecutor::new();
	executor.close();

	assert!(executor.submit(|| ()).is_err());
	executor.run_loop();
}
