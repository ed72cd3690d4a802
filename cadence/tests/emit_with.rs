use std::{
	sync::{
		atomic::{AtomicUsize, Ordering},
		mpsc, Arc,
	},
	time::Duration,
};

use cadence::{InlineExecutor, LoopExecutor, Signal, SubmitError, ThreadPool};

use _validator::Validator;

#[test]
fn inline_matches_emit() {
	let v = Arc::new(Validator::new());
	let signal: Signal<i32> = Signal::new();
	let _a = signal.connect({
		let v = Arc::clone(&v);
		move |n| v.push(("A", n))
	});
	let _b = signal.connect({
		let v = Arc::clone(&v);
		move |n| v.push(("B", n))
	});

	signal.emit_with(&InlineExecutor::new(), 5).unwrap();
	v.expect([("A", 5), ("B", 5)]);
}

#[test]
fn thread_pool_runs_every_slot() {
	let pool = ThreadPool::new(3).unwrap();
	let v = Arc::new(Validator::new());
	let signal: Signal<usize> = Signal::new();

	let _connections: Vec<_> = (0..10)
		.map(|i| {
			let v = Arc::clone(&v);
			signal.connect(move |n| v.push(i * n))
		})
		.collect();

	signal.emit_with(&pool, 2).unwrap();
	assert_eq!(pool.shutdown(), 0);
	v.expect_unordered((0..10).map(|i| i * 2));
}

#[test]
fn queued_slots_recheck_connection() {
	let executor = LoopExecutor::new();
	let v = Arc::new(Validator::new());
	let signal: Signal<i32> = Signal::new();

	let a = signal.connect({
		let v = Arc::clone(&v);
		move |n| v.push(("A", n))
	});
	let _b = signal.connect({
		let v = Arc::clone(&v);
		move |n| v.push(("B", n))
	});

	signal.emit_with(&executor, 1).unwrap();
	assert_eq!(executor.uninitiated_task_count(), 2);
	v.expect([]);

	a.disconnect();
	executor.run_queued_closures();
	v.expect([("B", 1)]);
}

#[test]
fn queued_slots_skip_dropped_signal() {
	let executor = LoopExecutor::new();
	let calls = Arc::new(AtomicUsize::new(0));
	let signal: Signal<()> = Signal::new();
	let connection = signal.connect({
		let calls = Arc::clone(&calls);
		move |()| {
			calls.fetch_add(1, Ordering::Relaxed);
		}
	});

	signal.emit_with(&executor, ()).unwrap();
	drop(signal);
	executor.run_queued_closures();

	assert_eq!(calls.load(Ordering::Relaxed), 0);
	assert!(!connection.is_connected());
}

#[test]
fn closed_executor_rejects() {
	let executor = LoopExecutor::new();
	executor.close();

	let signal: Signal<()> = Signal::new();
	assert_eq!(signal.emit_with(&executor, ()), Ok(()));

	let _connection = signal.connect(|()| ());
	assert_eq!(signal.emit_with(&executor, ()), Err(SubmitError::Closed));
}

#[test]
fn panicking_slot_is_contained_by_pool() {
	let pool = ThreadPool::new(1).unwrap();
	let signal: Signal<()> = Signal::new();
	let (sender, receiver) = mpsc::channel();

	let _panicking = signal.connect(|()| panic!("slot failed"));
	let _after = signal.connect(move |()| sender.send(()).unwrap());

	signal.emit_with(&pool, ()).unwrap();
	receiver.recv_timeout(Duration::from_secs(5)).unwrap();
	assert_eq!(pool.shutdown(), 1);
}
