use std::{
	fmt::{self, Debug, Formatter},
	ops::Deref,
	sync::Arc,
};

use cadence_executors::{Executor, SubmitError, Work};

use crate::SignalCore;

/// The publishing side of a signal.
///
/// Owners keep the [`Signal`] private and hand out `&`[`SignalCore`] (which this derefs to)
/// so that others can subscribe but not emit:
///
/// ```
/// use cadence::{Signal, SignalCore};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// pub enum DeviceState {
///     Playing,
///     Stopped,
/// }
///
/// #[derive(Default)]
/// pub struct Player {
///     state_changed: Signal<DeviceState>,
/// }
///
/// impl Player {
///     pub fn state_changed(&self) -> &SignalCore<DeviceState> {
///         &self.state_changed
///     }
///
///     pub fn stop(&self) {
///         self.state_changed.emit(DeviceState::Stopped);
///     }
/// }
///
/// let player = Player::default();
/// let _subscription = player
///     .state_changed()
///     .connect(|state| println!("now {state:?}"))
///     .scoped();
/// player.stop();
/// ```
pub struct Signal<A, R = ()> {
	core: SignalCore<A, R>,
}

impl<A, R> Debug for Signal<A, R> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Signal").field(&self.core).finish()
	}
}

impl<A: 'static, R: 'static> Default for Signal<A, R> {
	fn default() -> Self {
		Self::new()
	}
}

impl<A, R> Deref for Signal<A, R> {
	type Target = SignalCore<A, R>;

	fn deref(&self) -> &Self::Target {
		&self.core
	}
}

impl<A: 'static, R: 'static> Signal<A, R> {
	/// Creates a signal without slots.
	#[must_use]
	pub fn new() -> Self {
		Self {
			core: SignalCore::new(),
		}
	}

	/// Borrows the subscribable side explicitly.
	#[must_use]
	pub fn as_core(&self) -> &SignalCore<A, R> {
		&self.core
	}

	/// Calls every connected slot with a clone of `args`, in subscription order, on this
	/// thread.
	///
	/// The set of slots is fixed when this call starts. Slots may connect and disconnect
	/// (themselves or others) while it runs: a slot disconnected before its turn is skipped,
	/// and no slot is called twice.
	///
	/// # Panics
	///
	/// Panics from slots are not caught. Slots after the panicking one are not called for this
	/// emission; the signal itself stays usable.
	pub fn emit(&self, args: A)
	where
		A: Clone,
	{
		self.core.inner.dispatch(args);
	}

	/// Like [`emit`](`Signal::emit`), but submits each slot call to `executor` as a separate
	/// work item.
	///
	/// Each work item checks again whether its slot is still connected before calling it.
	/// What happens to panics is up to the executor.
	///
	/// # Errors
	///
	/// [`SubmitError`] as soon as the executor rejects a work item. Slots after it are not
	/// submitted.
	pub fn emit_with<E>(&self, executor: &E, args: A) -> Result<(), SubmitError>
	where
		E: ?Sized + Executor,
		A: Clone + Send,
	{
		for (id, slot) in self.core.inner.snapshot() {
			let signal = Arc::downgrade(&self.core.inner);
			let args = args.clone();
			executor.execute(Work::new(move || {
				if let Some(signal) = signal.upgrade() {
					signal.deliver(id, &slot, args);
				}
			}))?;
		}
		Ok(())
	}
}
