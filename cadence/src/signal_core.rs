//! Slot storage and the subscriber-facing half of a signal.

use std::{
	collections::BTreeMap,
	fmt::{self, Debug, Formatter},
	marker::PhantomData,
	mem,
	sync::{Arc, Weak},
};

use parking_lot::Mutex;
use tracing::trace;

use crate::connection::{ConnErasure, Connection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct SlotId(u64);

/// What became of one slot invocation.
pub(crate) enum Delivery {
	Delivered,
	/// The slot's target is gone; the slot should be removed.
	Expired,
}

pub(crate) type StoredSlot<A> = Arc<dyn Fn(A) -> Delivery + Send + Sync>;

/// The shared backing store of one signal.
///
/// Only the owning [`SignalCore`] holds it strongly. Connections hold it weakly.
pub(crate) struct SignalImpl<A> {
	slots: Mutex<Slots<A>>,
}

struct Slots<A> {
	last_id: u64,
	/// Ids increase monotonically, so this iterates in subscription order.
	by_id: BTreeMap<SlotId, StoredSlot<A>>,
}

impl<A> SignalImpl<A> {
	fn new() -> Self {
		Self {
			slots: Mutex::new(Slots {
				last_id: 0,
				by_id: BTreeMap::new(),
			}),
		}
	}

	fn insert(&self, slot: StoredSlot<A>) -> SlotId {
		let mut slots = self.slots.lock();
		slots.last_id += 1;
		let id = SlotId(slots.last_id);
		slots.by_id.insert(id, slot);
		id
	}

	pub(crate) fn remove(&self, id: SlotId) -> bool {
		let removed = self.slots.lock().by_id.remove(&id);
		match removed {
			Some(slot) => {
				// Unlocked by now. Dropping the slot's captures may touch this signal again.
				drop(slot);
				trace!(slot = id.0, "disconnected slot");
				true
			}
			None => false,
		}
	}

	pub(crate) fn contains(&self, id: SlotId) -> bool {
		self.slots.lock().by_id.contains_key(&id)
	}

	fn len(&self) -> usize {
		self.slots.lock().by_id.len()
	}

	fn clear(&self) {
		let slots = mem::take(&mut self.slots.lock().by_id);
		if !slots.is_empty() {
			trace!(slots = slots.len(), "dropping signal with connected slots");
		}
		drop(slots);
	}

	/// The connected slots in subscription order, as of now.
	pub(crate) fn snapshot(&self) -> Vec<(SlotId, StoredSlot<A>)> {
		self.slots
			.lock()
			.by_id
			.iter()
			.map(|(id, slot)| (*id, Arc::clone(slot)))
			.collect()
	}

	/// Invokes `slot` unless `id` was disconnected since the snapshot was taken.
	pub(crate) fn deliver(&self, id: SlotId, slot: &StoredSlot<A>, args: A) {
		if !self.contains(id) {
			return;
		}
		if let Delivery::Expired = slot(args) {
			self.remove(id);
		}
	}

	pub(crate) fn dispatch(&self, args: A)
	where
		A: Clone,
	{
		let snapshot = self.snapshot();
		trace!(slots = snapshot.len(), "emitting signal");
		for (id, slot) in &snapshot {
			self.deliver(*id, slot, args.clone());
		}
	}
}

struct SlotConnection<A> {
	signal: Weak<SignalImpl<A>>,
	id: SlotId,
}

impl<A> ConnErasure for SlotConnection<A> {
	fn disconnect(&self) -> bool {
		self.signal
			.upgrade()
			.is_some_and(|signal| signal.remove(self.id))
	}

	fn is_connected(&self) -> bool {
		self.signal
			.upgrade()
			.is_some_and(|signal| signal.contains(self.id))
	}

	fn signal_addr(&self) -> *const () {
		self.signal.as_ptr().cast::<()>()
	}
}

/// The subscribable side of a signal carrying arguments `A`.
///
/// Slots are callables `Fn(A) -> R`. Signals with several arguments use a tuple for `A`.
/// Return values are discarded.
///
/// A [`SignalCore`] is only ever obtained by borrowing a [`Signal`](`crate::Signal`), whose
/// owner alone can emit. Dropping the signal disconnects every slot; outstanding
/// [`Connection`]s stay valid and report that.
pub struct SignalCore<A, R = ()> {
	pub(crate) inner: Arc<SignalImpl<A>>,
	_phantom: PhantomData<fn(A) -> R>,
}

impl<A, R> Debug for SignalCore<A, R> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("SignalCore")
			.field("slot_count", &self.inner.len())
			.finish_non_exhaustive()
	}
}

impl<A, R> Drop for SignalCore<A, R> {
	fn drop(&mut self) {
		// Connections may briefly hold a strong reference while they check on their slot.
		// Clearing here makes them all report "disconnected" right away regardless.
		self.inner.clear();
	}
}

impl<A: 'static, R: 'static> SignalCore<A, R> {
	pub(crate) fn new() -> Self {
		Self {
			inner: Arc::new(SignalImpl::new()),
			_phantom: PhantomData,
		}
	}

	/// Subscribes `slot`.
	///
	/// Slots run in the order they were connected. Connecting the same callable again creates
	/// an independent second subscription. A slot connected while the signal is emitting is
	/// first called by the next emission.
	pub fn connect<F>(&self, slot: F) -> Connection
	where
		F: 'static + Send + Sync + Fn(A) -> R,
	{
		self.insert(Arc::new(move |args| {
			let _: R = slot(args);
			Delivery::Delivered
		}))
	}

	/// Subscribes `slot` bound to `target`, without keeping `target` alive.
	///
	/// Once `target` has been dropped, the next emission disconnects the slot instead of
	/// calling it.
	pub fn connect_weak<T, F>(&self, target: &Arc<T>, slot: F) -> Connection
	where
		T: ?Sized + 'static + Send + Sync,
		F: 'static + Send + Sync + Fn(&T, A) -> R,
	{
		let target = Arc::downgrade(target);
		self.insert(Arc::new(move |args| match target.upgrade() {
			Some(target) => {
				let _: R = slot(&*target, args);
				Delivery::Delivered
			}
			None => Delivery::Expired,
		}))
	}

	/// Disconnects `connection` iff it belongs to this signal.
	///
	/// **Returns** whether this call ended the subscription.
	#[allow(clippy::must_use_candidate)]
	pub fn disconnect(&self, connection: &Connection) -> bool {
		let this = Arc::as_ptr(&self.inner).cast::<()>();
		connection.signal_addr() == Some(this) && connection.disconnect()
	}

	/// Number of currently connected slots.
	#[must_use]
	pub fn slot_count(&self) -> usize {
		self.inner.len()
	}

	fn insert(&self, slot: StoredSlot<A>) -> Connection {
		let id = self.inner.insert(slot);
		trace!(slot = id.0, "connected slot");
		Connection::new(Arc::new(SlotConnection {
			signal: Arc::downgrade(&self.inner),
			id,
		}))
	}
}
