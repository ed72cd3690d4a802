//! Handles to individual subscriptions.

use std::{
	fmt::{self, Debug, Formatter},
	hash::{Hash, Hasher},
	mem,
	ops::Deref,
	ptr,
	sync::Arc,
};

/// Type-erased view of one subscription, implemented per signal type.
pub(crate) trait ConnErasure: Send + Sync {
	/// Removes the subscription if it still exists.
	///
	/// **Returns** whether this call removed it.
	fn disconnect(&self) -> bool;

	fn is_connected(&self) -> bool;

	/// Address of the backing store this subscription belongs to.
	fn signal_addr(&self) -> *const ();
}

/// A handle to one subscription of a [`SignalCore`](`crate::SignalCore`).
///
/// Cheap to clone; clones refer to the same subscription and compare equal.
/// A [`Default`] connection refers to nothing: it is never connected and disconnecting it
/// does nothing.
///
/// The handle does not keep the signal alive. Once the signal is dropped,
/// [`is_connected`](`Connection::is_connected`) reports `false` and
/// [`disconnect`](`Connection::disconnect`) is a no-op, regardless of which side went first.
#[derive(Clone, Default)]
pub struct Connection {
	erasure: Option<Arc<dyn ConnErasure>>,
}

impl Connection {
	pub(crate) fn new(erasure: Arc<dyn ConnErasure>) -> Self {
		Self {
			erasure: Some(erasure),
		}
	}

	/// Ends the subscription. Later emissions won't reach its slot.
	///
	/// A slot that is running right now on another thread is not interrupted.
	///
	/// **Idempotent** aside from the return value.  
	/// **Returns** whether this call ended the subscription.
	#[allow(clippy::must_use_candidate)]
	pub fn disconnect(&self) -> bool {
		self.erasure.as_ref().is_some_and(|erasure| erasure.disconnect())
	}

	/// Whether the subscription is still active.
	///
	/// `false` for a [`Default`] connection and for any connection whose signal was dropped.
	#[must_use]
	pub fn is_connected(&self) -> bool {
		self.erasure
			.as_ref()
			.is_some_and(|erasure| erasure.is_connected())
	}

	/// Wraps this connection so it disconnects when dropped.
	pub fn scoped(self) -> ScopedConnection {
		ScopedConnection::new(self)
	}

	pub(crate) fn signal_addr(&self) -> Option<*const ()> {
		self.erasure.as_ref().map(|erasure| erasure.signal_addr())
	}

	fn addr(&self) -> Option<*const ()> {
		self.erasure
			.as_ref()
			.map(|erasure| Arc::as_ptr(erasure).cast::<()>())
	}
}

impl Debug for Connection {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Connection")
			.field("connected", &self.is_connected())
			.finish_non_exhaustive()
	}
}

impl PartialEq for Connection {
	fn eq(&self, other: &Self) -> bool {
		match (self.addr(), other.addr()) {
			(Some(a), Some(b)) => ptr::eq(a, b),
			(None, None) => true,
			_ => false,
		}
	}
}

impl Eq for Connection {}

impl Hash for Connection {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.addr().hash(state);
	}
}

/// A [`Connection`] that disconnects when dropped.
///
/// Not [`Clone`], so exactly one owner is responsible for ending the subscription.
/// Dereferences to the wrapped [`Connection`] for queries.
#[derive(Debug, Default, PartialEq, Eq, Hash)]
#[must_use = "Dropping a `ScopedConnection` disconnects it immediately."]
pub struct ScopedConnection(Connection);

impl ScopedConnection {
	/// Takes over responsibility for disconnecting `connection`.
	pub fn new(connection: Connection) -> Self {
		Self(connection)
	}

	/// Replaces the wrapped connection, disconnecting the previous one first.
	///
	/// Setting the connection that is already wrapped keeps it connected.
	pub fn set(&mut self, connection: Connection) {
		if self.0 != connection {
			self.0.disconnect();
		}
		self.0 = connection;
	}

	/// Gives up responsibility for the subscription without ending it.
	pub fn release(mut self) -> Connection {
		mem::take(&mut self.0)
	}
}

impl From<Connection> for ScopedConnection {
	fn from(connection: Connection) -> Self {
		Self::new(connection)
	}
}

impl Deref for ScopedConnection {
	type Target = Connection;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl Drop for ScopedConnection {
	fn drop(&mut self) {
		self.0.disconnect();
		debug_assert!(
			!self.0.is_connected(),
			"`ScopedConnection` still connected after disconnecting."
		);
	}
}
