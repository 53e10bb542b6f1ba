use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use indexmap::Equivalent;

/// Address of the value behind a reference, used as its identity.
#[inline]
pub(crate) fn addr_of<K: ?Sized>(value: &K) -> usize {
	std::ptr::from_ref(value).cast::<()>().addr()
}

/// Shared handle compared and hashed by allocation address, never by `K`'s own equality.
///
/// The wrapped `Arc` pins the allocation, so the address is a stable per-instance handle for as
/// long as the key is alive: two value-equal instances always remain distinct keys.
pub struct IdentityKey<K: ?Sized> {
	inner: Arc<K>,
}

impl<K: ?Sized> IdentityKey<K> {
	pub fn new(inner: Arc<K>) -> Self {
		Self { inner }
	}

	/// Returns the original shared handle.
	pub fn as_arc(&self) -> &Arc<K> {
		&self.inner
	}

	pub fn into_inner(self) -> Arc<K> {
		self.inner
	}

	/// Identity handle of this key.
	#[inline]
	pub fn addr(&self) -> usize {
		addr_of::<K>(&self.inner)
	}
}

impl<K: ?Sized> From<Arc<K>> for IdentityKey<K> {
	fn from(inner: Arc<K>) -> Self {
		Self::new(inner)
	}
}

impl<K: ?Sized> Clone for IdentityKey<K> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<K: ?Sized> PartialEq for IdentityKey<K> {
	fn eq(&self, other: &Self) -> bool {
		self.addr() == other.addr()
	}
}

impl<K: ?Sized> Eq for IdentityKey<K> {}

impl<K: ?Sized> Hash for IdentityKey<K> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		state.write_usize(self.addr());
	}
}

impl<K: ?Sized> Deref for IdentityKey<K> {
	type Target = K;

	fn deref(&self) -> &K {
		&self.inner
	}
}

impl<K: ?Sized + fmt::Debug> fmt::Debug for IdentityKey<K> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:?}@{:#x}", &*self.inner, self.addr())
	}
}

impl<K: ?Sized + fmt::Display> fmt::Display for IdentityKey<K> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&*self.inner, f)
	}
}

/// Borrowed lookup probe hashing exactly like [`IdentityKey`], so lookups need no `Arc` clone.
#[derive(Clone, Copy)]
pub(crate) struct Probe(pub(crate) usize);

impl Probe {
	#[inline]
	pub(crate) fn of<K: ?Sized>(value: &K) -> Self {
		Self(addr_of(value))
	}
}

impl Hash for Probe {
	fn hash<H: Hasher>(&self, state: &mut H) {
		state.write_usize(self.0);
	}
}

impl<K: ?Sized> Equivalent<IdentityKey<K>> for Probe {
	fn equivalent(&self, key: &IdentityKey<K>) -> bool {
		self.0 == key.addr()
	}
}
