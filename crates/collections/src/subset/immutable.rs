use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::{Bits, CompactSet, Iter, SubsetMut, SubsetView, fmt_members, set_eq};
use crate::error::{CollectionError, Result};
use crate::universe::ValueUniverse;

const CONTAINER: &str = "ImmutableCompactSet";

/// Frozen compact set with size and hash computed once at construction.
///
/// Never mutates after construction, so it can be cached (for example inside a query plan) and
/// read from many threads without synchronization.
pub struct ImmutableCompactSet<V> {
	universe: Arc<ValueUniverse<V>>,
	bits: Bits,
	len: usize,
	fingerprint: u64,
}

impl<V> ImmutableCompactSet<V>
where
	V: Eq + Hash + Clone,
{
	/// Takes ownership of an already-cloned bitmap.
	pub(super) fn new(universe: Arc<ValueUniverse<V>>, bits: Bits) -> Self {
		let len = bits.count();
		let fingerprint = bits.fingerprint();
		Self {
			universe,
			bits,
			len,
			fingerprint,
		}
	}
}

impl<V> SubsetView<V> for ImmutableCompactSet<V>
where
	V: Eq + Hash + Clone,
{
	fn universe(&self) -> &Arc<ValueUniverse<V>> {
		&self.universe
	}

	fn bits(&self) -> &Bits {
		&self.bits
	}

	fn len(&self) -> usize {
		self.len
	}

	fn is_empty(&self) -> bool {
		self.len == 0
	}
}

impl<V> SubsetMut<V> for ImmutableCompactSet<V>
where
	V: Eq + Hash + Clone,
{
	const CONTAINER: &'static str = CONTAINER;

	fn try_add(&mut self, _value: V) -> Result<bool> {
		Err(CollectionError::unsupported(CONTAINER, "add"))
	}

	fn try_remove(&mut self, _value: &V) -> Result<bool> {
		Err(CollectionError::unsupported(CONTAINER, "remove"))
	}

	fn try_add_all<I>(&mut self, _values: I) -> Result<bool>
	where
		I: IntoIterator<Item = V>,
	{
		Err(CollectionError::unsupported(CONTAINER, "add_all"))
	}

	fn try_clear(&mut self) -> Result<()> {
		Err(CollectionError::unsupported(CONTAINER, "clear"))
	}
}

impl<V> Clone for ImmutableCompactSet<V> {
	fn clone(&self) -> Self {
		Self {
			universe: Arc::clone(&self.universe),
			bits: self.bits.clone(),
			len: self.len,
			fingerprint: self.fingerprint,
		}
	}
}

impl<'a, V> IntoIterator for &'a ImmutableCompactSet<V>
where
	V: Eq + Hash + Clone,
{
	type Item = V;
	type IntoIter = Iter<'a, V>;

	fn into_iter(self) -> Iter<'a, V> {
		self.iter()
	}
}

impl<V> PartialEq for ImmutableCompactSet<V>
where
	V: Eq + Hash + Clone,
{
	fn eq(&self, other: &Self) -> bool {
		if self.len != other.len {
			return false;
		}
		set_eq(self, other)
	}
}

impl<V> Eq for ImmutableCompactSet<V> where V: Eq + Hash + Clone {}

impl<V> PartialEq<CompactSet<V>> for ImmutableCompactSet<V>
where
	V: Eq + Hash + Clone,
{
	fn eq(&self, other: &CompactSet<V>) -> bool {
		set_eq(self, other)
	}
}

impl<V> Hash for ImmutableCompactSet<V> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		state.write_u64(self.fingerprint);
	}
}

impl<V> fmt::Debug for ImmutableCompactSet<V>
where
	V: Eq + Hash + Clone + fmt::Debug,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.iter()).finish()
	}
}

impl<V> fmt::Display for ImmutableCompactSet<V>
where
	V: Eq + Hash + Clone + fmt::Display,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt_members(self, f)
	}
}
