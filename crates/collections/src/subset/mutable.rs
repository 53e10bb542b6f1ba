use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::{Bits, ImmutableCompactSet, Iter, SubsetMut, SubsetView, fmt_members, set_eq};
use crate::error::{CollectionError, Result};
use crate::universe::ValueUniverse;

/// Mutable set of universe members, typically scoped to one query or transaction.
pub struct CompactSet<V> {
	universe: Arc<ValueUniverse<V>>,
	bits: Bits,
}

impl<V> CompactSet<V>
where
	V: Eq + Hash + Clone,
{
	/// Creates an empty set sized to the universe's current cardinality.
	pub fn new(universe: Arc<ValueUniverse<V>>) -> Self {
		let bits = Bits::with_capacity(universe.len());
		Self { universe, bits }
	}

	/// Adds `value`, growing the universe if it has never seen it.
	pub fn insert(&mut self, value: V) -> bool {
		let idx = self.universe.ensure_index(value);
		self.bits.set(idx)
	}

	/// Removes `value`. Unknown values are never registered by this call.
	pub fn remove<Q>(&mut self, value: &Q) -> bool
	where
		V: Borrow<Q>,
		Q: Hash + Eq + ?Sized,
	{
		match self.universe.index_of(value) {
			Some(idx) => self.bits.unset(idx),
			None => false,
		}
	}

	/// Adds every value, returning whether any membership changed.
	pub fn add_all<I>(&mut self, values: I) -> bool
	where
		I: IntoIterator<Item = V>,
	{
		values
			.into_iter()
			.fold(false, |changed, value| self.insert(value) | changed)
	}

	pub fn clear(&mut self) {
		self.bits.clear();
	}

	/// Bulk export is not offered; collect from [`SubsetView::iter`] instead.
	pub fn to_vec(&self) -> Result<Vec<V>> {
		Err(CollectionError::unsupported("CompactSet", "to_vec"))
	}

	/// Freezes the current membership into an independent snapshot.
	pub fn to_compact_immutable_copy(&self) -> ImmutableCompactSet<V> {
		ImmutableCompactSet::new(Arc::clone(&self.universe), self.bits.clone())
	}
}

impl<V> SubsetView<V> for CompactSet<V>
where
	V: Eq + Hash + Clone,
{
	fn universe(&self) -> &Arc<ValueUniverse<V>> {
		&self.universe
	}

	fn bits(&self) -> &Bits {
		&self.bits
	}
}

impl<V> SubsetMut<V> for CompactSet<V>
where
	V: Eq + Hash + Clone,
{
	const CONTAINER: &'static str = "CompactSet";

	fn try_add(&mut self, value: V) -> Result<bool> {
		Ok(self.insert(value))
	}

	fn try_remove(&mut self, value: &V) -> Result<bool> {
		Ok(self.remove(value))
	}

	fn try_add_all<I>(&mut self, values: I) -> Result<bool>
	where
		I: IntoIterator<Item = V>,
	{
		Ok(self.add_all(values))
	}

	fn try_clear(&mut self) -> Result<()> {
		self.clear();
		Ok(())
	}
}

impl<V> Clone for CompactSet<V> {
	fn clone(&self) -> Self {
		Self {
			universe: Arc::clone(&self.universe),
			bits: self.bits.clone(),
		}
	}
}

impl<V> Extend<V> for CompactSet<V>
where
	V: Eq + Hash + Clone,
{
	fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
		self.add_all(iter);
	}
}

impl<'a, V> IntoIterator for &'a CompactSet<V>
where
	V: Eq + Hash + Clone,
{
	type Item = V;
	type IntoIter = Iter<'a, V>;

	fn into_iter(self) -> Iter<'a, V> {
		self.iter()
	}
}

impl<V> PartialEq for CompactSet<V>
where
	V: Eq + Hash + Clone,
{
	fn eq(&self, other: &Self) -> bool {
		set_eq(self, other)
	}
}

impl<V> Eq for CompactSet<V> where V: Eq + Hash + Clone {}

impl<V> PartialEq<ImmutableCompactSet<V>> for CompactSet<V>
where
	V: Eq + Hash + Clone,
{
	fn eq(&self, other: &ImmutableCompactSet<V>) -> bool {
		set_eq(self, other)
	}
}

impl<V> Hash for CompactSet<V> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		state.write_u64(self.bits.fingerprint());
	}
}

impl<V> fmt::Debug for CompactSet<V>
where
	V: Eq + Hash + Clone + fmt::Debug,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.iter()).finish()
	}
}

impl<V> fmt::Display for CompactSet<V>
where
	V: Eq + Hash + Clone + fmt::Display,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt_members(self, f)
	}
}
