//! Append-only ordinal registry shared by compact sets.
//!
//! # Mental model
//!
//! * Readers pin an `Arc<UniverseSnapshot<V>>` and resolve lookups against that immutable view.
//! * Writers serialize on a mutex, copy the current snapshot, append one value and publish the
//!   copy with a single `ArcSwap::store`.
//! * A snapshot never changes after publication, so an iterator holding one cannot observe a value
//!   moving or disappearing while the universe grows.
//!
//! # Invariants
//!
//! * A value keeps the ordinal it was first assigned for the life of the universe.
//! * Ordinals are dense: the `n`th distinct value gets ordinal `n - 1`.
//! * `values.len() == lookup.len()` in every published snapshot.
//!
//! # Concurrency & ordering
//!
//! * `index_of` is wait-free (`ArcSwap` load plus hash lookup).
//! * `ensure_index` on a known value is wait-free; on a new value it takes the writer lock and
//!   re-checks the latest snapshot before appending, so racing writers agree on one ordinal.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::subset::CompactSet;

/// Immutable view of a universe at one point in time.
pub struct UniverseSnapshot<V> {
	values: Vec<V>,
	lookup: FxHashMap<V, usize>,
}

impl<V> UniverseSnapshot<V>
where
	V: Eq + Hash + Clone,
{
	fn empty() -> Self {
		Self {
			values: Vec::new(),
			lookup: FxHashMap::default(),
		}
	}

	/// Returns the ordinal of `value`, if registered in this snapshot.
	#[inline]
	pub fn index_of<Q>(&self, value: &Q) -> Option<usize>
	where
		V: Borrow<Q>,
		Q: Hash + Eq + ?Sized,
	{
		self.lookup.get(value).copied()
	}

	/// Returns the value registered at `index`.
	#[inline]
	pub fn get(&self, index: usize) -> Option<&V> {
		self.values.get(index)
	}

	/// Values in ordinal order.
	pub fn values(&self) -> &[V] {
		&self.values
	}

	pub fn len(&self) -> usize {
		debug_assert_eq!(self.values.len(), self.lookup.len());
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

impl<V: Clone> Clone for UniverseSnapshot<V> {
	fn clone(&self) -> Self {
		Self {
			values: self.values.clone(),
			lookup: self.lookup.clone(),
		}
	}
}

/// Thread-safe registry assigning stable ordinals to domain values.
///
/// One universe is typically built per metadata scope (for example, all table names known to a
/// session factory) and shared through an `Arc` by every [`CompactSet`] created from it.
pub struct ValueUniverse<V> {
	current: ArcSwap<UniverseSnapshot<V>>,
	writer: Mutex<()>,
}

impl<V> Default for ValueUniverse<V>
where
	V: Eq + Hash + Clone,
{
	fn default() -> Self {
		Self::new()
	}
}

impl<V> ValueUniverse<V>
where
	V: Eq + Hash + Clone,
{
	/// Creates an empty universe.
	pub fn new() -> Self {
		Self {
			current: ArcSwap::from_pointee(UniverseSnapshot::empty()),
			writer: Mutex::new(()),
		}
	}

	/// Returns the ordinal of `value`, or `None` if it was never registered.
	#[inline]
	pub fn index_of<Q>(&self, value: &Q) -> Option<usize>
	where
		V: Borrow<Q>,
		Q: Hash + Eq + ?Sized,
	{
		self.current.load().index_of(value)
	}

	/// Returns the ordinal of `value`, registering it first if needed.
	pub fn ensure_index(&self, value: V) -> usize {
		if let Some(index) = self.index_of(&value) {
			return index;
		}
		let _guard = self.writer.lock();
		let current = self.current.load_full();
		if let Some(index) = current.index_of(&value) {
			return index;
		}
		let mut next = UniverseSnapshot::clone(&current);
		let index = push_value(&mut next, value);
		self.current.store(Arc::new(next));
		tracing::trace!(index, size = index + 1, "universe.grow");
		index
	}

	/// Registers every value not yet known, publishing one snapshot for the whole batch.
	///
	/// Meant for bootstrap, when the full vocabulary is known up front.
	pub fn extend<I>(&self, values: I)
	where
		I: IntoIterator<Item = V>,
	{
		// Drained before locking: the iterator may itself register values here.
		let values: Vec<V> = values.into_iter().collect();
		let _guard = self.writer.lock();
		let current = self.current.load_full();
		let mut next = UniverseSnapshot::clone(&current);
		for value in values {
			if next.index_of(&value).is_none() {
				push_value(&mut next, value);
			}
		}
		if next.len() != current.len() {
			tracing::trace!(added = next.len() - current.len(), size = next.len(), "universe.extend");
			self.current.store(Arc::new(next));
		}
	}

	/// Returns a clone of the value at `index`.
	pub fn value_at(&self, index: usize) -> Option<V> {
		self.current.load().get(index).cloned()
	}

	/// Pins the current snapshot.
	pub fn snapshot(&self) -> Arc<UniverseSnapshot<V>> {
		self.current.load_full()
	}

	/// Number of distinct registered values.
	pub fn len(&self) -> usize {
		self.current.load().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Creates an empty compact set bound to this universe.
	pub fn create_compact_set(self: &Arc<Self>) -> CompactSet<V> {
		CompactSet::new(Arc::clone(self))
	}
}

fn push_value<V>(snapshot: &mut UniverseSnapshot<V>, value: V) -> usize
where
	V: Eq + Hash + Clone,
{
	let index = snapshot.values.len();
	snapshot.values.push(value.clone());
	snapshot.lookup.insert(value, index);
	index
}

impl<V> fmt::Debug for ValueUniverse<V>
where
	V: Eq + Hash + Clone + fmt::Debug,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ValueUniverse")
			.field("values", &self.snapshot().values())
			.finish()
	}
}

#[cfg(test)]
mod tests;
