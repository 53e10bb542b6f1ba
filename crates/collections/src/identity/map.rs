use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use super::key::{IdentityKey, Probe};
use crate::config::TrackingConfig;
use crate::error::{CollectionError, Result};

/// Detached `(key, value)` pair returned by [`IdentityRegistry::entry_set`].
///
/// Equality of the pair itself is value-based; only lookups inside the registry use identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityEntry<K: ?Sized, V> {
	pub key: Arc<K>,
	pub value: V,
}

/// Insertion-ordered map keyed by reference identity.
///
/// Tracks the live managed objects of one unit of work. Two instances that compare equal by value
/// are still distinct keys; `get(&a)` never answers with the value stored under `b`.
///
/// Lookups take `&K`, which is the address an `Arc<K>` derefs to, so `registry.get(&entity)` works
/// directly on the caller's `Arc`.
pub struct IdentityRegistry<K: ?Sized, V> {
	map: IndexMap<IdentityKey<K>, V, FxBuildHasher>,
	entries: Option<Arc<[(Arc<K>, V)]>>,
}

impl<K: ?Sized, V> Default for IdentityRegistry<K, V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<K: ?Sized, V> IdentityRegistry<K, V> {
	pub fn new() -> Self {
		Self {
			map: IndexMap::default(),
			entries: None,
		}
	}

	/// Creates a registry sized for `capacity` entries.
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			map: IndexMap::with_capacity_and_hasher(capacity, FxBuildHasher),
			entries: None,
		}
	}

	pub fn from_config(config: &TrackingConfig) -> Self {
		Self::with_capacity(config.registry_capacity)
	}

	/// Associates `value` with this exact instance, returning the value it replaces.
	pub fn insert(&mut self, key: Arc<K>, value: V) -> Option<V> {
		self.entries = None;
		self.map.insert(IdentityKey::new(key), value)
	}

	pub fn get(&self, key: &K) -> Option<&V> {
		self.map.get(&Probe::of(key))
	}

	/// Mutable access to the value of this exact instance.
	///
	/// Drops the cached entry snapshot, since the value may change through the returned reference.
	pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
		let value = self.map.get_mut(&Probe::of(key))?;
		self.entries = None;
		Some(value)
	}

	pub fn contains_key(&self, key: &K) -> bool {
		self.map.contains_key(&Probe::of(key))
	}

	/// Value-equality search over all entries.
	pub fn contains_value(&self, value: &V) -> bool
	where
		V: PartialEq,
	{
		self.map.values().any(|v| v == value)
	}

	/// Removes the entry for this exact instance, keeping the order of the rest.
	pub fn remove(&mut self, key: &K) -> Option<V> {
		let removed = self.map.shift_remove(&Probe::of(key));
		if removed.is_some() {
			self.entries = None;
		}
		removed
	}

	pub fn len(&self) -> usize {
		self.map.len()
	}

	pub fn is_empty(&self) -> bool {
		self.map.is_empty()
	}

	pub fn clear(&mut self) {
		self.entries = None;
		self.map.clear();
	}

	/// Original key handles in insertion order.
	pub fn keys(&self) -> impl ExactSizeIterator<Item = &Arc<K>> + '_ {
		self.map.keys().map(IdentityKey::as_arc)
	}

	pub fn values(&self) -> impl ExactSizeIterator<Item = &V> + '_ {
		self.map.values()
	}

	pub fn iter(&self) -> impl ExactSizeIterator<Item = (&Arc<K>, &V)> + '_ {
		self.map.iter().map(|(k, v)| (k.as_arc(), v))
	}

	/// Point-in-time copy of every entry.
	///
	/// The returned slice is unaffected by later inserts, so callers can walk it while adding
	/// entries discovered along the way. The copy is reused until the registry next changes.
	pub fn snapshot_entries(&mut self) -> Arc<[(Arc<K>, V)]>
	where
		V: Clone,
	{
		if let Some(entries) = &self.entries {
			return Arc::clone(entries);
		}
		let entries: Arc<[(Arc<K>, V)]> = self
			.map
			.iter()
			.map(|(k, v)| (Arc::clone(k.as_arc()), v.clone()))
			.collect();
		self.entries = Some(Arc::clone(&entries));
		entries
	}

	/// Detached entries whose own equality is value-based.
	pub fn entry_set(&self) -> Vec<IdentityEntry<K, V>>
	where
		V: Clone,
	{
		self.iter()
			.map(|(key, value)| IdentityEntry {
				key: Arc::clone(key),
				value: value.clone(),
			})
			.collect()
	}

	/// A key set would compare members by value and lose identity; use [`Self::keys`].
	pub fn key_set(&self) -> Result<Vec<Arc<K>>> {
		Err(CollectionError::unsupported("IdentityRegistry", "key_set"))
	}
}

impl<K: ?Sized, V> Extend<(Arc<K>, V)> for IdentityRegistry<K, V> {
	fn extend<I: IntoIterator<Item = (Arc<K>, V)>>(&mut self, iter: I) {
		for (key, value) in iter {
			self.insert(key, value);
		}
	}
}

impl<K: ?Sized, V> FromIterator<(Arc<K>, V)> for IdentityRegistry<K, V> {
	fn from_iter<I: IntoIterator<Item = (Arc<K>, V)>>(iter: I) -> Self {
		let mut registry = Self::new();
		registry.extend(iter);
		registry
	}
}

impl<K: ?Sized + fmt::Debug, V: fmt::Debug> fmt::Debug for IdentityRegistry<K, V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.map.iter()).finish()
	}
}
