use std::fmt;
use std::sync::Arc;

use super::key::addr_of;
use super::map::IdentityRegistry;
use crate::config::{DEFAULT_BOUNDED_MAP_CAPACITY, TrackingConfig};
use crate::error::{CollectionError, Result};

/// Insert rejected because every slot of an [`ArrayIdentityMap`] is taken.
///
/// Carries the rejected pair back so the caller can promote to an [`IdentityRegistry`] and retry.
pub struct CapacityExceeded<K: ?Sized, V> {
	pub key: Arc<K>,
	pub value: V,
	pub max_size: usize,
}

impl<K: ?Sized, V> CapacityExceeded<K, V> {
	pub fn into_parts(self) -> (Arc<K>, V) {
		(self.key, self.value)
	}
}

impl<K: ?Sized, V> fmt::Debug for CapacityExceeded<K, V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CapacityExceeded")
			.field("key_addr", &format_args!("{:#x}", addr_of::<K>(&self.key)))
			.field("max_size", &self.max_size)
			.finish_non_exhaustive()
	}
}

impl<K: ?Sized, V> fmt::Display for CapacityExceeded<K, V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "bounded identity map is full ({} entries)", self.max_size)
	}
}

impl<K: ?Sized, V> std::error::Error for CapacityExceeded<K, V> {}

/// Fixed-capacity identity map backed by a slot array and linear scans.
///
/// No hashing and no per-entry allocation, at the price of O(n) lookups and a hard size limit.
/// Only suitable for a handful of entries in a short-lived scope.
pub struct ArrayIdentityMap<K: ?Sized, V> {
	slots: Box<[Option<(Arc<K>, V)>]>,
	len: usize,
}

impl<K: ?Sized, V> Default for ArrayIdentityMap<K, V> {
	fn default() -> Self {
		Self::allocate(DEFAULT_BOUNDED_MAP_CAPACITY)
	}
}

impl<K: ?Sized, V> ArrayIdentityMap<K, V> {
	/// Creates a map holding at most `max_size` entries.
	pub fn with_max_size(max_size: usize) -> Result<Self> {
		if max_size == 0 {
			return Err(CollectionError::invalid("maximum size of an ArrayIdentityMap must be > 0"));
		}
		Ok(Self::allocate(max_size))
	}

	pub fn from_config(config: &TrackingConfig) -> Result<Self> {
		Self::with_max_size(config.bounded_map_capacity)
	}

	fn allocate(max_size: usize) -> Self {
		Self {
			slots: std::iter::repeat_with(|| None).take(max_size).collect(),
			len: 0,
		}
	}

	/// Copies the entries into a map with a different limit.
	pub fn resized(&self, new_max_size: usize) -> Result<Self>
	where
		V: Clone,
	{
		if new_max_size < self.len {
			return Err(CollectionError::invalid(format!(
				"cannot fit {} entries into an ArrayIdentityMap of size {new_max_size}",
				self.len
			)));
		}
		let mut resized = Self::with_max_size(new_max_size)?;
		for (slot, (key, value)) in resized.slots.iter_mut().zip(self.iter()) {
			*slot = Some((Arc::clone(key), value.clone()));
		}
		resized.len = self.len;
		Ok(resized)
	}

	pub fn max_size(&self) -> usize {
		self.slots.len()
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	fn position(&self, key: &K) -> Option<usize> {
		let addr = addr_of(key);
		self.slots
			.iter()
			.position(|slot| slot.as_ref().is_some_and(|(k, _)| addr_of::<K>(k) == addr))
	}

	/// Inserts or replaces the entry for this exact instance.
	///
	/// When the key is new and no slot is free, the pair is handed back in [`CapacityExceeded`];
	/// the map is left untouched.
	pub fn insert(&mut self, key: Arc<K>, value: V) -> std::result::Result<Option<V>, CapacityExceeded<K, V>> {
		if let Some(idx) = self.position(&key) {
			let previous = self.slots[idx].replace((key, value));
			return Ok(previous.map(|(_, v)| v));
		}
		let max_size = self.slots.len();
		let Some(free) = self.slots.iter_mut().find(|slot| slot.is_none()) else {
			tracing::debug!(max_size, "bounded identity map full; insert rejected");
			return Err(CapacityExceeded { key, value, max_size });
		};
		*free = Some((key, value));
		self.len += 1;
		Ok(None)
	}

	pub fn get(&self, key: &K) -> Option<&V> {
		let idx = self.position(key)?;
		self.slots[idx].as_ref().map(|(_, v)| v)
	}

	pub fn contains_key(&self, key: &K) -> bool {
		self.position(key).is_some()
	}

	pub fn contains_value(&self, value: &V) -> bool
	where
		V: PartialEq,
	{
		self.iter().any(|(_, v)| v == value)
	}

	/// Removes the entry, leaving a gap later inserts reuse.
	pub fn remove(&mut self, key: &K) -> Option<V> {
		let idx = self.position(key)?;
		let (_, value) = self.slots[idx].take()?;
		self.len -= 1;
		Some(value)
	}

	pub fn clear(&mut self) {
		self.slots.iter_mut().for_each(|slot| *slot = None);
		self.len = 0;
	}

	/// Occupied slots in slot order.
	pub fn iter(&self) -> impl Iterator<Item = (&Arc<K>, &V)> + '_ {
		self.slots.iter().flatten().map(|(k, v)| (k, v))
	}

	pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
		self.iter().map(|(_, v)| v)
	}

	/// Moves every entry into a general identity registry, in slot order.
	pub fn into_registry(self) -> IdentityRegistry<K, V> {
		let mut registry = IdentityRegistry::with_capacity(self.slots.len() * 2);
		registry.extend(self.slots.into_vec().into_iter().flatten());
		registry
	}
}

impl<K: ?Sized, V: Clone> Clone for ArrayIdentityMap<K, V> {
	fn clone(&self) -> Self {
		Self {
			slots: self.slots.clone(),
			len: self.len,
		}
	}
}

impl<K: ?Sized + fmt::Debug, V: fmt::Debug> fmt::Debug for ArrayIdentityMap<K, V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.iter()).finish()
	}
}
