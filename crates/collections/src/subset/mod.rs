//! Bitmap-backed sets over a shared [`ValueUniverse`].
//!
//! # Purpose
//!
//! Operations frequently need to record "which of N known tables/entities were touched", with
//! N bounded and reused across many short-lived sets. Indexing members through a shared universe
//! turns each set into a handful of machine words instead of a hash table.
//!
//! # Key types
//!
//! | Type | Meaning | Constraints |
//! |---|---|---|
//! | [`CompactSet`] | Mutable set, one per operation | Not synchronized; confined to its unit of work |
//! | [`ImmutableCompactSet`] | Frozen copy with cached size/hash | Safe for concurrent reads |
//! | [`SubsetView`] | Read contract shared by both | Same-universe fast paths via [`Bits`] |
//! | [`SubsetMut`] | Fallible mutation contract | Every method fails on the frozen variant |
//!
//! # Invariants
//!
//! * Bit `i` is set iff the universe value with ordinal `i` is a member.
//! * Adding an unknown value grows the universe before the bit is set.
//! * Iteration pins a universe snapshot; concurrent universe growth never moves a member.
//!
//! # Equality
//!
//! Sets from the same universe (`Arc::ptr_eq`) compare bitmaps. Sets from different universes
//! compare size and element-wise containment. Hashes are only comparable within one universe.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::error::{CollectionError, Result};
use crate::universe::{UniverseSnapshot, ValueUniverse};

mod bits;
mod immutable;
mod mutable;

pub use bits::Bits;
pub use immutable::ImmutableCompactSet;
pub use mutable::CompactSet;

/// Read-only operations common to mutable and frozen compact sets.
pub trait SubsetView<V>
where
	V: Eq + Hash + Clone,
{
	/// Universe this set indexes into.
	fn universe(&self) -> &Arc<ValueUniverse<V>>;

	/// Membership bitmap.
	fn bits(&self) -> &Bits;

	fn len(&self) -> usize {
		self.bits().count()
	}

	fn is_empty(&self) -> bool {
		self.bits().is_empty()
	}

	/// Membership test; values unknown to the universe are never members.
	fn contains<Q>(&self, value: &Q) -> bool
	where
		V: Borrow<Q>,
		Q: Hash + Eq + ?Sized,
	{
		self.universe()
			.index_of(value)
			.is_some_and(|idx| self.bits().get(idx))
	}

	/// Members in ascending ordinal order.
	fn iter(&self) -> Iter<'_, V> {
		Iter::new(self.universe().snapshot(), self.bits())
	}

	/// True when every member of `other` is a member of `self`.
	///
	/// Sets sharing a universe are compared word by word; otherwise each member of `other` is
	/// looked up individually.
	fn contains_all<O>(&self, other: &O) -> bool
	where
		O: SubsetView<V> + ?Sized,
	{
		if Arc::ptr_eq(self.universe(), other.universe()) {
			return other.bits().is_subset_of(self.bits());
		}
		other.iter().all(|v| self.contains(&v))
	}

	/// Element-wise containment check against arbitrary values.
	fn contains_all_values<'a, I>(&self, values: I) -> bool
	where
		I: IntoIterator<Item = &'a V>,
		V: 'a,
	{
		values.into_iter().all(|v| self.contains(v))
	}
}

/// Fallible mutation contract.
///
/// `retain_all` and `remove_all` are not provided by any compact set; callers needing them
/// materialize into a general-purpose set first.
pub trait SubsetMut<V>
where
	V: Eq + Hash + Clone,
{
	/// Container name used in [`CollectionError::Unsupported`].
	const CONTAINER: &'static str;

	/// Adds `value`, returning whether membership changed.
	fn try_add(&mut self, value: V) -> Result<bool>;

	/// Removes `value`, returning whether membership changed.
	fn try_remove(&mut self, value: &V) -> Result<bool>;

	/// Adds every value, returning whether any membership changed.
	fn try_add_all<I>(&mut self, values: I) -> Result<bool>
	where
		I: IntoIterator<Item = V>;

	fn try_clear(&mut self) -> Result<()>;

	fn retain_all<I>(&mut self, _values: I) -> Result<bool>
	where
		I: IntoIterator<Item = V>,
	{
		Err(CollectionError::unsupported(Self::CONTAINER, "retain_all"))
	}

	fn remove_all<I>(&mut self, _values: I) -> Result<bool>
	where
		I: IntoIterator<Item = V>,
	{
		Err(CollectionError::unsupported(Self::CONTAINER, "remove_all"))
	}
}

/// Lazy single-pass iterator over a compact set.
///
/// Holds the universe snapshot taken at creation; values registered afterwards cannot be members
/// of the borrowed set, so the snapshot always resolves every set bit.
pub struct Iter<'a, V> {
	snapshot: Arc<UniverseSnapshot<V>>,
	bits: &'a Bits,
	next: Option<usize>,
}

impl<'a, V> Iter<'a, V>
where
	V: Eq + Hash + Clone,
{
	fn new(snapshot: Arc<UniverseSnapshot<V>>, bits: &'a Bits) -> Self {
		Self {
			snapshot,
			bits,
			next: bits.next_set_bit(0),
		}
	}
}

impl<V> Iterator for Iter<'_, V>
where
	V: Eq + Hash + Clone,
{
	type Item = V;

	fn next(&mut self) -> Option<V> {
		let idx = self.next?;
		self.next = self.bits.next_set_bit(idx + 1);
		match self.snapshot.get(idx) {
			Some(value) => Some(value.clone()),
			None => {
				self.next = None;
				None
			}
		}
	}
}

impl<V> std::iter::FusedIterator for Iter<'_, V> where V: Eq + Hash + Clone {}

pub(crate) fn set_eq<V, A, B>(a: &A, b: &B) -> bool
where
	V: Eq + Hash + Clone,
	A: SubsetView<V>,
	B: SubsetView<V>,
{
	if Arc::ptr_eq(a.universe(), b.universe()) {
		return a.bits() == b.bits();
	}
	a.len() == b.len() && a.contains_all(b)
}

pub(crate) fn fmt_members<V, S>(set: &S, f: &mut fmt::Formatter<'_>) -> fmt::Result
where
	V: Eq + Hash + Clone + fmt::Display,
	S: SubsetView<V>,
{
	f.write_str("[")?;
	for (i, value) in set.iter().enumerate() {
		if i > 0 {
			f.write_str(", ")?;
		}
		write!(f, "{value}")?;
	}
	f.write_str("]")
}
