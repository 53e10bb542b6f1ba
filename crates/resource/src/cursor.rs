//! Statement to cursor-set bookkeeping for one connection-scoped resource manager.
//!
//! # Mental model
//!
//! Almost every connection has at most one open statement at a time. [`ResourceCursorTracker`]
//! keeps that statement in a plain slot and only allocates an overflow map when a second
//! statement is registered concurrently. Cursor sets themselves are allocated lazily on the first
//! cursor.
//!
//! # States per statement
//!
//! | State | Reached by |
//! |---|---|
//! | unregistered | `new`, `remove_statement`, `clear` |
//! | registered, no cursor set | `register_statement` |
//! | registered with cursor set | `cursors_mut` |
//!
//! # Invariants
//!
//! * The first slot and the overflow map never hold the same statement.
//! * The overflow map is `None` rather than empty; it exists only while a second statement is live.
//! * Removing a statement removes all of its cursors.
//!
//! # Failure modes & recovery
//!
//! * Registering a statement twice returns [`ResourceError::AlreadyRegistered`].
//! * Asking for the cursors of an unregistered statement logs at `debug` and registers it: some
//!   pooling layers hand out wrapped statements, which hides the original registration.

use std::fmt::Debug;
use std::hash::Hash;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{ResourceError, Result};

/// Open cursors produced by one statement.
pub type CursorSet<C> = FxHashSet<C>;

type Overflow<S, C> = FxHashMap<S, Option<CursorSet<C>>>;

struct Entry<S, C> {
	statement: S,
	cursors: Option<CursorSet<C>>,
}

/// Live statements: the fast-path slot plus, while a second statement is live, the overflow map.
struct Slots<S, C> {
	first: Entry<S, C>,
	overflow: Option<Overflow<S, C>>,
}

impl<S, C> Slots<S, C> {
	fn new(statement: S) -> Self {
		Self {
			first: Entry { statement, cursors: None },
			overflow: None,
		}
	}
}

/// Tracks the cursors opened under each live statement.
///
/// Not synchronized: one tracker belongs to one connection wrapper.
pub struct ResourceCursorTracker<S, C> {
	slots: Option<Slots<S, C>>,
}

impl<S, C> Default for ResourceCursorTracker<S, C> {
	fn default() -> Self {
		Self { slots: None }
	}
}

impl<S, C> ResourceCursorTracker<S, C>
where
	S: Eq + Hash + Clone + Debug,
	C: Eq + Hash,
{
	pub fn new() -> Self {
		Self::default()
	}

	/// True while any statement is registered.
	pub fn has_registered_resources(&self) -> bool {
		self.slots.is_some()
	}

	/// Number of registered statements.
	pub fn len(&self) -> usize {
		self.slots
			.as_ref()
			.map_or(0, |slots| 1 + slots.overflow.as_ref().map_or(0, FxHashMap::len))
	}

	pub fn is_empty(&self) -> bool {
		!self.has_registered_resources()
	}

	pub fn contains_statement(&self, statement: &S) -> bool {
		self.slots.as_ref().is_some_and(|slots| {
			slots.first.statement == *statement || slots.overflow.as_ref().is_some_and(|overflow| overflow.contains_key(statement))
		})
	}

	/// Starts tracking `statement` with no cursors.
	pub fn register_statement(&mut self, statement: S) -> Result<()> {
		if self.contains_statement(&statement) {
			return Err(ResourceError::AlreadyRegistered {
				statement: format!("{statement:?}"),
			});
		}
		self.slot(&statement);
		Ok(())
	}

	/// Cursor slot of `statement`, registering the statement if it is unknown.
	fn slot(&mut self, statement: &S) -> &mut Option<CursorSet<C>> {
		let slots = self.slots.get_or_insert_with(|| Slots::new(statement.clone()));
		if slots.first.statement == *statement {
			return &mut slots.first.cursors;
		}
		slots
			.overflow
			.get_or_insert_with(Overflow::default)
			.entry(statement.clone())
			.or_insert(None)
	}

	/// Cursors of `statement`, if it is registered and has opened any.
	pub fn cursors(&self, statement: &S) -> Option<&CursorSet<C>> {
		let slots = self.slots.as_ref()?;
		if slots.first.statement == *statement {
			return slots.first.cursors.as_ref();
		}
		slots.overflow.as_ref()?.get(statement)?.as_ref()
	}

	/// Writable cursor set of `statement`, allocated on first use.
	///
	/// An unregistered statement is registered on the fly.
	pub fn cursors_mut(&mut self, statement: &S) -> &mut CursorSet<C> {
		if !self.contains_statement(statement) {
			tracing::debug!(?statement, "cursor opened on an unregistered statement; registering it");
		}
		self.slot(statement).get_or_insert_with(CursorSet::default)
	}

	/// Stops tracking `statement`, handing back its cursors for the caller to close.
	///
	/// Returns `None` for an unknown statement and an empty set for one that never opened a
	/// cursor. When the first slot is vacated, an overflow entry is promoted into it.
	pub fn remove_statement(&mut self, statement: &S) -> Option<CursorSet<C>> {
		let slots = self.slots.as_mut()?;
		let removed = if slots.first.statement == *statement {
			match slots.overflow.as_mut().and_then(promote) {
				Some(next) => std::mem::replace(&mut slots.first, next).cursors,
				None => self.slots.take().and_then(|slots| slots.first.cursors),
			}
		} else {
			slots.overflow.as_mut()?.remove(statement)?
		};
		if let Some(slots) = &mut self.slots
			&& slots.overflow.as_ref().is_some_and(FxHashMap::is_empty)
		{
			slots.overflow = None;
		}
		Some(removed.unwrap_or_default())
	}

	/// Visits every `(statement, cursors)` pair, first slot first.
	///
	/// Statements without cursors are visited with an empty set.
	pub fn for_each<F>(&self, mut visit: F)
	where
		F: FnMut(&S, &CursorSet<C>),
	{
		let Some(slots) = &self.slots else {
			return;
		};
		let empty = CursorSet::default();
		visit(&slots.first.statement, slots.first.cursors.as_ref().unwrap_or(&empty));
		for (statement, cursors) in slots.overflow.iter().flatten() {
			visit(statement, cursors.as_ref().unwrap_or(&empty));
		}
	}

	/// Forgets every statement and cursor without closing them.
	pub fn clear(&mut self) {
		self.slots = None;
	}
}

fn promote<S, C>(overflow: &mut Overflow<S, C>) -> Option<Entry<S, C>>
where
	S: Eq + Hash + Clone,
{
	let statement = overflow.keys().next()?.clone();
	let cursors = overflow.remove(&statement)?;
	Some(Entry { statement, cursors })
}

impl<S: Debug, C: Debug> Debug for ResourceCursorTracker<S, C> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut map = f.debug_map();
		if let Some(slots) = &self.slots {
			map.entry(&slots.first.statement, &slots.first.cursors);
			map.entries(slots.overflow.iter().flatten());
		}
		map.finish()
	}
}
