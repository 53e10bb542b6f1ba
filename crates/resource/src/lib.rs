//! Connection-scoped resource bookkeeping.
//!
//! [`ResourceCursorTracker`] records which cursors each live statement opened so the owning
//! resource manager can close them together. Statements and cursors are opaque to the tracker;
//! wrap driver handles in [`StatementHandle`]/[`CursorHandle`] to track them by reference identity.

pub mod cursor;
pub mod error;

use tessera_collections::IdentityKey;

pub use cursor::{CursorSet, ResourceCursorTracker};
pub use error::{ResourceError, Result};

/// Statement tracked by the address of its shared handle.
pub type StatementHandle<S> = IdentityKey<S>;

/// Cursor tracked by the address of its shared handle.
pub type CursorHandle<C> = IdentityKey<C>;

/// Tracker keyed by reference identity on both levels.
pub type IdentityCursorTracker<S, C> = ResourceCursorTracker<StatementHandle<S>, CursorHandle<C>>;
