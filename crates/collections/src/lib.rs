//! In-memory tracking structures for unit-of-work state.
//!
//! * [`universe`]: thread-safe ordinal registry with copy-on-write snapshots.
//! * [`subset`]: bitmap sets over a shared universe, mutable and frozen.
//! * [`identity`]: maps keyed by reference identity, unbounded and bounded.
//!
//! None of these perform I/O; everything is synchronous and bounded by the size of the tracked
//! collections.

pub mod config;
pub mod error;
pub mod identity;
pub mod subset;
pub mod universe;

pub use config::TrackingConfig;
pub use error::{CollectionError, Result};
pub use identity::{ArrayIdentityMap, CapacityExceeded, IdentityEntry, IdentityKey, IdentityRegistry};
pub use subset::{CompactSet, ImmutableCompactSet, SubsetMut, SubsetView};
pub use universe::{UniverseSnapshot, ValueUniverse};
