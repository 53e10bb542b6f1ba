//! Reference-identity maps for unit-of-work state.
//!
//! # Purpose
//!
//! Session state must tell apart two managed instances that happen to compare equal (entities
//! before identifier assignment, or types with loose `PartialEq`). Both maps here key entries by
//! the address of a shared `Arc<K>`, never by `K: Eq`.
//!
//! # Key types
//!
//! | Type | Meaning | Constraints |
//! |---|---|---|
//! | [`IdentityKey`] | `Arc<K>` hashed/compared by address | Keeps the allocation (and its address) alive |
//! | [`IdentityRegistry`] | Insertion-ordered identity map | Not synchronized; one per session |
//! | [`ArrayIdentityMap`] | Bounded slot array, linear scan | Inserts past capacity return [`CapacityExceeded`] |
//!
//! # Invariants
//!
//! * Distinct instances never collide, whatever their value equality says.
//! * `snapshot_entries` results never observe inserts made after they were taken.

mod array;
mod key;
mod map;

pub use array::{ArrayIdentityMap, CapacityExceeded};
pub use key::IdentityKey;
pub use map::{IdentityEntry, IdentityRegistry};

#[cfg(test)]
mod tests;
