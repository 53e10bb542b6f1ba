use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use super::{ArrayIdentityMap, IdentityEntry, IdentityKey, IdentityRegistry};
use crate::config::TrackingConfig;
use crate::error::CollectionError;

/// Entity whose equality ignores identity, like one awaiting its generated id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Order {
	number: Option<u64>,
}

fn pending() -> Arc<Order> {
	Arc::new(Order { number: None })
}

#[test]
fn value_equal_instances_are_distinct_keys() {
	let a = pending();
	let b = pending();
	assert_eq!(a, b);

	let mut registry = IdentityRegistry::new();
	assert_eq!(registry.insert(Arc::clone(&a), "a"), None);
	assert_eq!(registry.insert(Arc::clone(&b), "b"), None);

	assert_eq!(registry.len(), 2);
	assert_eq!(registry.get(&a), Some(&"a"));
	assert_eq!(registry.get(&b), Some(&"b"));
	assert!(!registry.contains_key(&Order { number: None }));
}

#[test]
fn same_instance_overwrites() {
	let a = pending();
	let mut registry = IdentityRegistry::new();
	registry.insert(Arc::clone(&a), 1);
	assert_eq!(registry.insert(Arc::clone(&a), 2), Some(1));
	assert_eq!(registry.len(), 1);
	assert_eq!(registry.get(&a), Some(&2));
	*registry.get_mut(&a).unwrap() += 1;
	assert_eq!(registry.get(&a), Some(&3));
}

#[test]
fn remove_keeps_insertion_order() {
	let keys: Vec<_> = (0..4).map(|n| Arc::new(Order { number: Some(n) })).collect();
	let mut registry: IdentityRegistry<Order, u64> = keys.iter().map(|k| (Arc::clone(k), k.number.unwrap_or(0))).collect();

	assert_eq!(registry.remove(&keys[1]), Some(1));
	assert_eq!(registry.remove(&keys[1]), None);
	let order: Vec<_> = registry.keys().map(|k| k.number).collect();
	assert_eq!(order, vec![Some(0), Some(2), Some(3)]);
	assert!(registry.contains_value(&3));
	assert!(!registry.contains_value(&1));
}

#[test]
fn keys_are_the_original_handles() {
	let a = pending();
	let mut registry = IdentityRegistry::new();
	registry.insert(Arc::clone(&a), ());
	let key = registry.keys().next().unwrap();
	assert!(Arc::ptr_eq(key, &a));
}

#[test]
fn snapshot_tolerates_inserts_during_iteration() {
	let mut registry = IdentityRegistry::new();
	for n in 0..3 {
		registry.insert(Arc::new(Order { number: Some(n) }), n);
	}

	let entries = registry.snapshot_entries();
	for (key, value) in entries.iter() {
		registry.insert(Arc::new(Order { number: key.number.map(|n| n + 10) }), value + 10);
	}

	assert_eq!(entries.len(), 3);
	assert_eq!(registry.len(), 6);
	assert_eq!(registry.snapshot_entries().len(), 6);
}

#[test]
fn snapshot_is_reused_until_changed() {
	let mut registry = IdentityRegistry::new();
	let a = pending();
	registry.insert(Arc::clone(&a), 1);
	let first = registry.snapshot_entries();
	let second = registry.snapshot_entries();
	assert!(Arc::ptr_eq(&first, &second));

	registry.remove(&a);
	let third = registry.snapshot_entries();
	assert!(!Arc::ptr_eq(&first, &third));
	assert!(third.is_empty());
}

#[test]
fn snapshot_sees_values_changed_in_place() {
	let mut registry = IdentityRegistry::new();
	let a = pending();
	registry.insert(Arc::clone(&a), 1);
	let before = registry.snapshot_entries();

	*registry.get_mut(&a).unwrap() = 2;
	let after = registry.snapshot_entries();
	assert_eq!(before[0].1, 1);
	assert_eq!(after[0].1, 2);
	assert_eq!(registry.get(&a), Some(&2));

	assert!(registry.get_mut(&pending()).is_none());
	assert!(Arc::ptr_eq(&after, &registry.snapshot_entries()));
}

#[test]
fn entry_set_compares_by_value() {
	let mut registry = IdentityRegistry::new();
	registry.insert(pending(), 7);
	registry.insert(pending(), 7);
	let entries = registry.entry_set();
	assert_eq!(entries.len(), 2);
	assert_eq!(entries[0], entries[1]);
	assert_eq!(
		entries[0],
		IdentityEntry {
			key: pending(),
			value: 7
		}
	);
	let distinct: HashSet<_> = entries.into_iter().collect();
	assert_eq!(distinct.len(), 1);
}

#[test]
fn key_set_is_unsupported() {
	let registry: IdentityRegistry<Order, ()> = IdentityRegistry::new();
	assert!(matches!(registry.key_set(), Err(CollectionError::Unsupported { operation: "key_set", .. })));
}

#[test]
fn clear_empties_registry() {
	let mut registry = IdentityRegistry::from_config(&TrackingConfig::default());
	registry.insert(pending(), 1);
	let _ = registry.snapshot_entries();
	registry.clear();
	assert!(registry.is_empty());
	assert!(registry.snapshot_entries().is_empty());
}

#[test]
fn unsized_keys_use_identity() {
	let a: Arc<str> = Arc::from("orders");
	let b: Arc<str> = Arc::from("orders");
	let mut registry: IdentityRegistry<str, u8> = IdentityRegistry::new();
	registry.insert(Arc::clone(&a), 1);
	assert_eq!(registry.get(&a), Some(&1));
	assert_eq!(registry.get(&b), None);
	assert_eq!(registry.get("orders"), None);
}

#[test]
fn identity_key_equality_ignores_value() {
	let a = pending();
	let k1 = IdentityKey::new(Arc::clone(&a));
	let k2 = IdentityKey::from(Arc::clone(&a));
	let k3 = IdentityKey::new(pending());
	assert_eq!(k1, k2);
	assert_ne!(k1, k3);
	assert_eq!(*k1, *k3);
	assert_eq!(k1.addr(), k2.clone().addr());
}

#[test]
fn bounded_map_rejects_zero_capacity() {
	let err = ArrayIdentityMap::<Order, u8>::with_max_size(0).unwrap_err();
	assert!(matches!(err, CollectionError::InvalidArgument { .. }));
}

#[test]
fn bounded_map_signals_overflow() {
	let mut map = ArrayIdentityMap::with_max_size(2).unwrap();
	let (a, b, c) = (pending(), pending(), pending());
	assert!(map.insert(Arc::clone(&a), 1).unwrap().is_none());
	assert!(map.insert(Arc::clone(&b), 2).unwrap().is_none());

	let rejected = map.insert(Arc::clone(&c), 3).unwrap_err();
	assert_eq!(rejected.max_size, 2);
	let (key, value) = rejected.into_parts();
	assert!(Arc::ptr_eq(&key, &c));
	assert_eq!(value, 3);
	assert_eq!(map.len(), 2);
	assert!(!map.contains_key(&c));

	// Same identity still replaces in place when full.
	assert_eq!(map.insert(Arc::clone(&a), 10).unwrap(), Some(1));
	assert_eq!(map.get(&a), Some(&10));
}

#[test]
fn bounded_map_reuses_gaps() {
	let mut map = ArrayIdentityMap::with_max_size(2).unwrap();
	let (a, b, c) = (pending(), pending(), pending());
	map.insert(Arc::clone(&a), 'a').unwrap();
	map.insert(Arc::clone(&b), 'b').unwrap();
	assert_eq!(map.remove(&a), Some('a'));
	assert_eq!(map.remove(&a), None);
	assert!(map.insert(Arc::clone(&c), 'c').is_ok());
	assert_eq!(map.values().copied().collect::<Vec<_>>(), vec!['c', 'b']);
	assert!(map.contains_value(&'b'));
}

#[test]
fn bounded_map_resize_and_promote() {
	let mut map = ArrayIdentityMap::default();
	assert_eq!(map.max_size(), 30);
	let keys: Vec<_> = (0..3).map(|_| pending()).collect();
	for (i, key) in keys.iter().enumerate() {
		map.insert(Arc::clone(key), i).unwrap();
	}

	assert!(map.resized(2).is_err());
	let resized = map.resized(3).unwrap();
	assert_eq!(resized.max_size(), 3);
	assert_eq!(resized.len(), 3);
	assert_eq!(resized.get(&keys[2]), Some(&2));

	let registry = resized.into_registry();
	assert_eq!(registry.len(), 3);
	assert_eq!(registry.values().copied().collect::<Vec<_>>(), vec![0, 1, 2]);

	map.clear();
	assert!(map.is_empty());
	assert!(map.get(&keys[0]).is_none());
}

#[test]
fn bounded_map_from_config() {
	let config = TrackingConfig::from_toml_str("bounded_map_capacity = 4").unwrap();
	let map = ArrayIdentityMap::<Order, ()>::from_config(&config).unwrap();
	assert_eq!(map.max_size(), 4);
}

proptest! {
	#[test]
	fn registry_never_confuses_equal_instances(values in prop::collection::vec(0u8..4, 1..40)) {
		let keys: Vec<Arc<u8>> = values.iter().map(|v| Arc::new(*v)).collect();
		let mut registry = IdentityRegistry::new();
		for (i, key) in keys.iter().enumerate() {
			registry.insert(Arc::clone(key), i);
		}
		prop_assert_eq!(registry.len(), keys.len());
		for (i, key) in keys.iter().enumerate() {
			prop_assert_eq!(registry.get(key), Some(&i));
		}
	}
}
