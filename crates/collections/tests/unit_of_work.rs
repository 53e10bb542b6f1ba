//! Session-shaped scenarios combining the universe, compact sets and identity maps.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tessera_collections::{
	ArrayIdentityMap, IdentityRegistry, ImmutableCompactSet, SubsetView, TrackingConfig, ValueUniverse,
};

#[derive(Debug, PartialEq)]
struct Customer {
	name: &'static str,
}

#[test]
fn query_spaces_are_cached_as_frozen_sets() {
	let tables: Arc<ValueUniverse<String>> = Arc::new(ValueUniverse::new());
	tables.extend(["orders", "customers", "invoices"].map(String::from));

	let mut touched = tables.create_compact_set();
	touched.insert("orders".to_string());
	touched.insert("invoices".to_string());
	let plan_spaces: ImmutableCompactSet<String> = touched.to_compact_immutable_copy();

	// A later operation touches a table the metadata never declared.
	let mut next = tables.create_compact_set();
	next.insert("audit_log".to_string());
	assert_eq!(tables.index_of("audit_log"), Some(3));

	touched.clear();
	assert_eq!(plan_spaces.to_string(), "[orders, invoices]");
	assert!(!plan_spaces.contains_all(&next));
	assert!(plan_spaces.contains("invoices"));
}

#[test]
fn session_tracks_instances_not_values() {
	let config = TrackingConfig::from_toml_str("registry_capacity = 4\nbounded_map_capacity = 1").unwrap();
	let first = Arc::new(Customer { name: "ada" });
	let twin = Arc::new(Customer { name: "ada" });

	let mut small = ArrayIdentityMap::from_config(&config).unwrap();
	small.insert(Arc::clone(&first), "managed").unwrap();
	let overflow = small.insert(Arc::clone(&twin), "detached").unwrap_err();

	// Promote to the general registry and replay the rejected insert.
	let mut registry: IdentityRegistry<Customer, &str> = small.into_registry();
	let (key, value) = overflow.into_parts();
	registry.insert(key, value);

	assert_eq!(registry.len(), 2);
	assert_eq!(registry.get(&first), Some(&"managed"));
	assert_eq!(registry.get(&twin), Some(&"detached"));

	let names: Vec<_> = registry.keys().map(|c| c.name).collect();
	assert_eq!(names, vec!["ada", "ada"]);
}
