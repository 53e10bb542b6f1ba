use std::sync::Arc;
use std::sync::Barrier;

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::ValueUniverse;

#[test]
fn ordinals_follow_first_registration() {
	let universe = ValueUniverse::new();
	assert_eq!(universe.ensure_index("orders"), 0);
	assert_eq!(universe.ensure_index("customers"), 1);
	assert_eq!(universe.ensure_index("orders"), 0);
	assert_eq!(universe.len(), 2);
	assert_eq!(universe.index_of("customers"), Some(1));
	assert_eq!(universe.index_of("invoices"), None);
}

#[test]
fn lookup_accepts_borrowed_form() {
	let universe: ValueUniverse<String> = ValueUniverse::new();
	universe.ensure_index("orders".to_string());
	assert_eq!(universe.index_of("orders"), Some(0));
	assert_eq!(universe.value_at(0).as_deref(), Some("orders"));
	assert_eq!(universe.value_at(1), None);
}

#[test]
fn pinned_snapshot_ignores_later_growth() {
	let universe = ValueUniverse::new();
	universe.ensure_index("a");
	let pinned = universe.snapshot();
	universe.ensure_index("b");

	assert_eq!(pinned.len(), 1);
	assert_eq!(pinned.values(), &["a"]);
	assert_eq!(universe.snapshot().values(), &["a", "b"]);
}

#[test]
fn extend_skips_known_values() {
	let universe = ValueUniverse::new();
	universe.ensure_index("b");
	universe.extend(["a", "b", "c", "a"]);
	assert_eq!(universe.snapshot().values(), &["b", "a", "c"]);
}

#[test]
fn extend_without_new_values_keeps_snapshot() {
	let universe = ValueUniverse::new();
	universe.extend(["a"]);
	let before = universe.snapshot();
	universe.extend(["a"]);
	assert!(Arc::ptr_eq(&before, &universe.snapshot()));
}

#[test]
fn extend_accepts_iterator_that_registers_values() {
	let universe = ValueUniverse::new();
	universe.extend((0..2).map(|i| {
		universe.ensure_index(100 + i);
		i
	}));
	assert_eq!(universe.snapshot().values(), &[100, 101, 0, 1]);
	assert_eq!(universe.index_of(&1), Some(3));
}

#[test]
fn concurrent_registration_assigns_one_index_per_value() {
	const THREADS: usize = 8;
	const VALUES: usize = 64;

	let universe = ValueUniverse::<usize>::new();
	let barrier = Barrier::new(THREADS);
	let observed: Vec<Vec<usize>> = std::thread::scope(|scope| {
		let handles: Vec<_> = (0..THREADS)
			.map(|t| {
				let universe = &universe;
				let barrier = &barrier;
				scope.spawn(move || {
					barrier.wait();
					// Each thread walks the values in a different rotation.
					(0..VALUES)
						.map(|i| (i + t * 7) % VALUES)
						.map(|v| (v, universe.ensure_index(v)))
						.fold(vec![usize::MAX; VALUES], |mut acc, (v, idx)| {
							acc[v] = idx;
							acc
						})
				})
			})
			.collect();
		handles.into_iter().map(|h| h.join().unwrap()).collect()
	});

	assert_eq!(universe.len(), VALUES);
	let first = &observed[0];
	for other in &observed[1..] {
		assert_eq!(first, other);
	}
	let mut indices = first.clone();
	indices.sort_unstable();
	assert_eq!(indices, (0..VALUES).collect::<Vec<_>>());
	for (value, &index) in first.iter().enumerate() {
		assert_eq!(universe.index_of(&value), Some(index));
	}
}

proptest! {
	#[test]
	fn ensure_index_is_stable(values in prop::collection::vec(0u16..50, 0..200)) {
		let universe = ValueUniverse::new();
		let assigned: Vec<usize> = values.iter().map(|v| universe.ensure_index(*v)).collect();
		for (value, index) in values.iter().zip(assigned) {
			prop_assert_eq!(universe.index_of(value), Some(index));
			prop_assert_eq!(universe.value_at(index), Some(*value));
		}
		let mut distinct = values.clone();
		distinct.sort_unstable();
		distinct.dedup();
		prop_assert_eq!(universe.len(), distinct.len());
	}
}
