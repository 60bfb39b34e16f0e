//! Factory property-based tests
//!
//! Property-based tests for attribute layering, reuse priority and
//! collection indexing.

use proptest::prelude::*;
use reinhardt_factory::prelude::*;
use reinhardt_foundry_integration_tests::domain::{self, CATEGORY, CONTACT};
use reinhardt_foundry_integration_tests::factories::SimpleObjectFactory;
use rstest::*;

fn foundry() -> Foundry {
	Foundry::builder()
		.faker_seed(7)
		.classes(domain::classes())
		.build()
		.unwrap()
}

// ============================================================================
// Property-Based Tests: attribute layers
// ============================================================================

proptest! {
	/// Test: last attribute layer wins
	///
	/// Category: Property
	/// Verifies that states apply in order after the defaults and that
	/// creation overrides beat every state.
	#[rstest]
	fn prop_last_layer_wins(
		default in "[a-z]{1,10}",
		states in prop::collection::vec("[a-z]{1,10}", 0..5),
		override_value in prop::option::of("[a-z]{1,10}"),
	) {
		let foundry = foundry();
		let mut objects = factory("SimpleObject", attributes! { "prop1" => default.clone() });
		for state in &states {
			objects = objects.with(attributes! { "prop1" => state.clone() });
		}
		let overrides = match &override_value {
			Some(value) => attributes! { "prop1" => value.clone() },
			None => Attributes::new(),
		};

		let object = objects.create_with(&foundry, overrides).unwrap();

		let expected = override_value.or_else(|| states.last().cloned()).unwrap_or(default);
		prop_assert_eq!(object.get_str("prop1"), Some(expected));
	}

	/// Test: layers never leak between factories
	///
	/// Category: Property
	/// Verifies that `with` returns a new factory and leaves the receiver untouched.
	#[rstest]
	fn prop_with_is_immutable(default in "[a-z]{1,10}", state in "[A-Z]{1,10}") {
		let foundry = foundry();
		let base = factory("SimpleObject", attributes! { "prop1" => default.clone() });
		let _derived = base.with(attributes! { "prop1" => state });

		let object = base.create(&foundry).unwrap();

		prop_assert_eq!(object.get_str("prop1"), Some(default));
	}
}

// ============================================================================
// Property-Based Tests: reuse
// ============================================================================

proptest! {
	/// Test: explicit attributes beat reused objects
	///
	/// Category: Property
	/// Verifies that a pinned object only fills a property nothing else sets.
	#[rstest]
	fn prop_reuse_priority(explicit in any::<bool>(), name in "[a-z]{1,10}") {
		let foundry = foundry();
		let pinned = ObjectRef::with_fields(CATEGORY, [("name", "pinned")]);
		let contacts = factory(CONTACT, attributes! { "name" => "contact" })
			.reuse(pinned.clone())
			.unwrap();
		let overrides = if explicit {
			attributes! { "category" => factory(CATEGORY, attributes! { "name" => name.clone() }) }
		} else {
			Attributes::new()
		};

		let contact = contacts.create_with(&foundry, overrides).unwrap();

		let category = contact.get_object("category").unwrap();
		prop_assert_eq!(category.is(&pinned), !explicit);
		let expected = if explicit { name } else { "pinned".to_string() };
		prop_assert_eq!(category.get_str("name"), Some(expected));
	}
}

// ============================================================================
// Property-Based Tests: collections
// ============================================================================

proptest! {
	/// Test: collection indices
	///
	/// Category: Property
	/// Verifies that `many(n)` creates n objects indexed from 1 to n.
	#[rstest]
	fn prop_many_indices(count in 0usize..20) {
		let foundry = foundry();

		let objects = SimpleObjectFactory::new().many(count).create(&foundry).unwrap();

		let indices: Vec<_> = objects.iter().map(|object| object.get_i64("prop2").unwrap()).collect();
		let expected: Vec<_> = (1..=count as i64).collect();
		prop_assert_eq!(indices, expected);
	}

	/// Test: sequences keep their order
	///
	/// Category: Property
	/// Verifies that a sequence creates one object per entry, in order.
	#[rstest]
	fn prop_sequence_order(values in prop::collection::vec("[a-z]{1,10}", 0..10)) {
		let foundry = foundry();

		let objects = SimpleObjectFactory::create_sequence(
			&foundry,
			values.iter().map(|value| attributes! { "prop1" => value.clone() }),
		)
		.unwrap();

		let created: Vec<_> = objects.iter().map(|object| object.get_str("prop1").unwrap()).collect();
		prop_assert_eq!(created, values);
	}

	/// Test: range bounds
	///
	/// Category: Property
	/// Verifies that `range(min, max)` creates between min and max objects.
	#[rstest]
	fn prop_range_bounds(min in 0usize..5, extra in 0usize..5) {
		let foundry = foundry();
		let max = min + extra;

		let objects = SimpleObjectFactory::new().range(min, max).unwrap().create(&foundry).unwrap();

		prop_assert!((min..=max).contains(&objects.len()));
	}
}
