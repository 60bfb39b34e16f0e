//! Inverse Relationship Integration Tests
//!
//! Tests covering factories whose field is the inverse side of an
//! association: the children must point back at a parent that does not
//! exist yet while the parent's attributes are normalized.
//! - one-to-many and many-to-many collections, created after the parent
//! - one-to-one, created against a placeholder and rewired afterwards
//! - collections indexed by a child field

use reinhardt_factory::prelude::*;
use reinhardt_factory_test::TestKernel;
use reinhardt_foundry_integration_tests::domain::{
	CATEGORY, CONTACT, INDEXED_CHILD, INDEXED_PARENT, INVERSE_SIDE, INVERSE_SIDE_WITH_ITEMS, ITEM, OWNING_SIDE,
	OWNING_SIDE_WITH_ITEMS, REFERENCING_OWNING_SIDE, SELF_REFERENCING_INVERSE_SIDE,
};
use reinhardt_foundry_integration_tests::factories::{
	CategoryFactory, ContactFactory, IndexedChildFactory, IndexedParentFactory, InverseSideFactory,
	OwningSideFactory, TagFactory,
};
use reinhardt_foundry_integration_tests::{kernel, kernel_with_cascade};
use rstest::*;

fn count(kernel: &TestKernel, class: &str) -> usize {
	kernel.persistence().unwrap().row_count(class)
}

// ============================================================================
// One-to-many
// ============================================================================

#[rstest]
fn test_one_to_many_children_point_at_the_parent(#[values(false, true)] cascade: bool) {
	// Arrange
	let kernel = kernel_with_cascade(cascade);

	// Act
	let category = CategoryFactory::create_one(
		kernel.foundry(),
		attributes! { "contacts" => ContactFactory::new().many(2) },
	)
	.unwrap();

	// Assert
	let contacts = category.get_objects("contacts");
	assert_eq!(contacts.len(), 2);
	assert!(contacts.iter().all(|c| c.get_object("category").unwrap().is(&category)));
	assert!(contacts.iter().all(|c| c.get_i64("id").is_some()));
	// the contacts' default category factory is overridden, not created
	assert_eq!(count(&kernel, CATEGORY), 1);
	assert_eq!(count(&kernel, CONTACT), 2);
}

#[rstest]
fn test_one_to_many_single_factory(#[values(false, true)] cascade: bool) {
	// Arrange
	let kernel = kernel_with_cascade(cascade);

	// Act
	let category =
		CategoryFactory::create_one(kernel.foundry(), attributes! { "contacts" => ContactFactory::new() }).unwrap();

	// Assert
	let contacts = category.get_objects("contacts");
	assert_eq!(contacts.len(), 1);
	assert!(contacts[0].get_object("category").unwrap().is(&category));
}

#[rstest]
fn test_one_to_many_range(#[values(false, true)] cascade: bool) {
	// Arrange
	let kernel = kernel_with_cascade(cascade);

	// Act
	let category = CategoryFactory::create_one(
		kernel.foundry(),
		attributes! { "contacts" => ContactFactory::new().range(1, 3).unwrap() },
	)
	.unwrap();

	// Assert
	let created = category.get_objects("contacts").len();
	assert!((1..=3).contains(&created));
	assert_eq!(count(&kernel, CONTACT), created);
}

#[rstest]
fn test_one_to_many_existing_objects_are_rebound(#[values(false, true)] cascade: bool) {
	// Arrange
	let kernel = kernel_with_cascade(cascade);
	let existing = ContactFactory::create_many(kernel.foundry(), 2, Attributes::new()).unwrap();

	// Act
	let category = CategoryFactory::create_one(
		kernel.foundry(),
		attributes! { "contacts" => existing.clone() },
	)
	.unwrap();

	// Assert
	assert_eq!(category.get_objects("contacts").len(), 2);
	assert!(existing.iter().all(|c| c.get_object("category").unwrap().is(&category)));
	let criteria: Parameters = [("category".to_string(), Value::from(&category))].into_iter().collect();
	ContactFactory::assert(kernel.foundry()).unwrap().count_by(2, &criteria);
}

#[rstest]
fn test_one_to_many_mixed_list(kernel: TestKernel) {
	// Arrange
	let existing = ContactFactory::create_one(kernel.foundry(), Attributes::new()).unwrap();

	// Act
	let category = CategoryFactory::create_one(
		kernel.foundry(),
		attributes! {
			"contacts" => vec![
				Attribute::from(ContactFactory::new()),
				Attribute::from(&existing),
				Attribute::from(ContactFactory::new().many(2)),
			],
		},
	)
	.unwrap();

	// Assert
	let contacts = category.get_objects("contacts");
	assert_eq!(contacts.len(), 4);
	assert!(contacts.iter().any(|c| c.is(&existing)));
	assert!(contacts.iter().all(|c| c.get_object("category").unwrap().is(&category)));
}

#[rstest]
fn test_one_to_many_lazy_collection(kernel: TestKernel) {
	// Act
	let category = CategoryFactory::create_one(
		kernel.foundry(),
		attributes! { "contacts" => LazyValue::new(|_| Ok(ContactFactory::new().many(2).into())) },
	)
	.unwrap();

	// Assert
	let contacts = category.get_objects("contacts");
	assert_eq!(contacts.len(), 2);
	assert!(contacts.iter().all(|c| c.get_object("category").unwrap().is(&category)));
}

#[rstest]
fn test_one_to_many_without_persisting(kernel: TestKernel) {
	// Act
	let category = CategoryFactory::new()
		.without_persisting()
		.create_with(kernel.foundry(), attributes! { "contacts" => ContactFactory::new().many(2) })
		.unwrap();

	// Assert
	let contacts = category.get_objects("contacts");
	assert_eq!(contacts.len(), 2);
	assert!(contacts.iter().all(|c| c.get_object("category").unwrap().is(&category)));
	assert_eq!(count(&kernel, CONTACT), 0);
	assert_eq!(count(&kernel, CATEGORY), 0);
}

#[rstest]
fn test_one_to_many_subclass_parent(kernel: TestKernel) {
	// Act
	let special = persistent_factory("SpecialCategory", attributes! { "name" => "special" })
		.create_with(kernel.foundry(), attributes! { "contacts" => ContactFactory::new().many(2) })
		.unwrap();

	// Assert
	let contacts = special.get_objects("contacts");
	assert_eq!(contacts.len(), 2);
	assert!(contacts.iter().all(|c| c.get_object("category").unwrap().is(&special)));
	assert_eq!(count(&kernel, CATEGORY), 0);
}

// ============================================================================
// Many-to-many
// ============================================================================

#[rstest]
fn test_many_to_many_inverse_side(#[values(false, true)] cascade: bool) {
	// Arrange
	let kernel = kernel_with_cascade(cascade);

	// Act
	let tag = TagFactory::create_one(kernel.foundry(), attributes! { "contacts" => ContactFactory::new().many(2) }).unwrap();

	// Assert
	let contacts = tag.get_objects("contacts");
	assert_eq!(contacts.len(), 2);
	for contact in &contacts {
		let tags = contact.get_objects("tags");
		assert_eq!(tags.len(), 1);
		assert!(tags[0].is(&tag));
	}
	assert_eq!(count(&kernel, CONTACT), 2);
}

#[rstest]
fn test_many_to_many_inverse_side_keeps_existing_links(kernel: TestKernel) {
	// Arrange
	let first = TagFactory::create_one(kernel.foundry(), Attributes::new()).unwrap();
	let contact = ContactFactory::create_one(kernel.foundry(), attributes! { "tags" => vec![first.clone()] }).unwrap();

	// Act
	let second = TagFactory::create_one(kernel.foundry(), attributes! { "contacts" => vec![contact.clone()] }).unwrap();

	// Assert
	let tags = contact.get_objects("tags");
	assert_eq!(tags.len(), 2);
	assert!(tags[0].is(&first));
	assert!(tags[1].is(&second));
}

// ============================================================================
// One-to-one (inverse side)
// ============================================================================

#[rstest]
fn test_one_to_one_inverse_side(#[values(false, true)] cascade: bool) {
	// Arrange
	let kernel = kernel_with_cascade(cascade);

	// Act
	let inverse = InverseSideFactory::create_one(
		kernel.foundry(),
		attributes! { "owning_side" => OwningSideFactory::new() },
	)
	.unwrap();

	// Assert
	let owning = inverse.get_object("owning_side").unwrap();
	let back = owning.get_object("inverse_side").unwrap();
	assert!(back.is(&inverse));
	assert!(!back.is_placeholder());
	assert_eq!(count(&kernel, INVERSE_SIDE), 1);
	assert_eq!(count(&kernel, OWNING_SIDE), 1);
}

#[rstest]
fn test_one_to_one_inverse_side_before_an_owning_sibling(#[values(false, true)] cascade: bool) {
	// Arrange
	let kernel = kernel_with_cascade(cascade);

	// Act
	let inverse = InverseSideFactory::create_one(
		kernel.foundry(),
		attributes! {
			"owning_side" => OwningSideFactory::new(),
			"category" => CategoryFactory::new_with(attributes! { "name" => "sibling" }),
		},
	)
	.unwrap();
	let unrelated = CategoryFactory::create_one(kernel.foundry(), Attributes::new());

	// Assert
	assert!(unrelated.is_ok());
	let owning = inverse.get_object("owning_side").unwrap();
	assert!(owning.get_object("inverse_side").unwrap().is(&inverse));
	assert_eq!(
		inverse.get_object("category").unwrap().get_str("name").as_deref(),
		Some("sibling")
	);
	assert_eq!(count(&kernel, INVERSE_SIDE), 1);
	assert_eq!(count(&kernel, OWNING_SIDE), 1);
	assert_eq!(count(&kernel, CATEGORY), 2);
}

#[rstest]
fn test_one_to_one_inverse_side_with_one_to_many(#[values(false, true)] cascade: bool) {
	// Arrange
	let kernel = kernel_with_cascade(cascade);
	let inverse_sides = persistent_factory(INVERSE_SIDE_WITH_ITEMS, Attributes::new());
	let owning_sides = persistent_factory(OWNING_SIDE_WITH_ITEMS, Attributes::new());
	let items = persistent_factory(ITEM, Attributes::new()).with(attributes! { "owning_side" => owning_sides.clone() });

	// Act
	let inverse = inverse_sides
		.create_with(
			kernel.foundry(),
			attributes! { "owning_side" => owning_sides.with(attributes! { "items" => items.many(2) }) },
		)
		.unwrap();

	// Assert
	let owning = inverse.get_object("owning_side").unwrap();
	assert!(owning.get_object("inverse_side").unwrap().is(&inverse));
	let created = owning.get_objects("items");
	assert_eq!(created.len(), 2);
	assert!(created.iter().all(|item| item.get_object("owning_side").unwrap().is(&owning)));
	assert_eq!(count(&kernel, INVERSE_SIDE_WITH_ITEMS), 1);
	assert_eq!(count(&kernel, OWNING_SIDE_WITH_ITEMS), 1);
	assert_eq!(count(&kernel, ITEM), 2);
}

#[rstest]
fn test_one_to_one_inverse_side_survives_reload(kernel: TestKernel) {
	// Arrange
	let inverse = InverseSideFactory::create_one(
		kernel.foundry(),
		attributes! { "owning_side" => OwningSideFactory::new() },
	)
	.unwrap();
	kernel.persistence().unwrap().clear();

	// Act
	let reloaded = InverseSideFactory::find(kernel.foundry(), inverse.get_i64("id").unwrap()).unwrap();

	// Assert
	let owning = reloaded.get_object("owning_side").unwrap();
	assert!(owning.get_object("inverse_side").unwrap().is(&reloaded));
	assert_eq!(reloaded.get_str("main_value").as_deref(), Some("main"));
}

#[rstest]
fn test_one_to_one_inverse_side_without_persisting(kernel: TestKernel) {
	// Act
	let inverse = InverseSideFactory::new()
		.without_persisting()
		.create_with(kernel.foundry(), attributes! { "owning_side" => OwningSideFactory::new() })
		.unwrap();

	// Assert
	let owning = inverse.get_object("owning_side").unwrap();
	assert!(owning.get_object("inverse_side").unwrap().is(&inverse));
	assert_eq!(count(&kernel, OWNING_SIDE), 0);
}

#[rstest]
fn test_one_to_one_from_the_owning_side(kernel: TestKernel) {
	// Act
	let owning = OwningSideFactory::create_one(
		kernel.foundry(),
		attributes! { "inverse_side" => InverseSideFactory::new() },
	)
	.unwrap();

	// Assert
	let inverse = owning.get_object("inverse_side").unwrap();
	assert_eq!(inverse.get_str("main_value").as_deref(), Some("main"));
	assert!(inverse.get_i64("id").is_some());
}

// ============================================================================
// Self-referencing inverse side
// ============================================================================

#[rstest]
fn test_many_to_one_to_self_referencing_inverse_side(#[values(false, true)] cascade: bool) {
	// Arrange
	let kernel = kernel_with_cascade(cascade);
	let inverse_sides = persistent_factory(SELF_REFERENCING_INVERSE_SIDE, Attributes::new());

	// Act
	let owning = persistent_factory(REFERENCING_OWNING_SIDE, Attributes::new())
		.create_with(kernel.foundry(), attributes! { "inverse_side" => inverse_sides })
		.unwrap();

	// Assert
	let inverse = owning.get_object("inverse_side").unwrap();
	assert_eq!(inverse.class(), SELF_REFERENCING_INVERSE_SIDE);
	assert!(inverse.get_i64("id").is_some());
	assert_eq!(count(&kernel, REFERENCING_OWNING_SIDE), 1);
	assert_eq!(count(&kernel, SELF_REFERENCING_INVERSE_SIDE), 1);
}

// ============================================================================
// Indexed collections
// ============================================================================

#[rstest]
fn test_indexed_collection(kernel: TestKernel) {
	// Act
	let parent = IndexedParentFactory::create_one(
		kernel.foundry(),
		attributes! {
			"children" => IndexedChildFactory::new().distribute("language", ["en", "fr"]),
		},
	)
	.unwrap();

	// Assert
	let children = parent.get("children").unwrap();
	let children = children.as_map().unwrap();
	assert_eq!(children.keys().collect::<Vec<_>>(), ["en", "fr"]);
	for (language, child) in children {
		let child = child.as_object().unwrap();
		assert_eq!(child.get_str("language").as_deref(), Some(language.as_str()));
		assert!(child.get_object("parent").unwrap().is(&parent));
	}
}

#[rstest]
fn test_indexed_collection_survives_reload(kernel: TestKernel) {
	// Arrange
	let parent = IndexedParentFactory::create_one(
		kernel.foundry(),
		attributes! {
			"children" => IndexedChildFactory::new().distribute("language", ["en", "de"]),
		},
	)
	.unwrap();
	kernel.persistence().unwrap().clear();

	// Act
	let reloaded = IndexedParentFactory::find(kernel.foundry(), parent.get_i64("id").unwrap()).unwrap();

	// Assert
	let children = reloaded.get("children").unwrap();
	let children = children.as_map().unwrap();
	assert_eq!(children.keys().collect::<Vec<_>>(), ["en", "de"]);
}

#[rstest]
fn test_indexed_collection_duplicate_key(kernel: TestKernel) {
	// Act
	let result = IndexedParentFactory::create_one(
		kernel.foundry(),
		attributes! { "children" => IndexedChildFactory::new().many(2) },
	);

	// Assert
	assert!(matches!(
		result,
		Err(FoundryError::DuplicateIndexKey { ref key, .. }) if key == "en"
	));
}

#[rstest]
fn test_failed_create_leaves_nothing_scheduled(kernel: TestKernel) {
	// Arrange
	let failed = IndexedParentFactory::create_one(
		kernel.foundry(),
		attributes! { "children" => IndexedChildFactory::new().many(2) },
	);

	// Act
	let unrelated = CategoryFactory::create_one(kernel.foundry(), Attributes::new());

	// Assert
	assert!(matches!(failed, Err(FoundryError::DuplicateIndexKey { .. })));
	assert!(unrelated.is_ok());
	assert_eq!(count(&kernel, CATEGORY), 1);
	assert_eq!(count(&kernel, INDEXED_PARENT), 0);
	assert_eq!(count(&kernel, INDEXED_CHILD), 0);
}
