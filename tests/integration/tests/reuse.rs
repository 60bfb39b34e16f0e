//! Object Reuse Integration Tests
//!
//! Tests covering objects pinned on a factory with `reuse`: the pinned
//! object fills every property typed with its class, on the factory and
//! on every factory nested below it.

use reinhardt_factory::prelude::*;
use reinhardt_factory_test::TestKernel;
use reinhardt_foundry_integration_tests::domain::{ADDRESS, CATEGORY};
use reinhardt_foundry_integration_tests::factories::{
	AddressFactory, CategoryFactory, ContactFactory, TagFactory,
};
use reinhardt_foundry_integration_tests::kernel;
use rstest::*;

// ============================================================================
// Pinned objects
// ============================================================================

#[rstest]
fn test_reused_object_is_shared_by_every_created_object(kernel: TestKernel) {
	// Arrange
	let category = CategoryFactory::create_one(kernel.foundry(), attributes! { "name" => "php" }).unwrap();
	let factory = ContactFactory::new().reuse(category.clone()).unwrap();

	// Act
	let contacts = factory.create_many(kernel.foundry(), 3).unwrap();

	// Assert
	assert!(contacts.iter().all(|c| c.get_object("category").unwrap().is(&category)));
	assert_eq!(kernel.persistence().unwrap().row_count(CATEGORY), 1);
}

#[rstest]
fn test_reused_proxy_is_unwrapped(kernel: TestKernel) {
	// Arrange
	let address = AddressFactory::new().create_proxy(kernel.foundry()).unwrap();

	// Act
	let contact = ContactFactory::new()
		.reuse(address.clone())
		.unwrap()
		.create(kernel.foundry())
		.unwrap();

	// Assert
	assert!(contact.get_object("address").unwrap().is(address.object()));
	assert_eq!(kernel.persistence().unwrap().row_count(ADDRESS), 1);
}

#[rstest]
fn test_explicit_attribute_beats_reused_object(kernel: TestKernel) {
	// Arrange
	let pinned = CategoryFactory::create_one(kernel.foundry(), attributes! { "name" => "pinned" }).unwrap();
	let explicit = CategoryFactory::create_one(kernel.foundry(), attributes! { "name" => "explicit" }).unwrap();

	// Act
	let contact = ContactFactory::new()
		.reuse(pinned.clone())
		.unwrap()
		.create_with(kernel.foundry(), attributes! { "category" => &explicit })
		.unwrap();

	// Assert
	assert!(contact.get_object("category").unwrap().is(&explicit));
}

#[rstest]
fn test_reused_object_beats_defaults(kernel: TestKernel) {
	// Arrange
	let pinned = CategoryFactory::create_one(kernel.foundry(), Attributes::new()).unwrap();

	// Act
	let contact = ContactFactory::new()
		.reuse(pinned.clone())
		.unwrap()
		.create(kernel.foundry())
		.unwrap();

	// Assert
	// the default category factory never runs
	assert!(contact.get_object("category").unwrap().is(&pinned));
	assert_eq!(kernel.persistence().unwrap().row_count(CATEGORY), 1);
}

// ============================================================================
// Propagation
// ============================================================================

#[rstest]
fn test_reuse_propagates_into_nested_factories(kernel: TestKernel) {
	// Arrange
	let category = CategoryFactory::create_one(kernel.foundry(), Attributes::new()).unwrap();

	// Act
	let tag = TagFactory::new()
		.reuse(category.clone())
		.unwrap()
		.create_with(kernel.foundry(), attributes! { "contacts" => ContactFactory::new().many(2) })
		.unwrap();

	// Assert
	let contacts = tag.get_objects("contacts");
	assert_eq!(contacts.len(), 2);
	assert!(contacts.iter().all(|c| c.get_object("category").unwrap().is(&category)));
	assert_eq!(kernel.persistence().unwrap().row_count(CATEGORY), 1);
}

#[rstest]
fn test_nested_factory_keeps_its_own_pin(kernel: TestKernel) {
	// Arrange
	let outer = CategoryFactory::create_one(kernel.foundry(), attributes! { "name" => "outer" }).unwrap();
	let inner = CategoryFactory::create_one(kernel.foundry(), attributes! { "name" => "inner" }).unwrap();
	let contacts = ContactFactory::new().reuse(inner.clone()).unwrap().many(2);

	// Act
	let tag = TagFactory::new()
		.reuse(outer)
		.unwrap()
		.create_with(kernel.foundry(), attributes! { "contacts" => contacts })
		.unwrap();

	// Assert
	assert!(
		tag.get_objects("contacts")
			.iter()
			.all(|c| c.get_object("category").unwrap().is(&inner))
	);
}

#[rstest]
fn test_reuse_does_not_leak_into_the_original_factory(kernel: TestKernel) {
	// Arrange
	let pinned = CategoryFactory::create_one(kernel.foundry(), Attributes::new()).unwrap();
	let base = ContactFactory::new();
	let _pinned_factory = base.reuse(pinned.clone()).unwrap();

	// Act
	let contact = base.create(kernel.foundry()).unwrap();

	// Assert
	assert!(!contact.get_object("category").unwrap().is(&pinned));
	assert!(base.reused().is_empty());
}

// ============================================================================
// Errors
// ============================================================================

#[rstest]
fn test_two_objects_of_the_same_class_cannot_be_reused(kernel: TestKernel) {
	// Arrange
	let first = CategoryFactory::create_one(kernel.foundry(), Attributes::new()).unwrap();
	let second = CategoryFactory::create_one(kernel.foundry(), Attributes::new()).unwrap();
	let factory = ContactFactory::new().reuse(first).unwrap();

	// Act
	let result = factory.reuse(second);

	// Assert
	assert!(matches!(result, Err(FoundryError::AlreadyReused(ref class)) if class == CATEGORY));
}

#[rstest]
#[case::factory(Attribute::from(CategoryFactory::new()))]
#[case::collection(Attribute::from(CategoryFactory::new().many(2)))]
fn test_factories_cannot_be_reused(#[case] attribute: Attribute) {
	// Act
	let result = ContactFactory::new().reuse(attribute);

	// Assert
	assert!(matches!(result, Err(FoundryError::CannotReuseFactory)));
}

#[rstest]
#[case::scalar(Attribute::from("php"))]
#[case::number(Attribute::from(42))]
fn test_only_objects_can_be_reused(#[case] attribute: Attribute) {
	// Act
	let result = ContactFactory::new().reuse(attribute);

	// Assert
	assert!(matches!(result, Err(FoundryError::NotReusable(_))));
}
