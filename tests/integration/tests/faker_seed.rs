//! Faker Seed Integration Tests
//!
//! Tests covering the process-wide faker seed: how it is chosen, that it
//! stays frozen, and that equal seeds produce equal objects.
//!
//! Every test touches process-wide state and runs serially.

use reinhardt_factory::faker::{FAKER_SEED_ENV, MAX_RANDOM_SEED, reset_faker_seed};
use reinhardt_factory::prelude::*;
use reinhardt_factory_test::TestKernel;
use reinhardt_foundry_integration_tests::domain;
use reinhardt_foundry_integration_tests::factories::{ContactFactory, SimpleObjectFactory};
use rstest::*;
use serial_test::serial;

/// Kernel whose seed goes through the process-wide seed.
fn kernel_from_settings(seed: Option<u64>) -> TestKernel {
	TestKernel::builder()
		.settings(FoundrySettings {
			faker_seed: seed,
			..FoundrySettings::default()
		})
		.classes(domain::classes())
		.mappings(domain::mappings())
		.boot()
		.unwrap()
}

fn clean_slate() {
	// SAFETY: tests in this file are serialized and no other thread reads the environment meanwhile.
	unsafe { std::env::remove_var(FAKER_SEED_ENV) };
	reset_faker_seed();
}

fn names(kernel: &TestKernel) -> Vec<String> {
	ContactFactory::new()
		.without_persisting()
		.create_many(kernel.foundry(), 3)
		.unwrap()
		.iter()
		.map(|contact| contact.get_str("name").unwrap())
		.collect()
}

// ============================================================================
// Choosing the seed
// ============================================================================

#[rstest]
#[serial(faker_seed)]
fn test_settings_seed_is_used() {
	// Arrange
	clean_slate();

	// Act
	let kernel = kernel_from_settings(Some(42));

	// Assert
	assert_eq!(kernel.faker_seed(), 42);
}

#[rstest]
#[serial(faker_seed)]
fn test_random_seed_when_none_is_configured() {
	// Arrange
	clean_slate();

	// Act
	let kernel = kernel_from_settings(None);

	// Assert
	assert!(kernel.faker_seed() <= MAX_RANDOM_SEED);
}

#[rstest]
#[serial(faker_seed)]
fn test_environment_seed_wins() {
	// Arrange
	clean_slate();
	// SAFETY: tests in this file are serialized and no other thread reads the environment meanwhile.
	unsafe { std::env::set_var(FAKER_SEED_ENV, "777") };

	// Act
	let kernel = kernel_from_settings(Some(42));

	// Assert
	assert_eq!(kernel.faker_seed(), 777);
	clean_slate();
}

#[rstest]
#[serial(faker_seed)]
fn test_invalid_environment_seed_is_ignored() {
	// Arrange
	clean_slate();
	// SAFETY: tests in this file are serialized and no other thread reads the environment meanwhile.
	unsafe { std::env::set_var(FAKER_SEED_ENV, "not-a-number") };

	// Act
	let kernel = kernel_from_settings(Some(42));

	// Assert
	assert_eq!(kernel.faker_seed(), 42);
	clean_slate();
}

#[rstest]
#[serial(faker_seed)]
fn test_seed_is_frozen_until_reset() {
	// Arrange
	clean_slate();
	let first = kernel_from_settings(Some(1));

	// Act
	let second = kernel_from_settings(Some(2));
	reset_faker_seed();
	let third = kernel_from_settings(Some(3));

	// Assert
	assert_eq!(first.faker_seed(), 1);
	assert_eq!(second.faker_seed(), 1);
	assert_eq!(third.faker_seed(), 3);
	clean_slate();
}

#[rstest]
#[serial(faker_seed)]
fn test_explicit_kernel_seed_bypasses_the_global_seed() {
	// Arrange
	clean_slate();
	let global = kernel_from_settings(Some(10));

	// Act
	let explicit = TestKernel::builder()
		.faker_seed(20)
		.classes(domain::classes())
		.boot()
		.unwrap();

	// Assert
	assert_eq!(global.faker_seed(), 10);
	assert_eq!(explicit.faker_seed(), 20);
	clean_slate();
}

// ============================================================================
// Determinism
// ============================================================================

#[rstest]
#[serial(faker_seed)]
fn test_same_seed_same_objects() {
	// Arrange
	clean_slate();
	let first = kernel_from_settings(Some(1234));
	let second = kernel_from_settings(Some(1234));

	// Act
	let first_names = names(&first);
	let second_names = names(&second);

	// Assert
	assert_eq!(first_names, second_names);
	clean_slate();
}

#[rstest]
#[serial(faker_seed)]
fn test_lazy_values_draw_from_the_same_faker() {
	// Arrange
	clean_slate();
	let build = |seed| {
		let kernel = TestKernel::builder()
			.faker_seed(seed)
			.classes(domain::classes())
			.boot()
			.unwrap();
		SimpleObjectFactory::new()
			.with(attributes! {
				"prop1" => LazyValue::new(|foundry| Ok(foundry.faker().number_between(0, 1_000_000).into())),
			})
			.create(kernel.foundry())
			.unwrap()
			.get_i64("prop1")
	};

	// Act
	let first = build(99);
	let second = build(99);

	// Assert
	assert!(first.is_some());
	assert_eq!(first, second);
}
