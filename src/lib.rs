//! # Reinhardt Foundry
//!
//! Test-data factories for Reinhardt applications.
//!
//! Foundry builds graphs of related objects for tests. Factories describe
//! how to build one object of a class; nested factories build its related
//! objects, and a pluggable persistence engine stores the result. Inverse
//! relationships are wired once the owning object exists, and already
//! stored objects can be reused across a whole graph.
//!
//! ## Feature Flags
//!
//! - `testing` - In-memory persistence engine, constraint validator and test kernel
//! - `full` (default) - Everything above
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use foundry::prelude::*;
//! use foundry::testing::{MappingRegistry, TestKernel};
//!
//! struct CategoryFactory;
//!
//! impl ModelFactory for CategoryFactory {
//!     fn class() -> &'static str {
//!         "Category"
//!     }
//!
//!     fn defaults(ctx: &AttributeContext<'_>) -> Attributes {
//!         attributes! { "name" => ctx.faker().word() }
//!     }
//! }
//!
//! let kernel = TestKernel::builder()
//!     .class(ClassDescriptor::new("Category").scalar("id").scalar("name"))
//!     .mappings(MappingRegistry::new().with(ClassMetadata::new("Category")))
//!     .boot()?;
//!
//! let categories = CategoryFactory::create_many(kernel.foundry(), 3, attributes! {})?;
//! CategoryFactory::assert(kernel.foundry())?.count(3);
//! ```

pub mod testing;

// Re-export the factory engine modules
pub use reinhardt_factory::{
	array, attributes, class, config, error, events, factory, faker, foundry, instantiator, object,
	persistence, story, validation, value,
};

// Re-export core types
pub use reinhardt_factory::{
	ArrayFactory, Attribute, AttributeContext, AttributeSource, Attributes, ClassDescriptor,
	ClassRegistry, ConstructorArgs, Factory, FactoryCollection, Faker, Foundry, FoundryBuilder,
	FoundryError, FoundryResult, FoundrySettings, InstantiatorSettings, Instantiator, LazyValue,
	ModelFactory, ObjectRef, Parameters, PersistMode, PersistenceManager, PropertyType, Proxy,
	Validator, Value,
};

// Re-export testing collaborators
#[cfg(feature = "testing")]
pub use reinhardt_factory_test::{
	Constraint, ConstraintValidator, InMemoryPersistence, KernelBuilder, MappingRegistry, TestKernel,
};

/// Prelude module for convenient imports
///
/// Import everything needed to write factories and tests:
/// ```rust
/// use foundry::prelude::*;
/// ```
pub mod prelude {
	pub use reinhardt_factory::prelude::*;

	#[cfg(feature = "testing")]
	pub use crate::{MappingRegistry, TestKernel};
}
