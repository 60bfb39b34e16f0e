//! Convenience re-exports for writing factories and tests.
//!
//! ```ignore
//! use reinhardt_factory::prelude::*;
//! ```

pub use crate::attributes;

// Error types
pub use crate::error::{FoundryError, FoundryResult};

// Objects and values
pub use crate::class::{ClassDescriptor, ClassRegistry, PropertyType};
pub use crate::object::ObjectRef;
pub use crate::value::Value;

// Factory types
pub use crate::array::ArrayFactory;
pub use crate::attributes::{
	Attribute, AttributeContext, AttributeSource, Attributes, LazyValue, Parameters,
};
pub use crate::factory::{
	Factory, FactoryCollection, HookContext, ModelFactory, factory, object, persist,
	persistent_factory, proxy_factory,
};
pub use crate::instantiator::{ConstructorArgs, Instantiator};

// Context
pub use crate::config::FoundrySettings;
pub use crate::events::EventDispatcher;
pub use crate::faker::Faker;
pub use crate::foundry::{Foundry, FoundryBuilder};

// Persistence
pub use crate::persistence::{
	AssociationKind, AssociationMapping, ClassMetadata, PersistMode, PersistenceManager, Proxy,
	RepositoryAssertions, RepositoryDecorator,
};

// Validation and stories
pub use crate::story::{LoadedStory, Story, StoryState};
pub use crate::validation::{
	ConstraintViolation, ConstraintViolations, ValidationGroups, Validator,
};
