//! Test-data factories with relationship-aware normalization.
//!
//! This crate builds graphs of objects for tests: a [`Factory`] describes
//! how to build one object of a class, nested factories build related
//! objects, and a pluggable persistence engine stores the result.
//!
//! # Quick Start
//!
//! ```ignore
//! use reinhardt_factory::prelude::*;
//!
//! let foundry = Foundry::builder()
//!     .class(ClassDescriptor::new("Category").scalar("name"))
//!     .class(
//!         ClassDescriptor::new("Contact")
//!             .scalar("name")
//!             .object("category", "Category"),
//!     )
//!     .build()?;
//!
//! let contact = factory("Contact", attributes! {
//!     "name" => "Jane",
//!     "category" => factory("Category", attributes! { "name" => "php" }),
//! })
//! .create(&foundry)?;
//! ```
//!
//! # Architecture
//!
//! Creating an object runs the instantiation pipeline
//! ([`factory::Stage`]):
//!
//! - attribute layers are merged (defaults, reused objects, states, overrides);
//! - every attribute is normalized: nested factories are created, existing
//!   objects refreshed, inverse relationships deferred until the parent exists;
//! - before-instantiate listeners and hooks may rewrite the parameters;
//! - the [`Instantiator`] builds and hydrates the object;
//! - deferred relationship callbacks wire the children to the new object;
//! - after-instantiate listeners (validation among them) and hooks run;
//! - persistable factories schedule the object; the outermost `create`
//!   flushes the whole graph at once, unless told otherwise.
//!
//! A failed `create` forgets every object it scheduled.
//!
//! Persistence and validation are collaborators behind the
//! [`PersistenceManager`] and [`Validator`] traits; the
//! `reinhardt-factory-test` crate provides in-memory implementations.

#![warn(rustdoc::missing_crate_level_docs)]

pub mod array;
pub mod attributes;
pub mod class;
pub mod config;
pub mod error;
pub mod events;
pub mod factory;
pub mod faker;
pub mod foundry;
pub mod instantiator;
pub mod object;
pub mod persistence;
pub mod prelude;
pub mod story;
pub mod validation;
pub mod value;

pub use array::ArrayFactory;
pub use attributes::{
	Attribute, AttributeContext, AttributeSource, Attributes, LazyValue, Parameters,
};
pub use class::{ClassDescriptor, ClassRegistry, PropertyType};
pub use config::{FoundrySettings, InstantiatorSettings};
pub use error::{FoundryError, FoundryResult};
pub use factory::{Factory, FactoryCollection, ModelFactory};
pub use faker::Faker;
pub use foundry::{Foundry, FoundryBuilder};
pub use instantiator::{ConstructorArgs, Instantiator};
pub use object::ObjectRef;
pub use persistence::{PersistMode, PersistenceManager, Proxy};
pub use validation::Validator;
pub use value::Value;
