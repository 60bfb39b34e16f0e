//! Typed factories bound to one class, plus anonymous factory helpers.

use crate::attributes::{AttributeContext, AttributeSource, Attributes, Parameters};
use crate::error::{FoundryError, FoundryResult};
use crate::foundry::Foundry;
use crate::object::ObjectRef;
use crate::persistence::{RepositoryAssertions, RepositoryDecorator};
use crate::value::Value;

use super::Factory;

/// A factory type for one class.
///
/// Implementors provide the class name and default attributes; everything
/// else (creation shortcuts, finders) comes for free.
///
/// ```ignore
/// struct CategoryFactory;
///
/// impl ModelFactory for CategoryFactory {
///     fn class() -> &'static str {
///         "Category"
///     }
///
///     fn defaults(ctx: &AttributeContext<'_>) -> Attributes {
///         attributes! { "name" => ctx.faker().word() }
///     }
/// }
///
/// let category = CategoryFactory::create_one(&foundry, attributes! {})?;
/// ```
pub trait ModelFactory: Sized + 'static {
	fn class() -> &'static str;

	fn defaults(ctx: &AttributeContext<'_>) -> Attributes;

	/// Whether created objects go through the persistence engine.
	fn persistable() -> bool {
		true
	}

	/// Customizes every factory handed out by [`new`](Self::new).
	fn initialize(factory: Factory) -> Factory {
		factory
	}

	fn new() -> Factory {
		let factory = if Self::persistable() {
			Factory::persistent(Self::class())
		} else {
			Factory::object(Self::class())
		};
		Self::initialize(factory.with_defaults(AttributeSource::callback(Self::defaults)))
	}

	fn new_with(attributes: impl Into<AttributeSource>) -> Factory {
		Self::new().with(attributes)
	}

	fn create_one(foundry: &Foundry, attributes: impl Into<AttributeSource>) -> FoundryResult<ObjectRef> {
		Self::new().create_with(foundry, attributes)
	}

	fn create_many(
		foundry: &Foundry,
		count: usize,
		attributes: impl Into<AttributeSource>,
	) -> FoundryResult<Vec<ObjectRef>> {
		Self::new().many(count).create_with(foundry, attributes)
	}

	fn create_range(
		foundry: &Foundry,
		min: usize,
		max: usize,
		attributes: impl Into<AttributeSource>,
	) -> FoundryResult<Vec<ObjectRef>> {
		Self::new().range(min, max)?.create_with(foundry, attributes)
	}

	fn create_sequence<I, S>(foundry: &Foundry, sequence: I) -> FoundryResult<Vec<ObjectRef>>
	where
		I: IntoIterator<Item = S>,
		S: Into<AttributeSource>,
	{
		Self::new().sequence(sequence).create(foundry)
	}

	/// # Errors
	///
	/// [`FoundryError::PersistenceNotAvailable`] or [`FoundryError::PersistenceDisabled`].
	fn repository(foundry: &Foundry) -> FoundryResult<RepositoryDecorator> {
		foundry.repository(Self::class())
	}

	fn assert(foundry: &Foundry) -> FoundryResult<RepositoryAssertions> {
		Ok(Self::repository(foundry)?.assert())
	}

	/// Finds a stored object by identifier, failing when there is none.
	fn find(foundry: &Foundry, id: impl Into<Value>) -> FoundryResult<ObjectRef> {
		Self::repository(foundry)?.find_or_fail(id)
	}

	fn find_by(foundry: &Foundry, criteria: &Parameters) -> FoundryResult<Vec<ObjectRef>> {
		Self::repository(foundry)?.find_by(criteria)
	}

	/// First stored object matching `criteria`, or a new one built from them.
	///
	/// Without persistence the object is always created.
	fn find_or_create(foundry: &Foundry, criteria: Parameters) -> FoundryResult<ObjectRef> {
		match Self::repository(foundry).and_then(|repository| repository.find_one_by(&criteria)) {
			Ok(Some(found)) => Ok(found),
			Ok(None)
			| Err(FoundryError::PersistenceNotAvailable(_))
			| Err(FoundryError::PersistenceDisabled(_)) => Self::create_one(foundry, criteria),
			Err(error) => Err(error),
		}
	}

	/// A random stored object matching `criteria`, or a new one built from them.
	fn random_or_create(foundry: &Foundry, criteria: Parameters) -> FoundryResult<ObjectRef> {
		match Self::repository(foundry).and_then(|repository| repository.random(&criteria)) {
			Ok(found) => Ok(found),
			Err(
				FoundryError::NotEnoughObjects { .. }
				| FoundryError::PersistenceNotAvailable(_)
				| FoundryError::PersistenceDisabled(_),
			) => Self::create_one(foundry, criteria),
			Err(error) => Err(error),
		}
	}

	fn random(foundry: &Foundry) -> FoundryResult<ObjectRef> {
		Self::repository(foundry)?.random(&Parameters::new())
	}

	fn random_set(foundry: &Foundry, count: usize) -> FoundryResult<Vec<ObjectRef>> {
		Self::repository(foundry)?.random_set(count, &Parameters::new())
	}

	fn random_range(foundry: &Foundry, min: usize, max: usize) -> FoundryResult<Vec<ObjectRef>> {
		Self::repository(foundry)?.random_range(min, max, &Parameters::new())
	}

	/// First stored object by `sort_by`, failing on an empty table.
	fn first(foundry: &Foundry, sort_by: &str) -> FoundryResult<ObjectRef> {
		Self::repository(foundry)?.first_or_fail(sort_by)
	}

	fn last(foundry: &Foundry, sort_by: &str) -> FoundryResult<ObjectRef> {
		let repository = Self::repository(foundry)?;
		repository.last(sort_by)?.ok_or_else(|| FoundryError::ObjectNotFound {
			class: Self::class().to_string(),
			criteria: "an empty table".to_string(),
		})
	}

	fn all(foundry: &Foundry) -> FoundryResult<Vec<ObjectRef>> {
		Self::repository(foundry)?.find_all()
	}

	fn count(foundry: &Foundry) -> FoundryResult<usize> {
		Self::repository(foundry)?.count()
	}

	fn truncate(foundry: &Foundry) -> FoundryResult<()> {
		Self::repository(foundry)?.truncate()
	}
}

/// Anonymous object factory.
pub fn factory(class: impl Into<String>, defaults: impl Into<AttributeSource>) -> Factory {
	Factory::object(class).with_defaults(defaults)
}

/// Anonymous persistable factory.
pub fn persistent_factory(class: impl Into<String>, defaults: impl Into<AttributeSource>) -> Factory {
	Factory::persistent(class).with_defaults(defaults)
}

/// Anonymous persistable factory usable in data-provider contexts.
pub fn proxy_factory(class: impl Into<String>, defaults: impl Into<AttributeSource>) -> Factory {
	Factory::proxy(class).with_defaults(defaults)
}

/// Builds one object of `class` from `attributes`.
pub fn object(
	foundry: &Foundry,
	class: impl Into<String>,
	attributes: impl Into<AttributeSource>,
) -> FoundryResult<ObjectRef> {
	factory(class, attributes).create(foundry)
}

/// Builds and persists one object of `class` from `attributes`.
pub fn persist(
	foundry: &Foundry,
	class: impl Into<String>,
	attributes: impl Into<AttributeSource>,
) -> FoundryResult<ObjectRef> {
	persistent_factory(class, attributes).create(foundry)
}
