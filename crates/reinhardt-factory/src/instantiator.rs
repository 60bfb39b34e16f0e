//! Building objects from normalized parameters.
//!
//! An [`Instantiator`] first constructs the object (through the class'
//! default constructor, a named constructor, a custom closure, or by
//! skipping the constructor entirely) and then hydrates every parameter the
//! constructor did not consume.
//!
//! # Examples
//!
//! ```ignore
//! let factory = Object1Factory::new()
//!     .instantiate_with(Instantiator::named_constructor("factory").allow_extra_fields(["extra"]));
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::attributes::Parameters;
use crate::error::{FoundryError, FoundryResult};
use crate::foundry::Foundry;
use crate::object::ObjectRef;
use crate::value::Value;

/// Arguments handed to a constructor.
///
/// Every argument the constructor takes is removed; whatever is left is
/// hydrated afterwards.
#[derive(Debug)]
pub struct ConstructorArgs {
	class: String,
	parameters: Parameters,
}

impl ConstructorArgs {
	pub(crate) fn new(class: impl Into<String>, parameters: Parameters) -> Self {
		Self {
			class: class.into(),
			parameters,
		}
	}

	pub fn class(&self) -> &str {
		&self.class
	}

	/// Takes an optional argument.
	pub fn take(&mut self, name: &str) -> Option<Value> {
		self.parameters.shift_remove(name)
	}

	/// Takes an argument or falls back to `default`.
	pub fn take_or(&mut self, name: &str, default: impl Into<Value>) -> Value {
		self.take(name).unwrap_or_else(|| default.into())
	}

	/// Takes a mandatory argument.
	pub fn require(&mut self, name: &str) -> FoundryResult<Value> {
		self.take(name).ok_or_else(|| FoundryError::MissingArgument {
			class: self.class.clone(),
			argument: name.to_string(),
		})
	}

	/// Parameters the constructor has not consumed.
	pub fn remaining(&self) -> &Parameters {
		&self.parameters
	}

	fn into_remaining(self) -> Parameters {
		self.parameters
	}
}

type CustomConstructor = dyn Fn(&mut ConstructorArgs) -> FoundryResult<ObjectRef> + Send + Sync;

#[derive(Clone)]
enum Construction {
	Constructor,
	WithoutConstructor,
	Named(String),
	Custom(Arc<CustomConstructor>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldSelection {
	None,
	All,
	Only(HashSet<String>),
}

impl FieldSelection {
	fn contains(&self, field: &str) -> bool {
		match self {
			Self::None => false,
			Self::All => true,
			Self::Only(fields) => fields.contains(field),
		}
	}

	fn from_fields<I, S>(fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::Only(fields.into_iter().map(Into::into).collect())
	}
}

/// Strategy that turns parameters into an object.
#[derive(Clone)]
pub struct Instantiator {
	construction: Construction,
	allow_extra: FieldSelection,
	always_force: FieldSelection,
	hydrate: bool,
}

impl Default for Instantiator {
	fn default() -> Self {
		Self::with_constructor()
	}
}

impl Instantiator {
	/// Uses the class' default constructor, then hydrates the rest.
	pub fn with_constructor() -> Self {
		Self::build(Construction::Constructor)
	}

	/// Skips the constructor and hydrates every parameter.
	pub fn without_constructor() -> Self {
		Self::build(Construction::WithoutConstructor)
	}

	/// Uses a named constructor declared on the class.
	pub fn named_constructor(name: impl Into<String>) -> Self {
		Self::build(Construction::Named(name.into()))
	}

	/// Uses a closure to build the object.
	pub fn use_fn<F>(constructor: F) -> Self
	where
		F: Fn(&mut ConstructorArgs) -> FoundryResult<ObjectRef> + Send + Sync + 'static,
	{
		Self::build(Construction::Custom(Arc::new(constructor)))
	}

	fn build(construction: Construction) -> Self {
		Self {
			construction,
			allow_extra: FieldSelection::None,
			always_force: FieldSelection::None,
			hydrate: true,
		}
	}

	/// Accepts any undeclared attribute.
	pub fn allow_extra(mut self) -> Self {
		self.allow_extra = FieldSelection::All;
		self
	}

	/// Accepts the given undeclared attributes.
	pub fn allow_extra_fields<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.allow_extra = FieldSelection::from_fields(fields);
		self
	}

	/// Writes every attribute directly, bypassing setters.
	pub fn always_force(mut self) -> Self {
		self.always_force = FieldSelection::All;
		self
	}

	/// Writes the given attributes directly, bypassing setters.
	pub fn always_force_fields<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.always_force = FieldSelection::from_fields(fields);
		self
	}

	/// Only runs the constructor; leftover parameters are ignored.
	pub fn disable_hydration(mut self) -> Self {
		self.hydrate = false;
		self
	}

	pub fn instantiate(
		&self,
		foundry: &Foundry,
		class: &str,
		parameters: Parameters,
	) -> FoundryResult<ObjectRef> {
		let classes = foundry.classes();
		let descriptor = classes.get(class);
		let mut args = ConstructorArgs::new(class, parameters);

		let object = match &self.construction {
			Construction::Constructor => match descriptor.and_then(|d| d.default_constructor()) {
				Some(constructor) => constructor(&mut args)?,
				None => ObjectRef::new(class),
			},
			Construction::WithoutConstructor => ObjectRef::new(class),
			Construction::Named(name) => {
				let constructor = descriptor.and_then(|d| d.named(name)).ok_or_else(|| {
					FoundryError::UnknownConstructor {
						class: class.to_string(),
						name: name.clone(),
					}
				})?;
				constructor(&mut args)?
			}
			Construction::Custom(constructor) => constructor(&mut args)?,
		};

		let properties = classes.properties_of(object.class());
		for (name, property_type) in &properties {
			object.set_default(name.clone(), property_type.initial_value());
		}

		if !self.hydrate {
			return Ok(object);
		}

		let described = classes.contains(object.class());
		for (field, value) in args.into_remaining() {
			if described && !properties.contains_key(&field) && !self.allow_extra.contains(&field) {
				return Err(FoundryError::ExtraAttribute {
					class: object.class().to_string(),
					field,
				});
			}
			let setter = if self.always_force.contains(&field) {
				None
			} else {
				classes.get(object.class()).and_then(|d| d.setter_for(&field))
			};
			match setter {
				Some(setter) => setter(&object, value)?,
				None => object.set(field, value),
			}
		}

		Ok(object)
	}
}

impl fmt::Debug for Instantiator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let construction = match &self.construction {
			Construction::Constructor => "constructor".to_string(),
			Construction::WithoutConstructor => "without constructor".to_string(),
			Construction::Named(name) => format!("named({})", name),
			Construction::Custom(_) => "custom".to_string(),
		};
		f.debug_struct("Instantiator")
			.field("construction", &construction)
			.field("allow_extra", &self.allow_extra)
			.field("always_force", &self.always_force)
			.field("hydrate", &self.hydrate)
			.finish()
	}
}
