//! Statically registered type descriptors.
//!
//! A [`ClassDescriptor`] tells the engine what a domain type looks like:
//! which class it extends, which properties it declares (and their types),
//! how it is constructed and which properties go through a setter. The
//! descriptors are registered once, when the [`Foundry`](crate::Foundry)
//! context is built, and are read-only afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::FoundryResult;
use crate::instantiator::ConstructorArgs;
use crate::object::ObjectRef;
use crate::value::Value;

/// Constructor callback: consumes arguments and returns the new object.
pub type Constructor = Arc<dyn Fn(&mut ConstructorArgs) -> FoundryResult<ObjectRef> + Send + Sync>;

/// Setter callback used during hydration.
pub type Setter = Arc<dyn Fn(&ObjectRef, Value) -> FoundryResult<()> + Send + Sync>;

/// Declared type of a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyType {
	/// Scalar, list or map value.
	Scalar,
	/// Single reference to an object of the given class.
	Object(String),
	/// Collection of objects of the given class.
	Collection(String),
}

impl PropertyType {
	/// Initial value of a property that nothing has written yet.
	pub fn initial_value(&self) -> Value {
		match self {
			Self::Collection(_) => Value::List(Vec::new()),
			Self::Scalar | Self::Object(_) => Value::Null,
		}
	}
}

/// Description of one domain type.
#[derive(Clone)]
pub struct ClassDescriptor {
	name: String,
	parent: Option<String>,
	properties: IndexMap<String, PropertyType>,
	constructor: Option<Constructor>,
	named_constructors: HashMap<String, Constructor>,
	setters: HashMap<String, Setter>,
}

impl ClassDescriptor {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			parent: None,
			properties: IndexMap::new(),
			constructor: None,
			named_constructors: HashMap::new(),
			setters: HashMap::new(),
		}
	}

	/// Declares the parent class.
	pub fn extends(mut self, parent: impl Into<String>) -> Self {
		self.parent = Some(parent.into());
		self
	}

	/// Declares a property of any type.
	pub fn property(mut self, name: impl Into<String>, property_type: PropertyType) -> Self {
		self.properties.insert(name.into(), property_type);
		self
	}

	/// Declares a scalar property.
	pub fn scalar(self, name: impl Into<String>) -> Self {
		self.property(name, PropertyType::Scalar)
	}

	/// Declares a property referencing one object of `class`.
	pub fn object(self, name: impl Into<String>, class: impl Into<String>) -> Self {
		self.property(name, PropertyType::Object(class.into()))
	}

	/// Declares a property holding many objects of `class`.
	pub fn collection(self, name: impl Into<String>, class: impl Into<String>) -> Self {
		self.property(name, PropertyType::Collection(class.into()))
	}

	/// Sets the default constructor.
	pub fn constructor<F>(mut self, constructor: F) -> Self
	where
		F: Fn(&mut ConstructorArgs) -> FoundryResult<ObjectRef> + Send + Sync + 'static,
	{
		self.constructor = Some(Arc::new(constructor));
		self
	}

	/// Adds a named (static factory method style) constructor.
	pub fn named_constructor<F>(mut self, name: impl Into<String>, constructor: F) -> Self
	where
		F: Fn(&mut ConstructorArgs) -> FoundryResult<ObjectRef> + Send + Sync + 'static,
	{
		self.named_constructors.insert(name.into(), Arc::new(constructor));
		self
	}

	/// Routes writes of `property` through `setter` during hydration.
	pub fn setter<F>(mut self, property: impl Into<String>, setter: F) -> Self
	where
		F: Fn(&ObjectRef, Value) -> FoundryResult<()> + Send + Sync + 'static,
	{
		self.setters.insert(property.into(), Arc::new(setter));
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn parent(&self) -> Option<&str> {
		self.parent.as_deref()
	}

	pub fn properties(&self) -> &IndexMap<String, PropertyType> {
		&self.properties
	}

	pub fn property_type(&self, name: &str) -> Option<&PropertyType> {
		self.properties.get(name)
	}

	pub fn declares(&self, name: &str) -> bool {
		self.properties.contains_key(name)
	}

	pub(crate) fn default_constructor(&self) -> Option<&Constructor> {
		self.constructor.as_ref()
	}

	pub(crate) fn named(&self, name: &str) -> Option<&Constructor> {
		self.named_constructors.get(name)
	}

	pub(crate) fn setter_for(&self, property: &str) -> Option<&Setter> {
		self.setters.get(property)
	}

	/// Creates an object of this class with every declared property at its initial value.
	pub fn instantiate_bare(&self) -> ObjectRef {
		let object = ObjectRef::new(self.name.clone());
		self.initialize(&object);
		object
	}

	/// Fills declared properties that are still unset.
	pub fn initialize(&self, object: &ObjectRef) {
		for (name, property_type) in &self.properties {
			object.set_default(name.clone(), property_type.initial_value());
		}
	}
}

impl fmt::Debug for ClassDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ClassDescriptor")
			.field("name", &self.name)
			.field("parent", &self.parent)
			.field("properties", &self.properties)
			.field("has_constructor", &self.constructor.is_some())
			.field("named_constructors", &self.named_constructors.keys().collect::<Vec<_>>())
			.field("setters", &self.setters.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// Table of registered descriptors.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
	classes: HashMap<String, Arc<ClassDescriptor>>,
}

impl ClassRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a descriptor, replacing any previous one with the same name.
	pub fn register(&mut self, descriptor: ClassDescriptor) {
		self.classes
			.insert(descriptor.name().to_string(), Arc::new(descriptor));
	}

	pub fn get(&self, class: &str) -> Option<&Arc<ClassDescriptor>> {
		self.classes.get(class)
	}

	pub fn contains(&self, class: &str) -> bool {
		self.classes.contains_key(class)
	}

	/// Whether `class` is `ancestor` or inherits from it.
	///
	/// Unregistered classes only match themselves.
	pub fn is_a(&self, class: &str, ancestor: &str) -> bool {
		let mut current = Some(class);
		let mut hops = 0;
		while let Some(name) = current {
			if name == ancestor {
				return true;
			}
			// guards against a registered inheritance cycle
			hops += 1;
			if hops > self.classes.len() {
				return false;
			}
			current = self.classes.get(name).and_then(|descriptor| descriptor.parent());
		}
		false
	}

	/// Declared properties of `class`, including inherited ones.
	///
	/// A subclass declaration overrides the parent's declaration of the same name.
	pub fn properties_of(&self, class: &str) -> IndexMap<String, PropertyType> {
		let mut chain = Vec::new();
		let mut current = self.classes.get(class);
		while let Some(descriptor) = current {
			if chain.len() > self.classes.len() {
				break;
			}
			chain.push(descriptor);
			current = descriptor.parent().and_then(|parent| self.classes.get(parent));
		}
		let mut properties = IndexMap::new();
		for descriptor in chain.into_iter().rev() {
			for (name, property_type) in descriptor.properties() {
				properties.insert(name.clone(), property_type.clone());
			}
		}
		properties
	}

	pub fn len(&self) -> usize {
		self.classes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.classes.is_empty()
	}
}

impl FromIterator<ClassDescriptor> for ClassRegistry {
	fn from_iter<I: IntoIterator<Item = ClassDescriptor>>(iter: I) -> Self {
		let mut registry = Self::new();
		for descriptor in iter {
			registry.register(descriptor);
		}
		registry
	}
}
