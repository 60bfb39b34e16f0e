use indexmap::IndexMap;

use crate::attributes::{Attribute, Attributes};
use crate::class::{ClassRegistry, PropertyType};
use crate::error::{FoundryError, FoundryResult};
use crate::object::ObjectRef;
use crate::value::Value;

/// Objects pinned on a factory, keyed by class.
///
/// At most one object per class. A pinned object fills every property
/// declared with exactly its class, and the pins travel down to nested
/// factories unless those pin their own object of the same class.
///
/// Known limitation: a class with several mandatory associations to the
/// same entity gets the one pinned object in all of them, and nested
/// factories each building that entity are not reconciled. Pinning per
/// property needs a decision on the intended semantics first.
#[derive(Debug, Clone, Default)]
pub struct ReusedObjects {
	objects: IndexMap<String, ObjectRef>,
}

impl ReusedObjects {
	pub fn new() -> Self {
		Self::default()
	}

	/// Pins an already-built object.
	pub fn pin(&mut self, attribute: Attribute) -> FoundryResult<()> {
		let object = match attribute {
			Attribute::Factory(_) | Attribute::Collection(_) | Attribute::Array(_) => {
				return Err(FoundryError::CannotReuseFactory);
			}
			Attribute::Value(Value::Object(object)) => object,
			Attribute::Proxy(proxy) => proxy.into_object(),
			other => return Err(FoundryError::NotReusable(other.kind().to_string())),
		};

		let class = object.class().to_string();
		if self.objects.contains_key(&class) {
			return Err(FoundryError::AlreadyReused(class));
		}
		tracing::trace!(class = %class, "object pinned for reuse");
		self.objects.insert(class, object);
		Ok(())
	}

	pub fn get(&self, class: &str) -> Option<&ObjectRef> {
		self.objects.get(class)
	}

	pub fn classes(&self) -> impl Iterator<Item = &str> {
		self.objects.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.objects.len()
	}

	pub fn is_empty(&self) -> bool {
		self.objects.is_empty()
	}

	/// Pins of `target` merged with ours; `target` keeps its own on conflict.
	pub fn propagate_into(&self, target: &ReusedObjects) -> ReusedObjects {
		let mut merged = target.clone();
		for (class, object) in &self.objects {
			merged
				.objects
				.entry(class.clone())
				.or_insert_with(|| object.clone());
		}
		merged
	}

	/// Attributes filling the properties of `class` typed with a pinned class.
	pub fn attributes_for(&self, class: &str, classes: &ClassRegistry) -> Attributes {
		if self.objects.is_empty() {
			return Attributes::new();
		}
		classes
			.properties_of(class)
			.into_iter()
			.filter_map(|(property, property_type)| match property_type {
				PropertyType::Object(target) => self
					.objects
					.get(&target)
					.map(|object| (property, object.clone())),
				_ => None,
			})
			.collect()
	}
}
