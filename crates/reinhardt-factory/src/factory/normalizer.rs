//! Turns raw attributes into concrete parameters.
//!
//! Nested factories are created (or deferred, for inverse relationships),
//! lists are normalized element by element, lazy values are evaluated and
//! existing objects are refreshed from storage when the parent persists.

use crate::attributes::{Attribute, Attributes, Parameters};
use crate::error::{FoundryError, FoundryResult};
use crate::foundry::Foundry;
use crate::object::ObjectRef;
use crate::persistence::{RelationshipMetadata, RelationshipResolver};
use crate::value::Value;

use super::inverse::PendingChild;
use super::pipeline::Pipeline;
use super::{Factory, FactoryCollection};

impl Pipeline<'_> {
	pub(super) fn normalize_attributes(&mut self, attributes: Attributes) -> FoundryResult<Parameters> {
		let mut parameters = Parameters::new();
		for (field, attribute) in attributes {
			let value = self.normalize_parameter(&field, attribute)?;
			parameters.insert(field, value);
		}
		Ok(parameters)
	}

	fn normalize_parameter(&mut self, field: &str, attribute: Attribute) -> FoundryResult<Value> {
		match attribute {
			Attribute::Value(Value::Object(object)) => Ok(Value::Object(self.normalize_object(object))),
			Attribute::Value(Value::List(items)) if items.iter().any(|item| item.as_object().is_some()) => {
				self.normalize_list(field, items.into_iter().map(Attribute::Value).collect())
			}
			Attribute::Value(value) => Ok(value),
			Attribute::Proxy(proxy) => Ok(Value::Object(self.normalize_object(proxy.into_object()))),
			Attribute::Lazy(lazy) => {
				let resolved = lazy.evaluate(self.foundry)?;
				self.normalize_parameter(field, resolved)
			}
			Attribute::Factory(factory) => self.normalize_factory(field, *factory),
			Attribute::Collection(collection) => self.normalize_collection(field, *collection),
			Attribute::Array(array) => Ok(Value::Map(array.create(self.foundry)?)),
			Attribute::List(items) => self.normalize_list(field, items),
		}
	}

	/// Child factories inherit our pins and, when both persist, our mode.
	fn prepare(&self, nested: Factory) -> Factory {
		nested.propagate_from(self.factory, self.mode)
	}

	fn normalize_factory(&mut self, field: &str, nested: Factory) -> FoundryResult<Value> {
		let nested = self.prepare(nested);
		if let Some(metadata) = self.relationship(field, nested.class())?
			&& metadata.is_inverse()
		{
			return if metadata.is_collection {
				self.defer_inverse_collection(field, vec![PendingChild::Factory(nested)], metadata)
			} else if metadata.is_one_to_one {
				self.resolve_inverse_one_to_one(field, nested, metadata)
			} else {
				Err(FoundryError::InvalidRelationship {
					parent: self.factory.class().to_string(),
					child: nested.class().to_string(),
					field: field.to_string(),
					reason: format!("inverse side of a {:?} association holds a single object", metadata.kind),
				})
			};
		}
		Ok(Value::Object(nested.create_nested(self.foundry, &Attributes::new().into(), self.journal)?))
	}

	fn normalize_collection(&mut self, field: &str, collection: FactoryCollection) -> FoundryResult<Value> {
		let collection = collection.map_factory(|nested| self.prepare(nested));
		if let Some(metadata) = self.inverse_collection(field, collection.factory().class())? {
			return self.defer_inverse_collection(field, vec![PendingChild::Collection(collection)], metadata);
		}

		let mut values = Vec::new();
		for nested in collection.all(self.foundry) {
			values.push(self.normalize_factory(field, nested)?);
		}
		Ok(Value::List(values))
	}

	fn normalize_list(&mut self, field: &str, items: Vec<Attribute>) -> FoundryResult<Value> {
		let child_class = items.iter().find_map(Attribute::object_class);
		if let Some(child_class) = child_class
			&& let Some(metadata) = self.inverse_collection(field, &child_class)?
		{
			let mut pending = Vec::with_capacity(items.len());
			for item in items {
				pending.extend(self.pending_child(field, item)?);
			}
			return self.defer_inverse_collection(field, pending, metadata);
		}

		let mut values = Vec::with_capacity(items.len());
		for item in items {
			values.push(self.normalize_parameter(field, item)?);
		}
		Ok(Value::List(values))
	}

	/// Classifies one element of an inverse collection.
	fn pending_child(&mut self, field: &str, item: Attribute) -> FoundryResult<Vec<PendingChild>> {
		Ok(match item {
			Attribute::Factory(nested) => vec![PendingChild::Factory(self.prepare(*nested))],
			Attribute::Collection(collection) => {
				vec![PendingChild::Collection(collection.map_factory(|nested| self.prepare(nested)))]
			}
			Attribute::Value(Value::Object(object)) => vec![PendingChild::Object(self.normalize_object(object))],
			Attribute::Proxy(proxy) => vec![PendingChild::Object(self.normalize_object(proxy.into_object()))],
			Attribute::Lazy(lazy) => {
				let resolved = lazy.evaluate(self.foundry)?;
				self.pending_child(field, resolved)?
			}
			Attribute::List(items) => {
				let mut pending = Vec::new();
				for item in items {
					pending.extend(self.pending_child(field, item)?);
				}
				pending
			}
			other => {
				return Err(FoundryError::InvalidArgument(format!(
					"\"{}\" of \"{}\" only accepts objects, got a {}",
					field,
					self.factory.class(),
					other.kind()
				)));
			}
		})
	}

	/// Refreshes an existing object when it belongs to the persistence engine.
	fn normalize_object(&self, object: ObjectRef) -> ObjectRef {
		if object.is_placeholder() || !self.mode.is_persisting() {
			return object;
		}
		let Ok(manager) = self.foundry.persistence() else {
			return object;
		};
		if !manager.has_persistence_for(&object) {
			return object;
		}
		if !manager.is_persisted(&object) {
			self.journal.schedule(manager.as_ref(), &object, Vec::new());
			return object;
		}
		match manager.refresh(&object) {
			Ok(refreshed) => refreshed,
			Err(error) => {
				tracing::debug!(class = object.class(), %error, "keeping in-memory object after failed refresh");
				object
			}
		}
	}

	fn inverse_collection(&self, field: &str, child_class: &str) -> FoundryResult<Option<RelationshipMetadata>> {
		Ok(self
			.relationship(field, child_class)?
			.filter(|metadata| metadata.is_inverse() && metadata.is_collection))
	}

	/// Relationship between our class and `child_class` through `field`, if
	/// the persistence engine knows both.
	fn relationship(&self, field: &str, child_class: &str) -> FoundryResult<Option<RelationshipMetadata>> {
		if !self.factory.is_persistable() {
			return Ok(None);
		}
		let Ok(manager) = self.foundry.persistence() else {
			return Ok(None);
		};
		if !manager.supports(self.factory.class()) || !manager.supports(child_class) {
			return Ok(None);
		}
		let metadata = RelationshipResolver::new(manager.as_ref(), self.foundry.classes()).resolve(
			self.factory.class(),
			child_class,
			field,
		)?;
		tracing::trace!(
			parent = %self.factory.class(),
			child = child_class,
			field,
			inverse = metadata.as_ref().is_some_and(RelationshipMetadata::is_inverse),
			cascade = metadata.as_ref().is_some_and(|metadata| metadata.is_cascade_persist),
			"relationship resolved"
		);
		Ok(metadata)
	}
}

/// Normalizes attributes outside of any object factory (array factories).
///
/// Nested factories are created as-is, objects are kept unchanged.
pub(crate) fn normalize_detached(foundry: &Foundry, attribute: Attribute) -> FoundryResult<Value> {
	match attribute {
		Attribute::Value(value) => Ok(value),
		Attribute::Proxy(proxy) => Ok(Value::Object(proxy.into_object())),
		Attribute::Lazy(lazy) => normalize_detached(foundry, lazy.evaluate(foundry)?),
		Attribute::Factory(factory) => Ok(Value::Object(factory.create(foundry)?)),
		Attribute::Collection(collection) => Ok(Value::from(collection.create(foundry)?)),
		Attribute::Array(array) => Ok(Value::Map(array.create(foundry)?)),
		Attribute::List(items) => items
			.into_iter()
			.map(|item| normalize_detached(foundry, item))
			.collect::<FoundryResult<Vec<_>>>()
			.map(Value::List),
	}
}
