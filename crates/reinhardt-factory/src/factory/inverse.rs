//! Inverse-side relationships.
//!
//! When the parent holds the inverse side of an association, the child
//! must point at the parent, which does not exist yet while its parameters
//! are being normalized. Two strategies cover this:
//!
//! - one-to-one: the child is created right away against a [`Placeholder`]
//!   standing in for the parent, and rewired once the parent exists;
//! - collections: the parent field starts empty and the children are
//!   created after the parent, bound to it.
//!
//! Both run their second half as deferred callbacks of the parent's
//! pipeline, before its after-instantiate hooks.

use indexmap::IndexMap;

use crate::attributes::{AttributeSource, Attributes};
use crate::error::{FoundryError, FoundryResult};
use crate::foundry::Foundry;
use crate::object::ObjectRef;
use crate::persistence::{PersistMode, RelationshipMetadata};
use crate::value::Value;

use super::pipeline::Pipeline;
use super::{Factory, FactoryCollection};

/// Stand-in for a parent that is not instantiated yet.
///
/// The placeholder object is never stored: resolving it detaches it from
/// the persistence engine and rewires the holder's field to the real
/// object. It can only be resolved once, by value.
#[must_use = "a placeholder must be resolved once the real object exists"]
pub(crate) struct Placeholder {
	object: ObjectRef,
	resolved: bool,
}

impl Placeholder {
	pub(crate) fn new(class: &str) -> Self {
		Self {
			object: ObjectRef::placeholder(class),
			resolved: false,
		}
	}

	pub(crate) fn object(&self) -> &ObjectRef {
		&self.object
	}

	/// Replaces the placeholder in `holder.field` with `real`.
	pub(crate) fn resolve(mut self, foundry: &Foundry, holder: &ObjectRef, field: &str, real: &ObjectRef) {
		if let Ok(manager) = foundry.persistence() {
			manager.forget(&self.object);
		}
		holder.set(field, real.clone());
		self.resolved = true;
		tracing::trace!(holder = ?holder, field, real = ?real, "placeholder resolved");
	}
}

impl Drop for Placeholder {
	fn drop(&mut self) {
		if !self.resolved {
			tracing::warn!(class = self.object.class(), "placeholder dropped without being resolved");
		}
	}
}

/// One element of a deferred inverse collection.
pub(super) enum PendingChild {
	Factory(Factory),
	Collection(FactoryCollection),
	Object(ObjectRef),
}

impl Pipeline<'_> {
	/// Mode for children created on behalf of an inverse side: scheduled
	/// with the parent, flushed by it.
	fn child_mode(&self) -> PersistMode {
		if self.mode.is_persisting() {
			PersistMode::NoPersistButScheduleForInsert
		} else {
			PersistMode::WithoutPersisting
		}
	}

	pub(super) fn resolve_inverse_one_to_one(
		&mut self,
		field: &str,
		nested: Factory,
		metadata: RelationshipMetadata,
	) -> FoundryResult<Value> {
		let inverse_field = inverse_field_of(self.factory, field, &metadata)?;
		let placeholder = Placeholder::new(self.factory.class());

		let mut overrides = Attributes::new();
		overrides.insert(inverse_field.clone(), placeholder.object().clone());
		let child = nested
			.with_persist_mode(self.child_mode())
			.create_nested(self.foundry, &overrides.into(), self.journal)?;
		tracing::debug!(
			parent = %self.factory.class(),
			child = child.class(),
			field,
			"child created against a placeholder"
		);

		let holder = child.clone();
		self.defer(move |foundry, parent| {
			placeholder.resolve(foundry, &holder, &inverse_field, parent);
			Ok(())
		});
		Ok(Value::Object(child))
	}

	pub(super) fn defer_inverse_collection(
		&mut self,
		field: &str,
		children: Vec<PendingChild>,
		metadata: RelationshipMetadata,
	) -> FoundryResult<Value> {
		let inverse_field = inverse_field_of(self.factory, field, &metadata)?;
		let child_mode = self.child_mode();
		let journal = self.journal.clone();
		let field = field.to_string();

		self.defer(move |foundry, parent| {
			let back_reference = if metadata.inverse_is_collection {
				Value::List(vec![Value::Object(parent.clone())])
			} else {
				Value::Object(parent.clone())
			};
			let mut overrides = Attributes::new();
			overrides.insert(inverse_field.clone(), back_reference);
			let overrides = AttributeSource::from(overrides);

			let mut created = Vec::new();
			for child in children {
				match child {
					PendingChild::Factory(factory) => {
						let factory = factory.with_persist_mode(child_mode);
						created.push(factory.create_nested(foundry, &overrides, &journal)?);
					}
					PendingChild::Collection(collection) => {
						let collection = collection.with_persist_mode(child_mode);
						created.extend(collection.create_nested(foundry, &overrides, &journal)?);
					}
					PendingChild::Object(object) => {
						bind_to_parent(&object, &inverse_field, parent, metadata.inverse_is_collection);
						created.push(object);
					}
				}
			}
			tracing::debug!(
				parent = parent.class(),
				field = %field,
				children = created.len(),
				"inverse collection created"
			);

			let value = match &metadata.collection_indexed_by {
				Some(indexed_by) => Value::Map(index_children(&field, indexed_by, created)?),
				None => Value::from(created),
			};
			parent.set(field, value);
			Ok(())
		});
		Ok(Value::List(Vec::new()))
	}
}

fn inverse_field_of(parent: &Factory, field: &str, metadata: &RelationshipMetadata) -> FoundryResult<String> {
	metadata
		.inverse_field
		.clone()
		.ok_or_else(|| FoundryError::MappingNotFound(format!("{}::{}", parent.class(), field)))
}

/// Points an existing child at its new parent.
fn bind_to_parent(child: &ObjectRef, inverse_field: &str, parent: &ObjectRef, many: bool) {
	if !many {
		child.set(inverse_field, parent.clone());
		return;
	}
	if !child.get_objects(inverse_field).iter().any(|existing| existing.is(parent)) {
		child.push(inverse_field, parent.clone());
	}
}

/// Keys children by the value of their `indexed_by` field.
fn index_children(
	field: &str,
	indexed_by: &str,
	children: Vec<ObjectRef>,
) -> FoundryResult<IndexMap<String, Value>> {
	let mut indexed = IndexMap::with_capacity(children.len());
	for child in children {
		let key = child
			.get_or_null(indexed_by)
			.as_key()
			.ok_or_else(|| FoundryError::InvalidIndexKey {
				field: field.to_string(),
				indexed_by: indexed_by.to_string(),
			})?;
		if indexed.contains_key(&key) {
			return Err(FoundryError::DuplicateIndexKey {
				field: field.to_string(),
				indexed_by: indexed_by.to_string(),
				key,
			});
		}
		indexed.insert(key, Value::Object(child));
	}
	Ok(indexed)
}
