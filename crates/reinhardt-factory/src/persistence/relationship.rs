//! Association shape lookup for nested factories.
//!
//! When a factory for `parent` finds a nested factory for `child` under
//! `field`, it asks the [`RelationshipResolver`] what that field is: a
//! plain attribute, the owning side of an association, or an inverse side
//! that needs the child to point back at the parent.

use crate::class::ClassRegistry;
use crate::error::{FoundryError, FoundryResult};
use crate::persistence::{AssociationKind, AssociationMapping, PersistenceManager};

/// Shape of one association between a parent and a child class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipMetadata {
	/// Kind of the association as seen from the parent.
	pub kind: AssociationKind,
	pub is_cascade_persist: bool,
	/// Field on the child that points back at the parent, when the parent holds the inverse side.
	pub inverse_field: Option<String>,
	pub is_collection: bool,
	pub is_one_to_one: bool,
	/// Sub-field keying the inverse collection.
	pub collection_indexed_by: Option<String>,
	/// Whether the child's owning field holds many parents.
	pub inverse_is_collection: bool,
}

impl RelationshipMetadata {
	fn from_mapping(mapping: &AssociationMapping) -> Self {
		Self {
			kind: mapping.kind,
			is_cascade_persist: mapping.cascade_persist,
			inverse_field: None,
			is_collection: mapping.is_collection_valued(),
			is_one_to_one: mapping.kind == AssociationKind::OneToOne,
			collection_indexed_by: None,
			inverse_is_collection: false,
		}
	}

	/// Whether the parent holds the inverse side.
	pub fn is_inverse(&self) -> bool {
		self.inverse_field.is_some()
	}
}

/// Reads association shapes out of the persistence engine's mapping metadata.
pub struct RelationshipResolver<'a> {
	manager: &'a dyn PersistenceManager,
	classes: &'a ClassRegistry,
}

impl<'a> RelationshipResolver<'a> {
	pub fn new(manager: &'a dyn PersistenceManager, classes: &'a ClassRegistry) -> Self {
		Self { manager, classes }
	}

	/// Resolves what `field` of `parent` means for a nested `child`.
	///
	/// Returns `None` when the field is not an association between the two
	/// classes. Fails when the mapping exists but cannot be reconciled with
	/// the classes involved.
	pub fn resolve(
		&self,
		parent: &str,
		child: &str,
		field: &str,
	) -> FoundryResult<Option<RelationshipMetadata>> {
		if let Some(direct) = self.manager.association_mapping(parent, field)
			&& self.classes.is_a(child, &direct.target)
		{
			return match &direct.mapped_by {
				None => Ok(Some(RelationshipMetadata::from_mapping(&direct))),
				Some(mapped_by) => self.inverse(parent, child, field, &direct, mapped_by).map(Some),
			};
		}

		let Some(mirrored) = self.manager.association_mapping(child, field) else {
			return Ok(None);
		};
		if !self.classes.is_a(parent, &mirrored.target) {
			return Err(invalid(
				parent,
				child,
				field,
				format!(
					"\"{}::{}\" targets \"{}\"",
					child, field, mirrored.target
				),
			));
		}
		if !matches!(
			mirrored.kind,
			AssociationKind::OneToMany | AssociationKind::OneToOne
		) || mirrored.mapped_by.is_none()
		{
			return Ok(None);
		}
		Ok(Some(RelationshipMetadata::from_mapping(&mirrored)))
	}

	fn inverse(
		&self,
		parent: &str,
		child: &str,
		field: &str,
		direct: &AssociationMapping,
		mapped_by: &str,
	) -> FoundryResult<RelationshipMetadata> {
		let child_metadata = self.manager.class_metadata(child).map_err(|error| {
			invalid(
				parent,
				child,
				field,
				format!("owning side metadata is unavailable: {}", error),
			)
		})?;
		let owning = child_metadata.association_mapping(mapped_by).ok_or_else(|| {
			invalid(
				parent,
				child,
				field,
				format!(
					"inverse side is mapped by \"{}::{}\" which is not an association",
					child, mapped_by
				),
			)
		})?;
		if !self.classes.is_a(parent, &owning.target) {
			return Err(invalid(
				parent,
				child,
				field,
				format!(
					"owning side \"{}::{}\" targets \"{}\"",
					child, mapped_by, owning.target
				),
			));
		}
		if owning.mapped_by.is_some() {
			return Err(invalid(
				parent,
				child,
				field,
				format!("\"{}::{}\" is not an owning side", child, mapped_by),
			));
		}

		let mut metadata = RelationshipMetadata::from_mapping(direct);
		metadata.inverse_field = Some(mapped_by.to_string());
		metadata.collection_indexed_by = direct.index_by.clone();
		metadata.inverse_is_collection = owning.is_collection_valued();
		Ok(metadata)
	}
}

fn invalid(parent: &str, child: &str, field: &str, reason: String) -> FoundryError {
	FoundryError::InvalidRelationship {
		parent: parent.to_string(),
		child: child.to_string(),
		field: field.to_string(),
		reason,
	}
}
