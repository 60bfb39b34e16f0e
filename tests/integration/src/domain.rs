//! Fixture domain: class descriptors and persistence mappings.
//!
//! | Class                 | Associations                                                      |
//! |-----------------------|-------------------------------------------------------------------|
//! | `Category`            | `contacts`: one-to-many, inverse of `Contact::category`           |
//! | `Contact`             | `category`: many-to-one, `address`: one-to-one, `tags`: many-to-many |
//! | `Address`             | none                                                              |
//! | `Tag`                 | `contacts`: many-to-many, inverse of `Contact::tags`              |
//! | `InverseSide`         | `owning_side`: one-to-one, inverse of `OwningSide::inverse_side`; `category`: many-to-one |
//! | `OwningSide`          | `inverse_side`: one-to-one                                        |
//! | `InverseSideWithItems` | `owning_side`: one-to-one, inverse of `OwningSideWithItems::inverse_side` |
//! | `OwningSideWithItems` | `inverse_side`: one-to-one, `items`: one-to-many, inverse of `Item::owning_side` |
//! | `Item`                | `owning_side`: many-to-one                                        |
//! | `SelfReferencingInverseSide` | `owning_sides`: one-to-many, inverse of `ReferencingOwningSide::inverse_side`; `parent`: many-to-one to itself |
//! | `ReferencingOwningSide` | `inverse_side`: many-to-one                                     |
//! | `IndexedParent`       | `children`: one-to-many indexed by `language`                     |
//! | `IndexedChild`        | `parent`: many-to-one                                             |
//! | `EntityForValidation` | none                                                              |
//!
//! `SimpleObject` and `Object1` are plain objects without persistence.

use reinhardt_factory::persistence::{AssociationMapping, ClassMetadata};
use reinhardt_factory::{ClassDescriptor, ObjectRef, Value};
use reinhardt_factory_test::MappingRegistry;

pub const CATEGORY: &str = "Category";
pub const SPECIAL_CATEGORY: &str = "SpecialCategory";
pub const CONTACT: &str = "Contact";
pub const ADDRESS: &str = "Address";
pub const TAG: &str = "Tag";
pub const INVERSE_SIDE: &str = "InverseSide";
pub const OWNING_SIDE: &str = "OwningSide";
pub const INVERSE_SIDE_WITH_ITEMS: &str = "InverseSideWithItems";
pub const OWNING_SIDE_WITH_ITEMS: &str = "OwningSideWithItems";
pub const ITEM: &str = "Item";
pub const SELF_REFERENCING_INVERSE_SIDE: &str = "SelfReferencingInverseSide";
pub const REFERENCING_OWNING_SIDE: &str = "ReferencingOwningSide";
pub const INDEXED_PARENT: &str = "IndexedParent";
pub const INDEXED_CHILD: &str = "IndexedChild";
pub const ENTITY_FOR_VALIDATION: &str = "EntityForValidation";
pub const SIMPLE_OBJECT: &str = "SimpleObject";
pub const OBJECT1: &str = "Object1";

/// Every class of the fixture domain.
pub fn classes() -> Vec<ClassDescriptor> {
	vec![
		ClassDescriptor::new(CATEGORY)
			.scalar("id")
			.scalar("name")
			.collection("contacts", CONTACT),
		ClassDescriptor::new(SPECIAL_CATEGORY)
			.extends(CATEGORY)
			.scalar("label"),
		ClassDescriptor::new(CONTACT)
			.scalar("id")
			.scalar("name")
			.object("category", CATEGORY)
			.object("address", ADDRESS)
			.collection("tags", TAG),
		ClassDescriptor::new(ADDRESS).scalar("id").scalar("city"),
		ClassDescriptor::new(TAG)
			.scalar("id")
			.scalar("name")
			.collection("contacts", CONTACT),
		ClassDescriptor::new(INVERSE_SIDE)
			.scalar("id")
			.scalar("main_value")
			.object("owning_side", OWNING_SIDE)
			.object("category", CATEGORY),
		ClassDescriptor::new(OWNING_SIDE)
			.scalar("id")
			.object("inverse_side", INVERSE_SIDE),
		ClassDescriptor::new(INVERSE_SIDE_WITH_ITEMS)
			.scalar("id")
			.object("owning_side", OWNING_SIDE_WITH_ITEMS),
		ClassDescriptor::new(OWNING_SIDE_WITH_ITEMS)
			.scalar("id")
			.object("inverse_side", INVERSE_SIDE_WITH_ITEMS)
			.collection("items", ITEM),
		ClassDescriptor::new(ITEM)
			.scalar("id")
			.object("owning_side", OWNING_SIDE_WITH_ITEMS),
		ClassDescriptor::new(SELF_REFERENCING_INVERSE_SIDE)
			.scalar("id")
			.collection("owning_sides", REFERENCING_OWNING_SIDE)
			.object("parent", SELF_REFERENCING_INVERSE_SIDE),
		ClassDescriptor::new(REFERENCING_OWNING_SIDE)
			.scalar("id")
			.object("inverse_side", SELF_REFERENCING_INVERSE_SIDE),
		ClassDescriptor::new(INDEXED_PARENT)
			.scalar("id")
			.collection("children", INDEXED_CHILD),
		ClassDescriptor::new(INDEXED_CHILD)
			.scalar("id")
			.scalar("language")
			.object("parent", INDEXED_PARENT),
		ClassDescriptor::new(ENTITY_FOR_VALIDATION)
			.scalar("id")
			.scalar("name")
			.scalar("age"),
		ClassDescriptor::new(SIMPLE_OBJECT).scalar("prop1").scalar("prop2"),
		object1(),
	]
}

/// `Object1` takes `prop1` and `prop2` through its constructor, which
/// suffixes them; `prop2` and `prop3` have suffixing setters.
fn object1() -> ClassDescriptor {
	fn suffixed(value: Value, suffix: &str) -> Value {
		Value::from(format!("{}{}", value.as_str().unwrap_or_default(), suffix))
	}

	ClassDescriptor::new(OBJECT1)
		.scalar("prop1")
		.scalar("prop2")
		.scalar("prop3")
		.constructor(|args| {
			let prop1 = args.require("prop1")?;
			let prop2 = args.require("prop2")?;
			let prop3 = args.take_or("prop3", "default");
			Ok(ObjectRef::with_fields(
				OBJECT1,
				[
					("prop1", suffixed(prop1, "-constructor")),
					("prop2", suffixed(prop2, "-constructor")),
					("prop3", suffixed(prop3, "-constructor")),
				],
			))
		})
		.named_constructor("factory", |args| {
			let prop1 = args.require("prop1")?;
			Ok(ObjectRef::with_fields(
				OBJECT1,
				[("prop1", suffixed(prop1, "-named")), ("prop2", Value::from("static"))],
			))
		})
		.setter("prop2", |object, value| {
			object.set("prop2", suffixed(value, "-setter"));
			Ok(())
		})
		.setter("prop3", |object, value| {
			object.set("prop3", suffixed(value, "-setter"));
			Ok(())
		})
}

/// Persistence mappings of the fixture domain; nothing cascades.
pub fn mappings() -> MappingRegistry {
	MappingRegistry::new()
		.with(ClassMetadata::new(CATEGORY).association(
			AssociationMapping::one_to_many(CATEGORY, "contacts", CONTACT).mapped_by("category"),
		))
		.with(ClassMetadata::new(SPECIAL_CATEGORY).association(
			AssociationMapping::one_to_many(SPECIAL_CATEGORY, "contacts", CONTACT).mapped_by("category"),
		))
		.with(
			ClassMetadata::new(CONTACT)
				.association(
					AssociationMapping::many_to_one(CONTACT, "category", CATEGORY).inversed_by("contacts"),
				)
				.association(AssociationMapping::one_to_one(CONTACT, "address", ADDRESS))
				.association(AssociationMapping::many_to_many(CONTACT, "tags", TAG).inversed_by("contacts")),
		)
		.with(ClassMetadata::new(ADDRESS))
		.with(ClassMetadata::new(TAG).association(
			AssociationMapping::many_to_many(TAG, "contacts", CONTACT).mapped_by("tags"),
		))
		.with(
			ClassMetadata::new(INVERSE_SIDE)
				.association(
					AssociationMapping::one_to_one(INVERSE_SIDE, "owning_side", OWNING_SIDE)
						.mapped_by("inverse_side"),
				)
				.association(AssociationMapping::many_to_one(INVERSE_SIDE, "category", CATEGORY)),
		)
		.with(ClassMetadata::new(OWNING_SIDE).association(
			AssociationMapping::one_to_one(OWNING_SIDE, "inverse_side", INVERSE_SIDE).inversed_by("owning_side"),
		))
		.with(ClassMetadata::new(INVERSE_SIDE_WITH_ITEMS).association(
			AssociationMapping::one_to_one(INVERSE_SIDE_WITH_ITEMS, "owning_side", OWNING_SIDE_WITH_ITEMS)
				.mapped_by("inverse_side"),
		))
		.with(
			ClassMetadata::new(OWNING_SIDE_WITH_ITEMS)
				.association(
					AssociationMapping::one_to_one(OWNING_SIDE_WITH_ITEMS, "inverse_side", INVERSE_SIDE_WITH_ITEMS)
						.inversed_by("owning_side"),
				)
				.association(
					AssociationMapping::one_to_many(OWNING_SIDE_WITH_ITEMS, "items", ITEM).mapped_by("owning_side"),
				),
		)
		.with(ClassMetadata::new(ITEM).association(
			AssociationMapping::many_to_one(ITEM, "owning_side", OWNING_SIDE_WITH_ITEMS).inversed_by("items"),
		))
		.with(
			ClassMetadata::new(SELF_REFERENCING_INVERSE_SIDE)
				.association(
					AssociationMapping::one_to_many(
						SELF_REFERENCING_INVERSE_SIDE,
						"owning_sides",
						REFERENCING_OWNING_SIDE,
					)
					.mapped_by("inverse_side"),
				)
				.association(AssociationMapping::many_to_one(
					SELF_REFERENCING_INVERSE_SIDE,
					"parent",
					SELF_REFERENCING_INVERSE_SIDE,
				)),
		)
		.with(ClassMetadata::new(REFERENCING_OWNING_SIDE).association(
			AssociationMapping::many_to_one(REFERENCING_OWNING_SIDE, "inverse_side", SELF_REFERENCING_INVERSE_SIDE)
				.inversed_by("owning_sides"),
		))
		.with(
			ClassMetadata::new(INDEXED_PARENT).association(
				AssociationMapping::one_to_many(INDEXED_PARENT, "children", INDEXED_CHILD)
					.mapped_by("parent")
					.index_by("language"),
			),
		)
		.with(ClassMetadata::new(INDEXED_CHILD).association(
			AssociationMapping::many_to_one(INDEXED_CHILD, "parent", INDEXED_PARENT).inversed_by("children"),
		))
		.with(ClassMetadata::new(ENTITY_FOR_VALIDATION))
}

/// Mappings where every association cascades persistence.
pub fn cascading_mappings() -> MappingRegistry {
	let registry = mappings();
	registry
		.classes()
		.filter_map(|class| registry.get(class).cloned())
		.map(|mut metadata| {
			for mapping in metadata.associations.values_mut() {
				mapping.cascade_persist = true;
			}
			metadata
		})
		.collect()
}
