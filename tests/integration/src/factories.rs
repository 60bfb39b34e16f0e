//! Model factories of the fixture domain.

use reinhardt_factory::prelude::*;

use crate::domain::*;

pub struct CategoryFactory;

impl ModelFactory for CategoryFactory {
	fn class() -> &'static str {
		CATEGORY
	}

	fn defaults(ctx: &AttributeContext<'_>) -> Attributes {
		attributes! { "name" => ctx.faker().word() }
	}
}

pub struct SpecialCategoryFactory;

impl ModelFactory for SpecialCategoryFactory {
	fn class() -> &'static str {
		SPECIAL_CATEGORY
	}

	fn defaults(ctx: &AttributeContext<'_>) -> Attributes {
		attributes! {
			"name" => ctx.faker().word(),
			"label" => "special",
		}
	}
}

pub struct ContactFactory;

impl ModelFactory for ContactFactory {
	fn class() -> &'static str {
		CONTACT
	}

	fn defaults(ctx: &AttributeContext<'_>) -> Attributes {
		attributes! {
			"name" => ctx.faker().name(),
			"category" => CategoryFactory::new(),
			"address" => AddressFactory::new(),
		}
	}
}

pub struct AddressFactory;

impl ModelFactory for AddressFactory {
	fn class() -> &'static str {
		ADDRESS
	}

	fn defaults(ctx: &AttributeContext<'_>) -> Attributes {
		attributes! { "city" => ctx.faker().city() }
	}
}

pub struct TagFactory;

impl ModelFactory for TagFactory {
	fn class() -> &'static str {
		TAG
	}

	fn defaults(ctx: &AttributeContext<'_>) -> Attributes {
		attributes! { "name" => ctx.faker().word() }
	}
}

pub struct InverseSideFactory;

impl ModelFactory for InverseSideFactory {
	fn class() -> &'static str {
		INVERSE_SIDE
	}

	fn defaults(_ctx: &AttributeContext<'_>) -> Attributes {
		attributes! { "main_value" => "main" }
	}
}

pub struct OwningSideFactory;

impl ModelFactory for OwningSideFactory {
	fn class() -> &'static str {
		OWNING_SIDE
	}

	fn defaults(_ctx: &AttributeContext<'_>) -> Attributes {
		Attributes::new()
	}
}

pub struct IndexedParentFactory;

impl ModelFactory for IndexedParentFactory {
	fn class() -> &'static str {
		INDEXED_PARENT
	}

	fn defaults(_ctx: &AttributeContext<'_>) -> Attributes {
		Attributes::new()
	}
}

pub struct IndexedChildFactory;

impl ModelFactory for IndexedChildFactory {
	fn class() -> &'static str {
		INDEXED_CHILD
	}

	fn defaults(_ctx: &AttributeContext<'_>) -> Attributes {
		attributes! { "language" => "en" }
	}
}

pub struct EntityForValidationFactory;

impl ModelFactory for EntityForValidationFactory {
	fn class() -> &'static str {
		ENTITY_FOR_VALIDATION
	}

	fn defaults(_ctx: &AttributeContext<'_>) -> Attributes {
		attributes! { "name" => "valid", "age" => 30 }
	}
}

pub struct SimpleObjectFactory;

impl ModelFactory for SimpleObjectFactory {
	fn class() -> &'static str {
		SIMPLE_OBJECT
	}

	fn defaults(ctx: &AttributeContext<'_>) -> Attributes {
		attributes! {
			"prop1" => ctx.faker().word(),
			"prop2" => ctx.index,
		}
	}

	fn persistable() -> bool {
		false
	}
}

pub struct Object1Factory;

impl ModelFactory for Object1Factory {
	fn class() -> &'static str {
		OBJECT1
	}

	fn defaults(_ctx: &AttributeContext<'_>) -> Attributes {
		attributes! { "prop1" => "value1", "prop2" => "value2" }
	}

	fn persistable() -> bool {
		false
	}
}
