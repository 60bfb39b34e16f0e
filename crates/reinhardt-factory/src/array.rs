//! Factories producing plain maps instead of objects.

use std::fmt;

use indexmap::IndexMap;

use crate::attributes::{AttributeContext, AttributeSource, Attributes};
use crate::error::FoundryResult;
use crate::factory::normalize_detached;
use crate::foundry::Foundry;
use crate::value::Value;

/// Builds `IndexMap<String, Value>` records, e.g. request payloads.
///
/// Attribute layers merge like object factories' layers; nested factories
/// are created and lazy values evaluated. Nothing is persisted, validated
/// or hooked.
#[derive(Clone, Default)]
pub struct ArrayFactory {
	defaults: AttributeSource,
	states: Vec<AttributeSource>,
	index: usize,
}

impl ArrayFactory {
	pub fn new(defaults: impl Into<AttributeSource>) -> Self {
		Self {
			defaults: defaults.into(),
			states: Vec::new(),
			index: 1,
		}
	}

	pub fn with(&self, attributes: impl Into<AttributeSource>) -> Self {
		let mut clone = self.clone();
		clone.states.push(attributes.into());
		clone
	}

	pub fn create(&self, foundry: &Foundry) -> FoundryResult<IndexMap<String, Value>> {
		self.create_with(foundry, Attributes::new())
	}

	pub fn create_with(
		&self,
		foundry: &Foundry,
		overrides: impl Into<AttributeSource>,
	) -> FoundryResult<IndexMap<String, Value>> {
		let context = AttributeContext {
			index: self.index.max(1),
			foundry,
		};
		let mut attributes = self.defaults.resolve(&context);
		for state in &self.states {
			attributes.merge(state.resolve(&context));
		}
		attributes.merge(overrides.into().resolve(&context));

		attributes
			.into_iter()
			.map(|(field, attribute)| Ok((field, normalize_detached(foundry, attribute)?)))
			.collect()
	}

	/// `count` maps, indexed from 1.
	pub fn create_many(&self, foundry: &Foundry, count: usize) -> FoundryResult<Vec<IndexMap<String, Value>>> {
		(1..=count)
			.map(|index| {
				let mut factory = self.clone();
				factory.index = index;
				factory.create(foundry)
			})
			.collect()
	}
}

impl fmt::Debug for ArrayFactory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ArrayFactory")
			.field("defaults", &self.defaults)
			.field("states", &self.states.len())
			.finish()
	}
}
