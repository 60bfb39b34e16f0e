use std::fmt;

use crate::attributes::{AttributeSource, Attributes};
use crate::error::{FoundryError, FoundryResult};
use crate::foundry::Foundry;
use crate::object::ObjectRef;
use crate::persistence::PersistMode;
use crate::value::Value;

use super::Factory;
use super::pipeline::Journal;

#[derive(Clone)]
enum Plan {
	Count(usize),
	Range { min: usize, max: usize },
	Sequence(Vec<Vec<AttributeSource>>),
}

/// A factory repeated a number of times.
///
/// The collection yields one factory per object; each gets its 1-based
/// position as [`AttributeContext::index`](crate::AttributeContext::index).
#[derive(Clone)]
pub struct FactoryCollection {
	factory: Factory,
	plan: Plan,
}

impl FactoryCollection {
	pub(crate) fn count(factory: Factory, count: usize) -> Self {
		Self {
			factory,
			plan: Plan::Count(count),
		}
	}

	pub(crate) fn range(factory: Factory, min: usize, max: usize) -> FoundryResult<Self> {
		if min > max {
			return Err(FoundryError::InvalidArgument(format!(
				"range minimum {} is greater than maximum {}",
				min, max
			)));
		}
		Ok(Self {
			factory,
			plan: Plan::Range { min, max },
		})
	}

	pub(crate) fn sequence<I, S>(factory: Factory, sequence: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<AttributeSource>,
	{
		Self {
			factory,
			plan: Plan::Sequence(sequence.into_iter().map(|item| vec![item.into()]).collect()),
		}
	}

	pub fn factory(&self) -> &Factory {
		&self.factory
	}

	pub(crate) fn map_factory(mut self, map: impl FnOnce(Factory) -> Factory) -> Self {
		self.factory = map(self.factory);
		self
	}

	pub fn with_persist_mode(&self, mode: PersistMode) -> Self {
		self.clone().map_factory(|factory| factory.with_persist_mode(mode))
	}

	pub fn without_persisting(&self) -> Self {
		self.with_persist_mode(PersistMode::WithoutPersisting)
	}

	/// Assigns `values[i]` to `field` of the i-th object.
	///
	/// # Errors
	///
	/// [`FoundryError::InvalidArgument`] when the number of values differs
	/// from the number of objects, or when the size is random.
	pub fn distribute<I, V>(&self, field: &str, values: I) -> FoundryResult<Self>
	where
		I: IntoIterator<Item = V>,
		V: Into<Value>,
	{
		let values: Vec<Value> = values.into_iter().map(Into::into).collect();
		let items: Vec<Vec<AttributeSource>> = match &self.plan {
			Plan::Count(count) => vec![Vec::new(); *count],
			Plan::Sequence(items) => items.clone(),
			Plan::Range { .. } => {
				return Err(FoundryError::InvalidArgument(
					"cannot distribute values over a collection of random size".to_string(),
				));
			}
		};
		if items.len() != values.len() {
			return Err(FoundryError::InvalidArgument(format!(
				"cannot distribute {} values over {} objects",
				values.len(),
				items.len()
			)));
		}

		let items = items
			.into_iter()
			.zip(values)
			.map(|(mut layers, value)| {
				let mut attributes = Attributes::new();
				attributes.insert(field, value);
				layers.push(attributes.into());
				layers
			})
			.collect();
		Ok(Self {
			factory: self.factory.clone(),
			plan: Plan::Sequence(items),
		})
	}

	/// One factory per object, in creation order.
	pub fn all(&self, foundry: &Foundry) -> Vec<Factory> {
		match &self.plan {
			Plan::Count(count) => (1..=*count).map(|index| self.factory.at_index(index)).collect(),
			Plan::Range { min, max } => {
				let count = foundry.faker().count_between(*min, *max);
				(1..=count).map(|index| self.factory.at_index(index)).collect()
			}
			Plan::Sequence(items) => items
				.iter()
				.enumerate()
				.map(|(position, layers)| {
					layers
						.iter()
						.fold(self.factory.at_index(position + 1), |factory, layer| {
							factory.with(layer.clone())
						})
				})
				.collect(),
		}
	}

	pub fn create(&self, foundry: &Foundry) -> FoundryResult<Vec<ObjectRef>> {
		self.create_with(foundry, Attributes::new())
	}

	/// Creates every object with `overrides` applied to each.
	pub fn create_with(
		&self,
		foundry: &Foundry,
		overrides: impl Into<AttributeSource>,
	) -> FoundryResult<Vec<ObjectRef>> {
		let overrides = overrides.into();
		self.all(foundry)
			.iter()
			.map(|factory| factory.create_with(foundry, overrides.clone()))
			.collect()
	}

	pub(crate) fn create_nested(
		&self,
		foundry: &Foundry,
		overrides: &AttributeSource,
		journal: &Journal,
	) -> FoundryResult<Vec<ObjectRef>> {
		self.all(foundry)
			.iter()
			.map(|factory| factory.create_nested(foundry, overrides, journal))
			.collect()
	}
}

impl fmt::Debug for FactoryCollection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let plan = match &self.plan {
			Plan::Count(count) => format!("{}", count),
			Plan::Range { min, max } => format!("{}..={}", min, max),
			Plan::Sequence(items) => format!("sequence of {}", items.len()),
		};
		f.debug_struct("FactoryCollection")
			.field("factory", &self.factory)
			.field("plan", &plan)
			.finish()
	}
}
