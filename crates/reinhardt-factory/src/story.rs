//! Stories: named, load-once fixtures.
//!
//! A story builds a set of objects once per [`Foundry`] context and keeps
//! named references to them (state) and named pools to draw random
//! objects from.

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::{FoundryError, FoundryResult};
use crate::foundry::Foundry;
use crate::object::ObjectRef;
use crate::value::Value;

/// A reusable fixture.
pub trait Story: Send + Sync + 'static {
	/// Creates the story's objects and records them in `state`.
	fn build(&self, foundry: &Foundry, state: &mut StoryState) -> FoundryResult<()>;
}

/// What a story records while building.
#[derive(Debug, Default)]
pub struct StoryState {
	values: IndexMap<String, Value>,
	pools: IndexMap<String, Vec<ObjectRef>>,
}

impl StoryState {
	/// Records a named value; objects added this way can be fetched with [`LoadedStory::get_object`].
	pub fn add_state(&mut self, name: impl Into<String>, value: impl Into<Value>) {
		self.values.insert(name.into(), value.into());
	}

	/// Appends objects to a named pool.
	pub fn add_to_pool(&mut self, pool: impl Into<String>, objects: impl IntoIterator<Item = ObjectRef>) {
		self.pools.entry(pool.into()).or_default().extend(objects);
	}
}

/// A built story.
#[derive(Debug)]
pub struct LoadedStory {
	name: &'static str,
	state: StoryState,
}

impl LoadedStory {
	pub fn name(&self) -> &str {
		self.name
	}

	/// Named state value.
	///
	/// # Errors
	///
	/// [`FoundryError::StoryStateNotFound`] when nothing was recorded under `name`.
	pub fn get(&self, name: &str) -> FoundryResult<Value> {
		self.state
			.values
			.get(name)
			.cloned()
			.ok_or_else(|| self.missing(name))
	}

	/// Named state value that must be an object.
	pub fn get_object(&self, name: &str) -> FoundryResult<ObjectRef> {
		match self.get(name)? {
			Value::Object(object) => Ok(object),
			other => Err(FoundryError::InvalidArgument(format!(
				"story state \"{}\" holds a {}, not an object",
				name,
				other.kind()
			))),
		}
	}

	pub fn pool(&self, pool: &str) -> FoundryResult<&[ObjectRef]> {
		self.state
			.pools
			.get(pool)
			.map(Vec::as_slice)
			.ok_or_else(|| self.missing(pool))
	}

	pub fn random_from_pool(&self, foundry: &Foundry, pool: &str) -> FoundryResult<ObjectRef> {
		let objects = self.pool(pool)?;
		foundry.faker().pick(objects).ok_or_else(|| self.empty_pool(pool, 1, 0))
	}

	/// `count` distinct objects from the pool.
	pub fn random_set_from_pool(
		&self,
		foundry: &Foundry,
		pool: &str,
		count: usize,
	) -> FoundryResult<Vec<ObjectRef>> {
		let objects = self.pool(pool)?;
		if objects.len() < count {
			return Err(self.empty_pool(pool, count, objects.len()));
		}
		Ok(foundry.faker().pick_many(objects, count))
	}

	/// Between `min` and `max` distinct objects from the pool.
	pub fn random_range_from_pool(
		&self,
		foundry: &Foundry,
		pool: &str,
		min: usize,
		max: usize,
	) -> FoundryResult<Vec<ObjectRef>> {
		if min > max {
			return Err(FoundryError::InvalidArgument(format!(
				"random range minimum {} is greater than maximum {}",
				min, max
			)));
		}
		let count = foundry.faker().count_between(min, max);
		self.random_set_from_pool(foundry, pool, count)
	}

	fn missing(&self, name: &str) -> FoundryError {
		FoundryError::StoryStateNotFound {
			story: self.name.to_string(),
			name: name.to_string(),
		}
	}

	fn empty_pool(&self, pool: &str, required: usize, available: usize) -> FoundryError {
		FoundryError::NotEnoughObjects {
			class: format!("{}::{}", self.name, pool),
			required,
			available,
		}
	}
}

/// Stories loaded in one context.
#[derive(Debug, Default)]
pub struct StoryRegistry {
	loaded: RwLock<HashMap<TypeId, Arc<LoadedStory>>>,
}

impl StoryRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns story `S`, building it if it is not loaded yet.
	pub(crate) fn load<S: Story + Default>(&self, foundry: &Foundry) -> FoundryResult<Arc<LoadedStory>> {
		if let Some(story) = self.loaded.read().get(&TypeId::of::<S>()) {
			return Ok(Arc::clone(story));
		}

		// built without holding the lock: a story may load other stories
		let mut state = StoryState::default();
		S::default().build(foundry, &mut state)?;
		tracing::debug!(story = type_name::<S>(), "story loaded");

		let built = Arc::new(LoadedStory {
			name: type_name::<S>(),
			state,
		});
		let mut loaded = self.loaded.write();
		Ok(Arc::clone(loaded.entry(TypeId::of::<S>()).or_insert(built)))
	}

	pub fn is_loaded<S: Story>(&self) -> bool {
		self.loaded.read().contains_key(&TypeId::of::<S>())
	}

	pub fn reset(&self) {
		self.loaded.write().clear();
	}
}
