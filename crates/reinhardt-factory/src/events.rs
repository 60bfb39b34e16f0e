//! Lifecycle events dispatched by the instantiation pipeline.
//!
//! Listeners are registered when the [`Foundry`] context is built and run
//! for every factory, before the factory's own hooks of the same stage.

use std::fmt;
use std::sync::Arc;

use crate::attributes::Parameters;
use crate::error::FoundryResult;
use crate::factory::Factory;
use crate::foundry::Foundry;
use crate::object::ObjectRef;

/// Dispatched once the parameters are normalized; listeners may rewrite them.
pub struct BeforeInstantiate<'a> {
	pub parameters: Parameters,
	pub class: &'a str,
	pub factory: &'a Factory,
}

/// Dispatched right after the object is built and its deferred relationships are wired.
pub struct AfterInstantiate<'a> {
	pub object: &'a ObjectRef,
	pub parameters: &'a Parameters,
	pub factory: &'a Factory,
}

/// Dispatched when the persistence engine has flushed the object.
pub struct AfterPersist<'a> {
	pub object: &'a ObjectRef,
	pub parameters: &'a Parameters,
	pub class: &'a str,
}

type BeforeListener = Arc<dyn Fn(&mut BeforeInstantiate<'_>, &Foundry) -> FoundryResult<()> + Send + Sync>;
type AfterListener = Arc<dyn Fn(&AfterInstantiate<'_>, &Foundry) -> FoundryResult<()> + Send + Sync>;
type PersistListener = Arc<dyn Fn(&AfterPersist<'_>, &Foundry) -> FoundryResult<()> + Send + Sync>;

/// Registered lifecycle listeners.
#[derive(Clone, Default)]
pub struct EventDispatcher {
	before_instantiate: Vec<BeforeListener>,
	after_instantiate: Vec<AfterListener>,
	after_persist: Vec<PersistListener>,
}

impl EventDispatcher {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn on_before_instantiate<F>(&mut self, listener: F)
	where
		F: Fn(&mut BeforeInstantiate<'_>, &Foundry) -> FoundryResult<()> + Send + Sync + 'static,
	{
		self.before_instantiate.push(Arc::new(listener));
	}

	pub fn on_after_instantiate<F>(&mut self, listener: F)
	where
		F: Fn(&AfterInstantiate<'_>, &Foundry) -> FoundryResult<()> + Send + Sync + 'static,
	{
		self.after_instantiate.push(Arc::new(listener));
	}

	pub fn on_after_persist<F>(&mut self, listener: F)
	where
		F: Fn(&AfterPersist<'_>, &Foundry) -> FoundryResult<()> + Send + Sync + 'static,
	{
		self.after_persist.push(Arc::new(listener));
	}

	pub(crate) fn dispatch_before_instantiate(
		&self,
		event: &mut BeforeInstantiate<'_>,
		foundry: &Foundry,
	) -> FoundryResult<()> {
		self.before_instantiate
			.iter()
			.try_for_each(|listener| listener(event, foundry))
	}

	pub(crate) fn dispatch_after_instantiate(
		&self,
		event: &AfterInstantiate<'_>,
		foundry: &Foundry,
	) -> FoundryResult<()> {
		self.after_instantiate
			.iter()
			.try_for_each(|listener| listener(event, foundry))
	}

	pub(crate) fn dispatch_after_persist(
		&self,
		event: &AfterPersist<'_>,
		foundry: &Foundry,
	) -> FoundryResult<()> {
		self.after_persist
			.iter()
			.try_for_each(|listener| listener(event, foundry))
	}

	pub(crate) fn has_after_persist_listeners(&self) -> bool {
		!self.after_persist.is_empty()
	}
}

impl fmt::Debug for EventDispatcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EventDispatcher")
			.field("before_instantiate", &self.before_instantiate.len())
			.field("after_instantiate", &self.after_instantiate.len())
			.field("after_persist", &self.after_persist.len())
			.finish()
	}
}
