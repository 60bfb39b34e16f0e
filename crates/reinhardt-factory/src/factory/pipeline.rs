//! The instantiation pipeline.
//!
//! One [`Pipeline`] runs per created object and walks a fixed sequence of
//! stages:
//!
//! ```text
//! Normalizing -> BeforeHooks -> Instantiating -> DeferredCallbacks
//!     -> AfterHooks -> Scheduling -> Flushing -> Done
//! ```
//!
//! `Scheduling` is skipped when the factory does not persist, `Flushing`
//! unless it persists right away. Nested pipelines never flush: their
//! objects are scheduled and stored by the outermost one, whose after-persist
//! hooks run inside that flush.
//!
//! Every object scheduled during one `create` is recorded in a [`Journal`].
//! When the run fails, the journal forgets them all so the next flush does
//! not store half of an object graph.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::attributes::AttributeSource;
use crate::error::{FoundryError, FoundryResult};
use crate::events::{AfterInstantiate, BeforeInstantiate};
use crate::foundry::Foundry;
use crate::object::ObjectRef;
use crate::persistence::{AfterPersistCallback, PersistMode, PersistenceManager};

use super::{Factory, HookContext};

/// Stage of one object's creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
	Normalizing,
	BeforeHooks,
	Instantiating,
	DeferredCallbacks,
	AfterHooks,
	Scheduling,
	Flushing,
	Done,
}

impl fmt::Display for Stage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Normalizing => "normalizing",
			Self::BeforeHooks => "before-hooks",
			Self::Instantiating => "instantiating",
			Self::DeferredCallbacks => "deferred-callbacks",
			Self::AfterHooks => "after-hooks",
			Self::Scheduling => "scheduling",
			Self::Flushing => "flushing",
			Self::Done => "done",
		};
		f.write_str(name)
	}
}

/// Work postponed until the object under construction exists.
pub(super) type DeferredCallback = Box<dyn FnOnce(&Foundry, &ObjectRef) -> FoundryResult<()>>;

/// Objects scheduled for insertion by one top-level `create`.
#[derive(Clone, Default)]
pub(crate) struct Journal {
	scheduled: Rc<RefCell<Vec<ObjectRef>>>,
}

impl Journal {
	/// Schedules `object` and remembers it.
	pub(super) fn schedule(
		&self,
		manager: &dyn PersistenceManager,
		object: &ObjectRef,
		after_persist: Vec<AfterPersistCallback>,
	) {
		manager.schedule_for_insert(object, after_persist);
		self.scheduled.borrow_mut().push(object.clone());
	}

	/// Detaches every recorded object from the persistence engine.
	pub(super) fn rollback(&self, foundry: &Foundry) {
		let scheduled = std::mem::take(&mut *self.scheduled.borrow_mut());
		if scheduled.is_empty() {
			return;
		}
		let Ok(manager) = foundry.persistence() else {
			return;
		};
		tracing::debug!(objects = scheduled.len(), "forgetting objects scheduled by a failed create");
		for object in scheduled.iter().rev() {
			manager.forget(object);
		}
	}
}

pub(super) struct Pipeline<'f> {
	pub(super) foundry: &'f Foundry,
	pub(super) factory: &'f Factory,
	pub(super) mode: PersistMode,
	pub(super) journal: &'f Journal,
	stage: Stage,
	deferred: Vec<DeferredCallback>,
}

impl<'f> Pipeline<'f> {
	pub(super) fn new(foundry: &'f Foundry, factory: &'f Factory, journal: &'f Journal) -> Self {
		Self {
			foundry,
			factory,
			mode: factory.persist_mode(foundry),
			journal,
			stage: Stage::Normalizing,
			deferred: Vec::new(),
		}
	}

	/// Registers work to run once the object is instantiated.
	pub(super) fn defer<F>(&mut self, callback: F)
	where
		F: FnOnce(&Foundry, &ObjectRef) -> FoundryResult<()> + 'static,
	{
		debug_assert!(self.stage < Stage::DeferredCallbacks);
		self.deferred.push(Box::new(callback));
	}

	fn enter(&mut self, stage: Stage) {
		tracing::trace!(class = %self.factory.class(), from = %self.stage, to = %stage, "pipeline stage");
		self.stage = stage;
	}

	pub(super) fn run(mut self, overrides: &AttributeSource) -> FoundryResult<ObjectRef> {
		let foundry = self.foundry;
		let factory = self.factory;

		if factory.forces_validation() && !foundry.is_validation_available() {
			return Err(FoundryError::ValidationNotAvailable);
		}

		let attributes = factory.collect_attributes(foundry, overrides);
		let parameters = self.normalize_attributes(attributes)?;

		self.enter(Stage::BeforeHooks);
		let mut event = BeforeInstantiate {
			parameters,
			class: factory.class(),
			factory,
		};
		foundry.events().dispatch_before_instantiate(&mut event, foundry)?;
		let context = HookContext { foundry, factory };
		let mut parameters = event.parameters;
		for hook in factory.before_instantiate_hooks() {
			parameters = hook(parameters, &context)?;
		}

		self.enter(Stage::Instantiating);
		let instantiator = factory
			.configured_instantiator()
			.unwrap_or_else(|| foundry.instantiator());
		let object = instantiator.instantiate(foundry, factory.class(), parameters.clone())?;

		self.enter(Stage::DeferredCallbacks);
		for callback in std::mem::take(&mut self.deferred) {
			callback(foundry, &object)?;
		}

		self.enter(Stage::AfterHooks);
		let event = AfterInstantiate {
			object: &object,
			parameters: &parameters,
			factory,
		};
		foundry.events().dispatch_after_instantiate(&event, foundry)?;
		for hook in factory.after_instantiate_hooks() {
			hook(&object, &parameters, &context)?;
		}

		if factory.is_persistable() && self.mode.is_persisting() {
			self.enter(Stage::Scheduling);
			let manager = foundry.persistence()?;
			if !manager.supports(factory.class()) {
				return Err(FoundryError::PersistenceNotAvailable(format!(
					"class \"{}\" is not managed by the persistence engine",
					factory.class()
				)));
			}
			self.journal.schedule(
				manager.as_ref(),
				&object,
				factory.after_persist_callbacks(foundry, &object, &parameters),
			);

			if self.mode == PersistMode::Persist {
				self.enter(Stage::Flushing);
				manager.save(&object)?;
			}
		}

		self.enter(Stage::Done);
		tracing::debug!(class = %factory.class(), mode = ?self.mode, "object created");
		Ok(object)
	}
}
