//! Factories: immutable templates that produce objects.
//!
//! A [`Factory`] describes how to build one object of a class: default
//! attributes, extra attribute layers (`with`), pinned objects (`reuse`),
//! hooks, an optional instantiator, validation and, for persistable
//! factories, how the result reaches the persistence engine.
//!
//! Every configuration method takes `&self` and returns a new factory; the
//! receiver is never modified, so a factory can be shared and specialized
//! freely.
//!
//! # Examples
//!
//! ```ignore
//! let contact = ContactFactory::new()
//!     .with(attributes! { "name" => "Jane" })
//!     .reuse(category)?
//!     .create(&foundry)?;
//! ```

mod collection;
mod inverse;
mod model;
mod normalizer;
mod pipeline;
mod reuse;

use std::fmt;
use std::sync::Arc;

use crate::attributes::{
	AttributeContext, AttributeSource, Attribute, Attributes, Parameters,
};
use crate::error::{FoundryError, FoundryResult};
use crate::events::AfterPersist;
use crate::foundry::Foundry;
use crate::instantiator::Instantiator;
use crate::object::ObjectRef;
use crate::persistence::{AfterPersistCallback, PersistMode, Proxy};
use crate::validation::ValidationGroups;
use crate::value::Value;

pub use collection::FactoryCollection;
pub use model::{ModelFactory, factory, object, persist, persistent_factory, proxy_factory};
pub use pipeline::Stage;
pub use reuse::ReusedObjects;

pub(crate) use normalizer::normalize_detached;

/// What a hook can see besides the object and parameters.
pub struct HookContext<'a> {
	pub foundry: &'a Foundry,
	pub factory: &'a Factory,
}

impl HookContext<'_> {
	pub fn class(&self) -> &str {
		self.factory.class()
	}
}

/// Hook run on normalized parameters; returns the parameters to instantiate with.
pub type BeforeInstantiateHook =
	Arc<dyn Fn(Parameters, &HookContext<'_>) -> FoundryResult<Parameters> + Send + Sync>;

/// Hook run on the freshly built object.
pub type AfterInstantiateHook =
	Arc<dyn Fn(&ObjectRef, &Parameters, &HookContext<'_>) -> FoundryResult<()> + Send + Sync>;

/// Hook run once the object has been flushed.
pub type AfterPersistHook =
	Arc<dyn Fn(&ObjectRef, &Parameters, &Foundry) -> FoundryResult<()> + Send + Sync>;

/// Persistence options of a persistable factory.
#[derive(Clone, Default)]
pub struct PersistentOptions {
	mode: PersistMode,
	after_persist: Vec<AfterPersistHook>,
	proxy: bool,
}

impl PersistentOptions {
	pub fn mode(&self) -> PersistMode {
		self.mode
	}

	pub fn is_proxy(&self) -> bool {
		self.proxy
	}
}

/// The two families of factories.
#[derive(Clone)]
pub enum FactoryKind {
	/// Builds plain objects; never touches the persistence engine.
	Object,
	/// Builds objects the persistence engine can store.
	Persistent(PersistentOptions),
}

/// Template producing objects of one class.
#[derive(Clone)]
pub struct Factory {
	class: String,
	kind: FactoryKind,
	defaults: AttributeSource,
	states: Vec<AttributeSource>,
	before_instantiate: Vec<BeforeInstantiateHook>,
	after_instantiate: Vec<AfterInstantiateHook>,
	instantiator: Option<Instantiator>,
	reused: ReusedObjects,
	validation: Option<bool>,
	validation_groups: ValidationGroups,
	index: usize,
}

impl Factory {
	fn build(class: impl Into<String>, kind: FactoryKind) -> Self {
		Self {
			class: class.into(),
			kind,
			defaults: AttributeSource::default(),
			states: Vec::new(),
			before_instantiate: Vec::new(),
			after_instantiate: Vec::new(),
			instantiator: None,
			reused: ReusedObjects::default(),
			validation: None,
			validation_groups: ValidationGroups::Default,
			index: 1,
		}
	}

	/// Factory for plain objects.
	pub fn object(class: impl Into<String>) -> Self {
		Self::build(class, FactoryKind::Object)
	}

	/// Factory for persistable objects.
	pub fn persistent(class: impl Into<String>) -> Self {
		Self::build(class, FactoryKind::Persistent(PersistentOptions::default()))
	}

	/// Persistable factory allowed in data-provider contexts.
	pub fn proxy(class: impl Into<String>) -> Self {
		Self::build(
			class,
			FactoryKind::Persistent(PersistentOptions {
				proxy: true,
				..PersistentOptions::default()
			}),
		)
	}

	pub fn class(&self) -> &str {
		&self.class
	}

	pub fn kind(&self) -> &FactoryKind {
		&self.kind
	}

	pub fn is_persistable(&self) -> bool {
		matches!(self.kind, FactoryKind::Persistent(_))
	}

	pub fn is_proxy(&self) -> bool {
		matches!(&self.kind, FactoryKind::Persistent(options) if options.proxy)
	}

	/// 1-based position of this factory within a collection.
	pub fn index(&self) -> usize {
		self.index
	}

	pub fn reused(&self) -> &ReusedObjects {
		&self.reused
	}

	/// Replaces the default attributes.
	pub fn with_defaults(&self, defaults: impl Into<AttributeSource>) -> Self {
		let mut clone = self.clone();
		clone.defaults = defaults.into();
		clone
	}

	/// Adds an attribute layer on top of the previous ones.
	pub fn with(&self, attributes: impl Into<AttributeSource>) -> Self {
		let mut clone = self.clone();
		clone.states.push(attributes.into());
		clone
	}

	/// Adds an attribute layer computed per object.
	pub fn with_fn<F>(&self, callback: F) -> Self
	where
		F: Fn(&AttributeContext<'_>) -> Attributes + Send + Sync + 'static,
	{
		self.with(AttributeSource::callback(callback))
	}

	/// Pins an object: every property declared with its class, here and in
	/// nested factories, receives it instead of a new object.
	///
	/// # Errors
	///
	/// [`FoundryError::CannotReuseFactory`] for factories and collections,
	/// [`FoundryError::AlreadyReused`] when an object of the same class is
	/// already pinned.
	pub fn reuse(&self, object: impl Into<Attribute>) -> FoundryResult<Self> {
		let mut clone = self.clone();
		clone.reused.pin(object.into())?;
		Ok(clone)
	}

	pub fn instantiate_with(&self, instantiator: Instantiator) -> Self {
		let mut clone = self.clone();
		clone.instantiator = Some(instantiator);
		clone
	}

	pub fn before_instantiate<F>(&self, hook: F) -> Self
	where
		F: Fn(Parameters, &HookContext<'_>) -> FoundryResult<Parameters> + Send + Sync + 'static,
	{
		let mut clone = self.clone();
		clone.before_instantiate.push(Arc::new(hook));
		clone
	}

	pub fn after_instantiate<F>(&self, hook: F) -> Self
	where
		F: Fn(&ObjectRef, &Parameters, &HookContext<'_>) -> FoundryResult<()> + Send + Sync + 'static,
	{
		let mut clone = self.clone();
		clone.after_instantiate.push(Arc::new(hook));
		clone
	}

	/// Registers a hook run after the object is flushed.
	///
	/// Object factories never persist, so they ignore it.
	pub fn after_persist<F>(&self, hook: F) -> Self
	where
		F: Fn(&ObjectRef, &Parameters, &Foundry) -> FoundryResult<()> + Send + Sync + 'static,
	{
		let mut clone = self.clone();
		match &mut clone.kind {
			FactoryKind::Persistent(options) => options.after_persist.push(Arc::new(hook)),
			FactoryKind::Object => {
				tracing::debug!(class = %self.class, "after-persist hook ignored by object factory");
			}
		}
		clone
	}

	/// Validates created objects against the default group.
	///
	/// Creating fails with [`FoundryError::ValidationNotAvailable`] when the
	/// context has no validator.
	pub fn with_validation(&self) -> Self {
		let mut clone = self.clone();
		clone.validation = Some(true);
		clone.validation_groups = ValidationGroups::Default;
		clone
	}

	/// Validates created objects against `groups`.
	pub fn with_validation_groups<I, S>(&self, groups: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut clone = self.clone();
		clone.validation = Some(true);
		clone.validation_groups = ValidationGroups::of(groups);
		clone
	}

	/// Never validates, even when validation is enabled globally.
	pub fn without_validation(&self) -> Self {
		let mut clone = self.clone();
		clone.validation = Some(false);
		clone
	}

	pub fn validation_enabled(&self, foundry: &Foundry) -> bool {
		self.validation.unwrap_or_else(|| foundry.is_validation_enabled())
	}

	pub fn validation_groups(&self) -> &ValidationGroups {
		&self.validation_groups
	}

	/// Sets the persistence mode; object factories ignore it.
	pub fn with_persist_mode(&self, mode: PersistMode) -> Self {
		let mut clone = self.clone();
		if let FactoryKind::Persistent(options) = &mut clone.kind {
			options.mode = mode;
		}
		clone
	}

	pub fn and_persist(&self) -> Self {
		self.with_persist_mode(PersistMode::Persist)
	}

	pub fn without_persisting(&self) -> Self {
		self.with_persist_mode(PersistMode::WithoutPersisting)
	}

	/// Mode `create` will actually use in `foundry`.
	pub fn persist_mode(&self, foundry: &Foundry) -> PersistMode {
		match &self.kind {
			FactoryKind::Persistent(options) if foundry.is_persistence_enabled() => options.mode,
			_ => PersistMode::WithoutPersisting,
		}
	}

	pub fn is_persisting(&self, foundry: &Foundry) -> bool {
		self.persist_mode(foundry).is_persisting()
	}

	/// Creates one object.
	pub fn create(&self, foundry: &Foundry) -> FoundryResult<ObjectRef> {
		self.create_with(foundry, Attributes::new())
	}

	/// Creates one object with `overrides` on top of every other layer.
	pub fn create_with(
		&self,
		foundry: &Foundry,
		overrides: impl Into<AttributeSource>,
	) -> FoundryResult<ObjectRef> {
		self.ensure_creatable(foundry)?;
		let journal = pipeline::Journal::default();
		let created = pipeline::Pipeline::new(foundry, self, &journal).run(&overrides.into());
		if created.is_err() {
			journal.rollback(foundry);
		}
		created
	}

	/// Creates one object wrapped in a [`Proxy`].
	pub fn create_proxy(&self, foundry: &Foundry) -> FoundryResult<Proxy> {
		self.create(foundry).map(Proxy::new)
	}

	/// Creation triggered while normalizing another factory.
	pub(crate) fn create_nested(
		&self,
		foundry: &Foundry,
		overrides: &AttributeSource,
		journal: &pipeline::Journal,
	) -> FoundryResult<ObjectRef> {
		pipeline::Pipeline::new(foundry, self, journal).run(overrides)
	}

	/// `count` objects.
	pub fn many(&self, count: usize) -> FactoryCollection {
		FactoryCollection::count(self.clone(), count)
	}

	/// Between `min` and `max` objects, drawn with the seeded faker.
	///
	/// # Errors
	///
	/// [`FoundryError::InvalidArgument`] when `min > max`.
	pub fn range(&self, min: usize, max: usize) -> FoundryResult<FactoryCollection> {
		FactoryCollection::range(self.clone(), min, max)
	}

	/// One object per attribute layer.
	pub fn sequence<I, S>(&self, sequence: I) -> FactoryCollection
	where
		I: IntoIterator<Item = S>,
		S: Into<AttributeSource>,
	{
		FactoryCollection::sequence(self.clone(), sequence)
	}

	/// One object per value, each with `field` set to that value.
	pub fn distribute<I, V>(&self, field: &str, values: I) -> FactoryCollection
	where
		I: IntoIterator<Item = V>,
		V: Into<Value>,
	{
		self.sequence(values.into_iter().map(|value| {
			let mut attributes = Attributes::new();
			attributes.insert(field, value.into());
			attributes
		}))
	}

	pub fn create_many(&self, foundry: &Foundry, count: usize) -> FoundryResult<Vec<ObjectRef>> {
		self.many(count).create(foundry)
	}

	pub(crate) fn at_index(&self, index: usize) -> Self {
		let mut clone = self.clone();
		clone.index = index;
		clone
	}

	/// Children of a persisting parent are only scheduled: the outermost
	/// `create` flushes once, after every deferred callback ran.
	pub(crate) fn propagate_from(mut self, parent: &Factory, mode: PersistMode) -> Self {
		self.reused = parent.reused.propagate_into(&self.reused);
		if parent.is_persistable() {
			self = self.with_persist_mode(mode.scheduled());
		}
		self
	}

	/// Evaluates every attribute layer in priority order.
	pub(crate) fn collect_attributes(
		&self,
		foundry: &Foundry,
		overrides: &AttributeSource,
	) -> Attributes {
		let context = AttributeContext {
			index: self.index,
			foundry,
		};
		let mut attributes = self.defaults.resolve(&context);
		attributes.merge(self.reused.attributes_for(&self.class, foundry.classes()));
		for state in &self.states {
			attributes.merge(state.resolve(&context));
		}
		attributes.merge(overrides.resolve(&context));
		attributes
	}

	fn ensure_creatable(&self, foundry: &Foundry) -> FoundryResult<()> {
		if foundry.in_data_provider()
			&& self.is_persistable()
			&& !self.is_proxy()
			&& foundry.is_persistence_available()
		{
			return Err(FoundryError::CreatedInDataProvider(self.class.clone()));
		}
		Ok(())
	}

	pub(crate) fn before_instantiate_hooks(&self) -> &[BeforeInstantiateHook] {
		&self.before_instantiate
	}

	pub(crate) fn after_instantiate_hooks(&self) -> &[AfterInstantiateHook] {
		&self.after_instantiate
	}

	pub(crate) fn configured_instantiator(&self) -> Option<&Instantiator> {
		self.instantiator.as_ref()
	}

	pub(crate) fn forces_validation(&self) -> bool {
		self.validation == Some(true)
	}

	/// Packs the after-persist listeners and hooks into callbacks for the engine.
	pub(crate) fn after_persist_callbacks(
		&self,
		foundry: &Foundry,
		object: &ObjectRef,
		parameters: &Parameters,
	) -> Vec<AfterPersistCallback> {
		let FactoryKind::Persistent(options) = &self.kind else {
			return Vec::new();
		};
		let mut callbacks: Vec<AfterPersistCallback> = Vec::new();
		if foundry.events().has_after_persist_listeners() {
			let (foundry, object, parameters) = (foundry.clone(), object.clone(), parameters.clone());
			let class = self.class.clone();
			callbacks.push(Box::new(move || {
				let event = AfterPersist {
					object: &object,
					parameters: &parameters,
					class: &class,
				};
				foundry.events().dispatch_after_persist(&event, &foundry)
			}));
		}
		for hook in &options.after_persist {
			let hook = Arc::clone(hook);
			let (foundry, object, parameters) = (foundry.clone(), object.clone(), parameters.clone());
			callbacks.push(Box::new(move || hook(&object, &parameters, &foundry)));
		}
		callbacks
	}
}

impl fmt::Debug for Factory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let kind = match &self.kind {
			FactoryKind::Object => "object".to_string(),
			FactoryKind::Persistent(options) if options.proxy => format!("proxy({:?})", options.mode),
			FactoryKind::Persistent(options) => format!("persistent({:?})", options.mode),
		};
		f.debug_struct("Factory")
			.field("class", &self.class)
			.field("kind", &kind)
			.field("states", &self.states.len())
			.field("reused", &self.reused)
			.field("index", &self.index)
			.finish()
	}
}
