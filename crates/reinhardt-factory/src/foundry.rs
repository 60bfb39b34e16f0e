//! The context every factory operation runs in.
//!
//! A [`Foundry`] bundles the seeded faker, the registered class
//! descriptors, the default instantiator, the optional persistence engine
//! and validator, lifecycle listeners and loaded stories. It is cheap to
//! clone and is passed explicitly to `create` and friends; its lifecycle
//! (boot, shutdown) belongs to the test harness.

use std::fmt;
use std::sync::Arc;

use crate::class::{ClassDescriptor, ClassRegistry};
use crate::config::FoundrySettings;
use crate::error::{FoundryError, FoundryResult};
use crate::events::EventDispatcher;
use crate::faker::{Faker, faker_seed};
use crate::instantiator::Instantiator;
use crate::persistence::{PersistenceManager, RepositoryDecorator};
use crate::story::{LoadedStory, Story, StoryRegistry};
use crate::validation::{self, Validator};

struct FoundryInner {
	faker: Faker,
	instantiator: Instantiator,
	classes: ClassRegistry,
	persistence: Option<Arc<dyn PersistenceManager>>,
	validator: Option<Arc<dyn Validator>>,
	validation_enabled: bool,
	events: EventDispatcher,
	in_data_provider: bool,
	stories: StoryRegistry,
}

/// Shared factory context.
#[derive(Clone)]
pub struct Foundry {
	inner: Arc<FoundryInner>,
}

impl Foundry {
	pub fn builder() -> FoundryBuilder {
		FoundryBuilder::default()
	}

	pub fn faker(&self) -> &Faker {
		&self.inner.faker
	}

	pub fn faker_seed(&self) -> u64 {
		self.inner.faker.seed()
	}

	pub fn classes(&self) -> &ClassRegistry {
		&self.inner.classes
	}

	/// Instantiator used by factories that do not configure their own.
	pub fn instantiator(&self) -> &Instantiator {
		&self.inner.instantiator
	}

	pub fn events(&self) -> &EventDispatcher {
		&self.inner.events
	}

	/// The persistence engine.
	///
	/// # Errors
	///
	/// [`FoundryError::PersistenceNotAvailable`] when none is configured.
	pub fn persistence(&self) -> FoundryResult<&Arc<dyn PersistenceManager>> {
		self.inner.persistence.as_ref().ok_or_else(|| {
			FoundryError::PersistenceNotAvailable(
				"no persistence engine is configured for this context".to_string(),
			)
		})
	}

	pub fn is_persistence_available(&self) -> bool {
		self.inner.persistence.is_some()
	}

	pub fn is_persistence_enabled(&self) -> bool {
		self.inner
			.persistence
			.as_ref()
			.is_some_and(|manager| manager.is_enabled())
	}

	/// # Errors
	///
	/// [`FoundryError::PersistenceNotAvailable`] or [`FoundryError::PersistenceDisabled`].
	pub fn assert_persistence_enabled(&self) -> FoundryResult<()> {
		if self.persistence()?.is_enabled() {
			Ok(())
		} else {
			Err(FoundryError::PersistenceDisabled(
				"persistence was disabled for this context".to_string(),
			))
		}
	}

	pub fn validator(&self) -> Option<&Arc<dyn Validator>> {
		self.inner.validator.as_ref()
	}

	pub fn is_validation_available(&self) -> bool {
		self.inner.validator.is_some()
	}

	/// Whether objects are validated when their factory does not say otherwise.
	pub fn is_validation_enabled(&self) -> bool {
		self.inner.validation_enabled
	}

	/// Whether this context builds data for a test's data provider.
	pub fn in_data_provider(&self) -> bool {
		self.inner.in_data_provider
	}

	/// Repository over the stored objects of `class`.
	///
	/// # Errors
	///
	/// Fails like [`assert_persistence_enabled`](Self::assert_persistence_enabled).
	pub fn repository(&self, class: impl Into<String>) -> FoundryResult<RepositoryDecorator> {
		self.assert_persistence_enabled()?;
		Ok(RepositoryDecorator::new(self.clone(), class))
	}

	/// Loads story `S`, building it on first use.
	pub fn load_story<S: Story + Default>(&self) -> FoundryResult<Arc<LoadedStory>> {
		self.inner.stories.load::<S>(self)
	}

	pub fn stories(&self) -> &StoryRegistry {
		&self.inner.stories
	}

	/// Forgets every loaded story.
	pub fn reset_stories(&self) {
		self.inner.stories.reset();
	}
}

impl fmt::Debug for Foundry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Foundry")
			.field("faker_seed", &self.inner.faker.seed())
			.field("classes", &self.inner.classes.len())
			.field("persistence", &self.inner.persistence.is_some())
			.field("validator", &self.inner.validator.is_some())
			.field("validation_enabled", &self.inner.validation_enabled)
			.field("in_data_provider", &self.inner.in_data_provider)
			.finish()
	}
}

/// Builder for [`Foundry`].
#[derive(Default)]
pub struct FoundryBuilder {
	settings: FoundrySettings,
	seed: Option<u64>,
	instantiator: Option<Instantiator>,
	classes: ClassRegistry,
	persistence: Option<Arc<dyn PersistenceManager>>,
	validator: Option<Arc<dyn Validator>>,
	events: EventDispatcher,
	in_data_provider: bool,
}

impl FoundryBuilder {
	/// Applies settings; later builder calls override them.
	pub fn settings(mut self, settings: FoundrySettings) -> Self {
		self.settings = settings;
		self
	}

	/// Seeds this context directly, bypassing the process-wide seed.
	pub fn faker_seed(mut self, seed: u64) -> Self {
		self.seed = Some(seed);
		self
	}

	pub fn instantiator(mut self, instantiator: Instantiator) -> Self {
		self.instantiator = Some(instantiator);
		self
	}

	pub fn class(mut self, descriptor: ClassDescriptor) -> Self {
		self.classes.register(descriptor);
		self
	}

	pub fn classes(mut self, descriptors: impl IntoIterator<Item = ClassDescriptor>) -> Self {
		for descriptor in descriptors {
			self.classes.register(descriptor);
		}
		self
	}

	pub fn persistence(mut self, manager: Arc<dyn PersistenceManager>) -> Self {
		self.persistence = Some(manager);
		self
	}

	pub fn validator(mut self, validator: Arc<dyn Validator>) -> Self {
		self.validator = Some(validator);
		self
	}

	/// Validates every created object unless its factory opts out.
	pub fn enable_validation(mut self) -> Self {
		self.settings.validation_enabled = true;
		self
	}

	/// Registers lifecycle listeners.
	pub fn events(mut self, configure: impl FnOnce(&mut EventDispatcher)) -> Self {
		configure(&mut self.events);
		self
	}

	/// Marks the context as building data-provider data.
	pub fn in_data_provider(mut self) -> Self {
		self.in_data_provider = true;
		self
	}

	/// # Errors
	///
	/// [`FoundryError::Configuration`] when validation is enabled without a validator.
	pub fn build(self) -> FoundryResult<Foundry> {
		if self.settings.validation_enabled && self.validator.is_none() {
			return Err(FoundryError::Configuration(
				"validation cannot be enabled without a validator".to_string(),
			));
		}

		let seed = match self.seed {
			Some(seed) => seed,
			None => faker_seed(self.settings.faker_seed),
		};
		let instantiator = self
			.instantiator
			.unwrap_or_else(|| self.settings.instantiator.build());

		let mut events = self.events;
		events.on_after_instantiate(validation::validate_after_instantiate);

		tracing::debug!(
			seed,
			classes = self.classes.len(),
			persistence = self.persistence.is_some(),
			validator = self.validator.is_some(),
			"foundry context built"
		);

		Ok(Foundry {
			inner: Arc::new(FoundryInner {
				faker: Faker::seeded(seed),
				instantiator,
				classes: self.classes,
				persistence: self.persistence,
				validator: self.validator,
				validation_enabled: self.settings.validation_enabled,
				events,
				in_data_provider: self.in_data_provider,
				stories: StoryRegistry::new(),
			}),
		})
	}
}
