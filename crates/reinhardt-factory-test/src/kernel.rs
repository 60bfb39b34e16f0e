//! Boot and shutdown of a factory context for one test.
//!
//! ```ignore
//! let kernel = TestKernel::builder()
//!     .class(ClassDescriptor::new("Category").scalar("name"))
//!     .mappings(MappingRegistry::new().with(ClassMetadata::new("Category")))
//!     .boot()?;
//!
//! let category = persist(kernel.foundry(), "Category", attributes! { "name" => "php" })?;
//! kernel.shutdown();
//! ```

use std::sync::Arc;

use reinhardt_factory::events::EventDispatcher;
use reinhardt_factory::{
	ClassDescriptor, Foundry, FoundryResult, FoundrySettings, Instantiator, PersistenceManager,
	Validator,
};

use crate::memory::{InMemoryPersistence, MappingRegistry};

/// Owns the [`Foundry`] context and the in-memory engine of a test.
#[derive(Debug)]
pub struct TestKernel {
	foundry: Foundry,
	persistence: Option<Arc<InMemoryPersistence>>,
}

impl TestKernel {
	pub fn builder() -> KernelBuilder {
		KernelBuilder::default()
	}

	pub fn foundry(&self) -> &Foundry {
		&self.foundry
	}

	/// The in-memory engine, when the kernel was booted with mappings.
	pub fn persistence(&self) -> Option<&Arc<InMemoryPersistence>> {
		self.persistence.as_ref()
	}

	pub fn faker_seed(&self) -> u64 {
		self.foundry.faker_seed()
	}

	/// Truncates every mapped class and detaches every object.
	pub fn reset_database(&self) -> FoundryResult<()> {
		let Some(persistence) = &self.persistence else {
			return Ok(());
		};
		for class in persistence.classes() {
			persistence.truncate(&class)?;
		}
		persistence.clear();
		tracing::debug!("in-memory database reset");
		Ok(())
	}

	pub fn shutdown(self) {
		self.foundry.reset_stories();
		tracing::info!(seed = self.faker_seed(), "test kernel shut down");
	}
}

/// Configures a [`TestKernel`].
#[derive(Default)]
pub struct KernelBuilder {
	settings: Option<FoundrySettings>,
	seed: Option<u64>,
	classes: Vec<ClassDescriptor>,
	mappings: Option<MappingRegistry>,
	validator: Option<Arc<dyn Validator>>,
	instantiator: Option<Instantiator>,
	listeners: Vec<Box<dyn FnOnce(&mut EventDispatcher)>>,
}

impl KernelBuilder {
	pub fn settings(mut self, settings: FoundrySettings) -> Self {
		self.settings = Some(settings);
		self
	}

	/// Seeds the context directly instead of using the process-wide seed.
	pub fn faker_seed(mut self, seed: u64) -> Self {
		self.seed = Some(seed);
		self
	}

	pub fn class(mut self, descriptor: ClassDescriptor) -> Self {
		self.classes.push(descriptor);
		self
	}

	pub fn classes(mut self, descriptors: impl IntoIterator<Item = ClassDescriptor>) -> Self {
		self.classes.extend(descriptors);
		self
	}

	/// Enables in-memory persistence for the mapped classes.
	pub fn mappings(mut self, mappings: MappingRegistry) -> Self {
		self.mappings = Some(mappings);
		self
	}

	pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
		self.validator = Some(Arc::new(validator));
		self
	}

	pub fn instantiator(mut self, instantiator: Instantiator) -> Self {
		self.instantiator = Some(instantiator);
		self
	}

	pub fn events(mut self, configure: impl FnOnce(&mut EventDispatcher) + 'static) -> Self {
		self.listeners.push(Box::new(configure));
		self
	}

	/// # Errors
	///
	/// Fails like [`FoundryBuilder::build`](reinhardt_factory::FoundryBuilder::build).
	pub fn boot(self) -> FoundryResult<TestKernel> {
		self.boot_with(false)
	}

	/// Boots a context that refuses to persist outside proxy factories.
	pub fn boot_for_data_provider(self) -> FoundryResult<TestKernel> {
		self.boot_with(true)
	}

	fn boot_with(self, data_provider: bool) -> FoundryResult<TestKernel> {
		let persistence = self.mappings.map(InMemoryPersistence::shared);

		let mut builder = Foundry::builder()
			.settings(self.settings.unwrap_or_default())
			.classes(self.classes);
		if let Some(seed) = self.seed {
			builder = builder.faker_seed(seed);
		}
		if let Some(persistence) = &persistence {
			builder = builder.persistence(persistence.clone() as Arc<dyn PersistenceManager>);
		}
		if let Some(validator) = self.validator {
			builder = builder.validator(validator);
		}
		if let Some(instantiator) = self.instantiator {
			builder = builder.instantiator(instantiator);
		}
		for configure in self.listeners {
			builder = builder.events(configure);
		}
		if data_provider {
			builder = builder.in_data_provider();
		}

		let foundry = builder.build()?;
		tracing::info!(
			seed = foundry.faker_seed(),
			persistence = persistence.is_some(),
			data_provider,
			"test kernel booted"
		);
		Ok(TestKernel {
			foundry,
			persistence,
		})
	}
}
