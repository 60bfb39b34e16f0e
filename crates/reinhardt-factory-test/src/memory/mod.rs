//! In-memory persistence engine.
//!
//! [`InMemoryPersistence`] behaves like a small ORM: objects are scheduled,
//! receive an identifier at flush, are written to per-class tables with
//! references stored as `(class, id)`, and are found again through an
//! identity map. Associations follow the registered [`MappingRegistry`],
//! including cascade-persist flags.

mod mapping;
mod store;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use reinhardt_factory::attributes::Parameters;
use reinhardt_factory::persistence::{
	AfterPersistCallback, AssociationMapping, ClassMetadata, PersistenceManager,
};
use reinhardt_factory::{FoundryError, FoundryResult, ObjectRef, Value};

pub use mapping::MappingRegistry;

use store::{EntryState, Reference, UnitOfWork};

/// A [`PersistenceManager`] keeping everything in process memory.
pub struct InMemoryPersistence {
	mappings: RwLock<MappingRegistry>,
	enabled: AtomicBool,
	state: Mutex<UnitOfWork>,
}

impl InMemoryPersistence {
	pub fn new(mappings: MappingRegistry) -> Self {
		Self {
			mappings: RwLock::new(mappings),
			enabled: AtomicBool::new(true),
			state: Mutex::new(UnitOfWork::default()),
		}
	}

	pub fn shared(mappings: MappingRegistry) -> Arc<Self> {
		Arc::new(Self::new(mappings))
	}

	/// Enables or disables persistence globally.
	pub fn set_enabled(&self, enabled: bool) {
		self.enabled.store(enabled, Ordering::SeqCst);
		tracing::debug!(enabled, "in-memory persistence toggled");
	}

	/// Flips the cascade-persist flag of one association.
	///
	/// # Errors
	///
	/// [`FoundryError::MappingNotFound`] when the association is not mapped.
	pub fn set_cascade(&self, class: &str, field: &str, cascade: bool) -> FoundryResult<()> {
		self.mappings.write().set_cascade(class, field, cascade)
	}

	/// Mapped classes, in registration order.
	pub fn classes(&self) -> Vec<String> {
		self.mappings.read().classes().map(str::to_string).collect()
	}

	/// Detaches every object; stored rows stay.
	pub fn clear(&self) {
		self.state.lock().clear();
	}

	/// Drops every row, every managed object and every sequence.
	pub fn reset(&self) {
		*self.state.lock() = UnitOfWork::default();
	}

	/// Stored rows of `class`.
	pub fn row_count(&self, class: &str) -> usize {
		self.state.lock().row_count(class)
	}

	/// Whether `object` is scheduled for insertion but not flushed yet.
	pub fn is_scheduled(&self, object: &ObjectRef) -> bool {
		self.state.lock().state_of(object) == Some(EntryState::ScheduledForInsert)
	}

	/// Whether the engine tracks `object` at all.
	pub fn is_managed(&self, object: &ObjectRef) -> bool {
		self.state.lock().state_of(object).is_some()
	}
}

impl PersistenceManager for InMemoryPersistence {
	fn is_enabled(&self) -> bool {
		self.enabled.load(Ordering::SeqCst)
	}

	fn supports(&self, class: &str) -> bool {
		self.mappings.read().contains(class)
	}

	fn class_metadata(&self, class: &str) -> FoundryResult<ClassMetadata> {
		self.mappings
			.read()
			.get(class)
			.cloned()
			.ok_or_else(|| FoundryError::MappingNotFound(class.to_string()))
	}

	fn association_mapping(&self, class: &str, field: &str) -> Option<AssociationMapping> {
		self.mappings.read().association(class, field).cloned()
	}

	fn schedule_for_insert(&self, object: &ObjectRef, after_persist: Vec<AfterPersistCallback>) {
		tracing::trace!(object = ?object, callbacks = after_persist.len(), "scheduled for insert");
		self.state.lock().schedule(object, after_persist);
	}

	fn forget(&self, object: &ObjectRef) {
		self.state.lock().forget(object);
	}

	fn refresh(&self, object: &ObjectRef) -> FoundryResult<ObjectRef> {
		let mappings = self.mappings.read();
		self.state.lock().refresh(object, &mappings)
	}

	fn is_persisted(&self, object: &ObjectRef) -> bool {
		let mappings = self.mappings.read();
		self.state.lock().is_persisted(object, &mappings)
	}

	fn has_persistence_for(&self, object: &ObjectRef) -> bool {
		self.supports(object.class())
	}

	fn flush(&self) -> FoundryResult<()> {
		let callbacks = {
			let mappings = self.mappings.read();
			self.state.lock().flush(&mappings)?
		};
		tracing::debug!(callbacks = callbacks.len(), "in-memory flush");
		for callback in callbacks {
			callback()?;
		}
		Ok(())
	}

	fn find(&self, class: &str, id: &Value) -> FoundryResult<Option<ObjectRef>> {
		let Some(id) = id.as_i64() else {
			return Err(FoundryError::InvalidArgument(format!(
				"identifiers are integers, got a {}",
				id.kind()
			)));
		};
		let mappings = self.mappings.read();
		let reference = Reference {
			class: class.to_string(),
			id,
		};
		Ok(self.state.lock().load(&reference, &mappings))
	}

	fn find_by(&self, class: &str, criteria: &Parameters) -> FoundryResult<Vec<ObjectRef>> {
		let mappings = self.mappings.read();
		if !mappings.contains(class) {
			return Err(FoundryError::MappingNotFound(class.to_string()));
		}
		Ok(self.state.lock().find_by(class, criteria, &mappings))
	}

	fn truncate(&self, class: &str) -> FoundryResult<()> {
		self.state.lock().truncate(class);
		tracing::debug!(class, "table truncated");
		Ok(())
	}
}

impl fmt::Debug for InMemoryPersistence {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InMemoryPersistence")
			.field("classes", &self.classes())
			.field("enabled", &self.is_enabled())
			.finish()
	}
}
