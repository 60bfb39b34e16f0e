//! The contract between factories and a persistence engine.
//!
//! The engine itself (unit of work, storage, identity map) lives outside
//! this crate. Factories only talk to it through [`PersistenceManager`],
//! and read its mapping metadata through [`ClassMetadata`] and
//! [`AssociationMapping`].

mod proxy;
pub mod relationship;
pub mod repository;

use indexmap::IndexMap;

use crate::attributes::Parameters;
use crate::error::FoundryResult;
use crate::object::ObjectRef;
use crate::value::Value;

pub use proxy::Proxy;
pub use relationship::{RelationshipMetadata, RelationshipResolver};
pub use repository::{RepositoryAssertions, RepositoryDecorator};

/// Callback run by the engine once the object it was scheduled with has been flushed.
pub type AfterPersistCallback = Box<dyn FnOnce() -> FoundryResult<()> + Send>;

/// Whether, and how, `create` hands objects to the persistence engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PersistMode {
	/// Schedule the object and flush immediately.
	#[default]
	Persist,
	/// Never touch the persistence engine.
	WithoutPersisting,
	/// Schedule the object; whoever flushes next stores it.
	NoPersistButScheduleForInsert,
}

impl PersistMode {
	/// Whether objects created in this mode are scheduled for insertion.
	pub fn is_persisting(self) -> bool {
		!matches!(self, Self::WithoutPersisting)
	}

	/// Same mode, minus the flush.
	pub fn scheduled(self) -> Self {
		match self {
			Self::Persist => Self::NoPersistButScheduleForInsert,
			other => other,
		}
	}
}

/// Kind of an association between two classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociationKind {
	OneToOne,
	ManyToOne,
	OneToMany,
	ManyToMany,
}

impl AssociationKind {
	pub fn is_collection_valued(self) -> bool {
		matches!(self, Self::OneToMany | Self::ManyToMany)
	}
}

/// One side of an association, as declared on `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationMapping {
	pub source: String,
	pub field: String,
	pub target: String,
	pub kind: AssociationKind,
	/// Set on the inverse side: the owning field on `target`.
	pub mapped_by: Option<String>,
	/// Set on the owning side of a bidirectional association: the inverse field on `target`.
	pub inversed_by: Option<String>,
	pub cascade_persist: bool,
	/// Sub-field of the target used to key this collection.
	pub index_by: Option<String>,
}

impl AssociationMapping {
	fn build(
		kind: AssociationKind,
		source: impl Into<String>,
		field: impl Into<String>,
		target: impl Into<String>,
	) -> Self {
		Self {
			source: source.into(),
			field: field.into(),
			target: target.into(),
			kind,
			mapped_by: None,
			inversed_by: None,
			cascade_persist: false,
			index_by: None,
		}
	}

	pub fn one_to_one(
		source: impl Into<String>,
		field: impl Into<String>,
		target: impl Into<String>,
	) -> Self {
		Self::build(AssociationKind::OneToOne, source, field, target)
	}

	pub fn many_to_one(
		source: impl Into<String>,
		field: impl Into<String>,
		target: impl Into<String>,
	) -> Self {
		Self::build(AssociationKind::ManyToOne, source, field, target)
	}

	pub fn one_to_many(
		source: impl Into<String>,
		field: impl Into<String>,
		target: impl Into<String>,
	) -> Self {
		Self::build(AssociationKind::OneToMany, source, field, target)
	}

	pub fn many_to_many(
		source: impl Into<String>,
		field: impl Into<String>,
		target: impl Into<String>,
	) -> Self {
		Self::build(AssociationKind::ManyToMany, source, field, target)
	}

	pub fn mapped_by(mut self, field: impl Into<String>) -> Self {
		self.mapped_by = Some(field.into());
		self
	}

	pub fn inversed_by(mut self, field: impl Into<String>) -> Self {
		self.inversed_by = Some(field.into());
		self
	}

	pub fn cascade_persist(mut self, cascade: bool) -> Self {
		self.cascade_persist = cascade;
		self
	}

	pub fn index_by(mut self, field: impl Into<String>) -> Self {
		self.index_by = Some(field.into());
		self
	}

	/// The owning side holds the storage-level link.
	pub fn is_owning_side(&self) -> bool {
		self.mapped_by.is_none()
	}

	pub fn is_collection_valued(&self) -> bool {
		self.kind.is_collection_valued()
	}
}

/// Mapping metadata of one persisted class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMetadata {
	pub class: String,
	pub identifier: String,
	pub associations: IndexMap<String, AssociationMapping>,
}

impl ClassMetadata {
	pub fn new(class: impl Into<String>) -> Self {
		Self {
			class: class.into(),
			identifier: "id".to_string(),
			associations: IndexMap::new(),
		}
	}

	pub fn identifier(mut self, field: impl Into<String>) -> Self {
		self.identifier = field.into();
		self
	}

	/// Adds an association; its `source` is forced to this class.
	pub fn association(mut self, mut mapping: AssociationMapping) -> Self {
		mapping.source = self.class.clone();
		self.associations.insert(mapping.field.clone(), mapping);
		self
	}

	pub fn association_mapping(&self, field: &str) -> Option<&AssociationMapping> {
		self.associations.get(field)
	}

	pub fn is_single_valued_association(&self, field: &str) -> bool {
		self.associations
			.get(field)
			.is_some_and(|mapping| !mapping.is_collection_valued())
	}

	pub fn is_collection_valued_association(&self, field: &str) -> bool {
		self.associations
			.get(field)
			.is_some_and(AssociationMapping::is_collection_valued)
	}
}

/// A persistence engine, as seen by factories.
///
/// Implementations are shared behind an `Arc` and must not hold internal
/// locks while running after-persist callbacks, since those callbacks may
/// create (and flush) more objects.
pub trait PersistenceManager: Send + Sync {
	/// Whether persistence is globally enabled.
	fn is_enabled(&self) -> bool {
		true
	}

	/// Whether objects of `class` can be persisted.
	fn supports(&self, class: &str) -> bool;

	fn class_metadata(&self, class: &str) -> FoundryResult<ClassMetadata>;

	fn association_mapping(&self, class: &str, field: &str) -> Option<AssociationMapping>;

	/// Queues `object` for insertion at the next flush.
	fn schedule_for_insert(&self, object: &ObjectRef, after_persist: Vec<AfterPersistCallback>);

	/// Detaches `object` so the engine never stores it.
	fn forget(&self, object: &ObjectRef);

	/// Reloads `object` from storage, returning the managed instance.
	fn refresh(&self, object: &ObjectRef) -> FoundryResult<ObjectRef>;

	fn is_persisted(&self, object: &ObjectRef) -> bool;

	/// Whether the engine manages objects of this object's class.
	fn has_persistence_for(&self, object: &ObjectRef) -> bool;

	/// Stores `object` (and everything scheduled with it).
	fn save(&self, object: &ObjectRef) -> FoundryResult<()> {
		let _ = object;
		self.flush()
	}

	/// Stores everything scheduled so far.
	fn flush(&self) -> FoundryResult<()>;

	fn find(&self, class: &str, id: &Value) -> FoundryResult<Option<ObjectRef>>;

	/// Stored objects of `class` matching every criterion, in identifier order.
	fn find_by(&self, class: &str, criteria: &Parameters) -> FoundryResult<Vec<ObjectRef>>;

	/// Deletes every stored object of `class`.
	fn truncate(&self, class: &str) -> FoundryResult<()>;
}
