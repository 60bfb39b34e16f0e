//! Unit of work and tables of the in-memory engine.
//!
//! Everything here runs under the engine's lock; nothing calls back into
//! user code.

use std::collections::{BTreeMap, HashMap, VecDeque};

use indexmap::IndexMap;
use reinhardt_factory::attributes::Parameters;
use reinhardt_factory::persistence::AfterPersistCallback;
use reinhardt_factory::{FoundryError, FoundryResult, ObjectRef, Value};

use super::mapping::MappingRegistry;

/// Stored pointer to another row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Reference {
	pub(crate) class: String,
	pub(crate) id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StoredValue {
	Scalar(Value),
	Ref(Reference),
	Refs(Vec<Reference>),
	IndexedRefs(IndexMap<String, Reference>),
}

pub(crate) type Row = IndexMap<String, StoredValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryState {
	ScheduledForInsert,
	Managed,
}

struct ManagedEntry {
	object: ObjectRef,
	state: EntryState,
	after_persist: Vec<AfterPersistCallback>,
	/// Row as last written or loaded.
	snapshot: Option<Row>,
}

impl ManagedEntry {
	fn scheduled(object: ObjectRef, after_persist: Vec<AfterPersistCallback>) -> Self {
		Self {
			object,
			state: EntryState::ScheduledForInsert,
			after_persist,
			snapshot: None,
		}
	}
}

#[derive(Default)]
pub(crate) struct UnitOfWork {
	/// Keyed by object uid, in scheduling order.
	managed: IndexMap<u64, ManagedEntry>,
	identity: HashMap<Reference, u64>,
	tables: HashMap<String, BTreeMap<i64, Row>>,
	sequences: HashMap<String, i64>,
}

impl UnitOfWork {
	pub(crate) fn schedule(&mut self, object: &ObjectRef, after_persist: Vec<AfterPersistCallback>) {
		match self.managed.get_mut(&object.uid()) {
			Some(entry) => entry.after_persist.extend(after_persist),
			None => {
				self.managed.insert(
					object.uid(),
					ManagedEntry::scheduled(object.clone(), after_persist),
				);
			}
		}
	}

	pub(crate) fn forget(&mut self, object: &ObjectRef) {
		self.managed.shift_remove(&object.uid());
		self.identity.retain(|_, uid| *uid != object.uid());
	}

	pub(crate) fn state_of(&self, object: &ObjectRef) -> Option<EntryState> {
		self.managed.get(&object.uid()).map(|entry| entry.state)
	}

	pub(crate) fn is_persisted(&self, object: &ObjectRef, mappings: &MappingRegistry) -> bool {
		match self.state_of(object) {
			Some(EntryState::Managed) => true,
			Some(EntryState::ScheduledForInsert) => false,
			None => self.is_stored(object, mappings),
		}
	}

	fn is_stored(&self, object: &ObjectRef, mappings: &MappingRegistry) -> bool {
		reference_of(object, mappings).is_some_and(|reference| self.row(&reference).is_some())
	}

	fn row(&self, reference: &Reference) -> Option<&Row> {
		self.tables.get(&reference.class)?.get(&reference.id)
	}

	pub(crate) fn row_count(&self, class: &str) -> usize {
		self.tables.get(class).map_or(0, BTreeMap::len)
	}

	/// Writes every managed object and hands back the pending callbacks.
	pub(crate) fn flush(&mut self, mappings: &MappingRegistry) -> FoundryResult<Vec<AfterPersistCallback>> {
		self.cascade(mappings)?;

		let pending: Vec<u64> = self
			.managed
			.iter()
			.filter(|(_, entry)| entry.state == EntryState::ScheduledForInsert)
			.map(|(uid, _)| *uid)
			.collect();
		for uid in pending {
			let Some(entry) = self.managed.get_mut(&uid) else {
				continue;
			};
			let class = entry.object.class().to_string();
			let identifier = mappings.identifier(&class);
			let sequence = self.sequences.entry(class.clone()).or_default();
			let id = match entry.object.get_i64(identifier) {
				Some(id) => {
					*sequence = (*sequence).max(id);
					id
				}
				None => {
					*sequence += 1;
					entry.object.set(identifier, *sequence);
					*sequence
				}
			};
			entry.state = EntryState::Managed;
			self.identity.insert(Reference { class, id }, uid);
		}

		let uids: Vec<u64> = self.managed.keys().copied().collect();
		for uid in uids {
			let object = match self.managed.get(&uid) {
				Some(entry) => entry.object.clone(),
				None => continue,
			};
			let row = row_of(&object, mappings)?;
			let reference = reference_of(&object, mappings).ok_or_else(|| {
				FoundryError::Persistence(format!("{:?} has no identifier after flush", object))
			})?;
			self.tables
				.entry(reference.class)
				.or_default()
				.insert(reference.id, row.clone());
			if let Some(entry) = self.managed.get_mut(&uid) {
				entry.snapshot = Some(row);
			}
		}

		Ok(self
			.managed
			.values_mut()
			.flat_map(|entry| std::mem::take(&mut entry.after_persist))
			.collect())
	}

	/// Follows associations from every managed object and schedules new
	/// related objects where the association cascades.
	///
	/// On failure, objects scheduled by the walk are unscheduled again.
	fn cascade(&mut self, mappings: &MappingRegistry) -> FoundryResult<()> {
		let mut cascaded = Vec::new();
		let walked = self.cascade_from(mappings, &mut cascaded);
		if walked.is_err() {
			for uid in cascaded {
				self.managed.shift_remove(&uid);
			}
		}
		walked
	}

	fn cascade_from(&mut self, mappings: &MappingRegistry, cascaded: &mut Vec<u64>) -> FoundryResult<()> {
		let mut queue: VecDeque<ObjectRef> = self.managed.values().map(|entry| entry.object.clone()).collect();
		while let Some(object) = queue.pop_front() {
			let metadata = mappings
				.get(object.class())
				.ok_or_else(|| FoundryError::MappingNotFound(object.class().to_string()))?;
			for (field, mapping) in &metadata.associations {
				for related in object.get_or_null(field).objects() {
					if related.is_placeholder() {
						return Err(FoundryError::Persistence(format!(
							"a placeholder for \"{}\" is still referenced by \"{}::{}\"",
							related.class(),
							object.class(),
							field
						)));
					}
					if self.managed.contains_key(&related.uid()) || self.is_stored(&related, mappings) {
						continue;
					}
					if !mapping.cascade_persist {
						return Err(FoundryError::NewObjectThroughRelationship {
							class: object.class().to_string(),
							field: field.clone(),
							related: related.class().to_string(),
						});
					}
					tracing::debug!(
						class = object.class(),
						field = %field,
						related = related.class(),
						"cascading persist"
					);
					self.managed
						.insert(related.uid(), ManagedEntry::scheduled(related.clone(), Vec::new()));
					cascaded.push(related.uid());
					queue.push_back(related);
				}
			}
		}
		Ok(())
	}

	pub(crate) fn refresh(&mut self, object: &ObjectRef, mappings: &MappingRegistry) -> FoundryResult<ObjectRef> {
		let failed = |reason: &str| FoundryError::RefreshFailed {
			class: object.class().to_string(),
			reason: reason.to_string(),
		};
		let reference = reference_of(object, mappings).ok_or_else(|| failed("the object was never flushed"))?;
		let Some(stored) = self.row(&reference).cloned() else {
			return Err(failed("the object is not stored"));
		};

		let Some(entry) = self.managed.get(&object.uid()) else {
			return self
				.load(&reference, mappings)
				.ok_or_else(|| failed("the object is not stored"));
		};
		if entry.state == EntryState::ScheduledForInsert {
			return Err(failed("the object is scheduled but not flushed"));
		}
		let current = row_of(object, mappings).ok();
		if current.as_ref() != entry.snapshot.as_ref() {
			return Err(failed("the object has unsaved changes"));
		}

		for (field, value) in stored {
			if let StoredValue::Scalar(value) = value {
				object.set(field, value);
			}
		}
		Ok(object.clone())
	}

	/// Managed instance for `reference`, hydrated from its row if needed.
	pub(crate) fn load(&mut self, reference: &Reference, mappings: &MappingRegistry) -> Option<ObjectRef> {
		if let Some(uid) = self.identity.get(reference)
			&& let Some(entry) = self.managed.get(uid)
		{
			return Some(entry.object.clone());
		}
		let row = self.row(reference)?.clone();

		let object = ObjectRef::new(reference.class.clone());
		self.managed.insert(
			object.uid(),
			ManagedEntry {
				object: object.clone(),
				state: EntryState::Managed,
				after_persist: Vec::new(),
				snapshot: Some(row.clone()),
			},
		);
		self.identity.insert(reference.clone(), object.uid());

		// registered before materializing so cycles resolve to this instance
		for (field, stored) in row {
			let value = self.materialize(stored, mappings);
			object.set(field, value);
		}
		Some(object)
	}

	fn materialize(&mut self, stored: StoredValue, mappings: &MappingRegistry) -> Value {
		match stored {
			StoredValue::Scalar(value) => value,
			StoredValue::Ref(reference) => self.load(&reference, mappings).map_or(Value::Null, Value::Object),
			StoredValue::Refs(references) => Value::List(
				references
					.iter()
					.filter_map(|reference| self.load(reference, mappings))
					.map(Value::Object)
					.collect(),
			),
			StoredValue::IndexedRefs(references) => Value::Map(
				references
					.iter()
					.filter_map(|(key, reference)| {
						self.load(reference, mappings)
							.map(|object| (key.clone(), Value::Object(object)))
					})
					.collect(),
			),
		}
	}

	pub(crate) fn find_by(
		&mut self,
		class: &str,
		criteria: &Parameters,
		mappings: &MappingRegistry,
	) -> Vec<ObjectRef> {
		let ids: Vec<i64> = self
			.tables
			.get(class)
			.map(|table| {
				table
					.iter()
					.filter(|(_, row)| {
						criteria
							.iter()
							.all(|(field, expected)| matches(row.get(field), expected, mappings))
					})
					.map(|(id, _)| *id)
					.collect()
			})
			.unwrap_or_default();
		ids.into_iter()
			.filter_map(|id| {
				self.load(
					&Reference {
						class: class.to_string(),
						id,
					},
					mappings,
				)
			})
			.collect()
	}

	pub(crate) fn truncate(&mut self, class: &str) {
		self.tables.remove(class);
		self.managed.retain(|_, entry| entry.object.class() != class);
		self.identity.retain(|reference, _| reference.class != class);
	}

	/// Detaches every object; rows stay.
	pub(crate) fn clear(&mut self) {
		self.managed.clear();
		self.identity.clear();
	}
}

/// Stored reference of an object that has an identifier.
pub(crate) fn reference_of(object: &ObjectRef, mappings: &MappingRegistry) -> Option<Reference> {
	object
		.get_i64(mappings.identifier(object.class()))
		.map(|id| Reference {
			class: object.class().to_string(),
			id,
		})
}

fn row_of(object: &ObjectRef, mappings: &MappingRegistry) -> FoundryResult<Row> {
	let metadata = mappings.get(object.class());
	let mut row = Row::new();
	for (field, value) in object.snapshot() {
		let is_association = metadata.is_some_and(|metadata| metadata.association_mapping(&field).is_some());
		let stored = if is_association {
			store_association(&value, mappings)?
		} else {
			StoredValue::Scalar(value)
		};
		row.insert(field, stored);
	}
	Ok(row)
}

fn store_association(value: &Value, mappings: &MappingRegistry) -> FoundryResult<StoredValue> {
	let reference = |object: &ObjectRef| {
		reference_of(object, mappings).ok_or_else(|| {
			FoundryError::Persistence(format!("related object {:?} has no identifier", object))
		})
	};
	Ok(match value {
		Value::Object(object) => StoredValue::Ref(reference(object)?),
		Value::List(items) => StoredValue::Refs(
			items
				.iter()
				.filter_map(Value::as_object)
				.map(reference)
				.collect::<FoundryResult<_>>()?,
		),
		Value::Map(items) => StoredValue::IndexedRefs(
			items
				.iter()
				.filter_map(|(key, item)| item.as_object().map(|object| (key, object)))
				.map(|(key, object)| Ok((key.clone(), reference(object)?)))
				.collect::<FoundryResult<_>>()?,
		),
		other => StoredValue::Scalar(other.clone()),
	})
}

fn matches(stored: Option<&StoredValue>, expected: &Value, mappings: &MappingRegistry) -> bool {
	let points_at = |reference: &Reference| match expected {
		Value::Object(object) => reference_of(object, mappings).as_ref() == Some(reference),
		Value::Int(id) => reference.id == *id,
		_ => false,
	};
	match stored {
		None => expected.is_null(),
		Some(StoredValue::Scalar(value)) => value == expected,
		Some(StoredValue::Ref(reference)) => points_at(reference),
		Some(StoredValue::Refs(references)) => references.iter().any(points_at),
		Some(StoredValue::IndexedRefs(references)) => references.values().any(points_at),
	}
}
