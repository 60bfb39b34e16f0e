//! Shared handles to dynamically described domain objects.
//!
//! Factories do not know the concrete Rust types of the objects they build.
//! Every object is an [`ObjectRef`]: a reference-counted record with a class
//! name, a process-unique identity and an ordered map of field values.
//! Cloning an `ObjectRef` clones the handle, never the object.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::value::Value;

static NEXT_UID: AtomicU64 = AtomicU64::new(1);

struct ObjectData {
	uid: u64,
	class: String,
	placeholder: bool,
	fields: RwLock<IndexMap<String, Value>>,
}

/// Handle to a domain object.
///
/// Equality and hashing use object identity, so two handles are equal only
/// when they point at the very same object.
#[derive(Clone)]
pub struct ObjectRef(Arc<ObjectData>);

impl ObjectRef {
	/// Creates an empty object of `class`.
	pub fn new(class: impl Into<String>) -> Self {
		Self::build(class.into(), false)
	}

	/// Creates an object of `class` with initial field values.
	pub fn with_fields<I, K, V>(class: impl Into<String>, fields: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<Value>,
	{
		let object = Self::new(class);
		{
			let mut map = object.0.fields.write();
			for (key, value) in fields {
				map.insert(key.into(), value.into());
			}
		}
		object
	}

	pub(crate) fn placeholder(class: impl Into<String>) -> Self {
		Self::build(class.into(), true)
	}

	fn build(class: String, placeholder: bool) -> Self {
		Self(Arc::new(ObjectData {
			uid: NEXT_UID.fetch_add(1, Ordering::Relaxed),
			class,
			placeholder,
			fields: RwLock::new(IndexMap::new()),
		}))
	}

	/// Process-unique identity of this object.
	pub fn uid(&self) -> u64 {
		self.0.uid
	}

	/// Class name the object was instantiated as.
	pub fn class(&self) -> &str {
		&self.0.class
	}

	/// Whether this object is a stand-in used while wiring inverse relationships.
	pub fn is_placeholder(&self) -> bool {
		self.0.placeholder
	}

	/// Returns a clone of the field value, if set.
	pub fn get(&self, field: &str) -> Option<Value> {
		self.0.fields.read().get(field).cloned()
	}

	/// Returns the field value or [`Value::Null`].
	pub fn get_or_null(&self, field: &str) -> Value {
		self.get(field).unwrap_or(Value::Null)
	}

	/// Returns the object stored in `field`, if the field holds one.
	pub fn get_object(&self, field: &str) -> Option<ObjectRef> {
		self.0.fields.read().get(field).and_then(Value::as_object).cloned()
	}

	/// Returns the objects held by a collection field, in order.
	///
	/// Lists and maps are both accepted; anything else yields an empty vector.
	pub fn get_objects(&self, field: &str) -> Vec<ObjectRef> {
		self.get(field).map(|value| value.objects()).unwrap_or_default()
	}

	/// Returns the field as a string slice copy, if it holds a string.
	pub fn get_str(&self, field: &str) -> Option<String> {
		self.0
			.fields
			.read()
			.get(field)
			.and_then(Value::as_str)
			.map(str::to_string)
	}

	/// Returns the field as an integer, if it holds one.
	pub fn get_i64(&self, field: &str) -> Option<i64> {
		self.0.fields.read().get(field).and_then(Value::as_i64)
	}

	/// Writes a field, replacing any previous value.
	pub fn set(&self, field: impl Into<String>, value: impl Into<Value>) {
		self.0.fields.write().insert(field.into(), value.into());
	}

	/// Writes a field only when it is not set yet.
	pub fn set_default(&self, field: impl Into<String>, value: impl Into<Value>) {
		self.0
			.fields
			.write()
			.entry(field.into())
			.or_insert_with(|| value.into());
	}

	/// Appends a value to a list field, creating the list when missing.
	pub fn push(&self, field: &str, value: impl Into<Value>) {
		let mut fields = self.0.fields.write();
		let entry = fields.entry(field.to_string()).or_insert(Value::List(Vec::new()));
		match entry {
			Value::List(items) => items.push(value.into()),
			other => *other = Value::List(vec![value.into()]),
		}
	}

	/// Whether the field is set, even to null.
	pub fn has(&self, field: &str) -> bool {
		self.0.fields.read().contains_key(field)
	}

	/// Names of the fields currently set, in insertion order.
	pub fn field_names(&self) -> Vec<String> {
		self.0.fields.read().keys().cloned().collect()
	}

	/// Copy of every field value.
	pub fn snapshot(&self) -> IndexMap<String, Value> {
		self.0.fields.read().clone()
	}

	/// Identity comparison.
	pub fn is(&self, other: &ObjectRef) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl PartialEq for ObjectRef {
	fn eq(&self, other: &Self) -> bool {
		self.is(other)
	}
}

impl Eq for ObjectRef {}

impl Hash for ObjectRef {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.0.uid.hash(state);
	}
}

impl fmt::Debug for ObjectRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.0.placeholder {
			write!(f, "{}#{}(placeholder)", self.0.class, self.0.uid)
		} else {
			write!(f, "{}#{}", self.0.class, self.0.uid)
		}
	}
}
