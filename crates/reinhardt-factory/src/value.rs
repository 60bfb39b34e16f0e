//! Concrete field values.

use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::object::ObjectRef;

/// A concrete value stored in an object field.
///
/// This is what every attribute becomes after normalization: factories and
/// collections never survive into a `Value`.
#[derive(Debug, Clone, Default)]
pub enum Value {
	/// Absent value.
	#[default]
	Null,
	/// Boolean.
	Bool(bool),
	/// Signed integer.
	Int(i64),
	/// Floating point number.
	Float(f64),
	/// UTF-8 string.
	String(String),
	/// Ordered list.
	List(Vec<Value>),
	/// Ordered map, used for array factories and indexed collections.
	Map(IndexMap<String, Value>),
	/// Reference to another object.
	Object(ObjectRef),
}

impl Value {
	/// Whether the value is [`Value::Null`].
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Int(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Float(value) => Some(*value),
			Self::Int(value) => Some(*value as f64),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(value) => Some(value),
			_ => None,
		}
	}

	pub fn as_object(&self) -> Option<&ObjectRef> {
		match self {
			Self::Object(object) => Some(object),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[Value]> {
		match self {
			Self::List(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
		match self {
			Self::Map(map) => Some(map),
			_ => None,
		}
	}

	/// Objects directly held by this value.
	///
	/// A single object yields itself; lists and maps yield their object
	/// elements in order. Nested lists are not descended into.
	pub fn objects(&self) -> Vec<ObjectRef> {
		match self {
			Self::Object(object) => vec![object.clone()],
			Self::List(items) => items.iter().filter_map(Value::as_object).cloned().collect(),
			Self::Map(map) => map.values().filter_map(Value::as_object).cloned().collect(),
			_ => Vec::new(),
		}
	}

	/// Renders a string or integer as a map key.
	pub fn as_key(&self) -> Option<String> {
		match self {
			Self::String(value) => Some(value.clone()),
			Self::Int(value) => Some(value.to_string()),
			_ => None,
		}
	}

	/// Short description of the variant, used in error messages.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool(_) => "bool",
			Self::Int(_) => "int",
			Self::Float(_) => "float",
			Self::String(_) => "string",
			Self::List(_) => "list",
			Self::Map(_) => "map",
			Self::Object(_) => "object",
		}
	}

	/// Total order used to sort repository results.
	///
	/// Values of different kinds order by kind; objects order by identity.
	pub fn sort_cmp(&self, other: &Value) -> Ordering {
		match (self, other) {
			(Self::Int(a), Self::Int(b)) => a.cmp(b),
			(Self::Float(_) | Self::Int(_), Self::Float(_) | Self::Int(_)) => {
				let a = self.as_f64().unwrap_or_default();
				let b = other.as_f64().unwrap_or_default();
				a.total_cmp(&b)
			}
			(Self::String(a), Self::String(b)) => a.cmp(b),
			(Self::Bool(a), Self::Bool(b)) => a.cmp(b),
			(Self::Object(a), Self::Object(b)) => a.uid().cmp(&b.uid()),
			_ => self.rank().cmp(&other.rank()),
		}
	}

	fn rank(&self) -> u8 {
		match self {
			Self::Null => 0,
			Self::Bool(_) => 1,
			Self::Int(_) | Self::Float(_) => 2,
			Self::String(_) => 3,
			Self::List(_) => 4,
			Self::Map(_) => 5,
			Self::Object(_) => 6,
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Null, Self::Null) => true,
			(Self::Bool(a), Self::Bool(b)) => a == b,
			(Self::Int(a), Self::Int(b)) => a == b,
			(Self::Float(a), Self::Float(b)) => a == b,
			(Self::String(a), Self::String(b)) => a == b,
			(Self::List(a), Self::List(b)) => a == b,
			(Self::Map(a), Self::Map(b)) => a == b,
			(Self::Object(a), Self::Object(b)) => a.is(b),
			_ => false,
		}
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Self::Int(i64::from(value))
	}
}

impl From<u32> for Value {
	fn from(value: u32) -> Self {
		Self::Int(i64::from(value))
	}
}

impl From<usize> for Value {
	fn from(value: usize) -> Self {
		Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<&String> for Value {
	fn from(value: &String) -> Self {
		Self::String(value.clone())
	}
}

impl From<ObjectRef> for Value {
	fn from(value: ObjectRef) -> Self {
		Self::Object(value)
	}
}

impl From<&ObjectRef> for Value {
	fn from(value: &ObjectRef) -> Self {
		Self::Object(value.clone())
	}
}

impl From<Vec<Value>> for Value {
	fn from(value: Vec<Value>) -> Self {
		Self::List(value)
	}
}

impl From<Vec<ObjectRef>> for Value {
	fn from(value: Vec<ObjectRef>) -> Self {
		Self::List(value.into_iter().map(Value::Object).collect())
	}
}

impl From<IndexMap<String, Value>> for Value {
	fn from(value: IndexMap<String, Value>) -> Self {
		Self::Map(value)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, Into::into)
	}
}

impl From<serde_json::Value> for Value {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => Self::Null,
			serde_json::Value::Bool(value) => Self::Bool(value),
			serde_json::Value::Number(number) => match number.as_i64() {
				Some(int) => Self::Int(int),
				None => Self::Float(number.as_f64().unwrap_or_default()),
			},
			serde_json::Value::String(value) => Self::String(value),
			serde_json::Value::Array(items) => Self::List(items.into_iter().map(Into::into).collect()),
			serde_json::Value::Object(map) => {
				Self::Map(map.into_iter().map(|(key, value)| (key, value.into())).collect())
			}
		}
	}
}
