//! Raw attributes, attribute sources and normalized parameters.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;

use crate::array::ArrayFactory;
use crate::error::FoundryResult;
use crate::factory::{Factory, FactoryCollection};
use crate::faker::Faker;
use crate::foundry::Foundry;
use crate::object::ObjectRef;
use crate::persistence::Proxy;
use crate::value::Value;

/// Normalized parameters handed to hooks and the instantiator.
///
/// Only concrete [`Value`]s can be stored here, so no factory ever reaches
/// an instantiator.
pub type Parameters = IndexMap<String, Value>;

/// A raw attribute value, before normalization.
#[derive(Clone)]
pub enum Attribute {
	/// A concrete value, possibly an existing object.
	Value(Value),
	/// A nested factory producing one object.
	Factory(Box<Factory>),
	/// A nested collection producing a list of objects.
	Collection(Box<FactoryCollection>),
	/// A nested array factory producing a map.
	Array(Box<ArrayFactory>),
	/// A list of raw attributes normalized element by element.
	List(Vec<Attribute>),
	/// An object wrapped by the persistence layer.
	Proxy(Proxy),
	/// A value computed at normalization time.
	Lazy(LazyValue),
}

impl Attribute {
	/// Short description of the variant, used in logs and errors.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Value(value) => value.kind(),
			Self::Factory(_) => "factory",
			Self::Collection(_) => "factory collection",
			Self::Array(_) => "array factory",
			Self::List(_) => "list",
			Self::Proxy(_) => "proxy",
			Self::Lazy(_) => "lazy value",
		}
	}

	/// Class produced by this attribute, when it produces or is an object.
	pub(crate) fn object_class(&self) -> Option<String> {
		match self {
			Self::Value(Value::Object(object)) => Some(object.class().to_string()),
			Self::Proxy(proxy) => Some(proxy.object().class().to_string()),
			Self::Factory(factory) => Some(factory.class().to_string()),
			Self::Collection(collection) => Some(collection.factory().class().to_string()),
			_ => None,
		}
	}
}

impl fmt::Debug for Attribute {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
			Self::Factory(factory) => f.debug_tuple("Factory").field(factory).finish(),
			Self::Collection(collection) => f.debug_tuple("Collection").field(collection).finish(),
			Self::Array(_) => f.write_str("Array(..)"),
			Self::List(items) => f.debug_tuple("List").field(items).finish(),
			Self::Proxy(proxy) => f.debug_tuple("Proxy").field(proxy.object()).finish(),
			Self::Lazy(_) => f.write_str("Lazy(..)"),
		}
	}
}

macro_rules! attribute_from_value {
	($($ty:ty),* $(,)?) => {
		$(
			impl From<$ty> for Attribute {
				fn from(value: $ty) -> Self {
					Self::Value(Value::from(value))
				}
			}
		)*
	};
}

attribute_from_value!(
	bool,
	i32,
	i64,
	u32,
	usize,
	f64,
	&str,
	String,
	&String,
	ObjectRef,
	&ObjectRef,
	Vec<ObjectRef>,
	Vec<Value>,
	IndexMap<String, Value>,
	serde_json::Value,
);

impl From<Value> for Attribute {
	fn from(value: Value) -> Self {
		Self::Value(value)
	}
}

impl<T: Into<Value>> From<Option<T>> for Attribute {
	fn from(value: Option<T>) -> Self {
		Self::Value(value.map_or(Value::Null, Into::into))
	}
}

impl From<Factory> for Attribute {
	fn from(factory: Factory) -> Self {
		Self::Factory(Box::new(factory))
	}
}

impl From<FactoryCollection> for Attribute {
	fn from(collection: FactoryCollection) -> Self {
		Self::Collection(Box::new(collection))
	}
}

impl From<ArrayFactory> for Attribute {
	fn from(factory: ArrayFactory) -> Self {
		Self::Array(Box::new(factory))
	}
}

impl From<Proxy> for Attribute {
	fn from(proxy: Proxy) -> Self {
		Self::Proxy(proxy)
	}
}

impl From<LazyValue> for Attribute {
	fn from(lazy: LazyValue) -> Self {
		Self::Lazy(lazy)
	}
}

impl From<Vec<Attribute>> for Attribute {
	fn from(items: Vec<Attribute>) -> Self {
		Self::List(items)
	}
}

impl From<Vec<Factory>> for Attribute {
	fn from(factories: Vec<Factory>) -> Self {
		Self::List(factories.into_iter().map(Attribute::from).collect())
	}
}

type LazyFn = dyn Fn(&Foundry) -> FoundryResult<Attribute> + Send + Sync;

/// An attribute computed when the owning factory is normalized.
///
/// A memoized lazy value computes once and then hands the same result to
/// every factory that shares it.
#[derive(Clone)]
pub struct LazyValue {
	compute: Arc<LazyFn>,
	memo: Option<Arc<OnceCell<Attribute>>>,
}

impl LazyValue {
	pub fn new<F>(compute: F) -> Self
	where
		F: Fn(&Foundry) -> FoundryResult<Attribute> + Send + Sync + 'static,
	{
		Self {
			compute: Arc::new(compute),
			memo: None,
		}
	}

	/// Creates a lazy value that is computed at most once.
	pub fn memoize<F>(compute: F) -> Self
	where
		F: Fn(&Foundry) -> FoundryResult<Attribute> + Send + Sync + 'static,
	{
		Self {
			compute: Arc::new(compute),
			memo: Some(Arc::new(OnceCell::new())),
		}
	}

	/// Computes (or recalls) the attribute.
	pub fn evaluate(&self, foundry: &Foundry) -> FoundryResult<Attribute> {
		match &self.memo {
			Some(cell) => cell
				.get_or_try_init(|| (self.compute)(foundry))
				.map(Clone::clone),
			None => (self.compute)(foundry),
		}
	}
}

/// Ordered map of raw attributes.
#[derive(Debug, Clone, Default)]
pub struct Attributes(IndexMap<String, Attribute>);

impl Attributes {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts or replaces one attribute.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Attribute>) {
		self.0.insert(key.into(), value.into());
	}

	/// Builder-style [`insert`](Self::insert).
	pub fn set(mut self, key: impl Into<String>, value: impl Into<Attribute>) -> Self {
		self.insert(key, value);
		self
	}

	pub fn get(&self, key: &str) -> Option<&Attribute> {
		self.0.get(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	pub fn remove(&mut self, key: &str) -> Option<Attribute> {
		self.0.shift_remove(key)
	}

	/// Overlays `other` on top of `self`; keys in `other` win.
	pub fn merge(&mut self, other: Attributes) {
		for (key, value) in other.0 {
			self.0.insert(key, value);
		}
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn keys(&self) -> impl Iterator<Item = &String> {
		self.0.keys()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &Attribute)> {
		self.0.iter()
	}
}

impl IntoIterator for Attributes {
	type Item = (String, Attribute);
	type IntoIter = indexmap::map::IntoIter<String, Attribute>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl<K: Into<String>, V: Into<Attribute>> FromIterator<(K, V)> for Attributes {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(
			iter.into_iter()
				.map(|(key, value)| (key.into(), value.into()))
				.collect(),
		)
	}
}

impl From<Parameters> for Attributes {
	fn from(parameters: Parameters) -> Self {
		parameters.into_iter().collect()
	}
}

/// Builds an [`Attributes`] map.
///
/// ```ignore
/// let attributes = attributes! {
///     "name" => "Jane",
///     "category" => CategoryFactory::new(),
/// };
/// ```
#[macro_export]
macro_rules! attributes {
	() => {
		$crate::Attributes::new()
	};
	($($key:expr => $value:expr),+ $(,)?) => {{
		let mut attributes = $crate::Attributes::new();
		$(attributes.insert($key, $value);)+
		attributes
	}};
}

/// What an attribute callback can see.
pub struct AttributeContext<'a> {
	/// 1-based position of the object within its collection; `1` for single creations.
	pub index: usize,
	/// The context the factory runs in.
	pub foundry: &'a Foundry,
}

impl AttributeContext<'_> {
	pub fn faker(&self) -> &Faker {
		self.foundry.faker()
	}
}

type AttributeFn = dyn Fn(&AttributeContext<'_>) -> Attributes + Send + Sync;

/// A layer of attributes: a fixed map or a callback evaluated per object.
#[derive(Clone)]
pub enum AttributeSource {
	Map(Attributes),
	Callback(Arc<AttributeFn>),
}

impl AttributeSource {
	pub fn callback<F>(callback: F) -> Self
	where
		F: Fn(&AttributeContext<'_>) -> Attributes + Send + Sync + 'static,
	{
		Self::Callback(Arc::new(callback))
	}

	/// Evaluates the layer for one object.
	pub fn resolve(&self, context: &AttributeContext<'_>) -> Attributes {
		match self {
			Self::Map(attributes) => attributes.clone(),
			Self::Callback(callback) => callback(context),
		}
	}
}

impl Default for AttributeSource {
	fn default() -> Self {
		Self::Map(Attributes::new())
	}
}

impl fmt::Debug for AttributeSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Map(attributes) => f.debug_tuple("Map").field(attributes).finish(),
			Self::Callback(_) => f.write_str("Callback(..)"),
		}
	}
}

impl From<Attributes> for AttributeSource {
	fn from(attributes: Attributes) -> Self {
		Self::Map(attributes)
	}
}

impl From<Parameters> for AttributeSource {
	fn from(parameters: Parameters) -> Self {
		Self::Map(parameters.into())
	}
}
