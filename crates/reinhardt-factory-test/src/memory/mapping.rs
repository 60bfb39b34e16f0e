use indexmap::IndexMap;
use reinhardt_factory::persistence::{AssociationMapping, ClassMetadata};
use reinhardt_factory::{FoundryError, FoundryResult};

const DEFAULT_IDENTIFIER: &str = "id";

/// Mapping metadata of every class the in-memory engine stores.
#[derive(Debug, Clone, Default)]
pub struct MappingRegistry {
	classes: IndexMap<String, ClassMetadata>,
}

impl MappingRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&mut self, metadata: ClassMetadata) {
		self.classes.insert(metadata.class.clone(), metadata);
	}

	/// Builder-style [`register`](Self::register).
	pub fn with(mut self, metadata: ClassMetadata) -> Self {
		self.register(metadata);
		self
	}

	pub fn get(&self, class: &str) -> Option<&ClassMetadata> {
		self.classes.get(class)
	}

	pub fn contains(&self, class: &str) -> bool {
		self.classes.contains_key(class)
	}

	pub fn classes(&self) -> impl Iterator<Item = &str> {
		self.classes.keys().map(String::as_str)
	}

	pub fn association(&self, class: &str, field: &str) -> Option<&AssociationMapping> {
		self.get(class)?.association_mapping(field)
	}

	/// Identifier field of `class`; `id` for unknown classes.
	pub fn identifier(&self, class: &str) -> &str {
		self.get(class)
			.map_or(DEFAULT_IDENTIFIER, |metadata| metadata.identifier.as_str())
	}

	pub(crate) fn set_cascade(&mut self, class: &str, field: &str, cascade: bool) -> FoundryResult<()> {
		let mapping = self
			.classes
			.get_mut(class)
			.and_then(|metadata| metadata.associations.get_mut(field))
			.ok_or_else(|| FoundryError::MappingNotFound(format!("{}::{}", class, field)))?;
		mapping.cascade_persist = cascade;
		Ok(())
	}
}

impl FromIterator<ClassMetadata> for MappingRegistry {
	fn from_iter<I: IntoIterator<Item = ClassMetadata>>(iter: I) -> Self {
		let mut registry = Self::new();
		for metadata in iter {
			registry.register(metadata);
		}
		registry
	}
}
