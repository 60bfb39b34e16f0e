//! Error types for the factory engine.
//!
//! Variants fall into the families described on [`FoundryError`]: usage
//! errors, mapping errors, transient data errors, validation failures and
//! failures reported by the persistence engine.

use thiserror::Error;

use crate::validation::ConstraintViolations;

/// Errors that can occur while building, creating or persisting objects.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FoundryError {
	/// An object of the same class is already pinned on the factory.
	#[error("An object of class \"{0}\" is already being reused.")]
	AlreadyReused(String),

	/// A factory (or factory collection) was passed where a realized object is required.
	#[error("Cannot reuse a factory.")]
	CannotReuseFactory,

	/// Only object values can be pinned for reuse.
	#[error("Only objects can be reused, got {0}.")]
	NotReusable(String),

	/// No persistence engine is configured for this context.
	#[error("Persistence is not available: {0}")]
	PersistenceNotAvailable(String),

	/// A persistence engine is configured but persistence is globally disabled.
	#[error("Persistence is disabled: {0}")]
	PersistenceDisabled(String),

	/// A persistable object was created inside a data-provider context.
	#[error(
		"Cannot create object of class \"{0}\" in a data provider: use a proxy factory or create it in the test body."
	)]
	CreatedInDataProvider(String),

	/// Validation was requested but no validator is configured.
	#[error("Validation is not available. Configure a validator to enable validation.")]
	ValidationNotAvailable,

	/// A caller passed an argument that cannot be honored.
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	/// An attribute does not match any declared property of the class.
	#[error("Cannot set attribute \"{field}\" for object of class \"{class}\" (not a property).")]
	ExtraAttribute {
		/// Class being instantiated.
		class: String,
		/// Offending attribute name.
		field: String,
	},

	/// A constructor argument was not supplied and has no default.
	#[error("Missing constructor argument \"{argument}\" for class \"{class}\".")]
	MissingArgument {
		/// Class being instantiated.
		class: String,
		/// Argument name.
		argument: String,
	},

	/// A named constructor is not declared on the class.
	#[error("Named constructor \"{name}\" is not declared on class \"{class}\".")]
	UnknownConstructor {
		/// Class being instantiated.
		class: String,
		/// Requested constructor name.
		name: String,
	},

	/// An association between two classes cannot be resolved.
	#[error(
		"Cannot find correct association named \"{field}\" between classes [parent: \"{parent}\", child: \"{child}\"]: {reason}"
	)]
	InvalidRelationship {
		/// Class owning the field being normalized.
		parent: String,
		/// Class produced by the nested factory.
		child: String,
		/// Field name.
		field: String,
		/// What made the mapping unusable.
		reason: String,
	},

	/// The persistence engine has no metadata for a class.
	#[error("No mapping metadata for class \"{0}\".")]
	MappingNotFound(String),

	/// Two children of an indexed collection share the same index key.
	#[error("Duplicate key \"{key}\" while indexing collection \"{field}\" by \"{indexed_by}\".")]
	DuplicateIndexKey {
		/// Collection field on the parent.
		field: String,
		/// Sub-field used as the key.
		indexed_by: String,
		/// The duplicated key.
		key: String,
	},

	/// A child's index field holds something that cannot be a map key.
	#[error("Cannot index collection \"{field}\" by \"{indexed_by}\": value is not a string or integer.")]
	InvalidIndexKey {
		/// Collection field on the parent.
		field: String,
		/// Sub-field used as the key.
		indexed_by: String,
	},

	/// Reloading an object from storage failed.
	#[error("Cannot refresh object of class \"{class}\": {reason}")]
	RefreshFailed {
		/// Class of the object.
		class: String,
		/// Why the refresh failed.
		reason: String,
	},

	/// A created object violates its constraints.
	#[error("Validation failed for object of class \"{class}\": {violations}")]
	ValidationFailed {
		/// Class of the invalid object.
		class: String,
		/// Violated constraints.
		violations: ConstraintViolations,
	},

	/// A lookup matched nothing.
	#[error("No object of class \"{class}\" found for {criteria}.")]
	ObjectNotFound {
		/// Class searched.
		class: String,
		/// Human readable criteria.
		criteria: String,
	},

	/// A random pick needs more rows than are stored.
	#[error("At least {required} object(s) of class \"{class}\" must exist, {available} found.")]
	NotEnoughObjects {
		/// Class searched.
		class: String,
		/// Rows needed.
		required: usize,
		/// Rows available.
		available: usize,
	},

	/// A story has no state registered under this name.
	#[error("Story \"{story}\" has no state named \"{name}\".")]
	StoryStateNotFound {
		/// Story type name.
		story: String,
		/// Requested state name.
		name: String,
	},

	/// A new object was found through a relationship that does not cascade persistence.
	#[error(
		"A new object of class \"{related}\" was found through relationship \"{class}::{field}\" that is not configured to cascade persist."
	)]
	NewObjectThroughRelationship {
		/// Class holding the relationship.
		class: String,
		/// Relationship field.
		field: String,
		/// Class of the unmanaged object.
		related: String,
	},

	/// The persistence engine failed.
	#[error("Persistence error: {0}")]
	Persistence(String),

	/// Invalid configuration.
	#[error("Configuration error: {0}")]
	Configuration(String),

	/// TOML settings could not be parsed.
	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),
}

impl FoundryError {
	/// Returns `true` for programmer mistakes that must never be retried.
	pub fn is_usage_error(&self) -> bool {
		matches!(
			self,
			Self::AlreadyReused(_)
				| Self::CannotReuseFactory
				| Self::NotReusable(_)
				| Self::PersistenceNotAvailable(_)
				| Self::PersistenceDisabled(_)
				| Self::CreatedInDataProvider(_)
				| Self::ValidationNotAvailable
				| Self::InvalidArgument(_)
				| Self::ExtraAttribute { .. }
				| Self::MissingArgument { .. }
				| Self::UnknownConstructor { .. }
		)
	}

	/// Returns `true` when the attribute graph does not match the mapping metadata.
	pub fn is_mapping_error(&self) -> bool {
		matches!(
			self,
			Self::InvalidRelationship { .. }
				| Self::MappingNotFound(_)
				| Self::DuplicateIndexKey { .. }
				| Self::InvalidIndexKey { .. }
		)
	}
}

/// Result type alias for factory operations.
pub type FoundryResult<T> = Result<T, FoundryError>;
