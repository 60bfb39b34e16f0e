//! Validation of created objects.
//!
//! The validator itself is an external collaborator plugged in through the
//! [`Validator`] trait. When validation is enabled (globally, or on the
//! factory) the pipeline validates each object right after instantiation
//! and fails the creation with [`FoundryError::ValidationFailed`].

use std::fmt;

use crate::error::{FoundryError, FoundryResult};
use crate::events::AfterInstantiate;
use crate::foundry::Foundry;
use crate::object::ObjectRef;

/// Name of the group used when no group is requested.
pub const DEFAULT_GROUP: &str = "Default";

/// Constraint groups to validate against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValidationGroups {
	/// The validator's default group.
	#[default]
	Default,
	/// Only the listed groups.
	Groups(Vec<String>),
}

impl ValidationGroups {
	pub fn of<I, S>(groups: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::Groups(groups.into_iter().map(Into::into).collect())
	}

	/// Whether a constraint declared in `group` applies.
	pub fn includes(&self, group: &str) -> bool {
		match self {
			Self::Default => group == DEFAULT_GROUP,
			Self::Groups(groups) => groups.iter().any(|candidate| candidate == group),
		}
	}
}

/// One violated constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
	pub property: String,
	pub message: String,
}

impl ConstraintViolation {
	pub fn new(property: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			property: property.into(),
			message: message.into(),
		}
	}
}

/// Every constraint an object violates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConstraintViolations(Vec<ConstraintViolation>);

impl ConstraintViolations {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, violation: ConstraintViolation) {
		self.0.push(violation);
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = &ConstraintViolation> {
		self.0.iter()
	}

	/// Violations reported for `property`.
	pub fn for_property<'a>(&'a self, property: &'a str) -> impl Iterator<Item = &'a ConstraintViolation> {
		self.0.iter().filter(move |violation| violation.property == property)
	}
}

impl FromIterator<ConstraintViolation> for ConstraintViolations {
	fn from_iter<I: IntoIterator<Item = ConstraintViolation>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl fmt::Display for ConstraintViolations {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (index, violation) in self.0.iter().enumerate() {
			if index > 0 {
				f.write_str("; ")?;
			}
			write!(f, "{}: {}", violation.property, violation.message)?;
		}
		Ok(())
	}
}

/// Validates objects.
pub trait Validator: Send + Sync {
	fn validate(&self, object: &ObjectRef, groups: &ValidationGroups) -> ConstraintViolations;
}

/// After-instantiate listener that runs the configured validator.
pub(crate) fn validate_after_instantiate(
	event: &AfterInstantiate<'_>,
	foundry: &Foundry,
) -> FoundryResult<()> {
	let factory = event.factory;
	if !factory.validation_enabled(foundry) {
		return Ok(());
	}
	let Some(validator) = foundry.validator() else {
		return Err(FoundryError::ValidationNotAvailable);
	};
	let violations = validator.validate(event.object, factory.validation_groups());
	if violations.is_empty() {
		return Ok(());
	}
	tracing::debug!(
		class = event.object.class(),
		violations = violations.len(),
		"created object failed validation"
	);
	Err(FoundryError::ValidationFailed {
		class: event.object.class().to_string(),
		violations,
	})
}
