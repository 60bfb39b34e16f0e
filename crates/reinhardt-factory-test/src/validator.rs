//! Rule-based validator for tests.

use std::fmt;

use parking_lot::RwLock;
use reinhardt_factory::validation::{
	ConstraintViolation, ConstraintViolations, DEFAULT_GROUP, ValidationGroups, Validator,
};
use reinhardt_factory::{ObjectRef, Value};

/// A property constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
	/// Not null, not an empty string, not an empty list.
	NotBlank,
	/// Integer strictly greater than the bound.
	GreaterThan(i64),
}

impl Constraint {
	fn check(&self, value: &Value) -> Option<String> {
		match self {
			Self::NotBlank => {
				let blank = match value {
					Value::Null => true,
					Value::String(text) => text.is_empty(),
					Value::List(items) => items.is_empty(),
					_ => false,
				};
				blank.then(|| "This value should not be blank.".to_string())
			}
			Self::GreaterThan(bound) => match value.as_i64() {
				Some(number) if number > *bound => None,
				_ => Some(format!("This value should be greater than {}.", bound)),
			},
		}
	}
}

#[derive(Debug, Clone)]
struct Rule {
	class: String,
	property: String,
	constraint: Constraint,
	groups: Vec<String>,
}

/// [`Validator`] checking per-property [`Constraint`]s.
#[derive(Default)]
pub struct ConstraintValidator {
	rules: RwLock<Vec<Rule>>,
}

impl ConstraintValidator {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a constraint in the default group.
	pub fn rule(self, class: &str, property: &str, constraint: Constraint) -> Self {
		self.rule_in_groups(class, property, constraint, [DEFAULT_GROUP])
	}

	pub fn rule_in_groups<I, S>(self, class: &str, property: &str, constraint: Constraint, groups: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.rules.write().push(Rule {
			class: class.to_string(),
			property: property.to_string(),
			constraint,
			groups: groups.into_iter().map(Into::into).collect(),
		});
		self
	}
}

impl Validator for ConstraintValidator {
	fn validate(&self, object: &ObjectRef, groups: &ValidationGroups) -> ConstraintViolations {
		self.rules
			.read()
			.iter()
			.filter(|rule| rule.class == object.class())
			.filter(|rule| rule.groups.iter().any(|group| groups.includes(group)))
			.filter_map(|rule| {
				rule.constraint
					.check(&object.get_or_null(&rule.property))
					.map(|message| ConstraintViolation::new(rule.property.clone(), message))
			})
			.collect()
	}
}

impl fmt::Debug for ConstraintValidator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ConstraintValidator")
			.field("rules", &self.rules.read().len())
			.finish()
	}
}
