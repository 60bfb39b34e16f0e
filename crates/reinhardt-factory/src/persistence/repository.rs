//! Repository-style finders over one persisted class.

use std::fmt::Write as _;

use crate::attributes::Parameters;
use crate::error::{FoundryError, FoundryResult};
use crate::foundry::Foundry;
use crate::object::ObjectRef;
use crate::value::Value;

/// Finders for the stored objects of one class.
///
/// Random picks draw from the context's seeded faker, so they are
/// reproducible for a given seed.
#[derive(Clone)]
pub struct RepositoryDecorator {
	foundry: Foundry,
	class: String,
}

impl RepositoryDecorator {
	pub(crate) fn new(foundry: Foundry, class: impl Into<String>) -> Self {
		Self {
			foundry,
			class: class.into(),
		}
	}

	pub fn class(&self) -> &str {
		&self.class
	}

	/// Finds an object by identifier.
	pub fn find(&self, id: impl Into<Value>) -> FoundryResult<Option<ObjectRef>> {
		self.foundry.persistence()?.find(&self.class, &id.into())
	}

	pub fn find_or_fail(&self, id: impl Into<Value>) -> FoundryResult<ObjectRef> {
		let id = id.into();
		self.find(id.clone())?
			.ok_or_else(|| self.not_found(&format!("id {:?}", id)))
	}

	pub fn find_by(&self, criteria: &Parameters) -> FoundryResult<Vec<ObjectRef>> {
		self.foundry.persistence()?.find_by(&self.class, criteria)
	}

	pub fn find_one_by(&self, criteria: &Parameters) -> FoundryResult<Option<ObjectRef>> {
		Ok(self.find_by(criteria)?.into_iter().next())
	}

	pub fn find_all(&self) -> FoundryResult<Vec<ObjectRef>> {
		self.find_by(&Parameters::new())
	}

	/// First object when sorted ascending by `sort_by`.
	pub fn first(&self, sort_by: &str) -> FoundryResult<Option<ObjectRef>> {
		Ok(self.sorted(sort_by)?.into_iter().next())
	}

	/// Last object when sorted ascending by `sort_by`.
	pub fn last(&self, sort_by: &str) -> FoundryResult<Option<ObjectRef>> {
		Ok(self.sorted(sort_by)?.pop())
	}

	pub fn first_or_fail(&self, sort_by: &str) -> FoundryResult<ObjectRef> {
		self.first(sort_by)?.ok_or_else(|| self.not_found("an empty table"))
	}

	fn sorted(&self, sort_by: &str) -> FoundryResult<Vec<ObjectRef>> {
		let mut objects = self.find_all()?;
		objects.sort_by(|a, b| a.get_or_null(sort_by).sort_cmp(&b.get_or_null(sort_by)));
		Ok(objects)
	}

	/// One random object matching `criteria`.
	pub fn random(&self, criteria: &Parameters) -> FoundryResult<ObjectRef> {
		let mut picked = self.random_set(1, criteria)?;
		picked.pop().ok_or_else(|| self.not_enough(1, 0))
	}

	/// `count` distinct random objects matching `criteria`.
	pub fn random_set(&self, count: usize, criteria: &Parameters) -> FoundryResult<Vec<ObjectRef>> {
		let candidates = self.find_by(criteria)?;
		if candidates.len() < count {
			return Err(self.not_enough(count, candidates.len()));
		}
		Ok(self.foundry.faker().pick_many(&candidates, count))
	}

	/// Between `min` and `max` distinct random objects matching `criteria`.
	pub fn random_range(
		&self,
		min: usize,
		max: usize,
		criteria: &Parameters,
	) -> FoundryResult<Vec<ObjectRef>> {
		if min > max {
			return Err(FoundryError::InvalidArgument(format!(
				"random range minimum {} is greater than maximum {}",
				min, max
			)));
		}
		let candidates = self.find_by(criteria)?;
		if candidates.len() < max {
			return Err(self.not_enough(max, candidates.len()));
		}
		let count = self.foundry.faker().count_between(min, max);
		Ok(self.foundry.faker().pick_many(&candidates, count))
	}

	pub fn count(&self) -> FoundryResult<usize> {
		self.count_by(&Parameters::new())
	}

	pub fn count_by(&self, criteria: &Parameters) -> FoundryResult<usize> {
		Ok(self.find_by(criteria)?.len())
	}

	/// Deletes every stored object of this class.
	pub fn truncate(&self) -> FoundryResult<()> {
		self.foundry.assert_persistence_enabled()?;
		self.foundry.persistence()?.truncate(&self.class)
	}

	/// Panicking assertions over this repository.
	pub fn assert(&self) -> RepositoryAssertions {
		RepositoryAssertions {
			repository: self.clone(),
		}
	}

	fn not_found(&self, criteria: &str) -> FoundryError {
		FoundryError::ObjectNotFound {
			class: self.class.clone(),
			criteria: criteria.to_string(),
		}
	}

	fn not_enough(&self, required: usize, available: usize) -> FoundryError {
		FoundryError::NotEnoughObjects {
			class: self.class.clone(),
			required,
			available,
		}
	}
}

/// Test assertions over a [`RepositoryDecorator`].
///
/// Every method panics with a descriptive message when the assertion (or
/// the lookup behind it) fails.
pub struct RepositoryAssertions {
	repository: RepositoryDecorator,
}

impl RepositoryAssertions {
	#[track_caller]
	pub fn count(&self, expected: usize) -> &Self {
		let actual = self.lookup(|repository| repository.count());
		assert_eq!(
			actual, expected,
			"Expected {} object(s) of class \"{}\", {} found.",
			expected, self.repository.class, actual
		);
		self
	}

	#[track_caller]
	pub fn count_by(&self, expected: usize, criteria: &Parameters) -> &Self {
		let actual = self.lookup(|repository| repository.count_by(criteria));
		assert_eq!(
			actual,
			expected,
			"Expected {} object(s) of class \"{}\" matching {}, {} found.",
			expected,
			self.repository.class,
			describe(criteria),
			actual
		);
		self
	}

	#[track_caller]
	pub fn count_greater_than(&self, bound: usize) -> &Self {
		let actual = self.lookup(|repository| repository.count());
		assert!(
			actual > bound,
			"Expected more than {} object(s) of class \"{}\", {} found.",
			bound,
			self.repository.class,
			actual
		);
		self
	}

	#[track_caller]
	pub fn count_less_than(&self, bound: usize) -> &Self {
		let actual = self.lookup(|repository| repository.count());
		assert!(
			actual < bound,
			"Expected fewer than {} object(s) of class \"{}\", {} found.",
			bound,
			self.repository.class,
			actual
		);
		self
	}

	#[track_caller]
	pub fn empty(&self) -> &Self {
		self.count(0)
	}

	#[track_caller]
	pub fn not_empty(&self) -> &Self {
		self.count_greater_than(0)
	}

	#[track_caller]
	pub fn exists(&self, criteria: &Parameters) -> &Self {
		let found = self.lookup(|repository| repository.find_one_by(criteria));
		assert!(
			found.is_some(),
			"Expected an object of class \"{}\" matching {}, none found.",
			self.repository.class,
			describe(criteria)
		);
		self
	}

	#[track_caller]
	pub fn not_exists(&self, criteria: &Parameters) -> &Self {
		let found = self.lookup(|repository| repository.find_one_by(criteria));
		assert!(
			found.is_none(),
			"Expected no object of class \"{}\" matching {}, found {:?}.",
			self.repository.class,
			describe(criteria),
			found
		);
		self
	}

	#[track_caller]
	fn lookup<T>(&self, f: impl FnOnce(&RepositoryDecorator) -> FoundryResult<T>) -> T {
		match f(&self.repository) {
			Ok(value) => value,
			Err(error) => panic!(
				"Repository lookup for class \"{}\" failed: {}",
				self.repository.class, error
			),
		}
	}
}

fn describe(criteria: &Parameters) -> String {
	let mut out = String::from("{");
	for (index, (key, value)) in criteria.iter().enumerate() {
		if index > 0 {
			out.push_str(", ");
		}
		let _ = write!(out, "{}: {:?}", key, value);
	}
	out.push('}');
	out
}
