use crate::error::FoundryResult;
use crate::foundry::Foundry;
use crate::object::ObjectRef;

/// An object handed out by a proxy factory.
///
/// The proxy keeps the object reachable across refreshes: after
/// [`refresh`](Self::refresh) it points at whatever instance the
/// persistence engine manages. Normalization always unwraps it.
#[derive(Debug, Clone, PartialEq)]
pub struct Proxy {
	object: ObjectRef,
}

impl Proxy {
	pub fn new(object: ObjectRef) -> Self {
		Self { object }
	}

	/// The wrapped object.
	pub fn object(&self) -> &ObjectRef {
		&self.object
	}

	pub fn into_object(self) -> ObjectRef {
		self.object
	}

	/// Reloads the object from storage.
	pub fn refresh(&mut self, foundry: &Foundry) -> FoundryResult<&ObjectRef> {
		self.object = foundry.persistence()?.refresh(&self.object)?;
		Ok(&self.object)
	}

	/// Schedules (if needed) and flushes the object.
	pub fn save(&self, foundry: &Foundry) -> FoundryResult<()> {
		let manager = foundry.persistence()?;
		if !manager.is_persisted(&self.object) {
			manager.schedule_for_insert(&self.object, Vec::new());
		}
		manager.save(&self.object)
	}

	pub fn is_persisted(&self, foundry: &Foundry) -> bool {
		foundry
			.persistence()
			.is_ok_and(|manager| manager.is_persisted(&self.object))
	}
}

impl From<ObjectRef> for Proxy {
	fn from(object: ObjectRef) -> Self {
		Self::new(object)
	}
}
