//! Foundry settings.
//!
//! Settings are plain serde structs so they can be embedded in a larger
//! TOML settings file or loaded on their own:
//!
//! ```toml
//! faker_seed = 1234
//! validation_enabled = false
//!
//! [instantiator]
//! use_constructor = true
//! allow_extra_attributes = false
//! always_force_properties = false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FoundryError, FoundryResult};
use crate::instantiator::Instantiator;

/// Settings of a [`Foundry`](crate::Foundry) context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoundrySettings {
	/// Seed for fake data; `FOUNDRY_FAKER_SEED` overrides it.
	pub faker_seed: Option<u64>,
	/// Validate every created object unless a factory opts out.
	pub validation_enabled: bool,
	/// Default instantiator behavior.
	pub instantiator: InstantiatorSettings,
}

impl Default for FoundrySettings {
	fn default() -> Self {
		Self {
			faker_seed: None,
			validation_enabled: false,
			instantiator: InstantiatorSettings::default(),
		}
	}
}

impl FoundrySettings {
	pub fn from_toml_str(source: &str) -> FoundryResult<Self> {
		Ok(toml::from_str(source)?)
	}

	pub fn from_file(path: impl AsRef<Path>) -> FoundryResult<Self> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|error| {
			FoundryError::Configuration(format!("cannot read {}: {}", path.display(), error))
		})?;
		Self::from_toml_str(&source)
	}
}

/// How the default instantiator builds objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstantiatorSettings {
	pub use_constructor: bool,
	pub allow_extra_attributes: bool,
	pub always_force_properties: bool,
}

impl Default for InstantiatorSettings {
	fn default() -> Self {
		Self {
			use_constructor: true,
			allow_extra_attributes: false,
			always_force_properties: false,
		}
	}
}

impl InstantiatorSettings {
	/// Builds the instantiator these settings describe.
	pub fn build(&self) -> Instantiator {
		let mut instantiator = if self.use_constructor {
			Instantiator::with_constructor()
		} else {
			Instantiator::without_constructor()
		};
		if self.allow_extra_attributes {
			instantiator = instantiator.allow_extra();
		}
		if self.always_force_properties {
			instantiator = instantiator.always_force();
		}
		instantiator
	}
}
