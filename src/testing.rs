//! Testing collaborators module.
//!
//! In-memory persistence, a constraint validator and a test kernel wiring
//! them into a [`Foundry`](crate::Foundry).
//!
//! # Examples
//!
//! ```rust,no_run
//! use foundry::testing::{MappingRegistry, TestKernel};
//! ```

#[cfg(feature = "testing")]
pub use reinhardt_factory_test::*;
