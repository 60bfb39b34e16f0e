//! Test harness for `reinhardt-factory`.
//!
//! Provides the external collaborators the factory engine talks to, made
//! concrete for tests:
//!
//! - [`InMemoryPersistence`]: a small ORM-like engine keeping rows in memory
//! - [`ConstraintValidator`]: rule-based validation with groups
//! - [`TestKernel`]: boots and shuts down a [`Foundry`](reinhardt_factory::Foundry) context
//! - [`logging::init_test_logging`]: `tracing` output in tests

pub mod kernel;
pub mod logging;
pub mod memory;
pub mod validator;

pub use kernel::{KernelBuilder, TestKernel};
pub use memory::{InMemoryPersistence, MappingRegistry};
pub use validator::{Constraint, ConstraintValidator};
