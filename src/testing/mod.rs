//! Unified testing utilities
//!
//! Shared by the crate's own unit tests and by integration tests under
//! `tests/`, which is why the module is compiled unconditionally.
//!
//! - [`fixtures`] - Pre-built settings and managers
//! - [`mock`] - Mock storage handlers (in-memory, always-failing)

pub mod fixtures;
pub mod mock;

pub use fixtures::TestFixtures;
pub use mock::{FailingHandler, MemoryHandler};
