//! Persistence contract for the engagement workflow engine
//!
//! The engine never talks to a database directly; it talks to the traits
//! in this crate. Conditional-write semantics are part of the contract:
//! a commit carries the version observed at validation time, and the
//! store refuses it if another writer got there first.
//!
//! The in-memory adapter is the deterministic, test-friendly reference
//! implementation. Production deployments back these traits with a
//! transactional store that supports conditional writes.

#![deny(unsafe_code)]

mod error;
mod memory;
mod traits;

pub use error::{StorageError, StorageResult};
pub use memory::InMemoryWorkflowStore;
pub use traits::{AuditTrailStore, EngagementStore, ProcedureStore, QueryWindow, WorkflowStore};
