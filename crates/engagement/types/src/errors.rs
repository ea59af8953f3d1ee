//! Error taxonomy for workflow operations
//!
//! Every variant here is an expected, caller-facing outcome. None of them
//! are fatal: they are returned as typed results and rendered to the
//! caller with the full blocker list, never swallowed.

/// Failures a workflow operation can report
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    /// The action is not a legal edge from the entity's current state
    #[error("illegal transition: '{action}' is not valid from state '{state}'")]
    IllegalTransition { state: String, action: String },

    /// The actor's role or sign-off rank does not permit this action
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// One or more guard preconditions are unmet; all blockers collected
    #[error("preconditions not met: {}", .0.join("; "))]
    PreconditionFailed(Vec<String>),

    /// Content was edited after a sign-off was recorded
    #[error("content modified since prior sign-off")]
    IntegrityMismatch,

    /// Another actor's transition committed first; re-read and retry
    #[error("stale write: expected version {expected}, found {found}")]
    StaleWrite { expected: u64, found: u64 },

    /// The entity does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The persistence collaborator failed
    #[error("storage error: {0}")]
    Storage(String),
}

impl WorkflowError {
    /// Stale writes are always safe to retry after re-reading
    pub fn is_retryable(&self) -> bool {
        matches!(self, WorkflowError::StaleWrite { .. })
    }

    /// Human-readable blockers for checklist rendering.
    ///
    /// `PreconditionFailed` carries its full list; every other variant is
    /// reduced to its display form so callers always get at least one line.
    pub fn blockers(&self) -> Vec<String> {
        match self {
            WorkflowError::PreconditionFailed(blockers) => blockers.clone(),
            other => vec![other.to_string()],
        }
    }
}

/// Result alias for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;
