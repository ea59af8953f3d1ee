//! Application state for API handlers

use engagement_engine::{EngagementController, ProcedureController};
use engagement_storage::InMemoryWorkflowStore;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Engagement lifecycle controller
    pub engagements: Arc<EngagementController<InMemoryWorkflowStore>>,

    /// Procedure lifecycle controller
    pub procedures: Arc<ProcedureController<InMemoryWorkflowStore>>,

    /// Daemon version
    pub version: String,

    /// Daemon start time
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Create new application state over one shared store.
    ///
    /// Both controllers share the store so cross-lifecycle guards (an
    /// engagement gate over its procedures) see the same data.
    pub fn new(store: Arc<InMemoryWorkflowStore>) -> Self {
        Self {
            engagements: Arc::new(EngagementController::new(store.clone())),
            procedures: Arc::new(ProcedureController::new(store)),
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// Human-readable uptime
    pub fn uptime(&self) -> String {
        let elapsed = chrono::Utc::now() - self.started_at;
        format!("{}s", elapsed.num_seconds().max(0))
    }
}
