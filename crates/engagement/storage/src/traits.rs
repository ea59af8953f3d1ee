//! Storage traits for workflow entities

use crate::StorageResult;
use async_trait::async_trait;
use engagement_types::{
    AuditTrailEntry, Engagement, EngagementId, Procedure, ProcedureId,
};

/// Generic query window for paged reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryWindow {
    pub limit: usize,
    pub offset: usize,
}

/// Storage interface for engagement records.
///
/// `commit_engagement` is the only mutation path after insert: it writes
/// the updated record and appends its trail entries as one unit, refusing
/// with a version conflict when `expected_version` no longer matches the
/// stored record.
#[async_trait]
pub trait EngagementStore: Send + Sync {
    /// Insert a newly created engagement.
    async fn insert_engagement(&self, engagement: Engagement) -> StorageResult<()>;

    /// Get one engagement by id.
    async fn get_engagement(&self, id: &EngagementId) -> StorageResult<Option<Engagement>>;

    /// List all procedures owned by an engagement.
    async fn list_engagement_procedures(
        &self,
        id: &EngagementId,
    ) -> StorageResult<Vec<Procedure>>;

    /// Conditionally write an updated engagement plus its trail entries.
    async fn commit_engagement(
        &self,
        engagement: Engagement,
        expected_version: u64,
        trail: Vec<AuditTrailEntry>,
    ) -> StorageResult<()>;
}

/// Storage interface for procedure records.
#[async_trait]
pub trait ProcedureStore: Send + Sync {
    /// Insert a newly created procedure.
    async fn insert_procedure(&self, procedure: Procedure) -> StorageResult<()>;

    /// Get one procedure by id.
    async fn get_procedure(&self, id: &ProcedureId) -> StorageResult<Option<Procedure>>;

    /// Conditionally write an updated procedure plus its trail entries.
    async fn commit_procedure(
        &self,
        procedure: Procedure,
        expected_version: u64,
        trail: Vec<AuditTrailEntry>,
    ) -> StorageResult<()>;
}

/// Storage interface for the append-only audit trail.
#[async_trait]
pub trait AuditTrailStore: Send + Sync {
    /// Append one entry outside a commit (rejected attempts).
    async fn append_trail(&self, entry: AuditTrailEntry) -> StorageResult<()>;

    /// Read entries for one entity, newest-first.
    async fn list_trail(
        &self,
        entity_id: &str,
        window: QueryWindow,
    ) -> StorageResult<Vec<AuditTrailEntry>>;
}

/// Unified storage bundle consumed by the workflow controllers.
pub trait WorkflowStore: EngagementStore + ProcedureStore + AuditTrailStore + Send + Sync {}

impl<T> WorkflowStore for T where T: EngagementStore + ProcedureStore + AuditTrailStore + Send + Sync {}
