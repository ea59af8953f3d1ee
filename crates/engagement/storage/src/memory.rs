//! In-memory reference implementation of the workflow storage traits.
//!
//! Deterministic and test-friendly. All collections live behind a single
//! lock so a commit (entity write plus trail append) is one critical
//! section: either everything lands or nothing does.

use crate::traits::{AuditTrailStore, EngagementStore, ProcedureStore, QueryWindow};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use engagement_types::{
    AuditTrailEntry, Engagement, EngagementId, Procedure, ProcedureId,
};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
struct Inner {
    engagements: HashMap<EngagementId, Engagement>,
    procedures: HashMap<ProcedureId, Procedure>,
    trail: Vec<AuditTrailEntry>,
}

/// In-memory workflow storage adapter.
#[derive(Default)]
pub struct InMemoryWorkflowStore {
    inner: RwLock<Inner>,
}

impl InMemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(_: impl std::fmt::Debug) -> StorageError {
    StorageError::Backend("workflow store lock poisoned".to_string())
}

fn apply_window<T>(items: Vec<T>, window: QueryWindow) -> Vec<T> {
    let iter = items.into_iter().skip(window.offset);
    if window.limit == 0 {
        iter.collect()
    } else {
        iter.take(window.limit).collect()
    }
}

#[async_trait]
impl EngagementStore for InMemoryWorkflowStore {
    async fn insert_engagement(&self, engagement: Engagement) -> StorageResult<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if inner.engagements.contains_key(&engagement.id) {
            return Err(StorageError::Conflict(format!(
                "engagement {} already exists",
                engagement.id
            )));
        }
        inner.engagements.insert(engagement.id.clone(), engagement);
        Ok(())
    }

    async fn get_engagement(&self, id: &EngagementId) -> StorageResult<Option<Engagement>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.engagements.get(id).cloned())
    }

    async fn list_engagement_procedures(
        &self,
        id: &EngagementId,
    ) -> StorageResult<Vec<Procedure>> {
        let inner = self.inner.read().map_err(poisoned)?;
        let mut procedures = inner
            .procedures
            .values()
            .filter(|p| p.engagement_id == *id)
            .cloned()
            .collect::<Vec<_>>();
        procedures.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(procedures)
    }

    async fn commit_engagement(
        &self,
        engagement: Engagement,
        expected_version: u64,
        trail: Vec<AuditTrailEntry>,
    ) -> StorageResult<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let stored = inner.engagements.get(&engagement.id).ok_or_else(|| {
            StorageError::NotFound(format!("engagement {} not found", engagement.id))
        })?;

        if stored.version != expected_version {
            return Err(StorageError::VersionConflict {
                expected: expected_version,
                found: stored.version,
            });
        }

        inner.engagements.insert(engagement.id.clone(), engagement);
        inner.trail.extend(trail);
        Ok(())
    }
}

#[async_trait]
impl ProcedureStore for InMemoryWorkflowStore {
    async fn insert_procedure(&self, procedure: Procedure) -> StorageResult<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if inner.procedures.contains_key(&procedure.id) {
            return Err(StorageError::Conflict(format!(
                "procedure {} already exists",
                procedure.id
            )));
        }
        inner.procedures.insert(procedure.id.clone(), procedure);
        Ok(())
    }

    async fn get_procedure(&self, id: &ProcedureId) -> StorageResult<Option<Procedure>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.procedures.get(id).cloned())
    }

    async fn commit_procedure(
        &self,
        procedure: Procedure,
        expected_version: u64,
        trail: Vec<AuditTrailEntry>,
    ) -> StorageResult<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let stored = inner.procedures.get(&procedure.id).ok_or_else(|| {
            StorageError::NotFound(format!("procedure {} not found", procedure.id))
        })?;

        if stored.version != expected_version {
            return Err(StorageError::VersionConflict {
                expected: expected_version,
                found: stored.version,
            });
        }

        inner.procedures.insert(procedure.id.clone(), procedure);
        inner.trail.extend(trail);
        Ok(())
    }
}

#[async_trait]
impl AuditTrailStore for InMemoryWorkflowStore {
    async fn append_trail(&self, entry: AuditTrailEntry) -> StorageResult<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.trail.push(entry);
        Ok(())
    }

    async fn list_trail(
        &self,
        entity_id: &str,
        window: QueryWindow,
    ) -> StorageResult<Vec<AuditTrailEntry>> {
        let inner = self.inner.read().map_err(poisoned)?;
        let mut entries = inner
            .trail
            .iter()
            .filter(|e| e.entity_id == entity_id)
            .cloned()
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(apply_window(entries, window))
    }
}
