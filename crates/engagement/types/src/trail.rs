//! Append-only audit trail of attempted and committed transitions

use crate::{Actor, ActorId, SignoffRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Which of the two state machines an entry belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Engagement,
    Procedure,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Engagement => write!(f, "engagement"),
            Lifecycle::Procedure => write!(f, "procedure"),
        }
    }
}

/// How an attempted transition ended
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailOutcome {
    /// The transition committed
    Committed,
    /// The transition was rejected with the listed blockers
    Rejected { blockers: Vec<String> },
}

/// One line of the audit trail.
///
/// Appended for every attempted transition, rejected ones included, and
/// never mutated afterwards. State and action fields are stored as their
/// canonical names so one trail covers both lifecycles.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditTrailEntry {
    pub entry_id: String,
    pub entity_id: String,
    pub lifecycle: Lifecycle,
    pub action: String,
    pub actor: ActorId,
    pub actor_role: SignoffRole,
    pub from_state: String,
    /// Present only when the transition committed
    pub to_state: Option<String>,
    pub outcome: TrailOutcome,
    pub timestamp: DateTime<Utc>,
}

impl AuditTrailEntry {
    /// Entry for a committed transition
    pub fn committed(
        lifecycle: Lifecycle,
        entity_id: impl Into<String>,
        action: impl Into<String>,
        actor: &Actor,
        from_state: impl Into<String>,
        to_state: impl Into<String>,
    ) -> Self {
        Self {
            entry_id: format!("trail-{}", Uuid::new_v4()),
            entity_id: entity_id.into(),
            lifecycle,
            action: action.into(),
            actor: actor.id.clone(),
            actor_role: actor.role,
            from_state: from_state.into(),
            to_state: Some(to_state.into()),
            outcome: TrailOutcome::Committed,
            timestamp: Utc::now(),
        }
    }

    /// Entry for a rejected attempt, carrying the blockers reported
    pub fn rejected(
        lifecycle: Lifecycle,
        entity_id: impl Into<String>,
        action: impl Into<String>,
        actor: &Actor,
        from_state: impl Into<String>,
        blockers: Vec<String>,
    ) -> Self {
        Self {
            entry_id: format!("trail-{}", Uuid::new_v4()),
            entity_id: entity_id.into(),
            lifecycle,
            action: action.into(),
            actor: actor.id.clone(),
            actor_role: actor.role,
            from_state: from_state.into(),
            to_state: None,
            outcome: TrailOutcome::Rejected { blockers },
            timestamp: Utc::now(),
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self.outcome, TrailOutcome::Committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn committed_entry_carries_both_states() {
        let actor = Actor::new("mgr-1", SignoffRole::Manager);
        let entry = AuditTrailEntry::committed(
            Lifecycle::Engagement,
            "eng-1",
            "begin_fieldwork",
            &actor,
            "risk_assessment",
            "fieldwork",
        );
        assert!(entry.is_committed());
        assert_eq!(entry.to_state.as_deref(), Some("fieldwork"));
    }

    #[test]
    fn rejected_entry_keeps_blockers() {
        let actor = Actor::new("prep-1", SignoffRole::Preparer);
        let entry = AuditTrailEntry::rejected(
            Lifecycle::Procedure,
            "proc-1",
            "sign_off",
            &actor,
            "approved",
            vec!["content modified since prior sign-off".into()],
        );
        assert!(!entry.is_committed());
        match entry.outcome {
            TrailOutcome::Rejected { ref blockers } => assert_eq!(blockers.len(), 1),
            _ => panic!("expected rejection"),
        }
    }
}
