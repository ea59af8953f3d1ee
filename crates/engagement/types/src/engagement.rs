//! Engagements: one audit job for one client

use crate::{ActorId, EngagementId, EngagementState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One audit engagement.
///
/// Created in `Draft` and mutated only through the engagement workflow
/// controller. The review-note and EQCR-finding counters are snapshots
/// maintained by outside collaborators; `None` means the collaborator
/// data is unavailable, which guards treat as a blocking failure.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Engagement {
    pub id: EngagementId,
    pub client_name: String,
    pub state: EngagementState,
    /// Assigned engagement partner
    pub partner: Option<ActorId>,
    /// Assigned engagement manager
    pub manager: Option<ActorId>,
    /// Assigned preparer
    pub preparer: Option<ActorId>,
    /// Count of open review notes, if known
    pub open_review_notes: Option<u32>,
    /// Count of unresolved EQCR findings, if known
    pub unresolved_eqcr_findings: Option<u32>,
    /// Set when the report is issued
    pub report_released_at: Option<DateTime<Utc>>,
    /// Completion timestamp per milestone, keyed by the state that was left
    pub milestones: HashMap<EngagementState, DateTime<Utc>>,
    /// Optimistic-concurrency version counter
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Engagement {
    pub fn new(client_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EngagementId::generate(),
            client_name: client_name.into(),
            state: EngagementState::Draft,
            partner: None,
            manager: None,
            preparer: None,
            open_review_notes: Some(0),
            unresolved_eqcr_findings: Some(0),
            report_released_at: None,
            milestones: HashMap::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: EngagementId) -> Self {
        self.id = id;
        self
    }

    pub fn with_partner(mut self, partner: ActorId) -> Self {
        self.partner = Some(partner);
        self
    }

    pub fn with_manager(mut self, manager: ActorId) -> Self {
        self.manager = Some(manager);
        self
    }

    pub fn with_preparer(mut self, preparer: ActorId) -> Self {
        self.preparer = Some(preparer);
        self
    }

    /// Record the completion timestamp for a milestone being left
    pub fn record_milestone(&mut self, state: EngagementState, at: DateTime<Utc>) {
        self.milestones.insert(state, at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_engagement_is_a_draft() {
        let engagement = Engagement::new("Acme Holdings");
        assert_eq!(engagement.state, EngagementState::Draft);
        assert_eq!(engagement.version, 0);
        assert!(engagement.partner.is_none());
        assert_eq!(engagement.open_review_notes, Some(0));
    }

    #[test]
    fn milestones_record_per_state() {
        let mut engagement = Engagement::new("Acme Holdings")
            .with_partner(ActorId::new("partner-1"))
            .with_manager(ActorId::new("manager-1"));
        let now = Utc::now();
        engagement.record_milestone(EngagementState::Draft, now);

        assert_eq!(engagement.milestones.get(&EngagementState::Draft), Some(&now));
        assert!(engagement.milestones.get(&EngagementState::Planning).is_none());
    }
}
