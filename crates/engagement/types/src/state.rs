//! Lifecycle states for the two workflow state machines

use serde::{Deserialize, Serialize};
use std::fmt;

/// Engagement lifecycle states, declared in canonical order.
///
/// `Issued` and `Archived` are terminal: the only action permitted out of
/// them is `Reopen`, under restricted authorization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementState {
    Draft,
    ClientAcceptance,
    Planning,
    RiskAssessment,
    Fieldwork,
    ManagerReview,
    PartnerReview,
    EqcrReview,
    Completion,
    Reporting,
    Issued,
    Archived,
}

impl EngagementState {
    /// The canonical ordered sequence, used for progress reporting
    pub const SEQUENCE: [EngagementState; 12] = [
        EngagementState::Draft,
        EngagementState::ClientAcceptance,
        EngagementState::Planning,
        EngagementState::RiskAssessment,
        EngagementState::Fieldwork,
        EngagementState::ManagerReview,
        EngagementState::PartnerReview,
        EngagementState::EqcrReview,
        EngagementState::Completion,
        EngagementState::Reporting,
        EngagementState::Issued,
        EngagementState::Archived,
    ];

    /// Position of this state within the canonical sequence
    pub fn ordinal(&self) -> usize {
        Self::SEQUENCE
            .iter()
            .position(|s| s == self)
            .unwrap_or_default()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, EngagementState::Issued | EngagementState::Archived)
    }
}

impl fmt::Display for EngagementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngagementState::Draft => "draft",
            EngagementState::ClientAcceptance => "client_acceptance",
            EngagementState::Planning => "planning",
            EngagementState::RiskAssessment => "risk_assessment",
            EngagementState::Fieldwork => "fieldwork",
            EngagementState::ManagerReview => "manager_review",
            EngagementState::PartnerReview => "partner_review",
            EngagementState::EqcrReview => "eqcr_review",
            EngagementState::Completion => "completion",
            EngagementState::Reporting => "reporting",
            EngagementState::Issued => "issued",
            EngagementState::Archived => "archived",
        };
        write!(f, "{}", name)
    }
}

/// Procedure sign-off lifecycle states.
///
/// `SignedOff` and `NotApplicable` are terminal; `ChangesRequested` hands
/// control back to the preparer and invalidates sign-offs at or above the
/// requesting reviewer's rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcedureState {
    NotStarted,
    InProgress,
    PendingReview,
    InReview,
    ChangesRequested,
    Approved,
    SignedOff,
    NotApplicable,
}

impl ProcedureState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProcedureState::SignedOff | ProcedureState::NotApplicable
        )
    }
}

impl fmt::Display for ProcedureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcedureState::NotStarted => "not_started",
            ProcedureState::InProgress => "in_progress",
            ProcedureState::PendingReview => "pending_review",
            ProcedureState::InReview => "in_review",
            ProcedureState::ChangesRequested => "changes_requested",
            ProcedureState::Approved => "approved",
            ProcedureState::SignedOff => "signed_off",
            ProcedureState::NotApplicable => "not_applicable",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_covers_twelve_states() {
        assert_eq!(EngagementState::SEQUENCE.len(), 12);
        assert_eq!(EngagementState::Draft.ordinal(), 0);
        assert_eq!(EngagementState::Archived.ordinal(), 11);
    }

    #[test]
    fn terminal_states() {
        assert!(EngagementState::Issued.is_terminal());
        assert!(EngagementState::Archived.is_terminal());
        assert!(!EngagementState::Reporting.is_terminal());

        assert!(ProcedureState::SignedOff.is_terminal());
        assert!(ProcedureState::NotApplicable.is_terminal());
        assert!(!ProcedureState::ChangesRequested.is_terminal());
    }

    #[test]
    fn states_serialize_as_snake_case() {
        let json = serde_json::to_string(&EngagementState::EqcrReview).unwrap();
        assert_eq!(json, "\"eqcr_review\"");
        let json = serde_json::to_string(&ProcedureState::PendingReview).unwrap();
        assert_eq!(json, "\"pending_review\"");
    }
}
