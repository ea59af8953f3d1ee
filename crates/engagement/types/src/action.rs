//! Workflow actions for the two lifecycles

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Actions a caller may request on an engagement
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementAction {
    SubmitForAcceptance,
    ApproveAcceptance,
    ReturnToDraft,
    BeginRiskAssessment,
    BeginFieldwork,
    SubmitForManagerReview,
    ReturnToFieldwork,
    SubmitForPartnerReview,
    ReturnToManagerReview,
    SubmitForEqcr,
    ReturnToPartnerReview,
    CompleteEqcr,
    BeginReporting,
    IssueReport,
    Archive,
    Reopen,
}

impl EngagementAction {
    /// Every declared engagement action
    pub const ALL: [EngagementAction; 16] = [
        EngagementAction::SubmitForAcceptance,
        EngagementAction::ApproveAcceptance,
        EngagementAction::ReturnToDraft,
        EngagementAction::BeginRiskAssessment,
        EngagementAction::BeginFieldwork,
        EngagementAction::SubmitForManagerReview,
        EngagementAction::ReturnToFieldwork,
        EngagementAction::SubmitForPartnerReview,
        EngagementAction::ReturnToManagerReview,
        EngagementAction::SubmitForEqcr,
        EngagementAction::ReturnToPartnerReview,
        EngagementAction::CompleteEqcr,
        EngagementAction::BeginReporting,
        EngagementAction::IssueReport,
        EngagementAction::Archive,
        EngagementAction::Reopen,
    ];
}

impl fmt::Display for EngagementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngagementAction::SubmitForAcceptance => "submit_for_acceptance",
            EngagementAction::ApproveAcceptance => "approve_acceptance",
            EngagementAction::ReturnToDraft => "return_to_draft",
            EngagementAction::BeginRiskAssessment => "begin_risk_assessment",
            EngagementAction::BeginFieldwork => "begin_fieldwork",
            EngagementAction::SubmitForManagerReview => "submit_for_manager_review",
            EngagementAction::ReturnToFieldwork => "return_to_fieldwork",
            EngagementAction::SubmitForPartnerReview => "submit_for_partner_review",
            EngagementAction::ReturnToManagerReview => "return_to_manager_review",
            EngagementAction::SubmitForEqcr => "submit_for_eqcr",
            EngagementAction::ReturnToPartnerReview => "return_to_partner_review",
            EngagementAction::CompleteEqcr => "complete_eqcr",
            EngagementAction::BeginReporting => "begin_reporting",
            EngagementAction::IssueReport => "issue_report",
            EngagementAction::Archive => "archive",
            EngagementAction::Reopen => "reopen",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for EngagementAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.to_string() == s)
            .ok_or_else(|| format!("unknown engagement action: {}", s))
    }
}

/// Actions a caller may request on a procedure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcedureAction {
    Start,
    MarkNotApplicable,
    SubmitForReview,
    RecallSubmission,
    BeginReview,
    Sign,
    RequestChanges,
    Approve,
    SignOff,
    Reopen,
}

impl ProcedureAction {
    /// Every declared procedure action
    pub const ALL: [ProcedureAction; 10] = [
        ProcedureAction::Start,
        ProcedureAction::MarkNotApplicable,
        ProcedureAction::SubmitForReview,
        ProcedureAction::RecallSubmission,
        ProcedureAction::BeginReview,
        ProcedureAction::Sign,
        ProcedureAction::RequestChanges,
        ProcedureAction::Approve,
        ProcedureAction::SignOff,
        ProcedureAction::Reopen,
    ];
}

impl fmt::Display for ProcedureAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcedureAction::Start => "start",
            ProcedureAction::MarkNotApplicable => "mark_not_applicable",
            ProcedureAction::SubmitForReview => "submit_for_review",
            ProcedureAction::RecallSubmission => "recall_submission",
            ProcedureAction::BeginReview => "begin_review",
            ProcedureAction::Sign => "sign",
            ProcedureAction::RequestChanges => "request_changes",
            ProcedureAction::Approve => "approve",
            ProcedureAction::SignOff => "sign_off",
            ProcedureAction::Reopen => "reopen",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ProcedureAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.to_string() == s)
            .ok_or_else(|| format!("unknown procedure action: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engagement_actions_round_trip_through_names() {
        for action in EngagementAction::ALL {
            let parsed: EngagementAction = action.to_string().parse().unwrap();
            assert_eq!(parsed, action);
        }
    }

    #[test]
    fn procedure_actions_round_trip_through_names() {
        for action in ProcedureAction::ALL {
            let parsed: ProcedureAction = action.to_string().parse().unwrap();
            assert_eq!(parsed, action);
        }
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!("delete_everything".parse::<EngagementAction>().is_err());
        assert!("skip_review".parse::<ProcedureAction>().is_err());
    }
}
