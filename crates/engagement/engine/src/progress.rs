//! Progress reporting for dashboards
//!
//! Engagement progress is the position of the current state within the
//! canonical sequence; procedure progress is how much of the required
//! sign-off chain holds a valid signature.

use engagement_types::{
    EngagementAction, EngagementState, Procedure, ProcedureAction, ProcedureState, SignoffRole,
};

use crate::{integrity, roles};

/// Engagement completion as a percentage of the canonical state sequence
pub fn engagement_progress(state: EngagementState) -> u8 {
    let last = EngagementState::SEQUENCE.len() - 1;
    ((state.ordinal() * 100) / last) as u8
}

/// Procedure completion: valid sign-off ranks over required chain length.
///
/// Only records matching current content count, so an edit after a
/// signature visibly rolls progress back. Terminal states report 100.
pub fn procedure_progress(procedure: &Procedure) -> u8 {
    if procedure.state.is_terminal() {
        return 100;
    }

    let chain = roles::required_chain(procedure.risk);
    let current = integrity::fingerprint(&procedure.content);
    let valid = procedure
        .active_signoffs()
        .filter(|r| r.fingerprint == current)
        .count()
        .min(chain.len());
    ((valid * 100) / chain.len()) as u8
}

/// The next forward action on the canonical engagement path, or `None`
/// once the engagement is terminal
pub fn next_required_action(state: EngagementState) -> Option<EngagementAction> {
    use EngagementAction as A;
    use EngagementState as S;

    match state {
        S::Draft => Some(A::SubmitForAcceptance),
        S::ClientAcceptance => Some(A::ApproveAcceptance),
        S::Planning => Some(A::BeginRiskAssessment),
        S::RiskAssessment => Some(A::BeginFieldwork),
        S::Fieldwork => Some(A::SubmitForManagerReview),
        S::ManagerReview => Some(A::SubmitForPartnerReview),
        S::PartnerReview => Some(A::SubmitForEqcr),
        S::EqcrReview => Some(A::CompleteEqcr),
        S::Completion => Some(A::BeginReporting),
        S::Reporting => Some(A::IssueReport),
        S::Issued | S::Archived => None,
    }
}

/// The next forward action for a procedure, or `None` once terminal
pub fn next_required_procedure_action(state: ProcedureState) -> Option<ProcedureAction> {
    use ProcedureAction as A;
    use ProcedureState as S;

    match state {
        S::NotStarted => Some(A::Start),
        S::InProgress => Some(A::SubmitForReview),
        S::PendingReview => Some(A::BeginReview),
        S::InReview => Some(A::Sign),
        S::ChangesRequested => Some(A::SubmitForReview),
        S::Approved => Some(A::SignOff),
        S::SignedOff | S::NotApplicable => None,
    }
}

/// The first unfilled sign-off rank, or `None` when the chain is
/// complete or the procedure is terminal
pub fn next_required_signoff(procedure: &Procedure) -> Option<SignoffRole> {
    if procedure.state.is_terminal() {
        return None;
    }
    roles::next_required(&procedure.signoffs, procedure.risk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use engagement_types::{ActorId, EngagementId, RiskLevel, SignoffRecord};

    #[test]
    fn engagement_progress_spans_zero_to_hundred() {
        assert_eq!(engagement_progress(EngagementState::Draft), 0);
        assert_eq!(engagement_progress(EngagementState::Archived), 100);
        let fieldwork = engagement_progress(EngagementState::Fieldwork);
        let reporting = engagement_progress(EngagementState::Reporting);
        assert!(fieldwork > 0 && fieldwork < reporting && reporting < 100);
    }

    #[test]
    fn procedure_progress_counts_valid_ranks() {
        let content = "tested 25 of 25 items";
        let fp = integrity::fingerprint(content);
        let mut proc = Procedure::new(EngagementId::new("eng-1"), "Cash testing", RiskLevel::Low)
            .with_content(content, fp.clone());
        assert_eq!(procedure_progress(&proc), 0);

        proc.signoffs.push(SignoffRecord::new(
            SignoffRole::Preparer,
            ActorId::new("prep-1"),
            fp,
        ));
        assert_eq!(procedure_progress(&proc), 50);
    }

    #[test]
    fn stale_signatures_do_not_count() {
        let mut proc = Procedure::new(EngagementId::new("eng-1"), "Cash testing", RiskLevel::Low);
        let fp = integrity::fingerprint("v1");
        proc = proc.with_content("v1", fp.clone());
        proc.signoffs.push(SignoffRecord::new(
            SignoffRole::Preparer,
            ActorId::new("prep-1"),
            fp,
        ));
        assert_eq!(procedure_progress(&proc), 50);

        proc.content = "v2".to_string();
        assert_eq!(procedure_progress(&proc), 0);
    }

    #[test]
    fn terminal_procedures_report_complete() {
        let mut proc = Procedure::new(EngagementId::new("eng-1"), "Cash testing", RiskLevel::High);
        proc.state = ProcedureState::NotApplicable;
        assert_eq!(procedure_progress(&proc), 100);
        assert_eq!(next_required_signoff(&proc), None);
        assert_eq!(next_required_procedure_action(proc.state), None);
    }

    #[test]
    fn next_action_is_none_only_at_terminal() {
        for state in EngagementState::SEQUENCE {
            assert_eq!(next_required_action(state).is_none(), state.is_terminal());
        }
    }
}
