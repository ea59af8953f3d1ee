//! Transition tables: the legal edges of both lifecycles
//!
//! Pure data expressed as exhaustive matches, so adding a state or an
//! action forces every table through the compiler. No two rows share a
//! `(state, action)` key; the unique next state is the return value.
//! `Reopen` is the only action permitted out of a terminal state.

use engagement_types::{EngagementAction, EngagementState, ProcedureAction, ProcedureState};

/// Look up the unique next state for an engagement edge, or `None` when
/// the action is not legal from the current state.
pub fn engagement_next_state(
    state: EngagementState,
    action: EngagementAction,
) -> Option<EngagementState> {
    use EngagementAction as A;
    use EngagementState as S;

    match (state, action) {
        (S::Draft, A::SubmitForAcceptance) => Some(S::ClientAcceptance),
        (S::ClientAcceptance, A::ApproveAcceptance) => Some(S::Planning),
        (S::ClientAcceptance, A::ReturnToDraft) => Some(S::Draft),
        (S::Planning, A::BeginRiskAssessment) => Some(S::RiskAssessment),
        (S::RiskAssessment, A::BeginFieldwork) => Some(S::Fieldwork),
        (S::Fieldwork, A::SubmitForManagerReview) => Some(S::ManagerReview),
        (S::ManagerReview, A::ReturnToFieldwork) => Some(S::Fieldwork),
        (S::ManagerReview, A::SubmitForPartnerReview) => Some(S::PartnerReview),
        (S::PartnerReview, A::ReturnToManagerReview) => Some(S::ManagerReview),
        (S::PartnerReview, A::SubmitForEqcr) => Some(S::EqcrReview),
        (S::EqcrReview, A::ReturnToPartnerReview) => Some(S::PartnerReview),
        (S::EqcrReview, A::CompleteEqcr) => Some(S::Completion),
        (S::Completion, A::BeginReporting) => Some(S::Reporting),
        (S::Reporting, A::IssueReport) => Some(S::Issued),
        (S::Issued, A::Archive) => Some(S::Archived),
        // Reopening terminal states, under restricted authorization
        (S::Issued, A::Reopen) => Some(S::Fieldwork),
        (S::Archived, A::Reopen) => Some(S::Issued),
        _ => None,
    }
}

/// All engagement actions legal from the given state
pub fn engagement_available_actions(state: EngagementState) -> Vec<EngagementAction> {
    EngagementAction::ALL
        .iter()
        .copied()
        .filter(|action| engagement_next_state(state, *action).is_some())
        .collect()
}

/// Look up the unique next state for a procedure edge, or `None` when
/// the action is not legal from the current state.
pub fn procedure_next_state(
    state: ProcedureState,
    action: ProcedureAction,
) -> Option<ProcedureState> {
    use ProcedureAction as A;
    use ProcedureState as S;

    match (state, action) {
        (S::NotStarted, A::Start) => Some(S::InProgress),
        (S::NotStarted, A::MarkNotApplicable) => Some(S::NotApplicable),
        (S::InProgress, A::SubmitForReview) => Some(S::PendingReview),
        (S::InProgress, A::MarkNotApplicable) => Some(S::NotApplicable),
        (S::PendingReview, A::BeginReview) => Some(S::InReview),
        (S::PendingReview, A::RecallSubmission) => Some(S::InProgress),
        // Signing fills the next rank of the chain; the state stays put
        (S::InReview, A::Sign) => Some(S::InReview),
        (S::InReview, A::RequestChanges) => Some(S::ChangesRequested),
        (S::InReview, A::Approve) => Some(S::Approved),
        (S::ChangesRequested, A::SubmitForReview) => Some(S::PendingReview),
        (S::Approved, A::RequestChanges) => Some(S::ChangesRequested),
        (S::Approved, A::SignOff) => Some(S::SignedOff),
        // Reopening terminal states
        (S::SignedOff, A::Reopen) => Some(S::ChangesRequested),
        (S::NotApplicable, A::Reopen) => Some(S::NotStarted),
        _ => None,
    }
}

/// All procedure actions legal from the given state
pub fn procedure_available_actions(state: ProcedureState) -> Vec<ProcedureAction> {
    ProcedureAction::ALL
        .iter()
        .copied()
        .filter(|action| procedure_next_state(state, *action).is_some())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_engagement_states_only_allow_reopen() {
        for state in [EngagementState::Issued, EngagementState::Archived] {
            for action in EngagementAction::ALL {
                let legal = engagement_next_state(state, action).is_some();
                if action == EngagementAction::Reopen {
                    assert!(legal, "reopen must be legal from {}", state);
                } else if state == EngagementState::Issued && action == EngagementAction::Archive {
                    assert!(legal);
                } else {
                    assert!(!legal, "{} must be illegal from {}", action, state);
                }
            }
        }
    }

    #[test]
    fn terminal_procedure_states_only_allow_reopen() {
        for state in [ProcedureState::SignedOff, ProcedureState::NotApplicable] {
            for action in ProcedureAction::ALL {
                let legal = procedure_next_state(state, action).is_some();
                assert_eq!(
                    legal,
                    action == ProcedureAction::Reopen,
                    "{} from {}",
                    action,
                    state
                );
            }
        }
    }

    #[test]
    fn non_terminal_states_have_no_reopen() {
        for state in EngagementState::SEQUENCE {
            if !state.is_terminal() {
                assert!(engagement_next_state(state, EngagementAction::Reopen).is_none());
            }
        }
    }

    #[test]
    fn available_actions_match_the_table() {
        let actions = engagement_available_actions(EngagementState::ManagerReview);
        assert!(actions.contains(&EngagementAction::ReturnToFieldwork));
        assert!(actions.contains(&EngagementAction::SubmitForPartnerReview));
        assert_eq!(actions.len(), 2);

        let actions = procedure_available_actions(ProcedureState::InReview);
        assert!(actions.contains(&ProcedureAction::Sign));
        assert!(actions.contains(&ProcedureAction::RequestChanges));
        assert!(actions.contains(&ProcedureAction::Approve));
        assert_eq!(actions.len(), 3);
    }

    #[test]
    fn every_non_terminal_state_has_an_exit() {
        for state in EngagementState::SEQUENCE {
            assert!(
                !engagement_available_actions(state).is_empty(),
                "{} is a dead end",
                state
            );
        }
        for state in [
            ProcedureState::NotStarted,
            ProcedureState::InProgress,
            ProcedureState::PendingReview,
            ProcedureState::InReview,
            ProcedureState::ChangesRequested,
            ProcedureState::Approved,
            ProcedureState::SignedOff,
            ProcedureState::NotApplicable,
        ] {
            assert!(
                !procedure_available_actions(state).is_empty(),
                "{} is a dead end",
                state
            );
        }
    }
}
