//! Role hierarchy: sign-off chains and per-action allow-lists
//!
//! The hierarchy is a total order over sign-off roles. Risk level selects
//! a prefix of it as the required chain; ranks fill strictly in order and
//! an actor signs exactly at their own rank. Initiation allow-lists are
//! separate from the chain: they say who may request an action at all.

use engagement_types::{
    EngagementAction, ProcedureAction, RiskLevel, SignoffRecord, SignoffRole,
};

/// The full hierarchy, ascending
pub const HIERARCHY: [SignoffRole; 5] = [
    SignoffRole::Preparer,
    SignoffRole::Reviewer,
    SignoffRole::SeniorReviewer,
    SignoffRole::Manager,
    SignoffRole::Partner,
];

/// The ordered chain of ranks a procedure of this risk must collect.
///
/// Higher risk takes a longer prefix of the hierarchy; critical risk
/// requires the full chain through partner.
pub fn required_chain(risk: RiskLevel) -> &'static [SignoffRole] {
    match risk {
        RiskLevel::Low => &HIERARCHY[..2],
        RiskLevel::Medium => &HIERARCHY[..3],
        RiskLevel::High => &HIERARCHY[..4],
        RiskLevel::Critical => &HIERARCHY[..],
    }
}

/// The first rank of the chain without an active sign-off record, or
/// `None` when the chain is complete.
pub fn next_required(signoffs: &[SignoffRecord], risk: RiskLevel) -> Option<SignoffRole> {
    required_chain(risk)
        .iter()
        .copied()
        .find(|rank| !signoffs.iter().any(|r| r.is_active() && r.role == *rank))
}

/// Whether an actor may fill the next required rank.
///
/// Ranks cannot be skipped or signed out of order, an actor may not sign
/// a rank other than their own, and a filled rank is never re-signed
/// (the caller only ever passes the next *unfilled* rank here).
pub fn can_sign(actor_role: SignoffRole, next_required: SignoffRole) -> bool {
    actor_role == next_required
}

/// Roles permitted to initiate an engagement action
pub fn engagement_action_roles(action: EngagementAction) -> &'static [SignoffRole] {
    use EngagementAction as A;
    use SignoffRole as R;

    match action {
        A::SubmitForAcceptance => &[R::Preparer, R::Manager, R::Partner],
        A::ApproveAcceptance => &[R::Partner],
        A::ReturnToDraft => &[R::Manager, R::Partner],
        A::BeginRiskAssessment => &[R::Manager, R::Partner],
        A::BeginFieldwork => &[R::Manager, R::Partner],
        A::SubmitForManagerReview => &[R::Preparer, R::Reviewer, R::SeniorReviewer],
        A::ReturnToFieldwork => &[R::Manager, R::Partner],
        A::SubmitForPartnerReview => &[R::Manager],
        A::ReturnToManagerReview => &[R::Partner],
        A::SubmitForEqcr => &[R::Partner],
        A::ReturnToPartnerReview => &[R::Partner],
        A::CompleteEqcr => &[R::Partner],
        A::BeginReporting => &[R::Manager, R::Partner],
        A::IssueReport => &[R::Partner],
        A::Archive => &[R::Manager, R::Partner],
        // Reopening issued or archived work is partner-only
        A::Reopen => &[R::Partner],
    }
}

/// Roles permitted to initiate a procedure action.
///
/// `Sign` is open to the whole hierarchy here; the chain position check
/// in the controller decides whose signature actually lands.
pub fn procedure_action_roles(action: ProcedureAction) -> &'static [SignoffRole] {
    use ProcedureAction as A;
    use SignoffRole as R;

    match action {
        A::Start => &[R::Preparer],
        A::MarkNotApplicable => &HIERARCHY,
        A::SubmitForReview => &[R::Preparer],
        A::RecallSubmission => &[R::Preparer],
        A::BeginReview => &[R::Reviewer, R::SeniorReviewer, R::Manager, R::Partner],
        A::Sign => &HIERARCHY,
        A::RequestChanges => &[R::Reviewer, R::SeniorReviewer, R::Manager, R::Partner],
        A::Approve => &[R::Manager, R::Partner],
        A::SignOff => &[R::Manager, R::Partner],
        A::Reopen => &[R::Manager, R::Partner],
    }
}

pub fn is_engagement_role_allowed(action: EngagementAction, role: SignoffRole) -> bool {
    engagement_action_roles(action).contains(&role)
}

pub fn is_procedure_role_allowed(action: ProcedureAction, role: SignoffRole) -> bool {
    procedure_action_roles(action).contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use engagement_types::{ActorId, ContentFingerprint};

    fn record(role: SignoffRole) -> SignoffRecord {
        SignoffRecord::new(role, ActorId::new("a"), ContentFingerprint::new("f1"))
    }

    #[test]
    fn chain_length_grows_with_risk() {
        assert_eq!(required_chain(RiskLevel::Low).len(), 2);
        assert_eq!(required_chain(RiskLevel::Medium).len(), 3);
        assert_eq!(required_chain(RiskLevel::High).len(), 4);
        assert_eq!(required_chain(RiskLevel::Critical).len(), 5);
        assert_eq!(
            required_chain(RiskLevel::Critical).last(),
            Some(&SignoffRole::Partner)
        );
    }

    #[test]
    fn chains_are_prefixes_of_the_hierarchy() {
        for risk in [
            RiskLevel::Low,
            RiskLevel::Medium,
            RiskLevel::High,
            RiskLevel::Critical,
        ] {
            let chain = required_chain(risk);
            assert_eq!(chain, &HIERARCHY[..chain.len()]);
        }
    }

    #[test]
    fn next_required_fills_in_order() {
        let mut signoffs = Vec::new();
        assert_eq!(
            next_required(&signoffs, RiskLevel::High),
            Some(SignoffRole::Preparer)
        );

        signoffs.push(record(SignoffRole::Preparer));
        assert_eq!(
            next_required(&signoffs, RiskLevel::High),
            Some(SignoffRole::Reviewer)
        );

        signoffs.push(record(SignoffRole::Reviewer));
        signoffs.push(record(SignoffRole::SeniorReviewer));
        signoffs.push(record(SignoffRole::Manager));
        assert_eq!(next_required(&signoffs, RiskLevel::High), None);
    }

    #[test]
    fn superseded_records_reopen_their_rank() {
        let mut signoffs = vec![record(SignoffRole::Preparer), record(SignoffRole::Reviewer)];
        signoffs[1].superseded = true;
        assert_eq!(
            next_required(&signoffs, RiskLevel::Low),
            Some(SignoffRole::Reviewer)
        );
    }

    #[test]
    fn sign_only_at_own_rank() {
        assert!(can_sign(SignoffRole::Reviewer, SignoffRole::Reviewer));
        assert!(!can_sign(SignoffRole::Manager, SignoffRole::Reviewer));
        assert!(!can_sign(SignoffRole::Preparer, SignoffRole::Reviewer));
    }

    #[test]
    fn issue_and_reopen_are_partner_only() {
        assert!(is_engagement_role_allowed(
            EngagementAction::IssueReport,
            SignoffRole::Partner
        ));
        assert!(!is_engagement_role_allowed(
            EngagementAction::IssueReport,
            SignoffRole::Manager
        ));
        assert!(!is_engagement_role_allowed(
            EngagementAction::Reopen,
            SignoffRole::Manager
        ));
    }

    #[test]
    fn preparer_cannot_begin_review() {
        assert!(!is_procedure_role_allowed(
            ProcedureAction::BeginReview,
            SignoffRole::Preparer
        ));
        assert!(is_procedure_role_allowed(
            ProcedureAction::BeginReview,
            SignoffRole::Reviewer
        ));
    }
}
