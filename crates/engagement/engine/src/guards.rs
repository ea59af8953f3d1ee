//! Guard evaluator: preconditions that must hold before a transition
//!
//! Guards are small, independently testable predicates. They inspect an
//! entity snapshot and return pass/fail with human-readable reasons; they
//! never produce side effects. Evaluation collects *all* blockers rather
//! than failing fast, so a single failed call gives the caller a complete
//! checklist. A guard that cannot determine an answer (missing
//! collaborator data) blocks with a descriptive reason - the evaluator
//! fails closed, never open.
//!
//! The guard table is data: controllers are built with a default
//! [`GuardSet`] covering firm policy, and callers can register their own.

use engagement_types::{
    Engagement, EngagementAction, Procedure, ProcedureAction, ProcedureState,
};
use std::collections::HashMap;
use std::hash::Hash;

use crate::{integrity, roles};

/// Result of evaluating a single guard
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardResult {
    /// The precondition holds
    Pass,
    /// The precondition does not hold, with one reason per violation
    Blocked { reasons: Vec<String> },
}

impl GuardResult {
    pub fn blocked(reason: impl Into<String>) -> Self {
        GuardResult::Blocked {
            reasons: vec![reason.into()],
        }
    }

    /// Pass when the reason list is empty, blocked otherwise
    pub fn from_reasons(reasons: Vec<String>) -> Self {
        if reasons.is_empty() {
            GuardResult::Pass
        } else {
            GuardResult::Blocked { reasons }
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, GuardResult::Pass)
    }
}

/// Aggregate outcome of every guard attached to an action
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardOutcome {
    pub ok: bool,
    pub blockers: Vec<String>,
}

impl GuardOutcome {
    pub fn pass() -> Self {
        Self {
            ok: true,
            blockers: Vec::new(),
        }
    }
}

/// A precondition predicate for one lifecycle's guard context
pub trait Guard<Ctx>: Send + Sync {
    fn name(&self) -> &'static str;
    fn evaluate(&self, ctx: &Ctx) -> GuardResult;
}

/// Registry mapping actions to their guards
pub struct GuardSet<A, Ctx> {
    guards: HashMap<A, Vec<Box<dyn Guard<Ctx>>>>,
}

impl<A: Copy + Eq + Hash, Ctx> GuardSet<A, Ctx> {
    /// An empty set: every action passes
    pub fn empty() -> Self {
        Self {
            guards: HashMap::new(),
        }
    }

    /// Attach a guard to an action
    pub fn register(&mut self, action: A, guard: impl Guard<Ctx> + 'static) {
        self.guards.entry(action).or_default().push(Box::new(guard));
    }

    /// Evaluate every guard for the action, collecting all blockers
    pub fn evaluate(&self, action: A, ctx: &Ctx) -> GuardOutcome {
        let Some(guards) = self.guards.get(&action) else {
            return GuardOutcome::pass();
        };

        let mut blockers = Vec::new();
        for guard in guards {
            if let GuardResult::Blocked { reasons } = guard.evaluate(ctx) {
                blockers.extend(reasons);
            }
        }
        GuardOutcome {
            ok: blockers.is_empty(),
            blockers,
        }
    }
}

// ── Engagement guards ────────────────────────────────────────────────

/// Snapshot handed to engagement guards.
///
/// `procedures` is `None` when the child snapshot could not be loaded;
/// guards that need it treat that as a blocking failure.
#[derive(Clone, Debug)]
pub struct EngagementGuardContext {
    pub engagement: Engagement,
    pub procedures: Option<Vec<Procedure>>,
}

/// Partner and manager must be assigned before acceptance is approved
pub struct RolesAssigned;

impl Guard<EngagementGuardContext> for RolesAssigned {
    fn name(&self) -> &'static str {
        "roles_assigned"
    }

    fn evaluate(&self, ctx: &EngagementGuardContext) -> GuardResult {
        let mut reasons = Vec::new();
        if ctx.engagement.partner.is_none() {
            reasons.push("no engagement partner assigned".to_string());
        }
        if ctx.engagement.manager.is_none() {
            reasons.push("no engagement manager assigned".to_string());
        }
        GuardResult::from_reasons(reasons)
    }
}

/// Every child procedure must be approved, signed off, or not applicable
pub struct AllProceduresReviewed;

impl Guard<EngagementGuardContext> for AllProceduresReviewed {
    fn name(&self) -> &'static str {
        "all_procedures_reviewed"
    }

    fn evaluate(&self, ctx: &EngagementGuardContext) -> GuardResult {
        let Some(procedures) = &ctx.procedures else {
            return GuardResult::blocked(
                "child procedures unavailable; cannot verify review status",
            );
        };

        let reasons = procedures
            .iter()
            .filter(|p| {
                !matches!(
                    p.state,
                    ProcedureState::Approved
                        | ProcedureState::SignedOff
                        | ProcedureState::NotApplicable
                )
            })
            .map(|p| format!("procedure '{}' is at state '{}'", p.title, p.state))
            .collect();
        GuardResult::from_reasons(reasons)
    }
}

/// Every child procedure must be signed off or not applicable
pub struct AllProceduresSignedOff;

impl Guard<EngagementGuardContext> for AllProceduresSignedOff {
    fn name(&self) -> &'static str {
        "all_procedures_signed_off"
    }

    fn evaluate(&self, ctx: &EngagementGuardContext) -> GuardResult {
        let Some(procedures) = &ctx.procedures else {
            return GuardResult::blocked(
                "child procedures unavailable; cannot verify sign-off status",
            );
        };

        let reasons = procedures
            .iter()
            .filter(|p| {
                !matches!(
                    p.state,
                    ProcedureState::SignedOff | ProcedureState::NotApplicable
                )
            })
            .map(|p| format!("procedure '{}' is not signed off (state '{}')", p.title, p.state))
            .collect();
        GuardResult::from_reasons(reasons)
    }
}

/// No open review notes may remain
pub struct NoOpenReviewNotes;

impl Guard<EngagementGuardContext> for NoOpenReviewNotes {
    fn name(&self) -> &'static str {
        "no_open_review_notes"
    }

    fn evaluate(&self, ctx: &EngagementGuardContext) -> GuardResult {
        match ctx.engagement.open_review_notes {
            None => GuardResult::blocked("review note count unavailable; cannot verify"),
            Some(0) => GuardResult::Pass,
            Some(n) => GuardResult::blocked(format!("{} open review note(s)", n)),
        }
    }
}

/// No unresolved EQCR findings may remain
pub struct NoUnresolvedEqcrFindings;

impl Guard<EngagementGuardContext> for NoUnresolvedEqcrFindings {
    fn name(&self) -> &'static str {
        "no_unresolved_eqcr_findings"
    }

    fn evaluate(&self, ctx: &EngagementGuardContext) -> GuardResult {
        match ctx.engagement.unresolved_eqcr_findings {
            None => GuardResult::blocked("EQCR finding count unavailable; cannot verify"),
            Some(0) => GuardResult::Pass,
            Some(n) => GuardResult::blocked(format!("{} unresolved EQCR finding(s)", n)),
        }
    }
}

/// Archiving requires the report release date on record
pub struct ReportReleaseRecorded;

impl Guard<EngagementGuardContext> for ReportReleaseRecorded {
    fn name(&self) -> &'static str {
        "report_release_recorded"
    }

    fn evaluate(&self, ctx: &EngagementGuardContext) -> GuardResult {
        if ctx.engagement.report_released_at.is_some() {
            GuardResult::Pass
        } else {
            GuardResult::blocked("report release date not recorded")
        }
    }
}

/// Default engagement guard table: firm policy for the standard actions
pub fn engagement_defaults() -> GuardSet<EngagementAction, EngagementGuardContext> {
    let mut set = GuardSet::empty();
    set.register(EngagementAction::ApproveAcceptance, RolesAssigned);
    set.register(EngagementAction::SubmitForManagerReview, AllProceduresReviewed);
    set.register(EngagementAction::SubmitForPartnerReview, NoOpenReviewNotes);
    set.register(EngagementAction::CompleteEqcr, NoUnresolvedEqcrFindings);
    set.register(EngagementAction::IssueReport, NoOpenReviewNotes);
    set.register(EngagementAction::IssueReport, NoUnresolvedEqcrFindings);
    set.register(EngagementAction::IssueReport, AllProceduresSignedOff);
    set.register(EngagementAction::Archive, ReportReleaseRecorded);
    set
}

// ── Procedure guards ─────────────────────────────────────────────────

/// Snapshot handed to procedure guards
#[derive(Clone, Debug)]
pub struct ProcedureGuardContext {
    pub procedure: Procedure,
}

/// A procedure cannot go to review with an empty workpaper
pub struct ContentPresent;

impl Guard<ProcedureGuardContext> for ContentPresent {
    fn name(&self) -> &'static str {
        "content_present"
    }

    fn evaluate(&self, ctx: &ProcedureGuardContext) -> GuardResult {
        if ctx.procedure.content.trim().is_empty() {
            GuardResult::blocked("procedure content is empty")
        } else {
            GuardResult::Pass
        }
    }
}

/// Every rank of the risk-required chain must hold an active sign-off
pub struct ChainComplete;

impl Guard<ProcedureGuardContext> for ChainComplete {
    fn name(&self) -> &'static str {
        "chain_complete"
    }

    fn evaluate(&self, ctx: &ProcedureGuardContext) -> GuardResult {
        let reasons = roles::required_chain(ctx.procedure.risk)
            .iter()
            .filter(|rank| !ctx.procedure.has_active_signoff(**rank))
            .map(|rank| format!("sign-off rank '{}' not yet recorded", rank))
            .collect();
        GuardResult::from_reasons(reasons)
    }
}

/// Every active record on the chain must match current content.
///
/// `ChainComplete` only asks whether the ranks are filled; this guard
/// asks whether the signatures still cover what is on file. A workpaper
/// edit after a signature makes that rank stale, and a stale chain may
/// not be approved.
pub struct ChainCurrent;

impl Guard<ProcedureGuardContext> for ChainCurrent {
    fn name(&self) -> &'static str {
        "chain_current"
    }

    fn evaluate(&self, ctx: &ProcedureGuardContext) -> GuardResult {
        let reasons = integrity::stale_ranks(&ctx.procedure)
            .into_iter()
            .map(|rank| {
                format!(
                    "sign-off rank '{}' no longer matches current content",
                    rank
                )
            })
            .collect();
        GuardResult::from_reasons(reasons)
    }
}

/// Default procedure guard table
pub fn procedure_defaults() -> GuardSet<ProcedureAction, ProcedureGuardContext> {
    let mut set = GuardSet::empty();
    set.register(ProcedureAction::SubmitForReview, ContentPresent);
    set.register(ProcedureAction::Approve, ChainComplete);
    set.register(ProcedureAction::Approve, ChainCurrent);
    set.register(ProcedureAction::SignOff, ChainComplete);
    set
}
