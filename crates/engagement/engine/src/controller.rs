//! Workflow controllers: validate, then commit atomically
//!
//! One controller per lifecycle, same shape, different tables. Every
//! operation loads a fresh snapshot, validates legality, authorization,
//! guards, and (for sign-offs) chain position and content integrity, and
//! only then writes - conditioned on the version observed during
//! validation. A competing writer makes the commit fail with
//! `StaleWrite`; the caller re-fetches and retries.
//!
//! Nothing here blocks or queues. Rejections are typed, carry the full
//! blocker list, and are themselves appended to the audit trail.

use std::sync::Arc;

use chrono::Utc;
use engagement_storage::{QueryWindow, StorageError, WorkflowStore};
use engagement_types::{
    Actor, AuditTrailEntry, Engagement, EngagementAction, EngagementId, EngagementState,
    Lifecycle, Procedure, ProcedureAction, ProcedureId, ProcedureState, SignoffRecord,
    SignoffRole, WorkflowError, WorkflowResult,
};

use crate::guards::{
    engagement_defaults, procedure_defaults, EngagementGuardContext, GuardSet,
    ProcedureGuardContext,
};
use crate::notify::{Notifier, NoopNotifier, TransitionEvent};
use crate::{integrity, progress, roles, transitions};

/// Outcome of a dry-run check: can this action be performed right now?
///
/// Always carries the complete blocker list so the caller can render a
/// checklist without further round-trips.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionCheck {
    pub ok: bool,
    pub blockers: Vec<String>,
}

impl ActionCheck {
    fn pass() -> Self {
        Self {
            ok: true,
            blockers: Vec::new(),
        }
    }

    fn from_error(err: &WorkflowError) -> Self {
        Self {
            ok: false,
            blockers: err.blockers(),
        }
    }
}

fn storage_to_workflow(err: StorageError) -> WorkflowError {
    match err {
        StorageError::NotFound(msg) => WorkflowError::NotFound(msg),
        StorageError::VersionConflict { expected, found } => {
            WorkflowError::StaleWrite { expected, found }
        }
        other => WorkflowError::Storage(other.to_string()),
    }
}

/// Infrastructure failures propagate; everything else is a checklist item
fn is_infrastructure(err: &WorkflowError) -> bool {
    matches!(
        err,
        WorkflowError::NotFound(_) | WorkflowError::Storage(_) | WorkflowError::StaleWrite { .. }
    )
}

// ── Engagement controller ────────────────────────────────────────────

/// Orchestrates the engagement lifecycle
pub struct EngagementController<S> {
    store: Arc<S>,
    guards: GuardSet<EngagementAction, EngagementGuardContext>,
    notifier: Arc<dyn Notifier>,
}

impl<S: WorkflowStore> EngagementController<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            guards: engagement_defaults(),
            notifier: Arc::new(NoopNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_guards(
        mut self,
        guards: GuardSet<EngagementAction, EngagementGuardContext>,
    ) -> Self {
        self.guards = guards;
        self
    }

    /// Register a newly created engagement (always starts in `Draft`)
    pub async fn create(&self, engagement: Engagement) -> WorkflowResult<Engagement> {
        self.store
            .insert_engagement(engagement.clone())
            .await
            .map_err(storage_to_workflow)?;
        Ok(engagement)
    }

    pub async fn get(&self, id: &EngagementId) -> WorkflowResult<Engagement> {
        self.load(id).await
    }

    /// Actions legal from the current state that the role may initiate
    pub async fn available_actions(
        &self,
        id: &EngagementId,
        role: SignoffRole,
    ) -> WorkflowResult<Vec<EngagementAction>> {
        let engagement = self.load(id).await?;
        Ok(transitions::engagement_available_actions(engagement.state)
            .into_iter()
            .filter(|action| roles::is_engagement_role_allowed(*action, role))
            .collect())
    }

    /// Dry-run the full validation without mutating anything
    pub async fn can_perform(
        &self,
        id: &EngagementId,
        action: EngagementAction,
        actor: &Actor,
    ) -> WorkflowResult<ActionCheck> {
        let engagement = self.load(id).await?;
        match self.validate(&engagement, action, actor).await {
            Ok(_) => Ok(ActionCheck::pass()),
            Err(err) if is_infrastructure(&err) => Err(err),
            Err(err) => Ok(ActionCheck::from_error(&err)),
        }
    }

    /// The requirements checklist for an action, independent of actor
    pub async fn blocking_requirements(
        &self,
        id: &EngagementId,
        action: EngagementAction,
    ) -> WorkflowResult<Vec<String>> {
        let engagement = self.load(id).await?;
        if transitions::engagement_next_state(engagement.state, action).is_none() {
            return Ok(vec![format!(
                "action '{}' is not valid from state '{}'",
                action, engagement.state
            )]);
        }
        let ctx = self.guard_context(&engagement).await;
        Ok(self.guards.evaluate(action, &ctx).blockers)
    }

    /// Validate and commit a transition.
    ///
    /// Everything `can_perform` checks is re-validated against a fresh
    /// snapshot; a check from an earlier round-trip is never trusted.
    pub async fn perform(
        &self,
        id: &EngagementId,
        action: EngagementAction,
        actor: &Actor,
    ) -> WorkflowResult<EngagementState> {
        let engagement = self.load(id).await?;
        let observed_version = engagement.version;

        let next = match self.validate(&engagement, action, actor).await {
            Ok(next) => next,
            Err(err) => {
                self.record_rejection(&engagement, action, actor, &err).await;
                return Err(err);
            }
        };

        let now = Utc::now();
        let mut updated = engagement.clone();
        updated.state = next;
        updated.version = observed_version + 1;
        updated.updated_at = now;
        if next.ordinal() > engagement.state.ordinal() {
            updated.record_milestone(engagement.state, now);
        }
        if action == EngagementAction::IssueReport {
            updated.report_released_at = Some(now);
        }

        let entry = AuditTrailEntry::committed(
            Lifecycle::Engagement,
            id.as_str(),
            action.to_string(),
            actor,
            engagement.state.to_string(),
            next.to_string(),
        );
        self.store
            .commit_engagement(updated, observed_version, vec![entry])
            .await
            .map_err(storage_to_workflow)?;

        tracing::info!(
            engagement = %id,
            action = %action,
            from = %engagement.state,
            to = %next,
            actor = %actor.id,
            "engagement transition committed"
        );
        self.notifier.transition_committed(&TransitionEvent {
            lifecycle: Lifecycle::Engagement,
            entity_id: id.to_string(),
            action: action.to_string(),
            new_state: next.to_string(),
            actor: actor.id.clone(),
        });
        Ok(next)
    }

    pub async fn progress(&self, id: &EngagementId) -> WorkflowResult<u8> {
        let engagement = self.load(id).await?;
        Ok(progress::engagement_progress(engagement.state))
    }

    /// All procedures owned by the engagement
    pub async fn procedures(&self, id: &EngagementId) -> WorkflowResult<Vec<Procedure>> {
        self.load(id).await?;
        self.store
            .list_engagement_procedures(id)
            .await
            .map_err(storage_to_workflow)
    }

    pub async fn trail(
        &self,
        id: &EngagementId,
        window: QueryWindow,
    ) -> WorkflowResult<Vec<AuditTrailEntry>> {
        self.store
            .list_trail(id.as_str(), window)
            .await
            .map_err(storage_to_workflow)
    }

    async fn load(&self, id: &EngagementId) -> WorkflowResult<Engagement> {
        self.store
            .get_engagement(id)
            .await
            .map_err(storage_to_workflow)?
            .ok_or_else(|| WorkflowError::NotFound(format!("engagement {}", id)))
    }

    async fn guard_context(&self, engagement: &Engagement) -> EngagementGuardContext {
        // A failed child load is represented as None; guards fail closed
        let procedures = self
            .store
            .list_engagement_procedures(&engagement.id)
            .await
            .ok();
        EngagementGuardContext {
            engagement: engagement.clone(),
            procedures,
        }
    }

    async fn validate(
        &self,
        engagement: &Engagement,
        action: EngagementAction,
        actor: &Actor,
    ) -> WorkflowResult<EngagementState> {
        let next = transitions::engagement_next_state(engagement.state, action).ok_or_else(|| {
            WorkflowError::IllegalTransition {
                state: engagement.state.to_string(),
                action: action.to_string(),
            }
        })?;

        if !roles::is_engagement_role_allowed(action, actor.role) {
            return Err(WorkflowError::Unauthorized(format!(
                "role '{}' may not initiate '{}'",
                actor.role, action
            )));
        }

        let ctx = self.guard_context(engagement).await;
        let outcome = self.guards.evaluate(action, &ctx);
        if !outcome.ok {
            return Err(WorkflowError::PreconditionFailed(outcome.blockers));
        }
        Ok(next)
    }

    async fn record_rejection(
        &self,
        engagement: &Engagement,
        action: EngagementAction,
        actor: &Actor,
        err: &WorkflowError,
    ) {
        tracing::warn!(
            engagement = %engagement.id,
            action = %action,
            actor = %actor.id,
            error = %err,
            "engagement transition rejected"
        );
        let entry = AuditTrailEntry::rejected(
            Lifecycle::Engagement,
            engagement.id.as_str(),
            action.to_string(),
            actor,
            engagement.state.to_string(),
            err.blockers(),
        );
        if let Err(append_err) = self.store.append_trail(entry).await {
            tracing::warn!(error = %append_err, "failed to record rejected attempt");
        }
    }
}

// ── Procedure controller ─────────────────────────────────────────────

/// Orchestrates the procedure sign-off lifecycle
pub struct ProcedureController<S> {
    store: Arc<S>,
    guards: GuardSet<ProcedureAction, ProcedureGuardContext>,
    notifier: Arc<dyn Notifier>,
}

impl<S: WorkflowStore> ProcedureController<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            guards: procedure_defaults(),
            notifier: Arc::new(NoopNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_guards(mut self, guards: GuardSet<ProcedureAction, ProcedureGuardContext>) -> Self {
        self.guards = guards;
        self
    }

    /// Register a newly created procedure, fingerprinting its content
    pub async fn create(&self, mut procedure: Procedure) -> WorkflowResult<Procedure> {
        procedure.fingerprint = integrity::fingerprint(&procedure.content);
        self.store
            .insert_procedure(procedure.clone())
            .await
            .map_err(storage_to_workflow)?;
        Ok(procedure)
    }

    pub async fn get(&self, id: &ProcedureId) -> WorkflowResult<Procedure> {
        self.load(id).await
    }

    /// Actions legal from the current state that the role may initiate.
    ///
    /// The per-action allow-list is independent of the sign-off chain:
    /// whether a `Sign` would actually land is decided at perform time.
    pub async fn available_actions(
        &self,
        id: &ProcedureId,
        role: SignoffRole,
    ) -> WorkflowResult<Vec<ProcedureAction>> {
        let procedure = self.load(id).await?;
        Ok(transitions::procedure_available_actions(procedure.state)
            .into_iter()
            .filter(|action| roles::is_procedure_role_allowed(*action, role))
            .collect())
    }

    /// Dry-run the full validation without mutating anything
    pub async fn can_perform(
        &self,
        id: &ProcedureId,
        action: ProcedureAction,
        actor: &Actor,
    ) -> WorkflowResult<ActionCheck> {
        let procedure = self.load(id).await?;
        match self.validate(&procedure, action, actor, None) {
            Ok(_) => Ok(ActionCheck::pass()),
            Err(err) if is_infrastructure(&err) => Err(err),
            Err(err) => Ok(ActionCheck::from_error(&err)),
        }
    }

    /// The requirements checklist for an action, independent of actor
    pub async fn blocking_requirements(
        &self,
        id: &ProcedureId,
        action: ProcedureAction,
    ) -> WorkflowResult<Vec<String>> {
        let procedure = self.load(id).await?;
        if transitions::procedure_next_state(procedure.state, action).is_none() {
            return Ok(vec![format!(
                "action '{}' is not valid from state '{}'",
                action, procedure.state
            )]);
        }
        let ctx = ProcedureGuardContext {
            procedure: procedure.clone(),
        };
        let mut blockers = self.guards.evaluate(action, &ctx).blockers;
        if matches!(action, ProcedureAction::Sign | ProcedureAction::SignOff)
            && !integrity::validate(&procedure)
        {
            blockers.push(WorkflowError::IntegrityMismatch.to_string());
        }
        Ok(blockers)
    }

    /// Validate and commit a transition
    pub async fn perform(
        &self,
        id: &ProcedureId,
        action: ProcedureAction,
        actor: &Actor,
    ) -> WorkflowResult<ProcedureState> {
        let (state, _) = self.perform_inner(id, action, actor, None).await?;
        Ok(state)
    }

    /// Record the next required sign-off on the chain.
    ///
    /// Specialization of `perform(Sign)`: content integrity is verified
    /// first and a stale chain refuses with `IntegrityMismatch`.
    pub async fn record_signoff(
        &self,
        id: &ProcedureId,
        actor: &Actor,
        comment: Option<String>,
    ) -> WorkflowResult<SignoffRecord> {
        let (_, record) = self
            .perform_inner(id, ProcedureAction::Sign, actor, comment)
            .await?;
        record.ok_or_else(|| WorkflowError::Storage("sign-off record missing after commit".into()))
    }

    /// Replace the workpaper content under version control.
    ///
    /// Content edits are not transitions, but they still go through the
    /// conditional write so a concurrent transition cannot be lost, and
    /// the stored fingerprint stays current.
    pub async fn update_content(
        &self,
        id: &ProcedureId,
        content: String,
        expected_version: Option<u64>,
    ) -> WorkflowResult<Procedure> {
        let procedure = self.load(id).await?;
        let observed_version = expected_version.unwrap_or(procedure.version);
        if observed_version != procedure.version {
            return Err(WorkflowError::StaleWrite {
                expected: observed_version,
                found: procedure.version,
            });
        }
        if procedure.state.is_terminal() {
            return Err(WorkflowError::PreconditionFailed(vec![format!(
                "procedure is {} and no longer editable",
                procedure.state
            )]));
        }

        let mut updated = procedure;
        updated.content = content;
        updated.fingerprint = integrity::fingerprint(&updated.content);
        updated.version = observed_version + 1;
        updated.updated_at = Utc::now();
        self.store
            .commit_procedure(updated.clone(), observed_version, vec![])
            .await
            .map_err(storage_to_workflow)?;
        Ok(updated)
    }

    pub async fn progress(&self, id: &ProcedureId) -> WorkflowResult<u8> {
        let procedure = self.load(id).await?;
        Ok(progress::procedure_progress(&procedure))
    }

    /// The first unfilled rank, or `None` when complete or terminal
    pub async fn next_signoff(&self, id: &ProcedureId) -> WorkflowResult<Option<SignoffRole>> {
        let procedure = self.load(id).await?;
        Ok(progress::next_required_signoff(&procedure))
    }

    pub async fn trail(
        &self,
        id: &ProcedureId,
        window: QueryWindow,
    ) -> WorkflowResult<Vec<AuditTrailEntry>> {
        self.store
            .list_trail(id.as_str(), window)
            .await
            .map_err(storage_to_workflow)
    }

    async fn load(&self, id: &ProcedureId) -> WorkflowResult<Procedure> {
        self.store
            .get_procedure(id)
            .await
            .map_err(storage_to_workflow)?
            .ok_or_else(|| WorkflowError::NotFound(format!("procedure {}", id)))
    }

    async fn perform_inner(
        &self,
        id: &ProcedureId,
        action: ProcedureAction,
        actor: &Actor,
        comment: Option<String>,
    ) -> WorkflowResult<(ProcedureState, Option<SignoffRecord>)> {
        let procedure = self.load(id).await?;
        let observed_version = procedure.version;

        let (next, record) = match self.validate(&procedure, action, actor, comment) {
            Ok(result) => result,
            Err(err) => {
                self.record_rejection(&procedure, action, actor, &err).await;
                return Err(err);
            }
        };

        let now = Utc::now();
        let mut updated = procedure.clone();
        updated.state = next;
        updated.version = observed_version + 1;
        updated.updated_at = now;

        match action {
            ProcedureAction::Sign => {
                if let Some(record) = &record {
                    // A redo supersedes the stale record at the same rank
                    for existing in &mut updated.signoffs {
                        if existing.is_active() && existing.role == record.role {
                            existing.superseded = true;
                        }
                    }
                    updated.fingerprint = record.fingerprint.clone();
                    updated.signoffs.push(record.clone());
                }
            }
            // Both send the work back: ranks above the acting reviewer
            // must re-sign, the actor's own rank and below stand
            ProcedureAction::RequestChanges | ProcedureAction::Reopen => {
                updated.supersede_above(actor.role);
            }
            _ => {}
        }

        let entry = AuditTrailEntry::committed(
            Lifecycle::Procedure,
            id.as_str(),
            action.to_string(),
            actor,
            procedure.state.to_string(),
            next.to_string(),
        );
        self.store
            .commit_procedure(updated, observed_version, vec![entry])
            .await
            .map_err(storage_to_workflow)?;

        tracing::info!(
            procedure = %id,
            action = %action,
            from = %procedure.state,
            to = %next,
            actor = %actor.id,
            "procedure transition committed"
        );
        self.notifier.transition_committed(&TransitionEvent {
            lifecycle: Lifecycle::Procedure,
            entity_id: id.to_string(),
            action: action.to_string(),
            new_state: next.to_string(),
            actor: actor.id.clone(),
        });
        Ok((next, record))
    }

    fn validate(
        &self,
        procedure: &Procedure,
        action: ProcedureAction,
        actor: &Actor,
        comment: Option<String>,
    ) -> WorkflowResult<(ProcedureState, Option<SignoffRecord>)> {
        let next = transitions::procedure_next_state(procedure.state, action).ok_or_else(|| {
            WorkflowError::IllegalTransition {
                state: procedure.state.to_string(),
                action: action.to_string(),
            }
        })?;

        if !roles::is_procedure_role_allowed(action, actor.role) {
            return Err(WorkflowError::Unauthorized(format!(
                "role '{}' may not initiate '{}'",
                actor.role, action
            )));
        }

        let ctx = ProcedureGuardContext {
            procedure: procedure.clone(),
        };
        let outcome = self.guards.evaluate(action, &ctx);
        if !outcome.ok {
            return Err(WorkflowError::PreconditionFailed(outcome.blockers));
        }

        match action {
            ProcedureAction::Sign => {
                let record = self.validate_sign(procedure, actor, comment)?;
                Ok((next, Some(record)))
            }
            ProcedureAction::SignOff => {
                if !integrity::validate(procedure) {
                    return Err(WorkflowError::IntegrityMismatch);
                }
                Ok((next, None))
            }
            _ => Ok((next, None)),
        }
    }

    /// Decide whose signature may land and produce the record to append.
    ///
    /// When any active record no longer matches current content, the
    /// chain is frozen except for redoing the lowest stale rank; every
    /// other signature attempt reports the integrity mismatch.
    fn validate_sign(
        &self,
        procedure: &Procedure,
        actor: &Actor,
        comment: Option<String>,
    ) -> WorkflowResult<SignoffRecord> {
        let current = integrity::fingerprint(&procedure.content);
        let stale = integrity::stale_ranks(procedure);

        let rank = if let Some(lowest_stale) = stale.first().copied() {
            if actor.role != lowest_stale {
                return Err(WorkflowError::IntegrityMismatch);
            }
            lowest_stale
        } else {
            let next_rank = roles::next_required(&procedure.signoffs, procedure.risk)
                .ok_or_else(|| {
                    WorkflowError::Unauthorized("sign-off chain already complete".to_string())
                })?;
            if !roles::can_sign(actor.role, next_rank) {
                return Err(WorkflowError::Unauthorized(format!(
                    "next required sign-off rank is '{}', actor role is '{}'",
                    next_rank, actor.role
                )));
            }
            next_rank
        };

        let mut record = SignoffRecord::new(rank, actor.id.clone(), current);
        if let Some(comment) = comment {
            record = record.with_comment(comment);
        }
        Ok(record)
    }

    async fn record_rejection(
        &self,
        procedure: &Procedure,
        action: ProcedureAction,
        actor: &Actor,
        err: &WorkflowError,
    ) {
        tracing::warn!(
            procedure = %procedure.id,
            action = %action,
            actor = %actor.id,
            error = %err,
            "procedure transition rejected"
        );
        let entry = AuditTrailEntry::rejected(
            Lifecycle::Procedure,
            procedure.id.as_str(),
            action.to_string(),
            actor,
            procedure.state.to_string(),
            err.blockers(),
        );
        if let Err(append_err) = self.store.append_trail(entry).await {
            tracing::warn!(error = %append_err, "failed to record rejected attempt");
        }
    }
}
