//! Procedure lifecycle and sign-off handlers

use crate::error::ApiResult;
use crate::handlers::{parse_action, ActorBody, RoleQuery, WindowQuery};
use crate::handlers::engagements::{
    ActionsResponse, PerformActionRequest, ProgressResponse, RequirementsResponse,
    TransitionResponse,
};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use engagement_types::{AuditTrailEntry, Procedure, ProcedureAction, ProcedureId, SignoffRecord};
use serde::{Deserialize, Serialize};

/// Get one procedure
pub async fn get_procedure(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Procedure>> {
    let procedure = state.procedures.get(&ProcedureId::new(id)).await?;
    Ok(Json(procedure))
}

/// Actions currently available to the given role
pub async fn procedure_actions(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RoleQuery>,
) -> ApiResult<Json<ActionsResponse>> {
    let actions = state
        .procedures
        .available_actions(&ProcedureId::new(id), query.role)
        .await?;
    Ok(Json(ActionsResponse {
        actions: actions.iter().map(|a| a.to_string()).collect(),
    }))
}

/// Perform a lifecycle action
pub async fn perform_procedure_action(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<PerformActionRequest>,
) -> ApiResult<Json<TransitionResponse>> {
    let id = ProcedureId::new(id);
    let action: ProcedureAction = parse_action(&request.action)?;
    let actor = request.actor.into_actor();

    let next = state.procedures.perform(&id, action, &actor).await?;
    let procedure = state.procedures.get(&id).await?;
    Ok(Json(TransitionResponse {
        state: next.to_string(),
        version: procedure.version,
    }))
}

/// What currently blocks an action, independent of actor
pub async fn procedure_requirements(
    State(state): State<AppState>,
    Path((id, action)): Path<(String, String)>,
) -> ApiResult<Json<RequirementsResponse>> {
    let parsed: ProcedureAction = parse_action(&action)?;
    let blockers = state
        .procedures
        .blocking_requirements(&ProcedureId::new(id), parsed)
        .await?;
    Ok(Json(RequirementsResponse {
        action,
        satisfied: blockers.is_empty(),
        blockers,
    }))
}

/// Record sign-off request
#[derive(Debug, Deserialize)]
pub struct RecordSignoffRequest {
    #[serde(flatten)]
    pub actor: ActorBody,
    pub comment: Option<String>,
}

/// Record the next sign-off on the chain
pub async fn record_signoff(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RecordSignoffRequest>,
) -> ApiResult<Json<SignoffRecord>> {
    let actor = request.actor.into_actor();
    let record = state
        .procedures
        .record_signoff(&ProcedureId::new(id), &actor, request.comment)
        .await?;
    Ok(Json(record))
}

/// Update content request
#[derive(Debug, Deserialize)]
pub struct UpdateContentRequest {
    pub content: String,
    /// Version the caller last observed; omitted means last-writer-wins
    pub expected_version: Option<u64>,
}

/// Replace workpaper content under version control
pub async fn update_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateContentRequest>,
) -> ApiResult<Json<Procedure>> {
    let updated = state
        .procedures
        .update_content(&ProcedureId::new(id), request.content, request.expected_version)
        .await?;
    Ok(Json(updated))
}

/// Procedure completion percentage
pub async fn procedure_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProgressResponse>> {
    let percent = state.procedures.progress(&ProcedureId::new(id)).await?;
    Ok(Json(ProgressResponse { percent }))
}

/// Next sign-off response
#[derive(Debug, Serialize)]
pub struct NextSignoffResponse {
    /// The first unfilled rank, absent once the chain is complete
    pub role: Option<String>,
}

/// The next rank that must sign
pub async fn next_signoff(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<NextSignoffResponse>> {
    let role = state.procedures.next_signoff(&ProcedureId::new(id)).await?;
    Ok(Json(NextSignoffResponse {
        role: role.map(|r| r.to_string()),
    }))
}

/// Audit trail for one procedure, newest-first
pub async fn procedure_trail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(window): Query<WindowQuery>,
) -> ApiResult<Json<Vec<AuditTrailEntry>>> {
    let trail = state
        .procedures
        .trail(&ProcedureId::new(id), window.into_window())
        .await?;
    Ok(Json(trail))
}
