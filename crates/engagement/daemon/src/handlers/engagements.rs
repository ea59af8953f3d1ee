//! Engagement lifecycle handlers

use crate::error::{ApiError, ApiResult};
use crate::handlers::{parse_action, ActorBody, RoleQuery, WindowQuery};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use engagement_types::{
    ActorId, AuditTrailEntry, Engagement, EngagementAction, EngagementId, Procedure, RiskLevel,
};
use serde::{Deserialize, Serialize};

/// Create engagement request
#[derive(Debug, Deserialize)]
pub struct CreateEngagementRequest {
    pub client_name: String,
    pub partner: Option<String>,
    pub manager: Option<String>,
    pub preparer: Option<String>,
}

/// Create a new engagement in `Draft`
pub async fn create_engagement(
    State(state): State<AppState>,
    Json(request): Json<CreateEngagementRequest>,
) -> ApiResult<(StatusCode, Json<Engagement>)> {
    if request.client_name.trim().is_empty() {
        return Err(ApiError::BadRequest("client_name must not be empty".into()));
    }

    let mut engagement = Engagement::new(request.client_name);
    if let Some(partner) = request.partner {
        engagement = engagement.with_partner(ActorId::new(partner));
    }
    if let Some(manager) = request.manager {
        engagement = engagement.with_manager(ActorId::new(manager));
    }
    if let Some(preparer) = request.preparer {
        engagement = engagement.with_preparer(ActorId::new(preparer));
    }

    let created = state.engagements.create(engagement).await?;
    tracing::info!(engagement = %created.id, "created engagement");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get one engagement
pub async fn get_engagement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Engagement>> {
    let engagement = state.engagements.get(&EngagementId::new(id)).await?;
    Ok(Json(engagement))
}

/// Actions response
#[derive(Debug, Serialize)]
pub struct ActionsResponse {
    pub actions: Vec<String>,
}

/// Actions currently available to the given role
pub async fn engagement_actions(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RoleQuery>,
) -> ApiResult<Json<ActionsResponse>> {
    let actions = state
        .engagements
        .available_actions(&EngagementId::new(id), query.role)
        .await?;
    Ok(Json(ActionsResponse {
        actions: actions.iter().map(|a| a.to_string()).collect(),
    }))
}

/// Perform action request
#[derive(Debug, Deserialize)]
pub struct PerformActionRequest {
    pub action: String,
    #[serde(flatten)]
    pub actor: ActorBody,
}

/// Transition response
#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub state: String,
    pub version: u64,
}

/// Perform a lifecycle action
pub async fn perform_engagement_action(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<PerformActionRequest>,
) -> ApiResult<Json<TransitionResponse>> {
    let id = EngagementId::new(id);
    let action: EngagementAction = parse_action(&request.action)?;
    let actor = request.actor.into_actor();

    let next = state.engagements.perform(&id, action, &actor).await?;
    let engagement = state.engagements.get(&id).await?;
    Ok(Json(TransitionResponse {
        state: next.to_string(),
        version: engagement.version,
    }))
}

/// Requirements response: the full blocker checklist for an action
#[derive(Debug, Serialize)]
pub struct RequirementsResponse {
    pub action: String,
    pub satisfied: bool,
    pub blockers: Vec<String>,
}

/// What currently blocks an action, independent of actor
pub async fn engagement_requirements(
    State(state): State<AppState>,
    Path((id, action)): Path<(String, String)>,
) -> ApiResult<Json<RequirementsResponse>> {
    let parsed: EngagementAction = parse_action(&action)?;
    let blockers = state
        .engagements
        .blocking_requirements(&EngagementId::new(id), parsed)
        .await?;
    Ok(Json(RequirementsResponse {
        action,
        satisfied: blockers.is_empty(),
        blockers,
    }))
}

/// Progress response
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub percent: u8,
}

/// Engagement completion percentage
pub async fn engagement_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProgressResponse>> {
    let percent = state.engagements.progress(&EngagementId::new(id)).await?;
    Ok(Json(ProgressResponse { percent }))
}

/// Audit trail for one engagement, newest-first
pub async fn engagement_trail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(window): Query<WindowQuery>,
) -> ApiResult<Json<Vec<AuditTrailEntry>>> {
    let trail = state
        .engagements
        .trail(&EngagementId::new(id), window.into_window())
        .await?;
    Ok(Json(trail))
}

/// List all procedures of an engagement
pub async fn list_procedures(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Procedure>>> {
    let procedures = state.engagements.procedures(&EngagementId::new(id)).await?;
    Ok(Json(procedures))
}

/// Create procedure request
#[derive(Debug, Deserialize)]
pub struct CreateProcedureRequest {
    pub title: String,
    pub risk: RiskLevel,
    #[serde(default)]
    pub content: String,
}

/// Create a new procedure under an engagement
pub async fn create_procedure(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CreateProcedureRequest>,
) -> ApiResult<(StatusCode, Json<Procedure>)> {
    if request.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".into()));
    }

    let engagement_id = EngagementId::new(id);
    // The parent must exist before a procedure can hang off it
    state.engagements.get(&engagement_id).await?;

    let mut procedure = Procedure::new(engagement_id, request.title, request.risk);
    procedure.content = request.content;
    let created = state.procedures.create(procedure).await?;
    tracing::info!(procedure = %created.id, "created procedure");
    Ok((StatusCode::CREATED, Json(created)))
}
