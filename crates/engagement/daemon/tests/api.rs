//! End-to-end API tests against the in-memory router

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use engagement_daemon::{create_router, AppState};
use engagement_storage::InMemoryWorkflowStore;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let store = Arc::new(InMemoryWorkflowStore::new());
    create_router(AppState::new(store))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_engagement(app: &Router) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/engagements",
        Some(json!({
            "client_name": "Acme Holdings",
            "partner": "par-1",
            "manager": "mgr-1",
            "preparer": "prep-1",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

fn actor(role: &str) -> Value {
    json!({ "actor_id": format!("{}-1", role), "actor_role": role })
}

fn action(name: &str, role: &str) -> Value {
    let mut body = actor(role);
    body["action"] = json!(name);
    body
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn engagements_start_in_draft() {
    let app = app();
    let id = create_engagement(&app).await;

    let (status, body) = send(&app, "GET", &format!("/api/v1/engagements/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "draft");
    assert_eq!(body["version"], 0);
}

#[tokio::test]
async fn unknown_engagement_is_404() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/v1/engagements/eng-nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn illegal_transition_is_409() {
    let app = app();
    let id = create_engagement(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/engagements/{}/actions", id),
        Some(action("issue_report", "partner")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ILLEGAL_TRANSITION");
}

#[tokio::test]
async fn unauthorized_role_is_403() {
    let app = app();
    let id = create_engagement(&app).await;

    send(
        &app,
        "POST",
        &format!("/api/v1/engagements/{}/actions", id),
        Some(action("submit_for_acceptance", "preparer")),
    )
    .await;
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/engagements/{}/actions", id),
        Some(action("approve_acceptance", "preparer")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn unknown_action_is_400() {
    let app = app();
    let id = create_engagement(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/engagements/{}/actions", id),
        Some(action("launch_rocket", "partner")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn forward_walk_updates_state_and_trail() {
    let app = app();
    let id = create_engagement(&app).await;

    for (name, role) in [
        ("submit_for_acceptance", "preparer"),
        ("approve_acceptance", "partner"),
        ("begin_risk_assessment", "manager"),
        ("begin_fieldwork", "manager"),
    ] {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/v1/engagements/{}/actions", id),
            Some(action(name, role)),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "action {} failed", name);
    }

    let (_, body) = send(&app, "GET", &format!("/api/v1/engagements/{}", id), None).await;
    assert_eq!(body["state"], "fieldwork");
    assert_eq!(body["version"], 4);

    let (_, progress) = send(
        &app,
        "GET",
        &format!("/api/v1/engagements/{}/progress", id),
        None,
    )
    .await;
    assert!(progress["percent"].as_u64().unwrap() > 0);

    let (_, trail) = send(
        &app,
        "GET",
        &format!("/api/v1/engagements/{}/trail?limit=2", id),
        None,
    )
    .await;
    assert_eq!(trail.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn requirements_list_every_blocker() {
    let app = app();
    let id = create_engagement(&app).await;

    for (name, role) in [
        ("submit_for_acceptance", "preparer"),
        ("approve_acceptance", "partner"),
        ("begin_risk_assessment", "manager"),
        ("begin_fieldwork", "manager"),
    ] {
        send(
            &app,
            "POST",
            &format!("/api/v1/engagements/{}/actions", id),
            Some(action(name, role)),
        )
        .await;
    }

    // An unfinished procedure blocks submission for manager review
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/engagements/{}/procedures", id),
        Some(json!({ "title": "Revenue cutoff", "risk": "low" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "GET",
        &format!(
            "/api/v1/engagements/{}/requirements/submit_for_manager_review",
            id
        ),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["satisfied"], false);
    assert_eq!(body["blockers"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/engagements/{}/actions", id),
        Some(action("submit_for_manager_review", "preparer")),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "PRECONDITION_FAILED");
    assert_eq!(body["blockers"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn signoff_chain_over_http() {
    let app = app();
    let eng = create_engagement(&app).await;

    let (_, body) = send(
        &app,
        "POST",
        &format!("/api/v1/engagements/{}/procedures", eng),
        Some(json!({ "title": "Cash testing", "risk": "low", "content": "tested all items" })),
    )
    .await;
    let id = body["id"].as_str().unwrap().to_string();

    for (name, role) in [
        ("start", "preparer"),
        ("submit_for_review", "preparer"),
        ("begin_review", "reviewer"),
    ] {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/v1/procedures/{}/actions", id),
            Some(action(name, role)),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "action {} failed", name);
    }

    let (_, next) = send(
        &app,
        "GET",
        &format!("/api/v1/procedures/{}/next-signoff", id),
        None,
    )
    .await;
    assert_eq!(next["role"], "preparer");

    let (status, record) = send(
        &app,
        "POST",
        &format!("/api/v1/procedures/{}/signoffs", id),
        Some(actor("preparer")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["role"], "preparer");

    // A content edit after the signature freezes the chain
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/procedures/{}/content", id),
        Some(json!({ "content": "tested most items" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/procedures/{}/signoffs", id),
        Some(actor("reviewer")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INTEGRITY_MISMATCH");
}

#[tokio::test]
async fn stale_content_update_is_409_with_current_version() {
    let app = app();
    let eng = create_engagement(&app).await;

    let (_, body) = send(
        &app,
        "POST",
        &format!("/api/v1/engagements/{}/procedures", eng),
        Some(json!({ "title": "Inventory count", "risk": "medium" })),
    )
    .await;
    let id = body["id"].as_str().unwrap().to_string();

    send(
        &app,
        "POST",
        &format!("/api/v1/procedures/{}/actions", id),
        Some(action("start", "preparer")),
    )
    .await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/procedures/{}/content", id),
        Some(json!({ "content": "late", "expected_version": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "STALE_WRITE");
    assert_eq!(body["current_version"], 1);
}

#[tokio::test]
async fn available_actions_filter_by_role() {
    let app = app();
    let id = create_engagement(&app).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/v1/engagements/{}/actions?role=preparer", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let actions = body["actions"].as_array().unwrap();
    assert!(actions.contains(&json!("submit_for_acceptance")));
}
