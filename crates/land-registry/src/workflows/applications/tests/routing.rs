use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use base64::Engine as _;
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::workflows::applications::domain::StatusId;
use crate::workflows::applications::repository::RegistryRepository;

fn authed(request: axum::http::request::Builder, token: &str) -> axum::http::request::Builder {
    request.header(header::AUTHORIZATION, format!("Bearer {token}"))
}

fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = authed(builder, token);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = authed(builder, token);
    }
    builder.body(Body::empty()).expect("request builds")
}

#[tokio::test]
async fn create_application_round_trips_as_created() {
    let fixture = fixture();
    let router = fixture.router();

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/user/applications",
            Some(CITIZEN_TOKEN),
            json!({ "service_id": 1 }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert!(payload
        .get("reference_number")
        .and_then(serde_json::Value::as_str)
        .is_some_and(|reference| reference.starts_with("REF-")));
    assert_eq!(payload.get("status_id"), Some(&json!(1)));
}

#[tokio::test]
async fn missing_bearer_is_unauthorized() {
    let fixture = fixture();
    let router = fixture.router();

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/user/applications",
            None,
            json!({ "service_id": 1 }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let fixture = fixture();
    let router = fixture.router();

    let response = router
        .oneshot(get_request(
            "/api/v1/user/applications",
            Some("token-nobody"),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_service_maps_to_bad_request() {
    let fixture = fixture();
    let router = fixture.router();

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/user/applications",
            Some(CITIZEN_TOKEN),
            json!({ "service_id": 99 }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn foreign_application_maps_to_not_found() {
    let fixture = fixture();
    let application = create_application_for(&fixture, fixture.citizen.id);
    let router = fixture.router();

    let response = router
        .oneshot(get_request(
            &format!("/api/v1/user/applications/{}", application.id.0),
            Some(OTHER_CITIZEN_TOKEN),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn citizen_hitting_admin_surface_is_forbidden() {
    let fixture = fixture();
    let application = create_application_for(&fixture, fixture.citizen.id);
    let router = fixture.router();

    let response = router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/admin/applications/{}/status", application.id.0),
            Some(CITIZEN_TOKEN),
            json!({ "status_id": 2 }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn officer_status_update_returns_no_content() {
    let fixture = fixture();
    let application = create_application_for(&fixture, fixture.citizen.id);
    let router = fixture.router();

    let response = router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/admin/applications/{}/status", application.id.0),
            Some(OFFICER_TOKEN),
            json!({ "status_id": 2, "remarks": "queued" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let stored = fixture
        .repository
        .fetch_application(application.id)
        .expect("fetch ok")
        .expect("application present");
    assert_eq!(stored.status_id, StatusId(2));
}

#[tokio::test]
async fn invalid_status_id_maps_to_bad_request() {
    let fixture = fixture();
    let application = create_application_for(&fixture, fixture.citizen.id);
    let router = fixture.router();

    let response = router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/admin/applications/{}/status", application.id.0),
            Some(OFFICER_TOKEN),
            json!({ "status_id": 99 }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_and_verify_flow_over_http() {
    let fixture = fixture();
    let application = create_application_for(&fixture, fixture.citizen.id);
    let router = fixture.router();

    let content = base64::engine::general_purpose::STANDARD.encode(b"%PDF-1.4 survey plan");
    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/user/applications/{}/documents", application.id.0),
            Some(CITIZEN_TOKEN),
            json!({
                "document_type": "survey_plan",
                "file_name": "plan.pdf",
                "content_type": "application/pdf",
                "content_base64": content,
            }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    let document_id = payload
        .pointer("/document/id")
        .and_then(serde_json::Value::as_u64)
        .expect("document id present");
    assert!(payload.get("download_url").is_some());

    let response = router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/admin/documents/{document_id}/verify"),
            Some(OFFICER_TOKEN),
            json!({ "verification_status": "Verified", "remarks": "legible" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn malformed_base64_maps_to_bad_request() {
    let fixture = fixture();
    let application = create_application_for(&fixture, fixture.citizen.id);
    let router = fixture.router();

    let response = router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/user/applications/{}/documents", application.id.0),
            Some(CITIZEN_TOKEN),
            json!({
                "document_type": "survey_plan",
                "file_name": "plan.pdf",
                "content_base64": "@@not-base64@@",
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_listing_and_logs_render_for_officers() {
    let fixture = fixture();
    let application = create_application_for(&fixture, fixture.citizen.id);
    let router = fixture.router();

    let response = router
        .clone()
        .oneshot(get_request("/api/v1/admin/applications", Some(OFFICER_TOKEN)))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let rows = payload.as_array().expect("array payload");
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].get("user_full_name"),
        Some(&json!(fixture.citizen.full_name))
    );

    let response = router
        .oneshot(get_request(
            &format!("/api/v1/admin/applications/{}/logs", application.id.0),
            Some(OFFICER_TOKEN),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let logs = payload.as_array().expect("array payload");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].get("action_taken"), Some(&json!("Created by user")));
}

#[tokio::test]
async fn foreign_document_listing_is_forbidden_over_http() {
    let fixture = fixture();
    let application = create_application_for(&fixture, fixture.citizen.id);
    fixture
        .service
        .upload_document(fixture.citizen.id, application.id, upload_request("deed.pdf"))
        .expect("upload succeeds");
    let router = fixture.router();

    let response = router
        .oneshot(get_request(
            &format!("/api/v1/user/applications/{}/documents", application.id.0),
            Some(OTHER_CITIZEN_TOKEN),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
