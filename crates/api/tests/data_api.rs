//! HTTP-level integration tests for the `/data` endpoints.
//!
//! Covers sync, full and partial saves, version conflicts, export, import
//! with and without backups, ownership checks, and request validation.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, build_test_app_with, get, get_auth, post_json_auth,
    post_raw_auth, token_for,
};
use hexrfp_core::memory::InMemoryPersistence;
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Full-save `data` and return the response `data` envelope.
async fn save_full(app: axum::Router, token: &str, data: serde_json::Value) -> serde_json::Value {
    let response = post_json_auth(app, "/api/v1/data/save", json!({ "data": data }), token).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_first_sync_creates_defaulted_state() {
    let app = build_test_app();
    let token = token_for(1);

    let response = get_auth(app.clone(), "/api/v1/data/sync", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = &json["data"];

    assert_eq!(data["version"], 1);
    assert_eq!(data["isNew"], true);
    assert!(data["projectId"].is_number());
    assert!(data["lastModified"].is_string());
    assert_eq!(data["state"]["tasks"], json!([]));
    assert_eq!(data["state"]["uploadedFiles"], json!({}));
    assert_eq!(data["state"]["currentFilter"], "all");
    assert_eq!(data["state"]["theme"], "light");
    assert_eq!(data["state"]["startDate"], "2025-12-08");
    assert_eq!(data["state"]["goLiveDate"], "2026-09-01");

    let again = body_json(get_auth(app, "/api/v1/data/sync", &token).await).await;
    assert_eq!(again["data"]["isNew"], false);
    assert_eq!(again["data"]["version"], 1);
    assert_eq!(again["data"]["projectId"], data["projectId"]);
}

#[tokio::test]
async fn test_sync_without_token_returns_401() {
    let app = build_test_app();

    let response = get(app, "/api/v1/data/sync").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_sync_with_invalid_token_returns_401() {
    let app = build_test_app();

    let response = get_auth(app, "/api/v1/data/sync", "not-a-jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Save
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_full_saves_increment_version() {
    let app = build_test_app();
    let token = token_for(2);

    for expected in 1..=3 {
        let data = save_full(app.clone(), &token, json!({ "tasks": [{"id": expected}] })).await;
        assert_eq!(data["version"], expected);
    }

    let synced = body_json(get_auth(app, "/api/v1/data/sync", &token).await).await;
    assert_eq!(synced["data"]["version"], 3);
    assert_eq!(synced["data"]["state"]["tasks"], json!([{"id": 3}]));
}

#[tokio::test]
async fn test_partial_save_keeps_version() {
    let app = build_test_app();
    let token = token_for(3);
    save_full(app.clone(), &token, json!({})).await;
    save_full(app.clone(), &token, json!({})).await;

    let body = json!({ "data": { "theme": "dark" }, "isPartial": true });
    let response = post_json_auth(app.clone(), "/api/v1/data/save", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["version"], 2);

    let synced = body_json(get_auth(app, "/api/v1/data/sync", &token).await).await;
    assert_eq!(synced["data"]["version"], 2);
    assert_eq!(synced["data"]["state"]["theme"], "dark");
}

#[tokio::test]
async fn test_stale_expected_version_returns_409() {
    let app = build_test_app();
    let token = token_for(4);
    save_full(app.clone(), &token, json!({})).await;
    save_full(app.clone(), &token, json!({})).await;

    let body = json!({ "data": {}, "expectedVersion": 1 });
    let response = post_json_auth(app, "/api/v1/data/save", body, &token).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[tokio::test]
async fn test_save_without_data_returns_400() {
    let app = build_test_app();
    let token = token_for(5);

    let response = post_json_auth(app.clone(), "/api/v1/data/save", json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Data is required");

    // Nothing was created for the caller.
    let projects = body_json(get_auth(app, "/api/v1/projects", &token).await).await;
    assert_eq!(projects["data"], json!([]));
}

#[tokio::test]
async fn test_save_with_mistyped_field_returns_400() {
    let app = build_test_app();
    let token = token_for(6);

    let body = json!({ "data": { "tasks": "not a list" } });
    let response = post_json_auth(app, "/api/v1/data/save", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_save_with_wrong_typed_flag_returns_400_envelope() {
    let app = build_test_app();
    let token = token_for(13);

    let body = json!({ "data": {}, "isPartial": "yes" });
    let response = post_json_auth(app, "/api/v1/data/save", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].as_str().unwrap().contains("isPartial"));
}

#[tokio::test]
async fn test_save_with_invalid_json_returns_400_envelope() {
    let app = build_test_app();
    let token = token_for(14);

    let response = post_raw_auth(app, "/api/v1/data/save", "{not json", &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_sync_with_non_numeric_project_id_returns_400_envelope() {
    let app = build_test_app();
    let token = token_for(15);

    let response = get_auth(app, "/api/v1/data/sync?projectId=abc", &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].as_str().unwrap().contains("projectId"));
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_export_returns_saved_state() {
    let app = build_test_app();
    let token = token_for(7);
    save_full(app.clone(), &token, json!({ "vendors": [{"name": "Acme"}] })).await;

    let response = get_auth(app, "/api/v1/data/export", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["version"], 1);
    assert_eq!(json["data"]["state"]["vendors"], json!([{"name": "Acme"}]));
    assert!(json["data"]["exportedAt"].is_string());
}

#[tokio::test]
async fn test_export_before_any_sync_returns_404() {
    let app = build_test_app();
    let token = token_for(8);

    // Export resolves (and creates) the default project but never its state.
    let response = get_auth(app.clone(), "/api/v1/data/export", &token).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");

    let projects = body_json(get_auth(app, "/api/v1/projects", &token).await).await;
    assert_eq!(projects["data"].as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_import_resets_version_and_backs_up() {
    let persistence = Arc::new(InMemoryPersistence::new());
    let app = build_test_app_with(persistence.clone());
    let token = token_for(9);
    for _ in 0..5 {
        save_full(app.clone(), &token, json!({ "risks": [{"id": 1}] })).await;
    }

    let body = json!({ "data": { "risks": [] } });
    let response = post_json_auth(app.clone(), "/api/v1/data/import", body, &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["imported"], true);
    let backup_id = json["data"]["backupId"].as_i64().expect("backup id");
    assert!(json["data"].get("backupError").is_none());

    let backup = persistence.backup(backup_id).await.expect("backup stored");
    assert_eq!(backup.snapshot.version, 5);

    let synced = body_json(get_auth(app.clone(), "/api/v1/data/sync", &token).await).await;
    assert_eq!(synced["data"]["version"], 1);
    assert_eq!(synced["data"]["state"]["risks"], json!([]));

    let backups = body_json(get_auth(app, "/api/v1/data/backups", &token).await).await;
    assert_eq!(backups["data"][0]["id"], backup_id);
    assert_eq!(backups["data"][0]["backupType"], "pre-import");
    assert_eq!(backups["data"][0]["snapshotVersion"], 5);
}

#[tokio::test]
async fn test_import_without_existing_state_has_no_backup() {
    let app = build_test_app();
    let token = token_for(10);

    let body = json!({ "data": { "tasks": [{"id": 1}] } });
    let response = post_json_auth(app, "/api/v1/data/import", body, &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["imported"], true);
    assert!(json["data"]["backupId"].is_null());
}

#[tokio::test]
async fn test_import_with_backup_disabled_skips_backup() {
    let app = build_test_app();
    let token = token_for(11);
    save_full(app.clone(), &token, json!({})).await;

    let body = json!({ "data": {}, "createBackup": false });
    let response = post_json_auth(app.clone(), "/api/v1/data/import", body, &token).await;

    assert!(body_json(response).await["data"]["backupId"].is_null());
    let backups = body_json(get_auth(app, "/api/v1/data/backups", &token).await).await;
    assert_eq!(backups["data"], json!([]));
}

#[tokio::test]
async fn test_import_reports_backup_failure_and_still_imports() {
    let persistence = Arc::new(InMemoryPersistence::new());
    let app = build_test_app_with(persistence.clone());
    let token = token_for(12);
    save_full(app.clone(), &token, json!({})).await;
    save_full(app.clone(), &token, json!({})).await;
    persistence.fail_backup_writes(true);

    let body = json!({ "data": { "theme": "dark" } });
    let response = post_json_auth(app.clone(), "/api/v1/data/import", body, &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["imported"], true);
    assert!(json["data"]["backupId"].is_null());
    assert!(json["data"]["backupError"]["message"].is_string());

    let synced = body_json(get_auth(app, "/api/v1/data/sync", &token).await).await;
    assert_eq!(synced["data"]["version"], 1);
    assert_eq!(synced["data"]["state"]["theme"], "dark");
}

// ---------------------------------------------------------------------------
// Ownership
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_foreign_project_returns_403() {
    let app = build_test_app();
    let owner = token_for(20);
    let intruder = token_for(21);
    let synced = body_json(get_auth(app.clone(), "/api/v1/data/sync", &owner).await).await;
    let project_id = synced["data"]["projectId"].as_i64().unwrap();

    let uri = format!("/api/v1/data/sync?projectId={project_id}");
    let response = get_auth(app.clone(), &uri, &intruder).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");

    let body = json!({ "projectId": project_id, "data": {} });
    let response = post_json_auth(app, "/api/v1/data/save", body, &intruder).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_project_returns_404() {
    let app = build_test_app();
    let token = token_for(22);

    let response = get_auth(app, "/api/v1/data/sync?projectId=9999", &token).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
