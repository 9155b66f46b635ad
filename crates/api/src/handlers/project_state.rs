//! Handlers for the `/data` resource: sync, save, export, import and
//! backup listing of a project's state.
//!
//! Request payloads are decoded here; every rule about versions, defaults
//! and backups lives in [`StateStore`](hexrfp_core::state_store::StateStore).

use axum::extract::State;
use axum::Json;
use hexrfp_core::records::BackupSummary;
use hexrfp_core::state_store::{
    require_state, ExportResult, ImportOptions, ImportResult, SaveOptions, SaveResult,
    SyncResult,
};
use hexrfp_core::types::DbId;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::{AppJson, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::query::ProjectParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /data/save`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub project_id: Option<DbId>,
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub is_partial: bool,
    /// Optimistic concurrency guard for full saves.
    pub expected_version: Option<i32>,
}

/// Body of `POST /data/import`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub project_id: Option<DbId>,
    pub data: Option<serde_json::Value>,
    /// Defaults to `true`.
    pub create_backup: Option<bool>,
}

/// GET /api/v1/data/sync
pub async fn sync(
    auth: AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ProjectParams>,
) -> AppResult<Json<DataResponse<SyncResult>>> {
    let result = state.store.sync(auth.user_id, params.project_id).await?;
    Ok(Json(DataResponse { data: result }))
}

/// POST /api/v1/data/save
pub async fn save(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<SaveRequest>,
) -> AppResult<Json<DataResponse<SaveResult>>> {
    let document = require_state(input.data)?;
    let options = SaveOptions {
        project_id: input.project_id,
        is_partial: input.is_partial,
        expected_version: input.expected_version,
    };

    let result = state.store.save(auth.user_id, &document, &options).await?;
    Ok(Json(DataResponse { data: result }))
}

/// GET /api/v1/data/export
pub async fn export(
    auth: AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ProjectParams>,
) -> AppResult<Json<DataResponse<ExportResult>>> {
    let result = state.store.export(auth.user_id, params.project_id).await?;
    Ok(Json(DataResponse { data: result }))
}

/// POST /api/v1/data/import
///
/// A failed pre-import backup does not fail the request; it is reported in
/// `backupError` with `backupId: null`.
pub async fn import(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<ImportRequest>,
) -> AppResult<Json<DataResponse<ImportResult>>> {
    let document = require_state(input.data)?;
    let defaults = ImportOptions::default();
    let options = ImportOptions {
        project_id: input.project_id,
        create_backup: input.create_backup.unwrap_or(defaults.create_backup),
    };

    let result = state.store.import(auth.user_id, &document, &options).await?;
    if let Some(failure) = &result.backup_error {
        tracing::warn!(
            user_id = auth.user_id,
            project_id = result.project_id,
            reason = %failure.message,
            "Import completed without a backup"
        );
    }
    Ok(Json(DataResponse { data: result }))
}

/// GET /api/v1/data/backups
pub async fn list_backups(
    auth: AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ProjectParams>,
) -> AppResult<Json<DataResponse<Vec<BackupSummary>>>> {
    let backups = state
        .store
        .list_backups(auth.user_id, params.project_id)
        .await?;
    Ok(Json(DataResponse { data: backups }))
}
