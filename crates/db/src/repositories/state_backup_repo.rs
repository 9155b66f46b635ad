//! Repository for the `state_backups` table. Backups are insert-only.

use hexrfp_core::types::DbId;
use sqlx::PgPool;

use crate::models::state_backup::{BackupSummaryRow, StateBackupRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, user_id, project_id, backup_type, snapshot, snapshot_version, created_at";

pub struct StateBackupRepo;

impl StateBackupRepo {
    /// Insert a backup, returning the created row.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        project_id: DbId,
        backup_type: &str,
        snapshot: &serde_json::Value,
        snapshot_version: i32,
    ) -> Result<StateBackupRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO state_backups (user_id, project_id, backup_type, snapshot, snapshot_version)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StateBackupRow>(&query)
            .bind(user_id)
            .bind(project_id)
            .bind(backup_type)
            .bind(snapshot)
            .bind(snapshot_version)
            .fetch_one(pool)
            .await
    }

    /// Find a backup by ID, snapshot included.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<StateBackupRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM state_backups WHERE id = $1");
        sqlx::query_as::<_, StateBackupRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's backups newest first, without snapshot bodies.
    pub async fn list_by_project(
        pool: &PgPool,
        user_id: DbId,
        project_id: DbId,
    ) -> Result<Vec<BackupSummaryRow>, sqlx::Error> {
        sqlx::query_as::<_, BackupSummaryRow>(
            "SELECT id, project_id, backup_type, snapshot_version, created_at
             FROM state_backups
             WHERE user_id = $1 AND project_id = $2
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}
