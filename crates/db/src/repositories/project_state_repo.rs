//! Repository for the `project_states` table.
//!
//! Every query is scoped by both `user_id` and `project_id`.

use hexrfp_core::types::DbId;
use sqlx::PgPool;

use crate::models::project_state::ProjectStateRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "project_id, user_id, version, last_modified, fields, created_at, updated_at";

/// Provides versioned read/write operations for project state records.
pub struct ProjectStateRepo;

impl ProjectStateRepo {
    /// Find the state record of a project owned by `user_id`.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        project_id: DbId,
    ) -> Result<Option<ProjectStateRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_states WHERE user_id = $1 AND project_id = $2"
        );
        sqlx::query_as::<_, ProjectStateRow>(&query)
            .bind(user_id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a record at version 1. Fails with a unique violation if the
    /// project already has one.
    pub async fn insert(
        pool: &PgPool,
        user_id: DbId,
        project_id: DbId,
        fields: &serde_json::Value,
    ) -> Result<ProjectStateRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_states (project_id, user_id, version, last_modified, fields)
             VALUES ($1, $2, 1, NOW(), $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectStateRow>(&query)
            .bind(project_id)
            .bind(user_id)
            .bind(fields)
            .fetch_one(pool)
            .await
    }

    /// Full save: replace the fields and bump the version, but only while the
    /// stored version still equals `expected_version`.
    ///
    /// Returns `None` when no row matched.
    pub async fn update_full(
        pool: &PgPool,
        user_id: DbId,
        project_id: DbId,
        fields: &serde_json::Value,
        expected_version: i32,
    ) -> Result<Option<ProjectStateRow>, sqlx::Error> {
        let query = format!(
            "UPDATE project_states
             SET fields = $3, version = version + 1, last_modified = NOW()
             WHERE user_id = $1 AND project_id = $2 AND version = $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectStateRow>(&query)
            .bind(user_id)
            .bind(project_id)
            .bind(fields)
            .bind(expected_version)
            .fetch_optional(pool)
            .await
    }

    /// Partial save: replace the fields only.
    ///
    /// Returns `None` when no row matched.
    pub async fn update_partial(
        pool: &PgPool,
        user_id: DbId,
        project_id: DbId,
        fields: &serde_json::Value,
    ) -> Result<Option<ProjectStateRow>, sqlx::Error> {
        let query = format!(
            "UPDATE project_states
             SET fields = $3
             WHERE user_id = $1 AND project_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectStateRow>(&query)
            .bind(user_id)
            .bind(project_id)
            .bind(fields)
            .fetch_optional(pool)
            .await
    }

    /// Insert or overwrite the record at version 1 (import).
    pub async fn replace(
        pool: &PgPool,
        user_id: DbId,
        project_id: DbId,
        fields: &serde_json::Value,
    ) -> Result<ProjectStateRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_states (project_id, user_id, version, last_modified, fields)
             VALUES ($1, $2, 1, NOW(), $3)
             ON CONFLICT (project_id) DO UPDATE
             SET user_id = EXCLUDED.user_id,
                 version = 1,
                 last_modified = NOW(),
                 fields = EXCLUDED.fields
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectStateRow>(&query)
            .bind(project_id)
            .bind(user_id)
            .bind(fields)
            .fetch_one(pool)
            .await
    }
}
