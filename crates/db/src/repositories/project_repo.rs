//! Repository for the `projects` table.

use hexrfp_core::project::NewProject;
use hexrfp_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::{ProjectRow, ProjectSummaryRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, user_id, name, start_date, go_live_date, is_default, created_at, updated_at";

/// Provides create and read operations for projects. Projects are never
/// deleted by the service.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &NewProject,
    ) -> Result<ProjectRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (user_id, name, start_date, go_live_date, is_default)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(user_id)
            .bind(&input.name)
            .bind(input.start_date)
            .bind(input.go_live_date)
            .bind(input.is_default)
            .fetch_one(pool)
            .await
    }

    /// Insert the user's default project unless one already exists.
    ///
    /// Relies on the `uq_projects_default_per_user` partial unique index;
    /// returns `None` when the insert was skipped.
    pub async fn create_default(
        pool: &PgPool,
        user_id: DbId,
        input: &NewProject,
    ) -> Result<Option<ProjectRow>, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (user_id, name, start_date, go_live_date, is_default)
             VALUES ($1, $2, $3, $4, TRUE)
             ON CONFLICT (user_id) WHERE is_default DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(user_id)
            .bind(&input.name)
            .bind(input.start_date)
            .bind(input.go_live_date)
            .fetch_optional(pool)
            .await
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProjectRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's projects, oldest first.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<ProjectRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE user_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List a user's projects newest first, with the state record's
    /// `last_modified` (or the project's `updated_at` when it has none).
    pub async fn list_summaries_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<ProjectSummaryRow>, sqlx::Error> {
        sqlx::query_as::<_, ProjectSummaryRow>(
            "SELECT p.id, p.name, p.start_date, p.go_live_date, p.created_at, p.updated_at,
                    COALESCE(s.last_modified, p.updated_at) AS last_modified
             FROM projects p
             LEFT JOIN project_states s ON s.project_id = p.id
             WHERE p.user_id = $1
             ORDER BY p.created_at DESC, p.id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
