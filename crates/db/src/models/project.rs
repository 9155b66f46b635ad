//! Rows of the `projects` table.

use hexrfp_core::project::{Project, ProjectSummary};
use hexrfp_core::types::{Date, DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub start_date: Date,
    pub go_live_date: Date,
    pub is_default: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            start_date: row.start_date,
            go_live_date: row.go_live_date,
            is_default: row.is_default,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A project joined with its state record's `last_modified`.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectSummaryRow {
    pub id: DbId,
    pub name: String,
    pub start_date: Date,
    pub go_live_date: Date,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub last_modified: Timestamp,
}

impl From<ProjectSummaryRow> for ProjectSummary {
    fn from(row: ProjectSummaryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            start_date: row.start_date,
            go_live_date: row.go_live_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_modified: row.last_modified,
        }
    }
}
