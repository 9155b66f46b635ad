//! Rows of the `project_states` table.

use hexrfp_core::records::StateRecord;
use hexrfp_core::state_codec::StateFields;
use hexrfp_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `project_states` table. `fields` is the JSONB document.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectStateRow {
    pub project_id: DbId,
    pub user_id: DbId,
    pub version: i32,
    pub last_modified: Timestamp,
    pub fields: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ProjectStateRow> for StateRecord {
    fn from(row: ProjectStateRow) -> Self {
        Self {
            project_id: row.project_id,
            user_id: row.user_id,
            version: row.version,
            last_modified: row.last_modified,
            fields: StateFields::from_value(row.fields),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
