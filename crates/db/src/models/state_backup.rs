//! Rows of the `state_backups` table.

use hexrfp_core::error::CoreError;
use hexrfp_core::records::{BackupRecord, BackupSummary, BackupType, StateRecord};
use hexrfp_core::types::{DbId, Timestamp};
use sqlx::FromRow;

fn parse_backup_type(id: DbId, value: &str) -> Result<BackupType, CoreError> {
    BackupType::parse(value).ok_or_else(|| {
        CoreError::Persistence(format!("Backup {id} has unknown type '{value}'"))
    })
}

/// A full row from the `state_backups` table.
#[derive(Debug, Clone, FromRow)]
pub struct StateBackupRow {
    pub id: DbId,
    pub user_id: DbId,
    pub project_id: DbId,
    pub backup_type: String,
    pub snapshot: serde_json::Value,
    pub snapshot_version: i32,
    pub created_at: Timestamp,
}

impl TryFrom<StateBackupRow> for BackupRecord {
    type Error = CoreError;

    fn try_from(row: StateBackupRow) -> Result<Self, Self::Error> {
        let backup_type = parse_backup_type(row.id, &row.backup_type)?;
        let snapshot: StateRecord = serde_json::from_value(row.snapshot).map_err(|e| {
            CoreError::Persistence(format!("Backup {} has an unreadable snapshot: {e}", row.id))
        })?;
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            project_id: row.project_id,
            backup_type,
            snapshot,
            created_at: row.created_at,
        })
    }
}

/// A backup listing row (snapshot body omitted).
#[derive(Debug, Clone, FromRow)]
pub struct BackupSummaryRow {
    pub id: DbId,
    pub project_id: DbId,
    pub backup_type: String,
    pub snapshot_version: i32,
    pub created_at: Timestamp,
}

impl TryFrom<BackupSummaryRow> for BackupSummary {
    type Error = CoreError;

    fn try_from(row: BackupSummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            project_id: row.project_id,
            backup_type: parse_backup_type(row.id, &row.backup_type)?,
            snapshot_version: row.snapshot_version,
            created_at: row.created_at,
        })
    }
}
