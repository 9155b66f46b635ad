//! Stored state records and pre-import backups.

use serde::{Deserialize, Serialize};

use crate::state_codec::StateFields;
use crate::types::{DbId, Timestamp};

/// The versioned state document of one project.
///
/// `version` starts at 1 and is bumped by every full save. `last_modified`
/// moves on creation, full saves and imports only; `updated_at` moves on
/// every write, partial saves included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    pub project_id: DbId,
    pub user_id: DbId,
    pub version: i32,
    pub last_modified: Timestamp,
    pub fields: StateFields,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// How an existing record is rewritten by [`update_state`].
///
/// [`update_state`]: crate::persistence::StatePersistence::update_state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateWrite {
    /// Bump the version and `last_modified`, but only if the stored version
    /// still equals `expected_version`.
    Full { expected_version: i32 },
    /// Replace the fields only.
    Partial,
}

/// The kind of snapshot a backup holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackupType {
    #[serde(rename = "pre-import")]
    PreImport,
}

impl BackupType {
    pub fn as_str(self) -> &'static str {
        match self {
            BackupType::PreImport => "pre-import",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pre-import" => Some(BackupType::PreImport),
            _ => None,
        }
    }
}

/// An immutable copy of a state record taken before it was overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub id: DbId,
    pub user_id: DbId,
    pub project_id: DbId,
    pub backup_type: BackupType,
    pub snapshot: StateRecord,
    pub created_at: Timestamp,
}

/// Input for inserting a backup row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBackup {
    pub user_id: DbId,
    pub project_id: DbId,
    pub backup_type: BackupType,
    pub snapshot: StateRecord,
}

/// A backup as listed to its owner, without the snapshot body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSummary {
    pub id: DbId,
    pub project_id: DbId,
    pub backup_type: BackupType,
    /// Version of the record at the time it was snapshotted.
    pub snapshot_version: i32,
    pub created_at: Timestamp,
}

impl From<&BackupRecord> for BackupSummary {
    fn from(backup: &BackupRecord) -> Self {
        Self {
            id: backup.id,
            project_id: backup.project_id,
            backup_type: backup.backup_type,
            snapshot_version: backup.snapshot.version,
            created_at: backup.created_at,
        }
    }
}
