//! Pre-import backups.
//!
//! A backup failure never aborts the import it protects. It is reported as a
//! [`PartialFailure`] so callers can alert on lost safety copies.

use std::sync::Arc;

use serde::Serialize;

use crate::persistence::StatePersistence;
use crate::records::{BackupType, NewBackup};
use crate::types::DbId;

/// A backup that could not be taken while the surrounding operation went on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialFailure {
    pub message: String,
}

/// Result of [`BackupManager::snapshot_if_exists`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// A backup row was written.
    Created(DbId),
    /// There was no record to back up.
    Skipped,
    /// Reading the current record or writing the backup failed.
    Failed(PartialFailure),
}

impl BackupOutcome {
    pub fn backup_id(&self) -> Option<DbId> {
        match self {
            BackupOutcome::Created(id) => Some(*id),
            BackupOutcome::Skipped | BackupOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&PartialFailure> {
        match self {
            BackupOutcome::Failed(failure) => Some(failure),
            BackupOutcome::Created(_) | BackupOutcome::Skipped => None,
        }
    }
}

#[derive(Clone)]
pub struct BackupManager {
    persistence: Arc<dyn StatePersistence>,
}

impl BackupManager {
    pub fn new(persistence: Arc<dyn StatePersistence>) -> Self {
        Self { persistence }
    }

    /// Copy the current state record of the pair into a `pre-import` backup.
    pub async fn snapshot_if_exists(&self, user_id: DbId, project_id: DbId) -> BackupOutcome {
        let current = match self.persistence.find_state(user_id, project_id).await {
            Ok(Some(record)) => record,
            Ok(None) => return BackupOutcome::Skipped,
            Err(e) => {
                tracing::warn!(user_id, project_id, error = %e, "Backup read failed");
                return BackupOutcome::Failed(PartialFailure {
                    message: format!("Could not read current state for backup: {e}"),
                });
            }
        };

        let version = current.version;
        let input = NewBackup {
            user_id,
            project_id,
            backup_type: BackupType::PreImport,
            snapshot: current,
        };

        match self.persistence.create_backup(&input).await {
            Ok(backup) => {
                tracing::info!(
                    user_id,
                    project_id,
                    backup_id = backup.id,
                    version,
                    "Pre-import backup created"
                );
                BackupOutcome::Created(backup.id)
            }
            Err(e) => {
                tracing::warn!(user_id, project_id, error = %e, "Backup write failed");
                BackupOutcome::Failed(PartialFailure {
                    message: format!("Could not write pre-import backup: {e}"),
                })
            }
        }
    }
}
