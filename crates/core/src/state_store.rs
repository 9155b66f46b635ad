//! The versioned project state store: sync, save, export and import.
//!
//! Version rules:
//!
//! - a record is created at version 1 (first sync, first save, project
//!   creation);
//! - every full save bumps the version by exactly one and moves
//!   `last_modified`;
//! - a partial save rewrites the fields and leaves both alone;
//! - an import overwrites the record at version 1, so version monotonicity
//!   does not survive an import.
//!
//! Full saves are compare-and-swap writes on the version read just before,
//! so two concurrent full saves cannot both land on the same version: the
//! loser gets [`CoreError::Conflict`]. Partial saves are last-writer-wins.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::backup::{BackupManager, BackupOutcome, PartialFailure};
use crate::error::{CoreError, CoreResult};
use crate::persistence::StatePersistence;
use crate::project::{CreateProjectRequest, Project, ProjectDefaults, ProjectSummary};
use crate::records::{BackupSummary, StateRecord, StateWrite};
use crate::resolver::ProjectResolver;
use crate::state_codec::{default_fields, to_app_state, to_storage, StateDocument};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Operation inputs and results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub state: StateDocument,
    pub version: i32,
    pub last_modified: Timestamp,
    pub project_id: DbId,
    /// `true` when this call created the record.
    pub is_new: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    pub project_id: Option<DbId>,
    /// Write fields without advancing the version or `last_modified`.
    pub is_partial: bool,
    /// Reject a full save when the stored version differs.
    pub expected_version: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResult {
    pub version: i32,
    pub last_modified: Timestamp,
    pub project_id: DbId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub state: StateDocument,
    pub version: i32,
    pub project_id: DbId,
    pub exported_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub project_id: Option<DbId>,
    pub create_backup: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            project_id: None,
            create_backup: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub imported: bool,
    pub backup_id: Option<DbId>,
    pub project_id: DbId,
    /// Set when a requested backup could not be taken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_error: Option<PartialFailure>,
}

/// Turn an optional request payload into a state document.
///
/// A missing or `null` payload is a validation error, reported before any
/// persistence call is made.
pub fn require_state(data: Option<Value>) -> CoreResult<StateDocument> {
    match data {
        None | Some(Value::Null) => Err(CoreError::Validation("Data is required".to_string())),
        Some(payload) => StateDocument::from_payload(payload),
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct StateStore {
    persistence: Arc<dyn StatePersistence>,
    resolver: ProjectResolver,
    backups: BackupManager,
    defaults: ProjectDefaults,
}

impl StateStore {
    pub fn new(persistence: Arc<dyn StatePersistence>, defaults: ProjectDefaults) -> Self {
        Self {
            resolver: ProjectResolver::new(Arc::clone(&persistence), defaults.clone()),
            backups: BackupManager::new(Arc::clone(&persistence)),
            persistence,
            defaults,
        }
    }

    pub fn persistence(&self) -> &Arc<dyn StatePersistence> {
        &self.persistence
    }

    /// Resolve the target project and check the caller owns it.
    async fn target_project(&self, user_id: DbId, explicit: Option<DbId>) -> CoreResult<Project> {
        let project_id = self.resolver.resolve(user_id, explicit).await?;
        let project = self
            .persistence
            .find_project(project_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Project",
                id: project_id,
            })?;
        if project.user_id != user_id {
            tracing::warn!(user_id, project_id, "Project access denied");
            return Err(CoreError::Forbidden(format!(
                "Project {project_id} does not belong to the current user"
            )));
        }
        Ok(project)
    }

    /// Load the project state, creating a defaulted record on first access.
    pub async fn sync(&self, user_id: DbId, project_id: Option<DbId>) -> CoreResult<SyncResult> {
        let project = self.target_project(user_id, project_id).await?;
        tracing::debug!(user_id, project_id = project.id, "Syncing project state");

        let (record, is_new) = match self.persistence.find_state(user_id, project.id).await? {
            Some(record) => (record, false),
            None => self.create_default_record(user_id, project.id).await?,
        };

        Ok(SyncResult {
            state: to_app_state(&record.fields, &project.dates()),
            version: record.version,
            last_modified: record.last_modified,
            project_id: project.id,
            is_new,
        })
    }

    async fn create_default_record(
        &self,
        user_id: DbId,
        project_id: DbId,
    ) -> CoreResult<(StateRecord, bool)> {
        match self
            .persistence
            .insert_state(user_id, project_id, &default_fields())
            .await
        {
            Ok(record) => {
                tracing::info!(user_id, project_id, "Created default project state");
                Ok((record, true))
            }
            // Lost a creation race: the other caller's record is the one to return.
            Err(CoreError::Conflict(_)) => {
                let record = self
                    .persistence
                    .find_state(user_id, project_id)
                    .await?
                    .ok_or_else(|| {
                        CoreError::Conflict(format!(
                            "State record for project {project_id} is owned by another user"
                        ))
                    })?;
                Ok((record, false))
            }
            Err(e) => Err(e),
        }
    }

    /// Persist a full or partial state document.
    pub async fn save(
        &self,
        user_id: DbId,
        state: &StateDocument,
        options: &SaveOptions,
    ) -> CoreResult<SaveResult> {
        let project = self.target_project(user_id, options.project_id).await?;
        let project_id = project.id;
        let fields = to_storage(state);

        tracing::debug!(
            user_id,
            project_id,
            is_partial = options.is_partial,
            "Saving project state"
        );

        let existing = self.persistence.find_state(user_id, project_id).await?;

        let record = match existing {
            None => self
                .persistence
                .insert_state(user_id, project_id, &fields)
                .await
                .map_err(|e| match e {
                    CoreError::Conflict(_) => CoreError::Conflict(
                        "Project state was created concurrently; reload and retry".to_string(),
                    ),
                    other => other,
                })?,
            Some(_) if options.is_partial => self
                .persistence
                .update_state(user_id, project_id, &fields, StateWrite::Partial)
                .await?
                .ok_or_else(|| {
                    CoreError::Conflict("Project state disappeared during save".to_string())
                })?,
            Some(existing) => {
                if let Some(expected) = options.expected_version {
                    if expected != existing.version {
                        return Err(CoreError::Conflict(format!(
                            "Expected version {expected} but the stored version is {}",
                            existing.version
                        )));
                    }
                }
                let write = StateWrite::Full {
                    expected_version: existing.version,
                };
                self.persistence
                    .update_state(user_id, project_id, &fields, write)
                    .await?
                    .ok_or_else(|| {
                        tracing::warn!(
                            user_id,
                            project_id,
                            version = existing.version,
                            "Concurrent full save detected"
                        );
                        CoreError::Conflict(
                            "Project state was modified concurrently; reload and retry"
                                .to_string(),
                        )
                    })?
            }
        };

        tracing::info!(
            user_id,
            project_id,
            version = record.version,
            is_partial = options.is_partial,
            "Project state saved"
        );

        Ok(SaveResult {
            version: record.version,
            last_modified: record.last_modified,
            project_id,
        })
    }

    /// Read the project state for download. Never creates a record.
    pub async fn export(&self, user_id: DbId, project_id: Option<DbId>) -> CoreResult<ExportResult> {
        let project = self.target_project(user_id, project_id).await?;
        let record = self
            .persistence
            .find_state(user_id, project.id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "ProjectState",
                id: project.id,
            })?;

        tracing::info!(user_id, project_id = project.id, "Project state exported");

        Ok(ExportResult {
            state: to_app_state(&record.fields, &project.dates()),
            version: record.version,
            project_id: project.id,
            exported_at: chrono::Utc::now(),
        })
    }

    /// Overwrite the project state with an imported document, resetting the
    /// version to 1. The previous record is backed up first when requested.
    pub async fn import(
        &self,
        user_id: DbId,
        state: &StateDocument,
        options: &ImportOptions,
    ) -> CoreResult<ImportResult> {
        let project = self.target_project(user_id, options.project_id).await?;
        let project_id = project.id;

        let backup = if options.create_backup {
            self.backups.snapshot_if_exists(user_id, project_id).await
        } else {
            BackupOutcome::Skipped
        };

        let fields = to_storage(state);
        let record = self
            .persistence
            .replace_state(user_id, project_id, &fields)
            .await?;

        tracing::info!(
            user_id,
            project_id,
            version = record.version,
            backup_id = backup.backup_id(),
            "Project state imported"
        );

        Ok(ImportResult {
            imported: true,
            backup_id: backup.backup_id(),
            project_id,
            backup_error: backup.failure().cloned(),
        })
    }

    /// Create a project and initialise its state record.
    ///
    /// Failing to initialise the record is logged and ignored: the first
    /// sync or save creates it.
    pub async fn create_project(
        &self,
        user_id: DbId,
        request: &CreateProjectRequest,
    ) -> CoreResult<Project> {
        let input = self.defaults.apply(request)?;
        let project = self.persistence.create_project(user_id, &input).await?;
        tracing::info!(user_id, project_id = project.id, name = %project.name, "Project created");

        if let Err(e) = self
            .persistence
            .insert_state(user_id, project.id, &default_fields())
            .await
        {
            tracing::warn!(
                user_id,
                project_id = project.id,
                error = %e,
                "Failed to initialise project state"
            );
        }

        Ok(project)
    }

    /// The caller's projects, newest first.
    pub async fn list_projects(&self, user_id: DbId) -> CoreResult<Vec<ProjectSummary>> {
        self.persistence.list_project_summaries(user_id).await
    }

    /// Pre-import backups of the target project, newest first.
    pub async fn list_backups(
        &self,
        user_id: DbId,
        project_id: Option<DbId>,
    ) -> CoreResult<Vec<BackupSummary>> {
        let project = self.target_project(user_id, project_id).await?;
        self.persistence.list_backups(user_id, project.id).await
    }
}
