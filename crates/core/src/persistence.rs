//! The persistence collaborator consumed by the state store.
//!
//! Reads that may legitimately find nothing return `Option`; every other
//! failure is a [`CoreError::Persistence`]. A write that would violate the
//! one-record-per-project rule reports [`CoreError::Conflict`].
//!
//! [`CoreError::Persistence`]: crate::error::CoreError::Persistence
//! [`CoreError::Conflict`]: crate::error::CoreError::Conflict

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::project::{NewProject, Project, ProjectSummary};
use crate::records::{BackupRecord, BackupSummary, NewBackup, StateRecord, StateWrite};
use crate::state_codec::StateFields;
use crate::types::DbId;

#[async_trait]
pub trait StatePersistence: Send + Sync {
    /// Cheap reachability check used by the health endpoint.
    async fn ping(&self) -> CoreResult<()>;

    /// All projects owned by `user_id`, oldest first.
    async fn list_projects(&self, user_id: DbId) -> CoreResult<Vec<Project>>;

    /// All projects owned by `user_id`, newest first, with state modification
    /// times folded in.
    async fn list_project_summaries(&self, user_id: DbId) -> CoreResult<Vec<ProjectSummary>>;

    async fn find_project(&self, project_id: DbId) -> CoreResult<Option<Project>>;

    async fn create_project(&self, user_id: DbId, input: &NewProject) -> CoreResult<Project>;

    /// Create the user's default project unless one already exists.
    ///
    /// Returns `None` when another caller created it first.
    async fn create_default_project(
        &self,
        user_id: DbId,
        input: &NewProject,
    ) -> CoreResult<Option<Project>>;

    async fn find_state(&self, user_id: DbId, project_id: DbId)
        -> CoreResult<Option<StateRecord>>;

    /// Insert a record at version 1. Fails with `Conflict` if one exists.
    async fn insert_state(
        &self,
        user_id: DbId,
        project_id: DbId,
        fields: &StateFields,
    ) -> CoreResult<StateRecord>;

    /// Rewrite an existing record.
    ///
    /// Returns `None` if no record matched: either none exists or, for
    /// [`StateWrite::Full`], the stored version moved on.
    async fn update_state(
        &self,
        user_id: DbId,
        project_id: DbId,
        fields: &StateFields,
        write: StateWrite,
    ) -> CoreResult<Option<StateRecord>>;

    /// Insert or overwrite the record at version 1.
    async fn replace_state(
        &self,
        user_id: DbId,
        project_id: DbId,
        fields: &StateFields,
    ) -> CoreResult<StateRecord>;

    async fn create_backup(&self, input: &NewBackup) -> CoreResult<BackupRecord>;

    /// Backups of one project, newest first.
    async fn list_backups(&self, user_id: DbId, project_id: DbId)
        -> CoreResult<Vec<BackupSummary>>;
}
