//! [`StatePersistence`] backed by PostgreSQL.

use async_trait::async_trait;
use hexrfp_core::error::{CoreError, CoreResult};
use hexrfp_core::persistence::StatePersistence;
use hexrfp_core::project::{NewProject, Project, ProjectSummary};
use hexrfp_core::records::{
    BackupRecord, BackupSummary, NewBackup, StateRecord, StateWrite,
};
use hexrfp_core::state_codec::StateFields;
use hexrfp_core::types::DbId;

use crate::repositories::{ProjectRepo, ProjectStateRepo, StateBackupRepo};
use crate::DbPool;

/// PostgreSQL unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Map a sqlx error into the core taxonomy.
///
/// Unique violations become `Conflict`; everything else is a
/// `Persistence` error carrying the driver message.
pub fn classify(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown");
            return CoreError::Conflict(format!(
                "Duplicate value violates unique constraint: {constraint}"
            ));
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Persistence(err.to_string())
}

#[derive(Clone)]
pub struct PgStatePersistence {
    pool: DbPool,
}

impl PgStatePersistence {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatePersistence for PgStatePersistence {
    async fn ping(&self) -> CoreResult<()> {
        crate::health_check(&self.pool).await.map_err(classify)
    }

    async fn list_projects(&self, user_id: DbId) -> CoreResult<Vec<Project>> {
        let rows = ProjectRepo::list_by_user(&self.pool, user_id)
            .await
            .map_err(classify)?;
        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn list_project_summaries(&self, user_id: DbId) -> CoreResult<Vec<ProjectSummary>> {
        let rows = ProjectRepo::list_summaries_by_user(&self.pool, user_id)
            .await
            .map_err(classify)?;
        Ok(rows.into_iter().map(ProjectSummary::from).collect())
    }

    async fn find_project(&self, project_id: DbId) -> CoreResult<Option<Project>> {
        let row = ProjectRepo::find_by_id(&self.pool, project_id)
            .await
            .map_err(classify)?;
        Ok(row.map(Project::from))
    }

    async fn create_project(&self, user_id: DbId, input: &NewProject) -> CoreResult<Project> {
        let row = ProjectRepo::create(&self.pool, user_id, input)
            .await
            .map_err(classify)?;
        Ok(row.into())
    }

    async fn create_default_project(
        &self,
        user_id: DbId,
        input: &NewProject,
    ) -> CoreResult<Option<Project>> {
        let row = ProjectRepo::create_default(&self.pool, user_id, input)
            .await
            .map_err(classify)?;
        Ok(row.map(Project::from))
    }

    async fn find_state(
        &self,
        user_id: DbId,
        project_id: DbId,
    ) -> CoreResult<Option<StateRecord>> {
        let row = ProjectStateRepo::find(&self.pool, user_id, project_id)
            .await
            .map_err(classify)?;
        Ok(row.map(StateRecord::from))
    }

    async fn insert_state(
        &self,
        user_id: DbId,
        project_id: DbId,
        fields: &StateFields,
    ) -> CoreResult<StateRecord> {
        let fields = serde_json::Value::Object(fields.as_map().clone());
        let row = ProjectStateRepo::insert(&self.pool, user_id, project_id, &fields)
            .await
            .map_err(classify)?;
        Ok(row.into())
    }

    async fn update_state(
        &self,
        user_id: DbId,
        project_id: DbId,
        fields: &StateFields,
        write: StateWrite,
    ) -> CoreResult<Option<StateRecord>> {
        let fields = serde_json::Value::Object(fields.as_map().clone());
        let row = match write {
            StateWrite::Full { expected_version } => {
                ProjectStateRepo::update_full(
                    &self.pool,
                    user_id,
                    project_id,
                    &fields,
                    expected_version,
                )
                .await
            }
            StateWrite::Partial => {
                ProjectStateRepo::update_partial(&self.pool, user_id, project_id, &fields).await
            }
        }
        .map_err(classify)?;
        Ok(row.map(StateRecord::from))
    }

    async fn replace_state(
        &self,
        user_id: DbId,
        project_id: DbId,
        fields: &StateFields,
    ) -> CoreResult<StateRecord> {
        let fields = serde_json::Value::Object(fields.as_map().clone());
        let row = ProjectStateRepo::replace(&self.pool, user_id, project_id, &fields)
            .await
            .map_err(classify)?;
        Ok(row.into())
    }

    async fn create_backup(&self, input: &NewBackup) -> CoreResult<BackupRecord> {
        let snapshot = serde_json::to_value(&input.snapshot)
            .map_err(|e| CoreError::Internal(format!("Failed to serialize snapshot: {e}")))?;
        let row = StateBackupRepo::create(
            &self.pool,
            input.user_id,
            input.project_id,
            input.backup_type.as_str(),
            &snapshot,
            input.snapshot.version,
        )
        .await
        .map_err(classify)?;
        BackupRecord::try_from(row)
    }

    async fn list_backups(
        &self,
        user_id: DbId,
        project_id: DbId,
    ) -> CoreResult<Vec<BackupSummary>> {
        let rows = StateBackupRepo::list_by_project(&self.pool, user_id, project_id)
            .await
            .map_err(classify)?;
        rows.into_iter().map(BackupSummary::try_from).collect()
    }
}
