//! In-process [`StatePersistence`] backend.
//!
//! Mirrors the PostgreSQL backend's observable behaviour (one record per
//! project, one default project per user, compare-and-swap on full saves)
//! behind a single `RwLock`. Used by tests and by `STATE_BACKEND=memory`
//! local runs. Foreign keys are not modelled.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::persistence::StatePersistence;
use crate::project::{NewProject, Project, ProjectSummary};
use crate::records::{BackupRecord, BackupSummary, NewBackup, StateRecord, StateWrite};
use crate::state_codec::StateFields;
use crate::types::DbId;

#[derive(Default)]
struct Tables {
    last_project_id: DbId,
    last_backup_id: DbId,
    /// Creation order, which is also id order.
    projects: Vec<Project>,
    /// Keyed by project id; a project has at most one record.
    states: HashMap<DbId, StateRecord>,
    backups: Vec<BackupRecord>,
}

#[derive(Default)]
pub struct InMemoryPersistence {
    tables: RwLock<Tables>,
    fail_backups: AtomicBool,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `create_backup` fail (fault injection).
    pub fn fail_backup_writes(&self, fail: bool) {
        self.fail_backups.store(fail, Ordering::SeqCst);
    }

    /// Fetch a full backup, snapshot included.
    pub async fn backup(&self, backup_id: DbId) -> Option<BackupRecord> {
        let tables = self.tables.read().await;
        tables.backups.iter().find(|b| b.id == backup_id).cloned()
    }

    fn insert_project(tables: &mut Tables, user_id: DbId, input: &NewProject) -> Project {
        tables.last_project_id += 1;
        let now = Utc::now();
        let project = Project {
            id: tables.last_project_id,
            user_id,
            name: input.name.clone(),
            start_date: input.start_date,
            go_live_date: input.go_live_date,
            is_default: input.is_default,
            created_at: now,
            updated_at: now,
        };
        tables.projects.push(project.clone());
        project
    }
}

#[async_trait]
impl StatePersistence for InMemoryPersistence {
    async fn ping(&self) -> CoreResult<()> {
        Ok(())
    }

    async fn list_projects(&self, user_id: DbId) -> CoreResult<Vec<Project>> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_project_summaries(&self, user_id: DbId) -> CoreResult<Vec<ProjectSummary>> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id)
            .map(|p| ProjectSummary {
                id: p.id,
                name: p.name.clone(),
                start_date: p.start_date,
                go_live_date: p.go_live_date,
                created_at: p.created_at,
                updated_at: p.updated_at,
                last_modified: tables
                    .states
                    .get(&p.id)
                    .map_or(p.updated_at, |s| s.last_modified),
            })
            .collect())
    }

    async fn find_project(&self, project_id: DbId) -> CoreResult<Option<Project>> {
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().find(|p| p.id == project_id).cloned())
    }

    async fn create_project(&self, user_id: DbId, input: &NewProject) -> CoreResult<Project> {
        let mut tables = self.tables.write().await;
        if input.is_default
            && tables
                .projects
                .iter()
                .any(|p| p.user_id == user_id && p.is_default)
        {
            return Err(CoreError::Conflict(format!(
                "User {user_id} already has a default project"
            )));
        }
        Ok(Self::insert_project(&mut tables, user_id, input))
    }

    async fn create_default_project(
        &self,
        user_id: DbId,
        input: &NewProject,
    ) -> CoreResult<Option<Project>> {
        let mut tables = self.tables.write().await;
        if tables
            .projects
            .iter()
            .any(|p| p.user_id == user_id && p.is_default)
        {
            return Ok(None);
        }
        let input = NewProject {
            is_default: true,
            ..input.clone()
        };
        Ok(Some(Self::insert_project(&mut tables, user_id, &input)))
    }

    async fn find_state(
        &self,
        user_id: DbId,
        project_id: DbId,
    ) -> CoreResult<Option<StateRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .states
            .get(&project_id)
            .filter(|s| s.user_id == user_id)
            .cloned())
    }

    async fn insert_state(
        &self,
        user_id: DbId,
        project_id: DbId,
        fields: &StateFields,
    ) -> CoreResult<StateRecord> {
        let mut tables = self.tables.write().await;
        if tables.states.contains_key(&project_id) {
            return Err(CoreError::Conflict(format!(
                "State record for project {project_id} already exists"
            )));
        }
        let now = Utc::now();
        let record = StateRecord {
            project_id,
            user_id,
            version: 1,
            last_modified: now,
            fields: fields.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.states.insert(project_id, record.clone());
        Ok(record)
    }

    async fn update_state(
        &self,
        user_id: DbId,
        project_id: DbId,
        fields: &StateFields,
        write: StateWrite,
    ) -> CoreResult<Option<StateRecord>> {
        let mut tables = self.tables.write().await;
        let Some(record) = tables
            .states
            .get_mut(&project_id)
            .filter(|s| s.user_id == user_id)
        else {
            return Ok(None);
        };

        let now = Utc::now();
        match write {
            StateWrite::Full { expected_version } => {
                if record.version != expected_version {
                    return Ok(None);
                }
                record.version += 1;
                record.last_modified = now;
            }
            StateWrite::Partial => {}
        }
        record.fields = fields.clone();
        record.updated_at = now;
        Ok(Some(record.clone()))
    }

    async fn replace_state(
        &self,
        user_id: DbId,
        project_id: DbId,
        fields: &StateFields,
    ) -> CoreResult<StateRecord> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let created_at = tables
            .states
            .get(&project_id)
            .map_or(now, |existing| existing.created_at);
        let record = StateRecord {
            project_id,
            user_id,
            version: 1,
            last_modified: now,
            fields: fields.clone(),
            created_at,
            updated_at: now,
        };
        tables.states.insert(project_id, record.clone());
        Ok(record)
    }

    async fn create_backup(&self, input: &NewBackup) -> CoreResult<BackupRecord> {
        if self.fail_backups.load(Ordering::SeqCst) {
            return Err(CoreError::Persistence(
                "backup storage unavailable".to_string(),
            ));
        }
        let mut tables = self.tables.write().await;
        tables.last_backup_id += 1;
        let backup = BackupRecord {
            id: tables.last_backup_id,
            user_id: input.user_id,
            project_id: input.project_id,
            backup_type: input.backup_type,
            snapshot: input.snapshot.clone(),
            created_at: Utc::now(),
        };
        tables.backups.push(backup.clone());
        Ok(backup)
    }

    async fn list_backups(
        &self,
        user_id: DbId,
        project_id: DbId,
    ) -> CoreResult<Vec<BackupSummary>> {
        let tables = self.tables.read().await;
        Ok(tables
            .backups
            .iter()
            .rev()
            .filter(|b| b.user_id == user_id && b.project_id == project_id)
            .map(BackupSummary::from)
            .collect())
    }
}
