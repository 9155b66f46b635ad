//! Project resolution: map a caller and an optional explicit project id to
//! the project every state operation works on.

use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::persistence::StatePersistence;
use crate::project::{Project, ProjectDefaults};
use crate::types::DbId;

/// Finds the user's default project, creating it on first use.
#[derive(Clone)]
pub struct ProjectResolver {
    persistence: Arc<dyn StatePersistence>,
    defaults: ProjectDefaults,
}

impl ProjectResolver {
    pub fn new(persistence: Arc<dyn StatePersistence>, defaults: ProjectDefaults) -> Self {
        Self {
            persistence,
            defaults,
        }
    }

    /// Resolve the project id an operation targets.
    ///
    /// An explicit id is returned as-is; ownership is checked by the store.
    /// Otherwise the user's oldest project is used, and a default project is
    /// created when the user has none.
    pub async fn resolve(&self, user_id: DbId, explicit: Option<DbId>) -> CoreResult<DbId> {
        if let Some(project_id) = explicit {
            return Ok(project_id);
        }

        if let Some(project) = self.oldest_project(user_id).await? {
            return Ok(project.id);
        }

        let input = self.defaults.default_project();
        match self
            .persistence
            .create_default_project(user_id, &input)
            .await?
        {
            Some(project) => {
                tracing::info!(user_id, project_id = project.id, "Created default project");
                Ok(project.id)
            }
            // A concurrent caller created the default project first.
            None => {
                tracing::debug!(user_id, "Default project already created, re-reading");
                self.oldest_project(user_id)
                    .await?
                    .map(|project| project.id)
                    .ok_or_else(|| {
                        CoreError::Persistence(format!(
                            "Default project for user {user_id} was not readable after creation"
                        ))
                    })
            }
        }
    }

    async fn oldest_project(&self, user_id: DbId) -> CoreResult<Option<Project>> {
        let projects = self.persistence.list_projects(user_id).await?;
        Ok(projects.into_iter().next())
    }
}
