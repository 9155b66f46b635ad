//! Project domain types, creation defaults and validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Date, DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Name given to projects created without an explicit name.
pub const DEFAULT_PROJECT_NAME: &str = "HexagonRFP Project";

/// Maximum length of a project name (after trimming).
pub const MAX_PROJECT_NAME_LENGTH: usize = 200;

/// Default project start date (2025-12-08).
pub fn default_start_date() -> Date {
    NaiveDate::from_ymd_opt(2025, 12, 8).unwrap_or_default()
}

/// Default project go-live date (2026-09-01).
pub fn default_go_live_date() -> Date {
    NaiveDate::from_ymd_opt(2026, 9, 1).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A project owned by a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub start_date: Date,
    pub go_live_date: Date,
    /// Set on the project the resolver creates for a user with no projects.
    pub is_default: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    pub fn dates(&self) -> ProjectDates {
        ProjectDates {
            start_date: self.start_date,
            go_live_date: self.go_live_date,
        }
    }
}

/// The two project dates surfaced in every decoded state document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectDates {
    pub start_date: Date,
    pub go_live_date: Date,
}

/// Input for inserting a project row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub name: String,
    pub start_date: Date,
    pub go_live_date: Date,
    pub is_default: bool,
}

/// A project as listed to its owner, with the state record's modification
/// time folded in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: DbId,
    pub name: String,
    pub start_date: Date,
    pub go_live_date: Date,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// The state record's `last_modified`, or `updated_at` when the project
    /// has no state record yet.
    pub last_modified: Timestamp,
}

/// Caller input for creating a project. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub start_date: Option<Date>,
    pub go_live_date: Option<Date>,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Values used when a project is created without explicit name or dates.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDefaults {
    pub name: String,
    pub start_date: Date,
    pub go_live_date: Date,
}

impl Default for ProjectDefaults {
    fn default() -> Self {
        Self {
            name: DEFAULT_PROJECT_NAME.to_string(),
            start_date: default_start_date(),
            go_live_date: default_go_live_date(),
        }
    }
}

impl ProjectDefaults {
    /// The input the resolver uses for a user's implicit default project.
    pub fn default_project(&self) -> NewProject {
        NewProject {
            name: self.name.clone(),
            start_date: self.start_date,
            go_live_date: self.go_live_date,
            is_default: true,
        }
    }

    /// Merge a create request with these defaults and validate the result.
    pub fn apply(&self, request: &CreateProjectRequest) -> Result<NewProject, CoreError> {
        let name = match request.name.as_deref() {
            Some(name) => validate_project_name(name)?,
            None => self.name.clone(),
        };
        let start_date = request.start_date.unwrap_or(self.start_date);
        let go_live_date = request.go_live_date.unwrap_or(self.go_live_date);
        validate_project_dates(start_date, go_live_date)?;

        Ok(NewProject {
            name,
            start_date,
            go_live_date,
            is_default: false,
        })
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a project name and return it trimmed.
pub fn validate_project_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Project name must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_PROJECT_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Project name exceeds maximum length of {MAX_PROJECT_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// The go-live date must not precede the start date.
pub fn validate_project_dates(start_date: Date, go_live_date: Date) -> Result<(), CoreError> {
    if go_live_date < start_date {
        return Err(CoreError::Validation(format!(
            "Go-live date {go_live_date} precedes start date {start_date}"
        )));
    }
    Ok(())
}
