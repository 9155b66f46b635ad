//! Shared query parameter types for API handlers.

use hexrfp_core::types::DbId;
use serde::Deserialize;

/// Optional explicit project selector (`?projectId=`).
///
/// When absent the caller's default project is used.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectParams {
    pub project_id: Option<DbId>,
}
