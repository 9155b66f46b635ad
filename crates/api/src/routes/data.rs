//! Route definitions for the `/data` resource (project state).

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::project_state;
use crate::state::AppState;

/// Routes mounted at `/data`.
///
/// ```text
/// GET    /sync       -> sync
/// POST   /save       -> save
/// GET    /export     -> export
/// POST   /import     -> import
/// GET    /backups    -> list_backups
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sync", get(project_state::sync))
        .route("/save", post(project_state::save))
        .route("/export", get(project_state::export))
        .route("/import", post(project_state::import))
        .route("/backups", get(project_state::list_backups))
}
