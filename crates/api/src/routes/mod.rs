pub mod data;
pub mod health;
pub mod projects;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /data/sync                    load state, creating it on first access (GET)
/// /data/save                    full or partial save (POST)
/// /data/export                  download state (GET)
/// /data/import                  replace state, backing up first (POST)
/// /data/backups                 list pre-import backups (GET)
///
/// /projects                     list, create (GET, POST)
/// ```
///
/// Every route requires a Bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/data", data::router())
        .nest("/projects", projects::router())
}
