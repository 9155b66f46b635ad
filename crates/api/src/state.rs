use std::sync::Arc;

use hexrfp_core::state_store::StateStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the store holds its persistence behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Versioned project state operations over the configured backend.
    pub store: StateStore,
    /// Server configuration (JWT settings are read by the auth extractor).
    pub config: Arc<ServerConfig>,
}
