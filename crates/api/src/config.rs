use hexrfp_core::project::ProjectDefaults;
use hexrfp_core::types::Date;

use crate::auth::jwt::JwtConfig;

/// Which [`StatePersistence`](hexrfp_core::persistence::StatePersistence)
/// backend the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateBackend {
    /// PostgreSQL via `hexrfp-db` (default).
    Postgres,
    /// Process-local maps; state is lost on restart.
    Memory,
}

impl StateBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret and database URL have defaults suitable
/// for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub state_backend: StateBackend,
    /// Required when `state_backend` is [`StateBackend::Postgres`].
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// Name and dates used for implicitly created projects.
    pub project_defaults: ProjectDefaults,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                    |
    /// |----------------------------|----------------------------|
    /// | `HOST`                     | `0.0.0.0`                  |
    /// | `PORT`                     | `3000`                     |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                       |
    /// | `STATE_BACKEND`            | `postgres`                 |
    /// | `DATABASE_URL`             | -- (required for postgres) |
    /// | `DATABASE_MAX_CONNECTIONS` | `20`                       |
    /// | `DEFAULT_PROJECT_NAME`     | `HexagonRFP Project`       |
    /// | `DEFAULT_START_DATE`       | `2025-12-08`               |
    /// | `DEFAULT_GO_LIVE_DATE`     | `2026-09-01`               |
    ///
    /// # Panics
    ///
    /// Panics on unparsable values, on a missing `DATABASE_URL` with the
    /// postgres backend, and on default dates where go-live precedes start.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let state_backend = std::env::var("STATE_BACKEND")
            .map(|v| {
                StateBackend::parse(&v)
                    .unwrap_or_else(|| panic!("STATE_BACKEND must be 'postgres' or 'memory', got '{v}'"))
            })
            .unwrap_or(StateBackend::Postgres);

        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        if state_backend == StateBackend::Postgres {
            assert!(
                database_url.is_some(),
                "DATABASE_URL must be set when STATE_BACKEND is postgres"
            );
        }

        let database_max_connections: u32 = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| hexrfp_db::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse()
            .expect("DATABASE_MAX_CONNECTIONS must be a valid u32");

        let project_defaults = project_defaults_from_env();
        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            state_backend,
            database_url,
            database_max_connections,
            project_defaults,
            jwt,
        }
    }
}

fn date_var(name: &str, default: Date) -> Date {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} must be a YYYY-MM-DD date: {e}")),
        Err(_) => default,
    }
}

fn project_defaults_from_env() -> ProjectDefaults {
    let fallback = ProjectDefaults::default();
    let name = std::env::var("DEFAULT_PROJECT_NAME")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback.name);
    let start_date = date_var("DEFAULT_START_DATE", fallback.start_date);
    let go_live_date = date_var("DEFAULT_GO_LIVE_DATE", fallback.go_live_date);
    assert!(
        go_live_date >= start_date,
        "DEFAULT_GO_LIVE_DATE must not precede DEFAULT_START_DATE"
    );

    ProjectDefaults {
        name,
        start_date,
        go_live_date,
    }
}
