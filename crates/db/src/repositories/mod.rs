//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod project_repo;
pub mod project_state_repo;
pub mod state_backup_repo;

pub use project_repo::ProjectRepo;
pub use project_state_repo::ProjectStateRepo;
pub use state_backup_repo::StateBackupRepo;
