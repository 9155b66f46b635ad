//! Row structs for the state service tables.
//!
//! Each submodule contains `FromRow` structs matching the database rows and
//! the conversions into the domain types of `hexrfp_core`.

pub mod project;
pub mod project_state;
pub mod state_backup;
