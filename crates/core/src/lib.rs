//! Domain core for the HexagonRFP project state service.
//!
//! Everything here is transport- and storage-agnostic: persistence is reached
//! through the [`persistence::StatePersistence`] trait, implemented by the
//! PostgreSQL backend in `hexrfp-db` and by [`memory::InMemoryPersistence`].

pub mod backup;
pub mod error;
pub mod memory;
pub mod persistence;
pub mod project;
pub mod records;
pub mod resolver;
pub mod state_codec;
pub mod state_store;
pub mod types;
