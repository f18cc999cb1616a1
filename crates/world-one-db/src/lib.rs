//! Era store for the World One era system.
//!
//! `PostgreSQL` is the system of record for eras. This crate exposes the
//! narrow [`EraStore`] capability the era services are written against and
//! two implementations of it.
//!
//! # Architecture
//!
//! ```text
//! Transport adapter
//!     |
//!     +-- PostgresPool::begin_serializable() --> Transaction
//!     |       |
//!     |       +-- PgEraStore (bound to &mut *tx) --> eras table
//!     |
//!     +-- MemoryEraStore (tests, embedding)
//! ```
//!
//! # Modules
//!
//! - [`era_store`] -- [`EraStore`] trait, parameters, and the `PostgreSQL` store
//! - [`memory`] -- In-memory store with call counting
//! - [`postgres`] -- `PostgreSQL` connection pool, migrations, serializable transactions
//! - [`error`] -- Shared error types

pub mod era_store;
pub mod error;
pub mod memory;
pub mod postgres;

// Re-export primary types for convenience.
pub use era_store::{
    ERA_NAME_CONSTRAINT, EraRow, EraStore, InsertEra, PgEraStore, SINGLE_CURRENT_INDEX,
    UpdateEra,
};
pub use error::DbError;
pub use memory::{MemoryEraStore, StoreCalls};
pub use postgres::{PostgresConfig, PostgresPool};
