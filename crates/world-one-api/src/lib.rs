//! HTTP adapter for World One eras.
//!
//! A thin Axum layer over the era core: it decodes requests, opens the
//! serializable transaction, hands the transaction-bound store to
//! [`world_one_eras`], and renders the outcome or error as JSON.
//!
//! # Architecture
//!
//! ```text
//! HTTP request
//!     |
//!     +-- router (x-request-id, TraceLayer)
//!     |     |
//!     |     +-- handlers --> EraBackend
//!     |                        |
//!     |                        +-- PgBackend: SERIALIZABLE tx --> PgEraStore
//!     |                        +-- MemoryBackend: mutex + snapshot --> MemoryEraStore
//!     |
//!     +-- ApiError --> JSON {"error", "status", "retryable"}
//! ```
//!
//! # Modules
//!
//! - [`backend`] -- Transaction boundary per storage backend
//! - [`config`] -- YAML configuration with environment overrides
//! - [`error`] -- Error to response mapping
//! - [`handlers`] -- Endpoint handlers and request/response bodies
//! - [`router`] -- Route table and middleware
//! - [`server`] -- Listener lifecycle
//! - [`state`] -- Shared handler state

pub mod backend;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use backend::{EraBackend, MemoryBackend, PgBackend};
pub use config::{ApiConfig, ConfigError, LogFormat};
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
