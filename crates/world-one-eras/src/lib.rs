//! Era queries and the era rollover engine.
//!
//! Eras are named, time-bounded epochs that gate the game's global
//! configuration and allow periodic soft resets on the scale of years.
//! Exactly one era is current at any time, or none before the first
//! rollover.
//!
//! # Architecture
//!
//! ```text
//! Transport adapter (owns the serializable transaction)
//!     |
//!     +-- EraQueries::get_current_era / list_eras
//!     +-- Rollover::exec(now, name)
//!             |
//!             +-- EraQueries::get_current_era
//!             +-- EraStore::update_era   (close, keyed on update_time)
//!             +-- EraStore::insert_era   (open at now)
//! ```
//!
//! Both services are generic over [`world_one_db::EraStore`] and hold no
//! connection or transaction state of their own.
//!
//! # Modules
//!
//! - [`context`] -- Cancellation and deadlines threaded through every call
//! - [`queries`] -- Read-side era service
//! - [`rollover`] -- The close-old/open-new transition
//! - [`error`] -- Query and rollover error taxonomy

pub mod context;
pub mod error;
pub mod queries;
pub mod rollover;

// Re-export primary types for convenience.
pub use context::{Cancellation, RequestContext};
pub use error::{QueryError, RolloverError, RolloverStage};
pub use queries::EraQueries;
pub use rollover::{Rollover, RolloverOutcome};
