//! Error types for era queries and rollovers.
//!
//! The taxonomy separates four kinds of failure so the transport layer can
//! render them precisely:
//!
//! | Kind | Variants | Caller action |
//! |------|----------|---------------|
//! | Input | [`RolloverError::WhitespaceName`] | fix the request |
//! | Conflict | [`RolloverError::DuplicateName`], [`RolloverError::StaleConflict`] | re-read state |
//! | Cancellation | `Cancelled` | none, the caller gave up |
//! | Infrastructure | `Store` / `Infrastructure` | server error, cause retained |
//!
//! Cancellation is carried verbatim and never wrapped in an infrastructure
//! error.

use world_one_db::DbError;
use world_one_types::EraId;

use crate::context::Cancellation;

/// Errors returned by [`EraQueries`](crate::EraQueries).
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// No era holds the open-end sentinel. Legitimate before the first
    /// rollover.
    #[error("there is no current era, the game is not initialized yet")]
    NoCurrentEra,

    /// The caller's context finished before the query did.
    #[error(transparent)]
    Cancelled(#[from] Cancellation),

    /// The store failed.
    #[error("era queries failed to {operation}: {source}")]
    Store {
        /// What the query was doing.
        operation: &'static str,
        /// The underlying store error.
        #[source]
        source: DbError,
    },
}

impl QueryError {
    /// Whether this is the "no current era" signal.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NoCurrentEra)
    }
}

/// The rollover step an infrastructure failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloverStage {
    /// Reading the current era.
    ReadCurrent,
    /// Closing the current era.
    CloseCurrent,
    /// Inserting the new era.
    InsertNew,
}

impl core::fmt::Display for RolloverStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let stage = match self {
            Self::ReadCurrent => "retrieving the current era",
            Self::CloseCurrent => "updating the current era",
            Self::InsertNew => "inserting the new era",
        };
        f.write_str(stage)
    }
}

/// Errors returned by [`Rollover::exec`](crate::Rollover::exec).
#[derive(Debug, thiserror::Error)]
pub enum RolloverError {
    /// The requested name is empty after trimming.
    #[error("the new era name must not be empty or whitespace")]
    WhitespaceName,

    /// Another era, past or present, already has this name.
    #[error("an era named {name:?} already exists")]
    DuplicateName {
        /// The trimmed name that collided.
        name: String,
    },

    /// The current era changed between being read and being closed.
    #[error("era {era_id} was modified after it was read, the rollover is stale")]
    StaleConflict {
        /// The era whose close-write matched no rows.
        era_id: EraId,
    },

    /// The caller's context finished before the rollover did.
    #[error(transparent)]
    Cancelled(#[from] Cancellation),

    /// The store failed.
    #[error("era rollover failed while {stage}: {source}")]
    Infrastructure {
        /// The step that failed.
        stage: RolloverStage,
        /// The underlying store error.
        #[source]
        source: DbError,
    },
}

impl RolloverError {
    /// Whether the request itself is invalid against current state.
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::WhitespaceName | Self::DuplicateName { .. } | Self::StaleConflict { .. }
        )
    }

    /// Whether the owning transaction lost a serialization conflict and
    /// may be retried.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Infrastructure { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}
