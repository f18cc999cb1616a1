//! Error types for the era store.
//!
//! All errors are propagated via [`DbError`]. Converting a [`sqlx::Error`]
//! classifies the `PostgreSQL` SQLSTATE so callers branch on structured
//! variants instead of matching driver message text.

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// SQLSTATE for `serialization_failure`.
const SERIALIZATION_FAILURE: &str = "40001";

/// SQLSTATE for `deadlock_detected`.
const DEADLOCK_DETECTED: &str = "40P01";

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[source] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A write collided with a unique constraint or unique index.
    #[error("unique constraint {constraint:?} violated")]
    UniqueViolation {
        /// Name of the violated constraint or index.
        constraint: String,
    },

    /// The serializable transaction lost a conflict and was aborted.
    #[error("transaction serialization failure: {0}")]
    SerializationFailure(#[source] sqlx::Error),

    /// The store could not serve the request (used by non-SQL stores).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DbError {
    /// Whether the owning transaction may be retried from scratch.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::SerializationFailure(_))
    }

    /// Whether this is a unique violation of the named constraint.
    pub fn violates(&self, name: &str) -> bool {
        matches!(self, Self::UniqueViolation { constraint } if constraint == name)
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match classify(&err) {
            Some(SqlState::UniqueViolation(constraint)) => Self::UniqueViolation { constraint },
            Some(SqlState::SerializationFailure) => Self::SerializationFailure(err),
            None => Self::Postgres(err),
        }
    }
}

/// The SQLSTATE classes callers need to tell apart.
enum SqlState {
    UniqueViolation(String),
    SerializationFailure,
}

fn classify(err: &sqlx::Error) -> Option<SqlState> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    match db_err.code().as_deref() {
        Some(UNIQUE_VIOLATION) => Some(SqlState::UniqueViolation(
            db_err.constraint().unwrap_or_default().to_owned(),
        )),
        Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED) => Some(SqlState::SerializationFailure),
        _ => None,
    }
}
