//! Error types for the era API.
//!
//! [`ApiError`] gathers every failure a handler can see and converts it into
//! a JSON response via its [`IntoResponse`] implementation. Client errors
//! carry their message; infrastructure failures are logged with their full
//! cause chain and rendered opaquely.

use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use world_one_db::DbError;
use world_one_eras::{Cancellation, QueryError, RolloverError};

const INTERNAL_MESSAGE: &str = "An unexpected error was returned by the DB integration";
const RETRYABLE_MESSAGE: &str = "The rollover conflicted with a concurrent transaction, retry it";

/// Errors that can occur in the era API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// An era query failed.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// A rollover failed.
    #[error(transparent)]
    Rollover(#[from] RolloverError),

    /// The request context finished outside of a query or rollover.
    #[error(transparent)]
    Cancelled(#[from] Cancellation),

    /// Opening, committing or releasing the transaction failed.
    #[error("era transaction failed: {0}")]
    Transaction(#[from] DbError),

    /// A read could not get a connection to the store.
    #[error("era store unavailable: {0}")]
    Store(#[source] DbError),

    /// The request body could not be decoded.
    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

impl ApiError {
    /// The HTTP status this error renders as.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Query(QueryError::NoCurrentEra) => StatusCode::NOT_FOUND,
            Self::Query(QueryError::Cancelled(c))
            | Self::Rollover(RolloverError::Cancelled(c))
            | Self::Cancelled(c) => cancellation_status(*c),
            Self::Rollover(RolloverError::WhitespaceName) | Self::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Rollover(
                RolloverError::DuplicateName { .. } | RolloverError::StaleConflict { .. },
            ) => StatusCode::CONFLICT,
            Self::Rollover(err) if err.is_retryable() => StatusCode::CONFLICT,
            Self::Transaction(err) if err.is_retryable() => StatusCode::CONFLICT,
            Self::Query(QueryError::Store { .. })
            | Self::Rollover(RolloverError::Infrastructure { .. })
            | Self::Transaction(_)
            | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the client may retry the same request unchanged.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Rollover(err) => err.is_retryable(),
            Self::Transaction(err) => err.is_retryable(),
            _ => false,
        }
    }
}

const fn cancellation_status(cancellation: Cancellation) -> StatusCode {
    match cancellation {
        Cancellation::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        Cancellation::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Render `err` and every source beneath it, outermost first.
fn cause_chain(err: &dyn StdError) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        // Most messages already embed their source.
        if !chain.ends_with(&text) {
            chain.push_str(": ");
            chain.push_str(&text);
        }
        source = cause.source();
    }
    chain
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retryable = self.is_retryable();

        let message = if retryable {
            tracing::warn!(error = %cause_chain(&self), "Era rollover lost a serialization conflict");
            RETRYABLE_MESSAGE.to_owned()
        } else if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %cause_chain(&self), "Era request failed");
            INTERNAL_MESSAGE.to_owned()
        } else {
            self.to_string()
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
            "retryable": retryable,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use world_one_eras::RolloverStage;
    use world_one_types::EraId;

    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(
            ApiError::from(RolloverError::WhitespaceName).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(RolloverError::DuplicateName {
                name: String::from("Age of Iron")
            })
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(RolloverError::StaleConflict { era_id: EraId(3) }).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(QueryError::NoCurrentEra).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn cancellation_maps_by_kind() {
        assert_eq!(
            ApiError::from(RolloverError::Cancelled(Cancellation::DeadlineExceeded)).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::from(QueryError::Cancelled(Cancellation::Cancelled)).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn infrastructure_is_opaque_500() {
        let err = ApiError::from(RolloverError::Infrastructure {
            stage: RolloverStage::CloseCurrent,
            source: DbError::Unavailable(String::from("connection reset")),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.is_retryable());
    }

    #[test]
    fn read_path_store_failure_is_not_a_transaction_error() {
        let err = ApiError::Store(DbError::Unavailable(String::from("pool timed out")));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "era store unavailable: store unavailable: pool timed out"
        );
        assert!(!cause_chain(&err).contains("transaction"));
    }

    #[test]
    fn cause_chain_includes_sources() {
        let err = ApiError::from(RolloverError::Infrastructure {
            stage: RolloverStage::InsertNew,
            source: DbError::Unavailable(String::from("connection reset")),
        });
        let chain = cause_chain(&err);
        assert!(chain.starts_with("era rollover failed while inserting the new era"));
        assert!(chain.ends_with("store unavailable: connection reset"));
        assert_eq!(chain.matches("connection reset").count(), 1);
    }
}
