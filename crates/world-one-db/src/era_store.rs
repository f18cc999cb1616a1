//! Era persistence.
//!
//! [`EraStore`] is the narrow capability the era services depend on: read
//! the current era, read all eras, insert, and conditionally update.
//! Services take any implementation, so production code binds a
//! [`PgEraStore`] to a transaction while tests use a
//! [`MemoryEraStore`](crate::MemoryEraStore).
//!
//! # Outcomes
//!
//! | Operation | Success | Distinguished outcome |
//! |-----------|---------|-----------------------|
//! | `get_current_era` | `Some(era)` | `None`: no era holds the sentinel |
//! | `list_eras` | all rows | none |
//! | `insert_era` | inserted row | [`DbError::UniqueViolation`] |
//! | `update_era` | `Some(era)` | `None`: zero rows matched id + token |

use std::future::Future;

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use world_one_types::{Era, EraId, open_end_time};

use crate::error::DbError;

/// Name of the unique constraint on `eras.name`.
pub const ERA_NAME_CONSTRAINT: &str = "eras_name_key";

/// Name of the partial unique index allowing at most one current era.
pub const SINGLE_CURRENT_INDEX: &str = "eras_single_current";

/// Parameters for [`EraStore::insert_era`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertEra {
    /// Era name, already trimmed.
    pub name: String,
    /// Instant the era becomes effective.
    pub start_time: DateTime<Utc>,
    /// End instant, normally [`open_end_time`].
    pub end_time: DateTime<Utc>,
}

/// Parameters for [`EraStore::update_era`].
///
/// The write only applies when the stored row still carries
/// `expected_update_time`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateEra {
    /// Row to update.
    pub id: EraId,
    /// Name to write back (unchanged for a closing write).
    pub name: String,
    /// Start instant to write back (unchanged for a closing write).
    pub start_time: DateTime<Utc>,
    /// New end instant.
    pub end_time: DateTime<Utc>,
    /// The `update_time` observed when the row was read.
    pub expected_update_time: DateTime<Utc>,
}

impl UpdateEra {
    /// Build the write that closes `era` at `end_time`, keyed on the
    /// `update_time` it was read with.
    pub fn close(era: &Era, end_time: DateTime<Utc>) -> Self {
        Self {
            id: era.id,
            name: era.name.clone(),
            start_time: era.start_time,
            end_time,
            expected_update_time: era.update_time,
        }
    }
}

/// Storage capability for eras.
pub trait EraStore: Send {
    /// Fetch the era whose `end_time` is the open-end sentinel.
    fn get_current_era(&mut self) -> impl Future<Output = Result<Option<Era>, DbError>> + Send;

    /// Fetch every era in storage order.
    fn list_eras(&mut self) -> impl Future<Output = Result<Vec<Era>, DbError>> + Send;

    /// Insert a new era and return the stored row.
    fn insert_era(
        &mut self,
        params: &InsertEra,
    ) -> impl Future<Output = Result<Era, DbError>> + Send;

    /// Conditionally update an era keyed by id and expected `update_time`.
    ///
    /// Returns `Ok(None)` when no row matched both.
    fn update_era(
        &mut self,
        params: &UpdateEra,
    ) -> impl Future<Output = Result<Option<Era>, DbError>> + Send;
}

impl<S: EraStore> EraStore for &mut S {
    fn get_current_era(&mut self) -> impl Future<Output = Result<Option<Era>, DbError>> + Send {
        (**self).get_current_era()
    }

    fn list_eras(&mut self) -> impl Future<Output = Result<Vec<Era>, DbError>> + Send {
        (**self).list_eras()
    }

    fn insert_era(
        &mut self,
        params: &InsertEra,
    ) -> impl Future<Output = Result<Era, DbError>> + Send {
        (**self).insert_era(params)
    }

    fn update_era(
        &mut self,
        params: &UpdateEra,
    ) -> impl Future<Output = Result<Option<Era>, DbError>> + Send {
        (**self).update_era(params)
    }
}

/// A row from the `eras` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EraRow {
    /// `BIGSERIAL` key.
    pub id: i64,
    /// Unique era name.
    pub name: String,
    /// Start instant.
    pub start_time: DateTime<Utc>,
    /// End instant or the sentinel.
    pub end_time: DateTime<Utc>,
    /// Insertion instant.
    pub create_time: DateTime<Utc>,
    /// Last-write instant.
    pub update_time: DateTime<Utc>,
}

impl From<EraRow> for Era {
    fn from(row: EraRow) -> Self {
        Self {
            id: EraId(row.id),
            name: row.name,
            start_time: row.start_time,
            end_time: row.end_time,
            create_time: row.create_time,
            update_time: row.update_time,
        }
    }
}

/// Operations on the `eras` table over a single connection.
///
/// Bind it to a transaction (`&mut *tx`) for writes so the caller decides
/// isolation, commit, and rollback.
pub struct PgEraStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgEraStore<'c> {
    /// Create a store bound to a connection or transaction.
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

impl EraStore for PgEraStore<'_> {
    async fn get_current_era(&mut self) -> Result<Option<Era>, DbError> {
        let row = sqlx::query_as::<_, EraRow>(
            r"SELECT id, name, start_time, end_time, create_time, update_time
              FROM eras
              WHERE end_time = $1",
        )
        .bind(open_end_time())
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(row.map(Era::from))
    }

    async fn list_eras(&mut self) -> Result<Vec<Era>, DbError> {
        let rows = sqlx::query_as::<_, EraRow>(
            r"SELECT id, name, start_time, end_time, create_time, update_time
              FROM eras
              ORDER BY start_time, id",
        )
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows.into_iter().map(Era::from).collect())
    }

    async fn insert_era(&mut self, params: &InsertEra) -> Result<Era, DbError> {
        let row = sqlx::query_as::<_, EraRow>(
            r"INSERT INTO eras (name, start_time, end_time)
              VALUES ($1, $2, $3)
              RETURNING id, name, start_time, end_time, create_time, update_time",
        )
        .bind(&params.name)
        .bind(params.start_time)
        .bind(params.end_time)
        .fetch_one(&mut *self.conn)
        .await?;

        tracing::debug!(era_id = row.id, era_name = %row.name, "Inserted era row");
        Ok(row.into())
    }

    async fn update_era(&mut self, params: &UpdateEra) -> Result<Option<Era>, DbError> {
        let row = sqlx::query_as::<_, EraRow>(
            r"UPDATE eras
              SET name = $2, start_time = $3, end_time = $4, update_time = clock_timestamp()
              WHERE id = $1 AND update_time = $5
              RETURNING id, name, start_time, end_time, create_time, update_time",
        )
        .bind(params.id.into_inner())
        .bind(&params.name)
        .bind(params.start_time)
        .bind(params.end_time)
        .bind(params.expected_update_time)
        .fetch_optional(&mut *self.conn)
        .await?;

        if row.is_none() {
            tracing::debug!(era_id = %params.id, "Conditional era update matched no rows");
        }
        Ok(row.map(Era::from))
    }
}
