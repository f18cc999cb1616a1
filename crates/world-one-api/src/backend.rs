//! Transaction boundary between HTTP handlers and the era core.
//!
//! An [`EraBackend`] opens whatever unit of work its storage needs, binds an
//! [`EraStore`](world_one_db::EraStore) to it, runs the era operation and
//! then commits or rolls back. Handlers are generic over the backend so the
//! same router serves [`PgBackend`] in production and [`MemoryBackend`] in
//! tests.

use std::future::Future;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};
use world_one_db::{DbError, MemoryEraStore, PgEraStore, PostgresPool};
use world_one_eras::{EraQueries, RequestContext, Rollover, RolloverOutcome};
use world_one_types::Era;

use crate::error::ApiError;

/// Storage-backed era operations with their transaction handling.
pub trait EraBackend: Send + Sync + 'static {
    /// Read the current era.
    fn current_era(
        &self,
        ctx: &RequestContext,
    ) -> impl Future<Output = Result<Era, ApiError>> + Send;

    /// Read every era.
    fn list_eras(
        &self,
        ctx: &RequestContext,
    ) -> impl Future<Output = Result<Vec<Era>, ApiError>> + Send;

    /// Roll over to `name` at `now` inside one serializable unit of work.
    fn rollover(
        &self,
        ctx: &RequestContext,
        now: DateTime<Utc>,
        name: &str,
    ) -> impl Future<Output = Result<RolloverOutcome, ApiError>> + Send;
}

/// Backend over a `PostgreSQL` pool.
///
/// Reads run on a pooled connection. Rollovers run in a `SERIALIZABLE`
/// transaction which is committed only when the core succeeds; any error,
/// cancellation included, rolls it back.
#[derive(Clone)]
pub struct PgBackend {
    pool: PostgresPool,
}

impl PgBackend {
    /// Create a backend over `pool`.
    pub const fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }
}

impl EraBackend for PgBackend {
    async fn current_era(&self, ctx: &RequestContext) -> Result<Era, ApiError> {
        let mut conn = ctx
            .run(self.pool.pool().acquire())
            .await?
            .map_err(|e| ApiError::Store(e.into()))?;
        Ok(EraQueries::new(PgEraStore::new(&mut conn))
            .get_current_era(ctx)
            .await?)
    }

    async fn list_eras(&self, ctx: &RequestContext) -> Result<Vec<Era>, ApiError> {
        let mut conn = ctx
            .run(self.pool.pool().acquire())
            .await?
            .map_err(|e| ApiError::Store(e.into()))?;
        Ok(EraQueries::new(PgEraStore::new(&mut conn))
            .list_eras(ctx)
            .await?)
    }

    async fn rollover(
        &self,
        ctx: &RequestContext,
        now: DateTime<Utc>,
        name: &str,
    ) -> Result<RolloverOutcome, ApiError> {
        let mut tx = ctx.run(self.pool.begin_serializable()).await??;

        // A context that finished after the last store call still forbids the commit.
        let result = Rollover::new(PgEraStore::new(&mut tx))
            .exec(ctx, now, name)
            .await
            .and_then(|outcome| ctx.err().map_or(Ok(outcome), |c| Err(c.into())));

        match result {
            Ok(outcome) => {
                tx.commit().await.map_err(DbError::from)?;
                info!(
                    era_id = %outcome.new_era.id,
                    era_name = %outcome.new_era.name,
                    "Era rollover committed"
                );
                Ok(outcome)
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback().await {
                    warn!(error = %rollback, "Rolling back a failed era rollover also failed");
                }
                Err(err.into())
            }
        }
    }
}

/// Backend over an in-memory store.
///
/// The mutex serializes rollovers. A failed rollover restores the store as
/// it was before the call, which is this backend's rollback.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    store: Mutex<MemoryEraStore>,
}

impl MemoryBackend {
    /// Create a backend over an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the store as it is now.
    pub async fn snapshot(&self) -> MemoryEraStore {
        self.store.lock().await.clone()
    }
}

impl EraBackend for MemoryBackend {
    async fn current_era(&self, ctx: &RequestContext) -> Result<Era, ApiError> {
        let mut store = self.store.lock().await;
        Ok(EraQueries::new(&mut *store).get_current_era(ctx).await?)
    }

    async fn list_eras(&self, ctx: &RequestContext) -> Result<Vec<Era>, ApiError> {
        let mut store = self.store.lock().await;
        Ok(EraQueries::new(&mut *store).list_eras(ctx).await?)
    }

    async fn rollover(
        &self,
        ctx: &RequestContext,
        now: DateTime<Utc>,
        name: &str,
    ) -> Result<RolloverOutcome, ApiError> {
        let mut store = self.store.lock().await;
        let before = store.clone();

        match Rollover::new(&mut *store).exec(ctx, now, name).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                *store = before;
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;
    use world_one_eras::{Cancellation, RolloverError};

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn failed_rollover_restores_the_store() {
        let backend = MemoryBackend::new();
        let ctx = RequestContext::background();
        backend.rollover(&ctx, at(1), "Age of Bronze").await.unwrap();
        let before = backend.snapshot().await;

        let err = backend
            .rollover(&ctx, at(2), "Age of Bronze")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Rollover(RolloverError::DuplicateName { .. })
        ));

        let after = backend.snapshot().await;
        assert_eq!(after.eras(), before.eras());
        assert!(after.eras()[0].is_current());
    }

    #[tokio::test]
    async fn cancelled_rollover_writes_nothing() {
        let backend = MemoryBackend::new();
        let ctx = RequestContext::background();
        ctx.cancel();

        let err = backend
            .rollover(&ctx, at(1), "Age of Bronze")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Rollover(RolloverError::Cancelled(Cancellation::Cancelled))
        ));
        assert!(backend.snapshot().await.eras().is_empty());
    }

    #[tokio::test]
    async fn reads_see_committed_rollovers() {
        let backend = MemoryBackend::new();
        let ctx = RequestContext::background();
        backend.rollover(&ctx, at(1), "Age of Bronze").await.unwrap();
        backend.rollover(&ctx, at(2), "Age of Iron").await.unwrap();

        let current = backend.current_era(&ctx).await.unwrap();
        assert_eq!(current.name, "Age of Iron");
        assert_eq!(backend.list_eras(&ctx).await.unwrap().len(), 2);
    }
}
