//! Read-side era service.
//!
//! [`EraQueries`] wraps an [`EraStore`] with the era read semantics: a
//! missing current era is the distinguished [`QueryError::NoCurrentEra`]
//! signal rather than a failure, and every store call is bounded by the
//! caller's [`RequestContext`].

use tracing::info;
use world_one_db::EraStore;
use world_one_types::Era;

use crate::context::RequestContext;
use crate::error::QueryError;

/// Era read operations over a store.
#[derive(Debug)]
pub struct EraQueries<S> {
    store: S,
}

impl<S: EraStore> EraQueries<S> {
    /// Create queries over `store` (usually `&mut` a transaction-bound store).
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Retrieve the unique era whose end is still open.
    pub async fn get_current_era(&mut self, ctx: &RequestContext) -> Result<Era, QueryError> {
        info!("Retrieving current era");
        match ctx.run(self.store.get_current_era()).await? {
            Ok(Some(era)) => {
                info!(era_id = %era.id, era_name = %era.name, "Retrieved current era");
                Ok(era)
            }
            Ok(None) => {
                info!("There is no current era");
                Err(QueryError::NoCurrentEra)
            }
            Err(source) => Err(QueryError::Store {
                operation: "retrieve the current era",
                source,
            }),
        }
    }

    /// Retrieve every era in storage order.
    pub async fn list_eras(&mut self, ctx: &RequestContext) -> Result<Vec<Era>, QueryError> {
        info!("Retrieving eras");
        let eras = ctx
            .run(self.store.list_eras())
            .await?
            .map_err(|source| QueryError::Store {
                operation: "retrieve all eras",
                source,
            })?;
        info!(count = eras.len(), "Retrieved eras");
        Ok(eras)
    }
}
