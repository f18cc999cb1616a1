//! Era rollover: close the current era and open the next one.
//!
//! While a rollover happens other parts of the game are usually soft reset
//! as well, so the engine is handed the instant to use (`now`) instead of
//! reading a clock. The same instant becomes the closing era's `end_time`
//! and the new era's `start_time`, which keeps era intervals contiguous.
//!
//! # Steps
//!
//! ```text
//! exec(now, name)
//!   |
//!   +-- trim name, reject if empty          (no store calls)
//!   +-- read current era                    (none is fine: bootstrap)
//!   +-- close it at `now`, keyed on update_time
//!   |       zero rows matched -> StaleConflict
//!   +-- insert {name, now, open-end}
//!           name taken -> DuplicateName
//! ```
//!
//! The two writes target different rows and are issued separately. The
//! caller wraps the whole call in one serializable transaction and commits
//! or rolls back; the engine never touches transaction lifecycle.

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use world_one_db::{ERA_NAME_CONSTRAINT, EraStore, InsertEra, UpdateEra};
use world_one_types::{Era, open_end_time};

use crate::context::RequestContext;
use crate::error::{QueryError, RolloverError, RolloverStage};
use crate::queries::EraQueries;

/// The result of a successful rollover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverOutcome {
    /// The era opened at `now`.
    pub new_era: Era,
    /// The era closed at `now`, absent on the bootstrap rollover.
    pub previous_era: Option<Era>,
}

/// Orchestrates the close-old/open-new transition over a store.
#[derive(Debug)]
pub struct Rollover<S> {
    store: S,
}

impl<S: EraStore> Rollover<S> {
    /// Create a rollover over `store` (usually `&mut` a transaction-bound store).
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Close the current era (if any) and open `new_era_name` at `now`.
    ///
    /// `now` is used exactly as given for both the closing end and the new
    /// start. The context is checked after every store call; once it is done the
    /// rollover stops and reports [`RolloverError::Cancelled`], and nothing
    /// written so far may be committed.
    pub async fn exec(
        &mut self,
        ctx: &RequestContext,
        now: DateTime<Utc>,
        new_era_name: &str,
    ) -> Result<RolloverOutcome, RolloverError> {
        let name = new_era_name.trim();
        if name.is_empty() {
            return Err(RolloverError::WhitespaceName);
        }

        info!("Attempting to retrieve current era, if exists");
        let current = match EraQueries::new(&mut self.store).get_current_era(ctx).await {
            Ok(era) => Some(era),
            Err(QueryError::NoCurrentEra) => None,
            Err(QueryError::Cancelled(cancellation)) => return Err(cancellation.into()),
            Err(QueryError::Store { source, .. }) => {
                return Err(RolloverError::Infrastructure {
                    stage: RolloverStage::ReadCurrent,
                    source,
                });
            }
        };

        let previous_era = match current {
            Some(era) => Some(self.close_current(ctx, &era, now).await?),
            None => None,
        };

        let new_era = self.insert_new(ctx, name, now).await?;

        Ok(RolloverOutcome {
            new_era,
            previous_era,
        })
    }

    async fn close_current(
        &mut self,
        ctx: &RequestContext,
        era: &Era,
        now: DateTime<Utc>,
    ) -> Result<Era, RolloverError> {
        info!(era_id = %era.id, era_name = %era.name, %now, "There is a current era, terminating and updating database");
        let params = UpdateEra::close(era, now);
        match ctx.run(self.store.update_era(&params)).await? {
            Ok(Some(closed)) => {
                info!(era_id = %closed.id, "Current era was saved");
                Ok(closed)
            }
            Ok(None) => {
                warn!(
                    era_id = %era.id,
                    expected_update_time = %era.update_time,
                    "Current era changed after it was read"
                );
                Err(RolloverError::StaleConflict { era_id: era.id })
            }
            Err(source) => Err(RolloverError::Infrastructure {
                stage: RolloverStage::CloseCurrent,
                source,
            }),
        }
    }

    async fn insert_new(
        &mut self,
        ctx: &RequestContext,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Era, RolloverError> {
        info!(era_name = name, %now, "Inserting new era");
        let params = InsertEra {
            name: name.to_owned(),
            start_time: now,
            end_time: open_end_time(),
        };
        match ctx.run(self.store.insert_era(&params)).await? {
            Ok(era) => {
                info!(era_id = %era.id, era_name = %era.name, "New era was saved");
                Ok(era)
            }
            Err(source) if source.violates(ERA_NAME_CONSTRAINT) => {
                Err(RolloverError::DuplicateName { name: params.name })
            }
            Err(source) => Err(RolloverError::Infrastructure {
                stage: RolloverStage::InsertNew,
                source,
            }),
        }
    }
}
