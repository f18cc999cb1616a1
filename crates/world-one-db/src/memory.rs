//! In-memory era store.
//!
//! [`MemoryEraStore`] honours the same contract as the `eras` table: unique
//! names under [`ERA_NAME_CONSTRAINT`], at most one open era under
//! [`SINGLE_CURRENT_INDEX`], conditional updates keyed on `update_time`, and
//! a strictly increasing write clock truncated to microseconds like
//! `timestamptz`.
//!
//! It is `Clone`, so a caller can snapshot it before a unit of work and
//! restore the snapshot to roll back. Every call is counted in
//! [`StoreCalls`] for tests that assert on store traffic.

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use world_one_types::{Era, EraId, open_end_time};

use crate::era_store::{
    ERA_NAME_CONSTRAINT, EraStore, InsertEra, SINGLE_CURRENT_INDEX, UpdateEra,
};
use crate::error::DbError;

/// Number of calls made to each [`EraStore`] operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCalls {
    /// Calls to `get_current_era`.
    pub get_current_era: u32,
    /// Calls to `list_eras`.
    pub list_eras: u32,
    /// Calls to `insert_era`.
    pub insert_era: u32,
    /// Calls to `update_era`.
    pub update_era: u32,
}

impl StoreCalls {
    /// Total calls across all operations.
    pub const fn total(&self) -> u32 {
        self.get_current_era
            .saturating_add(self.list_eras)
            .saturating_add(self.insert_era)
            .saturating_add(self.update_era)
    }
}

/// Era store backed by a `Vec` in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryEraStore {
    eras: Vec<Era>,
    last_id: i64,
    last_write: Option<DateTime<Utc>>,
    calls: StoreCalls,
}

impl MemoryEraStore {
    /// Create an empty store (no current era).
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls made so far.
    pub const fn calls(&self) -> StoreCalls {
        self.calls
    }

    /// All stored eras in insertion order.
    pub fn eras(&self) -> &[Era] {
        &self.eras
    }

    /// Bump an era's `update_time` without changing anything else, as a
    /// concurrent writer would. Returns the touched row.
    pub fn touch(&mut self, id: EraId) -> Option<Era> {
        let now = self.next_write_time();
        let era = self.eras.iter_mut().find(|e| e.id == id)?;
        era.update_time = now;
        Some(era.clone())
    }

    fn next_write_time(&mut self) -> DateTime<Utc> {
        let now = Utc::now().trunc_subsecs(6);
        let next = match self.last_write {
            Some(last) if now <= last => last
                .checked_add_signed(TimeDelta::microseconds(1))
                .unwrap_or(last),
            _ => now,
        };
        self.last_write = Some(next);
        next
    }

    fn name_taken(&self, name: &str, except: Option<EraId>) -> bool {
        self.eras
            .iter()
            .any(|e| e.name == name && Some(e.id) != except)
    }

    fn current_taken(&self, except: Option<EraId>) -> bool {
        self.eras
            .iter()
            .any(|e| e.is_current() && Some(e.id) != except)
    }

    fn check_unique(
        &self,
        name: &str,
        end_time: DateTime<Utc>,
        except: Option<EraId>,
    ) -> Result<(), DbError> {
        if self.name_taken(name, except) {
            return Err(DbError::UniqueViolation {
                constraint: ERA_NAME_CONSTRAINT.to_owned(),
            });
        }
        if end_time == open_end_time() && self.current_taken(except) {
            return Err(DbError::UniqueViolation {
                constraint: SINGLE_CURRENT_INDEX.to_owned(),
            });
        }
        Ok(())
    }
}

impl EraStore for MemoryEraStore {
    async fn get_current_era(&mut self) -> Result<Option<Era>, DbError> {
        self.calls.get_current_era = self.calls.get_current_era.saturating_add(1);
        Ok(self.eras.iter().find(|e| e.is_current()).cloned())
    }

    async fn list_eras(&mut self) -> Result<Vec<Era>, DbError> {
        self.calls.list_eras = self.calls.list_eras.saturating_add(1);
        Ok(self.eras.clone())
    }

    async fn insert_era(&mut self, params: &InsertEra) -> Result<Era, DbError> {
        self.calls.insert_era = self.calls.insert_era.saturating_add(1);
        self.check_unique(&params.name, params.end_time, None)?;

        let id = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| DbError::Unavailable(String::from("era id space exhausted")))?;
        let now = self.next_write_time();
        let era = Era {
            id: EraId(id),
            name: params.name.clone(),
            start_time: params.start_time,
            end_time: params.end_time,
            create_time: now,
            update_time: now,
        };
        self.last_id = id;
        self.eras.push(era.clone());
        Ok(era)
    }

    async fn update_era(&mut self, params: &UpdateEra) -> Result<Option<Era>, DbError> {
        self.calls.update_era = self.calls.update_era.saturating_add(1);
        let matched = self
            .eras
            .iter()
            .any(|e| e.id == params.id && e.update_time == params.expected_update_time);
        if !matched {
            return Ok(None);
        }
        self.check_unique(&params.name, params.end_time, Some(params.id))?;

        let now = self.next_write_time();
        let Some(era) = self.eras.iter_mut().find(|e| e.id == params.id) else {
            return Ok(None);
        };
        era.name.clone_from(&params.name);
        era.start_time = params.start_time;
        era.end_time = params.end_time;
        era.update_time = now;
        Ok(Some(era.clone()))
    }
}
