//! The era entity.
//!
//! An era is a named, contiguous time interval representing one
//! configuration epoch of the game. Eras are never deleted; the only
//! mutation an era ever sees is the single write that closes it when the
//! next era takes over.
//!
//! # Open-ended eras
//!
//! Storage keeps `end_time` non-nullable. The era that is still running
//! carries the reserved far-future instant returned by [`open_end_time`]
//! (`2200-01-01T00:00:00Z`) instead of a null. [`Era::end`] converts this
//! into the explicit [`EraEnd`] view so callers never compare against the
//! sentinel by hand.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::EraId;

/// Unix seconds of `2200-01-01T00:00:00Z`, the open-end sentinel.
pub const OPEN_END_TIME_SECS: i64 = 7_258_118_400;

/// The reserved `end_time` that marks an era as still open (current).
///
/// Strictly greater than any realistic instant the game will observe.
pub fn open_end_time() -> DateTime<Utc> {
    DateTime::from_timestamp(OPEN_END_TIME_SECS, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Whether an era is still running or has been closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "at", rename_all = "snake_case")]
pub enum EraEnd {
    /// The era is current; its end is not yet known.
    Open,
    /// The era was superseded at this instant.
    Closed(DateTime<Utc>),
}

/// A persisted era row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Era {
    /// Storage-assigned surrogate key. Immutable.
    pub id: EraId,
    /// Human-assigned label, unique across all eras past and present.
    pub name: String,
    /// Instant the era became effective. Immutable.
    pub start_time: DateTime<Utc>,
    /// Instant the era stopped being effective, or [`open_end_time`].
    pub end_time: DateTime<Utc>,
    /// When the row was inserted.
    pub create_time: DateTime<Utc>,
    /// When the row was last written. Doubles as the optimistic
    /// concurrency token for the closing write.
    pub update_time: DateTime<Utc>,
}

impl Era {
    /// Whether this era holds the open-end sentinel.
    pub fn is_current(&self) -> bool {
        self.end_time == open_end_time()
    }

    /// The explicit open/closed view of `end_time`.
    pub fn end(&self) -> EraEnd {
        if self.is_current() {
            EraEnd::Open
        } else {
            EraEnd::Closed(self.end_time)
        }
    }
}

/// JSON projection of an [`Era`] served to API clients.
///
/// The id is rendered as a decimal string so `JavaScript` clients never
/// lose precision on large keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct EraDto {
    /// Era key as a decimal string.
    pub id: String,
    /// Era name.
    pub name: String,
    /// RFC 3339 start instant.
    pub start_time: DateTime<Utc>,
    /// RFC 3339 end instant (`2200-01-01T00:00:00Z` while current).
    pub end_time: DateTime<Utc>,
    /// RFC 3339 insertion instant.
    pub create_time: DateTime<Utc>,
    /// RFC 3339 last-write instant.
    pub update_time: DateTime<Utc>,
}

impl From<&Era> for EraDto {
    fn from(era: &Era) -> Self {
        Self {
            id: era.id.to_string(),
            name: era.name.clone(),
            start_time: era.start_time,
            end_time: era.end_time,
            create_time: era.create_time,
            update_time: era.update_time,
        }
    }
}

impl From<Era> for EraDto {
    fn from(era: Era) -> Self {
        Self {
            id: era.id.to_string(),
            name: era.name,
            start_time: era.start_time,
            end_time: era.end_time,
            create_time: era.create_time,
            update_time: era.update_time,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn era(end_time: DateTime<Utc>) -> Era {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Era {
            id: EraId(1),
            name: String::from("Age of Bronze"),
            start_time: start,
            end_time,
            create_time: start,
            update_time: start,
        }
    }

    #[test]
    fn sentinel_is_year_2200() {
        let expected = Utc.with_ymd_and_hms(2200, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(open_end_time(), expected);
    }

    #[test]
    fn open_era_is_current() {
        let e = era(open_end_time());
        assert!(e.is_current());
        assert_eq!(e.end(), EraEnd::Open);
    }

    #[test]
    fn closed_era_reports_its_end() {
        let end = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let e = era(end);
        assert!(!e.is_current());
        assert_eq!(e.end(), EraEnd::Closed(end));
    }

    #[test]
    fn dto_uses_camel_case_and_string_id() {
        let dto = EraDto::from(era(open_end_time()));
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["name"], "Age of Bronze");
        assert_eq!(json["endTime"], "2200-01-01T00:00:00Z");
        assert!(json.get("startTime").is_some());
        assert!(json.get("updateTime").is_some());
    }
}
