//! Type-safe identifier wrapper for eras.
//!
//! Eras are keyed by a storage-assigned 64-bit surrogate (`BIGSERIAL` in
//! `PostgreSQL`). The wrapper keeps era keys from being mixed up with other
//! integers (row counts, timestamps) at compile time.

use serde::{Deserialize, Serialize};

/// Unique, immutable identifier of an era.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EraId(pub i64);

impl EraId {
    /// Return the inner key.
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for EraId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EraId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<EraId> for i64 {
    fn from(id: EraId) -> Self {
        id.0
    }
}
