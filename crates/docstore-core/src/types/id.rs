//! Public document identifier.
//!
//! Identifiers are registry-assigned sequence numbers. They are kept
//! distinct from the blob's stored name so that storage naming never leaks
//! into the public API.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unique, immutable identifier of a document record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
#[serde(transparent)]
pub struct DocumentId(pub i64);

impl DocumentId {
    /// Wrap a raw registry row id.
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Return the inner value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

impl From<i64> for DocumentId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl From<DocumentId> for i64 {
    fn from(id: DocumentId) -> i64 {
        id.0
    }
}
