//! Core identity and versioning types.
//!
//! Every record Crossmark stores is addressed by an opaque string id and
//! carries a [`Revision`]. Ids come from outside (device registration,
//! the storage backend); Crossmark never parses them.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Stable identifier of a player, assigned once per device or account.
///
/// A newtype over `String` so a `GameId` can never be passed where a
/// player is expected. `#[serde(transparent)]` keeps the stored form a
/// bare string: `PlayerId::from("p1")` serializes as `"p1"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Returns the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for PlayerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one game session, assigned by storage at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Returns the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GameId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for GameId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for GameId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Revision
// ---------------------------------------------------------------------------

/// Version token of a stored record.
///
/// Starts at [`Revision::INITIAL`] when a record is inserted and grows by
/// exactly one on every committed write. Two writers computing from the
/// same revision can never both commit: the second one finds the stored
/// revision has moved on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Revision(pub u64);

impl Revision {
    /// Revision of a freshly inserted record.
    pub const INITIAL: Revision = Revision(1);

    /// The revision a successful commit on top of `self` produces.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Versioned
// ---------------------------------------------------------------------------

/// An immutable value of a record at one revision (a "snapshot").
///
/// `K` is the id type, `T` the record. Snapshots are plain values: holding
/// one never blocks anybody else, and a stale one is only detected when it
/// is used as the base of a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned<K, T> {
    /// Which record this is.
    pub id: K,
    /// The revision this value was read at (or committed as).
    pub revision: Revision,
    /// The record itself.
    pub record: T,
}

impl<K, T> Versioned<K, T> {
    /// Replaces the record, keeping id and revision.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Versioned<K, U> {
        Versioned {
            id: self.id,
            revision: self.revision,
            record: f(self.record),
        }
    }
}
