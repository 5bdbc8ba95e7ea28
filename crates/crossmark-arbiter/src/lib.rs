//! Concurrency arbiter for Crossmark.
//!
//! Game records live in shared storage and any participant's host may try
//! to advance one at any time. The arbiter guarantees that from a given
//! revision at most one transition is ever committed:
//!
//! 1. read the current snapshot and its revision,
//! 2. refuse if it is not the revision the caller computed from,
//! 3. let the rules compute the next record (rejections write nothing),
//! 4. commit it only if storage still holds that same revision.
//!
//! A losing writer gets [`ArbiterError::Conflict`] and must re-read. It is
//! never retried here: moves do not commute, so a retry has to be
//! re-validated against whatever the winner wrote.

mod arbiter;
mod error;

pub use arbiter::Arbiter;
pub use error::ArbiterError;
