//! Shared vocabulary for Crossmark.
//!
//! This crate defines the types every other layer agrees on:
//!
//! - **Identity** ([`PlayerId`], [`GameId`]) — opaque, stable string ids.
//! - **Versioning** ([`Revision`], [`Versioned`]) — the optimistic
//!   concurrency token attached to every stored record.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how records are turned
//!   into the opaque bytes the storage collaborator keeps.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding or
//!   decoding a record.
//!
//! # Architecture
//!
//! ```text
//! Game rules (typed records) → Protocol (bytes + revision) → Storage
//! ```
//!
//! The protocol layer knows nothing about boards or turns; it only knows
//! how to name records, version them, and serialize them.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{GameId, PlayerId, Revision, Versioned};
