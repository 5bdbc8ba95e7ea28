//! Error types for the protocol layer.
//!
//! Each crate in Crossmark defines its own error enum. A `ProtocolError`
//! always means a record could not be converted to or from bytes; it says
//! nothing about game rules or storage availability.

/// Errors that can occur while encoding or decoding a stored record.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a record into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes back into a record).
    ///
    /// For records read from shared storage this usually means another
    /// host wrote something this version does not understand.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
