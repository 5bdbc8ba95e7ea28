//! Codec trait and implementations for record serialization.
//!
//! Storage keeps opaque bytes; the codec is the only place that knows how
//! a typed record becomes those bytes. Swapping the codec changes the
//! stored format without touching the game rules or the arbiter.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode records to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because a codec lives inside long-lived
/// tables that are shared across Tokio tasks. `Clone` so each
/// table handle can carry its own copy.
pub trait Codec: Clone + Send + Sync + 'static {
    /// Serializes a record into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a record.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected record type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that stores records as JSON (via `serde_json`).
///
/// JSON keeps stored documents readable by other hosts and by humans
/// poking at the database, which matters more here than byte size.
///
/// ## Example
///
/// ```rust
/// use crossmark_protocol::{Codec, JsonCodec, PlayerId};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&PlayerId::from("alice")).unwrap();
/// assert_eq!(bytes, br#""alice""#);
///
/// let decoded: PlayerId = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded.as_str(), "alice");
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
