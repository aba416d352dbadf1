//! A single (format, payload) clipboard entry.

use bytes::Bytes;

/// One clipboard representation: a format name paired with its byte payload.
///
/// The payload is produced eagerly before transmission. After a successful
/// send its logical read cursor is considered consumed; callers that need to
/// resend must rebuild the item rather than reuse a partially-read cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardItem {
    format: String,
    payload: Bytes,
}

impl ClipboardItem {
    /// Builds a new item. `format` must be non-empty; this is an invariant of
    /// the data model, not validated here (callers construct from trusted
    /// host-side enumeration or from the wire codec, which never produces an
    /// empty format string itself).
    pub fn new(format: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            format: format.into(),
            payload: payload.into(),
        }
    }

    /// The format name, transmitted verbatim on the wire.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// The payload bytes.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// True when the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
