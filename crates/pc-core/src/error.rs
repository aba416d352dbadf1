//! Error types shared by the wire codec, transfer engine and connection roles.

use thiserror::Error;

/// Result alias used throughout the transfer subsystem.
pub type ClipResult<T> = std::result::Result<T, ClipError>;

/// Errors surfaced by the framed protocol, the clipboard/file transfer
/// engines and the connection lifecycle.
#[derive(Error, Debug)]
pub enum ClipError {
    /// The peer's handshake version did not match ours.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u16),

    /// The peer rejected a format name mid-transfer.
    #[error("peer rejected format: {0}")]
    UnsupportedFormat(String),

    /// The peer rejected an announced item or stream size.
    #[error("peer rejected announced size: {0}")]
    UnsupportedSize(i64),

    /// A payload was sent in full but the peer never acknowledged it.
    #[error("transfer failed: peer did not confirm receipt")]
    TransferFailed,

    /// A DIB buffer failed to deserialize into a usable header.
    #[error("invalid DIB: {0}")]
    InvalidDib(String),

    /// A file-drop entry's relative path escaped the spool root.
    #[error("unsafe file-drop path: {0}")]
    UnsafePath(String),

    /// The stream closed before a length-prefixed value was fully read.
    #[error("end of stream while reading framed value")]
    EndOfStream,

    /// A configuration value is internally inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The operation was cancelled; never shown to the user.
    #[error("operation cancelled")]
    Cancelled,

    /// Transport-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClipError {
    /// Cancellation is the one error kind that must never reach the
    /// `ErrorDialog` collaborator (see `§7 Error Handling Design`).
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, ClipError::Cancelled)
    }
}
