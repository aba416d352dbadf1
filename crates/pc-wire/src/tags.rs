//! Protocol tag constants carried on the control channel (§4.2).
//!
//! Values are arbitrary but must be stable across both peers; the exact
//! numbers below have no significance beyond agreement.

/// Protocol version sent first by the client.
pub const VERSION: u16 = 1;

/// Current protocol version this implementation speaks and accepts.
pub const CURRENT_VERSION: u16 = 1;

/// Server acknowledges the client's version.
pub const SUCCESS_VERSION: u16 = 2;

/// Format name accepted.
pub const SUCCESS_FORMAT: u16 = 3;

/// Announced size accepted.
pub const SUCCESS_SIZE: u16 = 4;

/// Payload bytes received whole.
pub const SUCCESS_DATA: u16 = 5;

/// Sender will transmit another (format, size, payload) triple.
pub const MORE_DATA: u16 = 6;

/// End of the ClipboardData stream.
pub const FINISH: u16 = 7;

/// Either side rejects and closes.
pub const ERROR: u16 = 8;
