//! Domain models, error types and host-side ports for the clipboard transfer
//! service: the data shared by `pc-wire`, `pc-transfer` and `pc-net`.

pub mod clipboard;
pub mod config;
pub mod error;
pub mod filedrop;
pub mod ports;

pub use clipboard::{ClipboardData, ClipboardItem};
pub use config::Configuration;
pub use error::{ClipError, ClipResult};
pub use filedrop::{EntryKind, FileDropEntry};
