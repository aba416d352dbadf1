//! External collaborators consumed by `pc-net` (§6).
//!
//! These traits are the boundary between the transfer core and the desktop
//! shell: OS clipboard access, the progress indicator, the error dialog and
//! address discovery all live outside this workspace and are injected as
//! trait objects at startup.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::clipboard::ClipboardData;
use crate::error::ClipResult;

/// Receives assembled payloads on the inbound (server) side and forwards them
/// to the OS clipboard.
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Delivers a fully assembled clipboard payload.
    async fn deliver_clipboard_data(&self, data: ClipboardData);

    /// Delivers the path list produced by a completed file-drop transfer.
    async fn deliver_file_paths(&self, paths: Vec<PathBuf>);

    /// Delivers a converted image (BMP bytes produced from a `Dib` payload).
    async fn deliver_image(&self, bmp: Vec<u8>);
}

/// Which direction a progress-scoped operation is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
    /// Outbound transfer.
    Send,
    /// Inbound transfer.
    Receive,
}

/// A scoped progress indicator handle. Dropping it releases any visible
/// indicator state, whatever the exit path (success, error, cancellation).
pub trait ProgressHandle: Send {
    /// Sets the total tick count the operation expects to reach.
    fn set_max_tick(&mut self, total: u64);

    /// Advances the indicator by `delta` ticks.
    fn tick(&mut self, delta: u64);
}

/// Begins a progress-scoped operation.
#[async_trait]
pub trait Progress: Send + Sync {
    /// Acquires a handle for the given direction; released on drop.
    async fn begin(&self, mode: ProgressMode) -> Box<dyn ProgressHandle>;
}

/// Connection status, reported at the state changes described in §4.3/§4.7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectState {
    /// Server socket bound and accepting.
    Online,
    /// Server socket not accepting.
    Offline,
    /// Client has an established connection to a peer.
    ClientOnline,
    /// Client has no established connection.
    ClientOffline,
}

/// Reports connection status transitions to the shell.
#[async_trait]
pub trait ConnectStatus: Send + Sync {
    /// Called whenever the client or server role changes state.
    async fn report(&self, state: ConnectState);
}

/// Surfaces non-cancellation errors to the user.
#[async_trait]
pub trait ErrorDialog: Send + Sync {
    /// Presents `err` to the user. Never called for `ClipError::Cancelled`.
    async fn show_error(&self, err: &crate::error::ClipError);
}

/// Resolves a discovery id (rather than a literal `host:port`) to an address.
#[async_trait]
pub trait AddressDiscovery: Send + Sync {
    /// Looks up the current address and port for a discovery id.
    async fn discover(&self, id: &str) -> ClipResult<(String, u16)>;
}
