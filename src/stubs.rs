//! Logging stand-ins for the external collaborators described in §6. The
//! desktop shell, OS clipboard bindings, and address-discovery service are
//! out of scope; these adapters let the service run standalone while making
//! every delivery and status transition visible on stdout.

use async_trait::async_trait;
use pc_core::clipboard::ClipboardData;
use pc_core::error::{ClipError, ClipResult};
use pc_core::ports::{
    AddressDiscovery, ConnectState, ConnectStatus, Dispatch, ErrorDialog, Progress, ProgressHandle,
    ProgressMode,
};
use std::path::PathBuf;

pub struct LoggingDispatch;

#[async_trait]
impl Dispatch for LoggingDispatch {
    async fn deliver_clipboard_data(&self, data: ClipboardData) {
        tracing::info!(items = data.len(), total_bytes = data.total_len(), "clipboard data delivered");
    }

    async fn deliver_file_paths(&self, paths: Vec<PathBuf>) {
        tracing::info!(count = paths.len(), "file-drop paths delivered");
    }

    async fn deliver_image(&self, bmp: Vec<u8>) {
        tracing::info!(bytes = bmp.len(), "image delivered");
    }
}

struct LoggingProgressHandle {
    mode: ProgressMode,
    max: u64,
    done: u64,
}

impl ProgressHandle for LoggingProgressHandle {
    fn set_max_tick(&mut self, total: u64) {
        self.max = total;
    }

    fn tick(&mut self, delta: u64) {
        self.done += delta;
        tracing::debug!(mode = ?self.mode, done = self.done, max = self.max, "progress");
    }
}

impl Drop for LoggingProgressHandle {
    fn drop(&mut self) {
        tracing::debug!(mode = ?self.mode, done = self.done, "progress finished");
    }
}

pub struct LoggingProgress;

#[async_trait]
impl Progress for LoggingProgress {
    async fn begin(&self, mode: ProgressMode) -> Box<dyn ProgressHandle> {
        Box::new(LoggingProgressHandle { mode, max: 0, done: 0 })
    }
}

pub struct LoggingConnectStatus;

#[async_trait]
impl ConnectStatus for LoggingConnectStatus {
    async fn report(&self, state: ConnectState) {
        tracing::info!(?state, "connection status changed");
    }
}

pub struct LoggingErrorDialog;

#[async_trait]
impl ErrorDialog for LoggingErrorDialog {
    async fn show_error(&self, err: &ClipError) {
        tracing::error!(%err, "transfer error");
    }
}

/// Discovery is out of scope; this always fails, so only literal `host:port`
/// partner addresses work until a real collaborator is wired in.
pub struct UnsupportedDiscovery;

#[async_trait]
impl AddressDiscovery for UnsupportedDiscovery {
    async fn discover(&self, id: &str) -> ClipResult<(String, u16)> {
        Err(ClipError::InvalidConfiguration(format!(
            "no address-discovery collaborator configured; cannot resolve id '{id}'"
        )))
    }
}
