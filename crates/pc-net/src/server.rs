//! The inbound (server) role: accept, handshake, run a session (§4.7).

use std::sync::Arc;

use pc_core::error::ClipResult;
use pc_core::ports::{ConnectState, ConnectStatus, Dispatch, ErrorDialog, Progress, ProgressMode};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::handshake::server_handshake;
use crate::session::run_server_session;

/// The inbound role. Accepts one connection at a time on `host_address` and
/// dispatches each session to the host via [`Dispatch`].
pub struct DataServer {
    dispatch: Arc<dyn Dispatch>,
    connect_status: Arc<dyn ConnectStatus>,
    error_dialog: Arc<dyn ErrorDialog>,
    progress: Arc<dyn Progress>,
    cancel: CancellationToken,
}

impl DataServer {
    pub fn new(
        dispatch: Arc<dyn Dispatch>,
        connect_status: Arc<dyn ConnectStatus>,
        error_dialog: Arc<dyn ErrorDialog>,
        progress: Arc<dyn Progress>,
    ) -> Self {
        Self {
            dispatch,
            connect_status,
            error_dialog,
            progress,
            cancel: CancellationToken::new(),
        }
    }

    /// Binds `host_address` and runs the accept loop until [`DataServer::stop`]
    /// is called or the listener itself fails. A session error is surfaced to
    /// `ErrorDialog` and the loop continues accepting.
    pub async fn run(&self, host_address: &str) -> ClipResult<()> {
        let listener = TcpListener::bind(host_address).await?;
        self.connect_status.report(ConnectState::Online).await;

        loop {
            let accepted = tokio::select! {
                _ = self.cancel.cancelled() => break,
                result = listener.accept() => result,
            };

            let (mut socket, peer) = match accepted {
                Ok(pair) => pair,
                Err(e) => {
                    self.error_dialog.show_error(&e.into()).await;
                    continue;
                }
            };

            let span = tracing::info_span!("session", peer = %peer);
            let mut handle = self.progress.begin(ProgressMode::Receive).await;
            let result = async {
                server_handshake(&mut socket).await?;
                run_server_session(&mut socket, self.dispatch.as_ref()).await
            }
            .instrument(span)
            .await;
            handle.tick(1);
            drop(handle);

            if let Err(e) = result {
                if e.is_user_facing() {
                    self.error_dialog.show_error(&e).await;
                }
            }
        }

        self.connect_status.report(ConnectState::Offline).await;
        Ok(())
    }

    /// Cancels the accept loop. `run`'s future resolves once the current
    /// `accept()` (or session) call returns.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use pc_core::clipboard::{ClipboardData, ClipboardItem};
    use pc_core::error::ClipError;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    #[derive(Default)]
    struct RecordingDispatch {
        clipboard: Mutex<Vec<ClipboardData>>,
    }

    #[async_trait]
    impl Dispatch for RecordingDispatch {
        async fn deliver_clipboard_data(&self, data: ClipboardData) {
            self.clipboard.lock().unwrap().push(data);
        }
        async fn deliver_file_paths(&self, _paths: Vec<PathBuf>) {}
        async fn deliver_image(&self, _bmp: Vec<u8>) {}
    }

    #[derive(Default)]
    struct RecordingStatus {
        states: Mutex<Vec<ConnectState>>,
    }
    #[async_trait]
    impl ConnectStatus for RecordingStatus {
        async fn report(&self, state: ConnectState) {
            self.states.lock().unwrap().push(state);
        }
    }

    #[derive(Default)]
    struct SilentErrors;
    #[async_trait]
    impl ErrorDialog for SilentErrors {
        async fn show_error(&self, _err: &ClipError) {}
    }

    struct NoopHandle;
    impl pc_core::ports::ProgressHandle for NoopHandle {
        fn set_max_tick(&mut self, _total: u64) {}
        fn tick(&mut self, _delta: u64) {}
    }

    struct NoopProgress;
    #[async_trait]
    impl Progress for NoopProgress {
        async fn begin(&self, _mode: ProgressMode) -> Box<dyn pc_core::ports::ProgressHandle> {
            Box::new(NoopHandle)
        }
    }

    #[tokio::test]
    async fn accepts_one_session_and_reports_online_then_offline() {
        let dispatch = Arc::new(RecordingDispatch::default());
        let status = Arc::new(RecordingStatus::default());
        let server = Arc::new(DataServer::new(
            dispatch.clone(),
            status.clone(),
            Arc::new(SilentErrors),
            Arc::new(NoopProgress),
        ));

        let addr = "127.0.0.1:41411";
        let run_server = server.clone();
        let run_task = tokio::spawn(async move { run_server.run(addr).await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let mut client = TcpStream::connect(addr).await.unwrap();
        crate::handshake::client_handshake(&mut client).await.unwrap();

        let mut data = ClipboardData::new();
        data.push(ClipboardItem::new("Text", Bytes::from_static(b"hi")));
        crate::session::send_clipboard_data(&mut client, &data).await.unwrap();
        drop(client);

        tokio::time::sleep(Duration::from_millis(20)).await;
        server.stop();
        run_task.await.unwrap().unwrap();

        assert_eq!(dispatch.clipboard.lock().unwrap().len(), 1);
        let states = status.states.lock().unwrap();
        assert_eq!(states.first(), Some(&ConnectState::Online));
        assert_eq!(states.last(), Some(&ConnectState::Offline));
    }

    #[tokio::test]
    async fn session_error_does_not_tear_down_listener() {
        let dispatch = Arc::new(RecordingDispatch::default());
        let status = Arc::new(RecordingStatus::default());
        let server = Arc::new(DataServer::new(
            dispatch.clone(),
            status.clone(),
            Arc::new(SilentErrors),
            Arc::new(NoopProgress),
        ));

        let addr = "127.0.0.1:41412";
        let run_server = server.clone();
        let run_task = tokio::spawn(async move { run_server.run(addr).await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        // A connection that sends garbage instead of a version tag.
        let mut bad_client = TcpStream::connect(addr).await.unwrap();
        bad_client.write_all(&[0xAB, 0xCD]).await.unwrap();
        drop(bad_client);
        tokio::time::sleep(Duration::from_millis(20)).await;

        // The listener is still accepting.
        let mut good_client = TcpStream::connect(addr).await.unwrap();
        crate::handshake::client_handshake(&mut good_client).await.unwrap();
        drop(good_client);

        tokio::time::sleep(Duration::from_millis(20)).await;
        server.stop();
        run_task.await.unwrap().unwrap();
    }
}
