//! The outbound (client) role: connect, handshake, send, and keep-alive
//! pinging (§4.6).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pc_core::clipboard::ClipboardData;
use pc_core::config::{Configuration, PartnerAddress};
use pc_core::error::{ClipError, ClipResult};
use pc_core::ports::{
    AddressDiscovery, ConnectState, ConnectStatus, ErrorDialog, Progress, ProgressMode,
};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::handshake::client_handshake;
use crate::session::{send_clipboard_data, send_ping};

/// Outbound connection lifecycle states (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// No connection attempt in progress.
    Idle,
    /// Dialing the peer or discovery service.
    Connecting,
    /// Connected and handshaked, awaiting work.
    Online,
    /// A `send_data`/`send_file_drop_list` call is in flight.
    Sending,
    /// The connection was closed by an error or by `stop()`.
    Disconnected,
}

/// How long `send_*` waits for a prior in-flight operation to unwind before
/// proceeding anyway (§5).
const QUIESCENCE_WAIT: Duration = Duration::from_secs(1);

struct Connection {
    stream: TcpStream,
    handshaked: bool,
}

/// The outbound role. Cheap to clone (an `Arc` internally); intended to be
/// shared between the caller that triggers sends and the background ping
/// task started by [`DataClient::start`].
pub struct DataClient {
    config: Configuration,
    discovery: Arc<dyn AddressDiscovery>,
    connect_status: Arc<dyn ConnectStatus>,
    error_dialog: Arc<dyn ErrorDialog>,
    progress: Arc<dyn Progress>,
    ping_period: Duration,

    conn: Mutex<Option<Connection>>,
    state: Mutex<ClientState>,
    op_lock: Mutex<()>,
    cancel: Mutex<CancellationToken>,
    ping_enabled: Mutex<bool>,
}

impl DataClient {
    /// Builds a new client. Call [`DataClient::start`] to enable the
    /// keep-alive ping.
    pub fn new(
        config: Configuration,
        discovery: Arc<dyn AddressDiscovery>,
        connect_status: Arc<dyn ConnectStatus>,
        error_dialog: Arc<dyn ErrorDialog>,
        progress: Arc<dyn Progress>,
        ping_period: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            discovery,
            connect_status,
            error_dialog,
            progress,
            ping_period,
            conn: Mutex::new(None),
            state: Mutex::new(ClientState::Idle),
            op_lock: Mutex::new(()),
            cancel: Mutex::new(CancellationToken::new()),
            ping_enabled: Mutex::new(false),
        })
    }

    async fn set_state(&self, state: ClientState) {
        *self.state.lock().await = state;
        let reported = match state {
            ClientState::Online | ClientState::Sending => ConnectState::ClientOnline,
            ClientState::Idle | ClientState::Disconnected | ClientState::Connecting => {
                ConnectState::ClientOffline
            }
        };
        self.connect_status.report(reported).await;
    }

    /// The client's current lifecycle state.
    pub async fn state(&self) -> ClientState {
        *self.state.lock().await
    }

    /// Reuses the current socket if it still looks alive, otherwise closes
    /// it and dials a fresh connection (§4.6 "Connect").
    async fn connect(&self) -> ClipResult<()> {
        {
            let mut guard = self.conn.lock().await;
            if let Some(connection) = guard.as_ref() {
                if is_reusable(&connection.stream).await {
                    return Ok(());
                }
            }
            *guard = None;
        }

        self.set_state(ClientState::Connecting).await;
        let addr = self.resolve_address().await?;
        let stream = TcpStream::connect(&addr).await?;
        *self.conn.lock().await = Some(Connection {
            stream,
            handshaked: false,
        });
        Ok(())
    }

    async fn resolve_address(&self) -> ClipResult<String> {
        match self.config.partner()? {
            PartnerAddress::Socket(addr) => Ok(addr),
            PartnerAddress::Discovery(id) => {
                let (host, port) = self.discovery.discover(&id).await?;
                Ok(format!("{host}:{port}"))
            }
        }
    }

    async fn ensure_handshaked(&self) -> ClipResult<()> {
        self.connect().await?;
        let mut guard = self.conn.lock().await;
        let connection = guard.as_mut().expect("connect() populates the connection");
        if !connection.handshaked {
            client_handshake(&mut connection.stream).await?;
            connection.handshaked = true;
        }
        Ok(())
    }

    /// Cancels whatever holds the connection right now, waits up to one
    /// second for it to release, then returns the exclusive guard for the
    /// caller's own operation. The ping is suppressed until the guard drops.
    async fn acquire_exclusive(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.cancel.lock().await.cancel();
        let guard = match tokio::time::timeout(QUIESCENCE_WAIT, self.op_lock.lock()).await {
            Ok(guard) => guard,
            Err(_) => self.op_lock.lock().await,
        };
        *self.cancel.lock().await = CancellationToken::new();
        *self.ping_enabled.lock().await = false;
        guard
    }

    /// Sends a `ClipboardData` payload (§4.6's `send_data`).
    pub async fn send_data(&self, data: &ClipboardData) -> ClipResult<()> {
        let _guard = self.acquire_exclusive().await;
        let mut handle = self.progress.begin(ProgressMode::Send).await;
        handle.set_max_tick(data.len() as u64);
        self.set_state(ClientState::Sending).await;
        let outcome = async {
            self.ensure_handshaked().await?;
            let mut guard = self.conn.lock().await;
            let connection = guard.as_mut().expect("ensure_handshaked populates the connection");
            send_clipboard_data(&mut connection.stream, data).await
        }
        .await;
        let result = self.finish_connection_op(outcome).await;
        handle.tick(data.len() as u64);
        *self.ping_enabled.lock().await = true;
        result
    }

    /// Sends a file-drop list (§4.6's `send_file_drop_list`).
    pub async fn send_file_drop_list(&self, paths: &[PathBuf]) -> ClipResult<()> {
        let _guard = self.acquire_exclusive().await;
        let mut handle = self.progress.begin(ProgressMode::Send).await;
        handle.set_max_tick(paths.len() as u64);
        self.set_state(ClientState::Sending).await;
        let owned = paths.to_vec();
        let outcome = async {
            self.ensure_handshaked().await?;
            let mut guard = self.conn.lock().await;
            let connection = guard.as_mut().expect("ensure_handshaked populates the connection");
            pc_transfer::send_file_drop_list(&mut connection.stream, &owned).await
        }
        .await;
        let result = self.finish_connection_op(outcome).await;
        handle.tick(paths.len() as u64);
        *self.ping_enabled.lock().await = true;
        result
    }

    async fn finish_connection_op(&self, outcome: ClipResult<()>) -> ClipResult<()> {
        match &outcome {
            Ok(()) => self.set_state(ClientState::Online).await,
            Err(e) => {
                if e.is_user_facing() {
                    self.error_dialog.show_error(e).await;
                }
                self.disconnect().await;
            }
        }
        outcome
    }

    async fn disconnect(&self) {
        *self.conn.lock().await = None;
        self.set_state(ClientState::Disconnected).await;
    }

    /// Enables the periodic keep-alive ping and spawns its background task.
    pub fn start(self: &Arc<Self>) {
        let client = self.clone();
        tokio::spawn(async move { client.ping_loop().await });
    }

    /// Disables the ping, cancels any in-flight operation, and closes the
    /// socket. Returns once the ping task's next wake-up would observe the
    /// disabled flag — callers needing a hard guarantee should drop all
    /// clones of the `Arc<DataClient>` afterward.
    pub async fn stop(&self) {
        *self.ping_enabled.lock().await = false;
        self.cancel.lock().await.cancel();
        self.disconnect().await;
    }

    async fn ping_loop(self: Arc<Self>) {
        *self.ping_enabled.lock().await = true;
        loop {
            sleep(self.ping_period).await;
            if !*self.ping_enabled.lock().await {
                continue;
            }

            let token = self.cancel.lock().await.clone();
            let result = tokio::select! {
                _ = token.cancelled() => Err(ClipError::Cancelled),
                r = self.ping_once() => r,
            };
            if let Err(e) = result {
                if e.is_user_facing() {
                    self.error_dialog.show_error(&e).await;
                }
                self.disconnect().await;
            }
        }
    }

    async fn ping_once(&self) -> ClipResult<()> {
        let _guard = self.op_lock.lock().await;
        self.ensure_handshaked().await?;
        let result = {
            let mut guard = self.conn.lock().await;
            let connection = guard.as_mut().expect("ensure_handshaked populates the connection");
            send_ping(&mut connection.stream).await
        };
        if result.is_ok() {
            self.set_state(ClientState::Online).await;
        }
        result
    }
}

/// Approximates ".NET's `Poll(0, SelectRead) && Available == 0`" liveness
/// check: peek non-destructively with an immediate-only poll. No data and no
/// error means the peer hasn't signalled EOF, so the socket is still good
/// for a subsequent write (§9 design notes).
async fn is_reusable(stream: &TcpStream) -> bool {
    let mut probe = [0u8; 1];
    match tokio::time::timeout(Duration::ZERO, stream.peek(&mut probe)).await {
        Ok(Ok(0)) => false,
        Ok(Ok(_)) => true,
        Ok(Err(_)) => false,
        Err(_) => true,
    }
}
