//! Entry point: loads configuration, installs tracing, and runs the data
//! server and data client side by side until interrupted.

mod bootstrap;
mod stubs;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use pc_core::config::Configuration;
use pc_net::{DataClient, DataServer};

const CONFIG_PATH_ENV: &str = "PAIRCLIP_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "pairclip.toml";
const PING_PERIOD: Duration = Duration::from_secs(30);

async fn load_config() -> Configuration {
    let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    match tokio::fs::read_to_string(&path).await {
        Ok(contents) => match Configuration::from_toml_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(%e, path, "failed to parse configuration, using defaults");
                Configuration::default()
            }
        },
        Err(_) => {
            tracing::info!(path, "no configuration file found, using defaults");
            Configuration::default()
        }
    }
}

#[tokio::main]
async fn main() {
    bootstrap::init_tracing_subscriber().expect("tracing subscriber already initialized");

    let config = load_config().await;
    let host_address = config.host_address.clone();

    let dispatch = Arc::new(stubs::LoggingDispatch);
    let connect_status = Arc::new(stubs::LoggingConnectStatus);
    let error_dialog = Arc::new(stubs::LoggingErrorDialog);
    let discovery = Arc::new(stubs::UnsupportedDiscovery);
    let progress = Arc::new(stubs::LoggingProgress);

    let server = Arc::new(DataServer::new(
        dispatch,
        connect_status.clone(),
        error_dialog.clone(),
        progress.clone(),
    ));
    let server_task = {
        let server = server.clone();
        tokio::spawn(async move {
            if let Err(e) = server.run(&host_address).await {
                tracing::error!(%e, "data server exited");
            }
        })
    };

    let client = DataClient::new(
        config,
        discovery,
        connect_status,
        error_dialog,
        progress,
        PING_PERIOD,
    );
    client.start();

    tokio::signal::ctrl_c().await.expect("failed to listen for ctrl-c");
    tracing::info!("shutting down");

    server.stop();
    client.stop().await;
    let _ = server_task.await;
}
