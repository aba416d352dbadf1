//! Connection lifecycle for the clipboard transfer service: the data client
//! and data server roles (§4.6, §4.7).

pub mod client;
pub mod handshake;
pub mod server;
pub mod session;

pub use client::{ClientState, DataClient};
pub use server::DataServer;
