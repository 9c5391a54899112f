pub mod call_tests;
pub mod negotiation_tests;

use std::net::SocketAddr;
use tracing::Level;

use adieu_server::{AppState, RelayConfig, RelayServer};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Serve a real relay on an ephemeral port.
pub async fn start_test_relay() -> (SocketAddr, AppState) {
    let config = RelayConfig {
        bind: SocketAddr::from(([127, 0, 0, 1], 0)),
        ..RelayConfig::default()
    };
    let server = RelayServer::bind(config)
        .await
        .expect("Failed to bind test relay");
    let addr = server.local_addr().expect("No local address");
    let state = server.state().clone();

    tokio::spawn(server.serve());
    (addr, state)
}
