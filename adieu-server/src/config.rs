use adieu_core::IceServerConfig;
use adieu_core::utils::default_ice_servers;
use std::net::SocketAddr;

/// Runtime settings of the relay process.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind: SocketAddr,
    /// Handed to every client in its `welcome` frame.
    pub ice_servers: Vec<IceServerConfig>,
    /// Bound of the queue between socket handlers and the relay loop.
    pub command_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            ice_servers: default_ice_servers(),
            command_capacity: 1024,
        }
    }
}
