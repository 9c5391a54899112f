use adieu_core::IceServerConfig;
use adieu_core::utils::{NEGOTIATION_TIMEOUT_MS, REACTION_TTL_MS};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint of the relay, e.g. `ws://localhost:5000/ws`.
    pub relay_url: String,
    pub display_name: String,
    /// How long a session may stay negotiating before it is torn down.
    pub negotiation_timeout: Duration,
    pub reaction_ttl: Duration,
    /// Overrides the ICE servers announced by the relay.
    pub ice_servers: Option<Vec<IceServerConfig>>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: "ws://localhost:5000/ws".to_owned(),
            display_name: "Guest".to_owned(),
            negotiation_timeout: Duration::from_millis(NEGOTIATION_TIMEOUT_MS),
            reaction_ttl: Duration::from_millis(REACTION_TTL_MS),
            ice_servers: None,
        }
    }
}
