use crate::IceServerConfig;

pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";

/// How long a client keeps a received reaction on screen.
pub const REACTION_TTL_MS: u64 = 2000;

/// Default deadline for a session to leave the negotiating state.
pub const NEGOTIATION_TIMEOUT_MS: u64 = 20_000;

pub fn default_ice_servers() -> Vec<IceServerConfig> {
    vec![IceServerConfig::stun(DEFAULT_STUN_ADDR)]
}

/// Milliseconds since the unix epoch, saturating to zero on a skewed clock.
pub fn unix_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
