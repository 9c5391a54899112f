use adieu_core::{ConnectionId, ServerMessage};

/// Outbound half of the relay: delivers frames to connected peers.
///
/// Implementations must not block; the relay loop calls this for every
/// fan-out target in turn.
pub trait SignalingOutput: Send + Sync {
    /// Queue `msg` for `connection_id`. Returns `false` if that connection is
    /// gone, in which case the frame is dropped.
    fn send(&self, connection_id: &ConnectionId, msg: ServerMessage) -> bool;

    /// Queue `msg` for each of `targets`.
    fn send_all(&self, targets: &[ConnectionId], msg: &ServerMessage) {
        for target in targets {
            self.send(target, msg.clone());
        }
    }
}
