use adieu_core::{ClientMessage, ConnectionId, PeerInfo, RoomId};
use tokio::sync::oneshot;

use crate::registry::LiveParticipant;

/// Commands the socket handlers feed into the relay loop.
#[derive(Debug)]
pub enum RelayCommand {
    /// A decoded frame from a connected peer.
    Client {
        connection_id: ConnectionId,
        message: ClientMessage,
    },

    /// The peer's socket closed, cleanly or not.
    Disconnect { connection_id: ConnectionId },

    /// Read-only view of one room, for diagnostics and tests.
    Inspect {
        room_id: RoomId,
        reply: oneshot::Sender<Option<RoomSnapshot>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub members: Vec<PeerInfo>,
    pub live: Vec<LiveParticipant>,
}

impl RoomSnapshot {
    pub fn live_ids(&self) -> Vec<ConnectionId> {
        self.live.iter().map(|p| p.connection_id).collect()
    }

    pub fn member_ids(&self) -> Vec<ConnectionId> {
        self.members.iter().map(|m| m.connection_id).collect()
    }
}
