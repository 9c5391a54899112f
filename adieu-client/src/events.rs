use crate::media::RemoteStream;
use crate::session::{CloseReason, NegotiationState};
use adieu_core::{ChatMessage, ConnectionId, PeerInfo, RoomId};

/// What the client loop reports to the application.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// The relay assigned our connection id.
    Connected { connection_id: ConnectionId },
    Members {
        room_id: RoomId,
        members: Vec<PeerInfo>,
    },
    Chat(ChatMessage),
    Reaction {
        room_id: RoomId,
        emoji: String,
        id: String,
    },
    /// The reaction's display time is over.
    ReactionExpired { id: String },
    ParticipantJoinedLive {
        room_id: RoomId,
        connection_id: ConnectionId,
        display_name: String,
        is_host: bool,
    },
    ParticipantLeftLive {
        room_id: RoomId,
        connection_id: ConnectionId,
    },
    CallJoined { room_id: RoomId },
    CallLeft { room_id: RoomId },
    /// A remote session was created; show a connecting tile.
    TileAdded {
        connection_id: ConnectionId,
        display_name: String,
    },
    SessionStateChanged {
        connection_id: ConnectionId,
        state: NegotiationState,
    },
    StreamAttached {
        connection_id: ConnectionId,
        stream: RemoteStream,
    },
    TileRemoved {
        connection_id: ConnectionId,
        reason: CloseReason,
    },
    /// The relay connection is gone; every session was closed.
    Disconnected,
}

/// Snapshot of one remote session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub connection_id: ConnectionId,
    pub display_name: String,
    pub state: NegotiationState,
    pub remote_stream: Option<RemoteStream>,
}
