use crate::model::chat::ChatMessage;
use crate::model::connection::ConnectionId;
use crate::model::peer::PeerInfo;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

/// Offer or answer payload, in the shape browsers produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

/// Connectivity candidate, field-compatible with `RTCIceCandidateInit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default)]
    pub sdp_mid: Option<String>,
    #[serde(default, rename = "sdpMLineIndex")]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_m_line_index: None,
            username_fragment: None,
        }
    }
}

/// Frames a client sends to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "op",
    content = "d",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    JoinRoom {
        room_id: RoomId,
        display_name: String,
    },
    LeaveRoom {
        room_id: RoomId,
    },
    ChatMessage {
        room_id: RoomId,
        author: String,
        text: String,
    },
    JoinLive {
        room_id: RoomId,
        is_host: bool,
        display_name: String,
    },
    LeaveLive {
        room_id: RoomId,
    },
    Offer {
        target_connection_id: ConnectionId,
        session_description: SessionDescription,
        caller_display_name: String,
    },
    Answer {
        target_connection_id: ConnectionId,
        session_description: SessionDescription,
        responder_display_name: String,
    },
    Candidate {
        target_connection_id: ConnectionId,
        candidate: IceCandidate,
    },
    Reaction {
        room_id: RoomId,
        emoji: String,
    },
}

/// Frames the relay sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "op",
    content = "d",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    Welcome {
        connection_id: ConnectionId,
        ice_servers: Vec<IceServerConfig>,
    },
    RoomMembers {
        room_id: RoomId,
        members: Vec<PeerInfo>,
    },
    Message(ChatMessage),
    UserJoinedLive {
        room_id: RoomId,
        connection_id: ConnectionId,
        is_host: bool,
        display_name: String,
    },
    UserLeftLive {
        room_id: RoomId,
        connection_id: ConnectionId,
    },
    Offer {
        caller_connection_id: ConnectionId,
        caller_display_name: String,
        session_description: SessionDescription,
    },
    Answer {
        responder_connection_id: ConnectionId,
        responder_display_name: String,
        session_description: SessionDescription,
    },
    Candidate {
        from_connection_id: ConnectionId,
        candidate: IceCandidate,
    },
    Reaction {
        room_id: RoomId,
        emoji: String,
        id: String,
    },
}

impl ServerMessage {
    /// Short name used in log lines.
    pub fn op(&self) -> &'static str {
        match self {
            ServerMessage::Welcome { .. } => "welcome",
            ServerMessage::RoomMembers { .. } => "roomMembers",
            ServerMessage::Message(_) => "message",
            ServerMessage::UserJoinedLive { .. } => "userJoinedLive",
            ServerMessage::UserLeftLive { .. } => "userLeftLive",
            ServerMessage::Offer { .. } => "offer",
            ServerMessage::Answer { .. } => "answer",
            ServerMessage::Candidate { .. } => "candidate",
            ServerMessage::Reaction { .. } => "reaction",
        }
    }
}
