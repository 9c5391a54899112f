mod chat;
mod connection;
mod peer;
mod room;
mod signaling;

pub use chat::{ChatMessage, MessageId};
pub use connection::{ConnectionId, IdParseError};
pub use peer::PeerInfo;
pub use room::RoomId;
pub use signaling::{
    ClientMessage, IceCandidate, IceServerConfig, SdpKind, ServerMessage, SessionDescription,
};
