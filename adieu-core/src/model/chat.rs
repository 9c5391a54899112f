use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

/// Relay-stamped, monotonically increasing chat message id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub room_id: RoomId,
    pub author: String,
    pub text: String,
    /// Milliseconds since the unix epoch, taken on the relay.
    pub timestamp: u64,
}
