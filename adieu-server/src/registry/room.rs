use adieu_core::{ConnectionId, PeerInfo};

/// A participant of the live call inside one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveParticipant {
    pub connection_id: ConnectionId,
    pub display_name: String,
    pub is_host: bool,
}

/// Presence state of a single room.
///
/// `members` and `live` are mutated independently: a peer may stay in the call
/// after its chat membership was dropped and vice versa.
#[derive(Debug, Default)]
pub struct Room {
    members: Vec<PeerInfo>,
    live: Vec<LiveParticipant>,
}

impl Room {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or refreshes a chat member. Returns `true` if the peer was new.
    pub fn add_member(&mut self, peer: PeerInfo) -> bool {
        match self
            .members
            .iter_mut()
            .find(|m| m.connection_id == peer.connection_id)
        {
            Some(existing) => {
                existing.display_name = peer.display_name;
                false
            }
            None => {
                self.members.push(peer);
                true
            }
        }
    }

    pub fn remove_member(&mut self, connection_id: &ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| &m.connection_id != connection_id);
        self.members.len() != before
    }

    /// Adds or refreshes a live participant. Returns `true` if the peer was new.
    pub fn add_live(&mut self, participant: LiveParticipant) -> bool {
        match self
            .live
            .iter_mut()
            .find(|p| p.connection_id == participant.connection_id)
        {
            Some(existing) => {
                *existing = participant;
                false
            }
            None => {
                self.live.push(participant);
                true
            }
        }
    }

    pub fn remove_live(&mut self, connection_id: &ConnectionId) -> bool {
        let before = self.live.len();
        self.live.retain(|p| &p.connection_id != connection_id);
        self.live.len() != before
    }

    pub fn is_member(&self, connection_id: &ConnectionId) -> bool {
        self.members.iter().any(|m| &m.connection_id == connection_id)
    }

    pub fn is_live(&self, connection_id: &ConnectionId) -> bool {
        self.live.iter().any(|p| &p.connection_id == connection_id)
    }

    /// Whether the peer still has any reason to be indexed under this room.
    pub fn involves(&self, connection_id: &ConnectionId) -> bool {
        self.is_member(connection_id) || self.is_live(connection_id)
    }

    /// Chat members in first-join order.
    pub fn members(&self) -> &[PeerInfo] {
        &self.members
    }

    pub fn live(&self) -> &[LiveParticipant] {
        &self.live
    }

    pub fn member_ids(&self) -> Vec<ConnectionId> {
        self.members.iter().map(|m| m.connection_id).collect()
    }

    pub fn live_ids_except(&self, connection_id: &ConnectionId) -> Vec<ConnectionId> {
        self.live
            .iter()
            .map(|p| p.connection_id)
            .filter(|id| id != connection_id)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty() && self.live.is_empty()
    }
}
