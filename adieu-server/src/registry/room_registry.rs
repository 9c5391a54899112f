use crate::registry::room::{LiveParticipant, Room};
use adieu_core::{ConnectionId, PeerInfo, RoomId};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// What a departure from one room requires the relay to announce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub room_id: RoomId,
    /// Updated member list, present when the peer was a chat member.
    pub remaining_members: Option<Vec<PeerInfo>>,
    /// Live participants to notify, present when the peer was in the call.
    pub remaining_live: Option<Vec<ConnectionId>>,
}

/// Process-wide room and presence registry.
///
/// Owned by the relay task, so every mutation happens on one event loop.
/// `memberships` indexes which rooms each connection is involved in, which
/// keeps disconnect cleanup proportional to that connection's rooms.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    memberships: HashMap<ConnectionId, HashSet<RoomId>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `peer` to the chat members of `room_id`, creating the room on
    /// first join. Returns the member list to broadcast to every member.
    pub fn join(&mut self, room_id: &RoomId, peer: PeerInfo) -> Vec<PeerInfo> {
        let connection_id = peer.connection_id;
        let room = self.rooms.entry(room_id.clone()).or_insert_with(|| {
            debug!("Creating room {}", room_id);
            Room::new()
        });

        room.add_member(peer);
        let members = room.members().to_vec();
        self.index(connection_id, room_id);
        members
    }

    /// Removes a chat member. Returns the remaining members, or `None` if the
    /// peer was not a member.
    pub fn leave_chat(
        &mut self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Option<Vec<PeerInfo>> {
        let room = self.rooms.get_mut(room_id)?;
        if !room.remove_member(connection_id) {
            return None;
        }

        let remaining = room.members().to_vec();
        self.settle(room_id, connection_id);
        Some(remaining)
    }

    /// Adds a live participant. Returns the other live participants that must
    /// learn about the arrival, or `None` if the peer was already live.
    pub fn join_live(
        &mut self,
        room_id: &RoomId,
        participant: LiveParticipant,
    ) -> Option<Vec<ConnectionId>> {
        let connection_id = participant.connection_id;
        let room = self.rooms.entry(room_id.clone()).or_default();

        let added = room.add_live(participant);
        let others = room.live_ids_except(&connection_id);
        self.index(connection_id, room_id);

        added.then_some(others)
    }

    /// Removes a live participant. Returns the live participants that remain,
    /// or `None` if the peer was not in the call.
    pub fn leave_live(
        &mut self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Option<Vec<ConnectionId>> {
        let room = self.rooms.get_mut(room_id)?;
        if !room.remove_live(connection_id) {
            return None;
        }

        let remaining = room.live_ids_except(connection_id);
        self.settle(room_id, connection_id);
        Some(remaining)
    }

    /// Runs `leave_chat` and `leave_live` for every room the connection is
    /// involved in and forgets the connection.
    pub fn disconnect(&mut self, connection_id: &ConnectionId) -> Vec<Departure> {
        let Some(room_ids) = self.memberships.remove(connection_id) else {
            return Vec::new();
        };

        let mut departures = Vec::with_capacity(room_ids.len());
        for room_id in room_ids {
            let Some(room) = self.rooms.get_mut(&room_id) else {
                continue;
            };

            let remaining_members = room
                .remove_member(connection_id)
                .then(|| room.members().to_vec());
            let remaining_live = room
                .remove_live(connection_id)
                .then(|| room.live_ids_except(connection_id));

            if room.is_empty() {
                debug!("Dropping empty room {}", room_id);
                self.rooms.remove(&room_id);
            }

            departures.push(Departure {
                room_id,
                remaining_members,
                remaining_live,
            });
        }

        departures
    }

    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn is_member(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool {
        self.rooms
            .get(room_id)
            .is_some_and(|room| room.is_member(connection_id))
    }

    pub fn member_ids(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.rooms
            .get(room_id)
            .map(Room::member_ids)
            .unwrap_or_default()
    }

    /// Display name the peer registered in `room_id`, if any.
    pub fn display_name(&self, room_id: &RoomId, connection_id: &ConnectionId) -> Option<&str> {
        self.rooms
            .get(room_id)?
            .members()
            .iter()
            .find(|m| &m.connection_id == connection_id)
            .map(|m| m.display_name.as_str())
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn rooms_of(&self, connection_id: &ConnectionId) -> usize {
        self.memberships
            .get(connection_id)
            .map(HashSet::len)
            .unwrap_or_default()
    }

    fn index(&mut self, connection_id: ConnectionId, room_id: &RoomId) {
        self.memberships
            .entry(connection_id)
            .or_default()
            .insert(room_id.clone());
    }

    // Drops the index entry and the room itself once nothing references them.
    fn settle(&mut self, room_id: &RoomId, connection_id: &ConnectionId) {
        let Some(room) = self.rooms.get(room_id) else {
            return;
        };

        if !room.involves(connection_id) {
            if let Some(rooms) = self.memberships.get_mut(connection_id) {
                rooms.remove(room_id);
                if rooms.is_empty() {
                    self.memberships.remove(connection_id);
                }
            }
        }

        if room.is_empty() {
            debug!("Dropping empty room {}", room_id);
            self.rooms.remove(room_id);
        }
    }
}
