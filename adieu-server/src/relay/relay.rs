use crate::registry::{Departure, LiveParticipant, RoomRegistry};
use crate::relay::{RelayCommand, RoomSnapshot};
use crate::signaling::SignalingOutput;
use adieu_core::utils::unix_millis;
use adieu_core::{
    ChatMessage, ClientMessage, ConnectionId, IceCandidate, MessageId, PeerInfo, RoomId,
    ServerMessage, SessionDescription,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The relay event loop.
///
/// Owns the room registry outright; all membership changes and fan-out
/// decisions happen here, one command at a time, in arrival order.
pub struct Relay {
    registry: RoomRegistry,
    command_rx: mpsc::Receiver<RelayCommand>,
    output: Arc<dyn SignalingOutput>,
    next_message_id: u64,
    next_reaction_seq: u64,
}

impl Relay {
    pub fn new(command_rx: mpsc::Receiver<RelayCommand>, output: Arc<dyn SignalingOutput>) -> Self {
        Self {
            registry: RoomRegistry::new(),
            command_rx,
            output,
            next_message_id: 1,
            next_reaction_seq: 1,
        }
    }

    pub async fn run(mut self) {
        info!("Relay event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd);
        }

        info!(
            "Command channel closed. Relay shutting down with {} rooms.",
            self.registry.room_count()
        );
    }

    fn handle_command(&mut self, cmd: RelayCommand) {
        match cmd {
            RelayCommand::Client {
                connection_id,
                message,
            } => self.handle_message(connection_id, message),

            RelayCommand::Disconnect { connection_id } => self.disconnect(&connection_id),

            RelayCommand::Inspect { room_id, reply } => {
                let snapshot = self.registry.room(&room_id).map(|room| RoomSnapshot {
                    members: room.members().to_vec(),
                    live: room.live().to_vec(),
                });
                let _ = reply.send(snapshot);
            }
        }
    }

    fn handle_message(&mut self, from: ConnectionId, message: ClientMessage) {
        match message {
            ClientMessage::JoinRoom {
                room_id,
                display_name,
            } => {
                info!("{} ({}) joined room {}", display_name, from, room_id);
                let members = self
                    .registry
                    .join(&room_id, PeerInfo::new(from, display_name));
                self.broadcast_members(room_id, members);
            }

            ClientMessage::LeaveRoom { room_id } => {
                let Some(members) = self.registry.leave_chat(&room_id, &from) else {
                    debug!("{} left room {} it was not in", from, room_id);
                    return;
                };
                info!("{} left room {}", from, room_id);
                self.broadcast_members(room_id, members);
            }

            ClientMessage::ChatMessage {
                room_id,
                author,
                text,
            } => self.chat(from, room_id, author, text),

            ClientMessage::JoinLive {
                room_id,
                is_host,
                display_name,
            } => self.join_live(from, room_id, is_host, display_name),

            ClientMessage::LeaveLive { room_id } => {
                let Some(remaining) = self.registry.leave_live(&room_id, &from) else {
                    debug!("{} left live call in {} it was not in", from, room_id);
                    return;
                };
                info!("{} left live stage in {}", from, room_id);
                self.announce_live_departure(room_id, from, &remaining);
            }

            ClientMessage::Offer {
                target_connection_id,
                session_description,
                caller_display_name,
            } => self.relay_offer(
                from,
                target_connection_id,
                session_description,
                caller_display_name,
            ),

            ClientMessage::Answer {
                target_connection_id,
                session_description,
                responder_display_name,
            } => self.relay_answer(
                from,
                target_connection_id,
                session_description,
                responder_display_name,
            ),

            ClientMessage::Candidate {
                target_connection_id,
                candidate,
            } => self.relay_candidate(from, target_connection_id, candidate),

            ClientMessage::Reaction { room_id, emoji } => self.reaction(from, room_id, emoji),
        }
    }

    fn join_live(&mut self, from: ConnectionId, room_id: RoomId, is_host: bool, name: String) {
        // Fall back to the chat name when the call announcement carries none.
        let name = if name.trim().is_empty() {
            self.registry
                .display_name(&room_id, &from)
                .unwrap_or_default()
                .to_owned()
        } else {
            name
        };

        let participant = LiveParticipant {
            connection_id: from,
            display_name: name.clone(),
            is_host,
        };

        let Some(others) = self.registry.join_live(&room_id, participant) else {
            debug!("{} is already live in {}", from, room_id);
            return;
        };

        info!(
            "User {} ({}) joined live stage in {} (host: {}), notifying {} peers",
            name,
            from,
            room_id,
            is_host,
            others.len()
        );

        let msg = ServerMessage::UserJoinedLive {
            room_id,
            connection_id: from,
            is_host,
            display_name: name,
        };
        self.output.send_all(&others, &msg);
    }

    /// Sends `offer` to `to` only. Unreachable targets are dropped silently;
    /// the caller's negotiation timeout covers them.
    fn relay_offer(
        &self,
        from: ConnectionId,
        to: ConnectionId,
        session_description: SessionDescription,
        caller_display_name: String,
    ) {
        debug!("Relaying offer {} -> {}", from, to);
        self.output.send(
            &to,
            ServerMessage::Offer {
                caller_connection_id: from,
                caller_display_name,
                session_description,
            },
        );
    }

    fn relay_answer(
        &self,
        from: ConnectionId,
        to: ConnectionId,
        session_description: SessionDescription,
        responder_display_name: String,
    ) {
        debug!("Relaying answer {} -> {}", from, to);
        self.output.send(
            &to,
            ServerMessage::Answer {
                responder_connection_id: from,
                responder_display_name,
                session_description,
            },
        );
    }

    fn relay_candidate(&self, from: ConnectionId, to: ConnectionId, candidate: IceCandidate) {
        self.output.send(
            &to,
            ServerMessage::Candidate {
                from_connection_id: from,
                candidate,
            },
        );
    }

    fn chat(&mut self, from: ConnectionId, room_id: RoomId, author: String, text: String) {
        if !self.registry.is_member(&room_id, &from) {
            warn!("Dropping chat from {} to room {} it has not joined", from, room_id);
            return;
        }

        let id = MessageId(self.next_message_id);
        self.next_message_id += 1;

        let targets = self.registry.member_ids(&room_id);
        let msg = ServerMessage::Message(ChatMessage {
            id,
            room_id,
            author,
            text,
            timestamp: unix_millis(),
        });
        self.output.send_all(&targets, &msg);
    }

    fn reaction(&mut self, from: ConnectionId, room_id: RoomId, emoji: String) {
        if !self.registry.is_member(&room_id, &from) {
            warn!("Dropping reaction from {} to room {} it has not joined", from, room_id);
            return;
        }

        let id = format!("{}-{}", unix_millis(), self.next_reaction_seq);
        self.next_reaction_seq += 1;

        let targets = self.registry.member_ids(&room_id);
        let msg = ServerMessage::Reaction { room_id, emoji, id };
        self.output.send_all(&targets, &msg);
    }

    fn disconnect(&mut self, connection_id: &ConnectionId) {
        let departures = self.registry.disconnect(connection_id);
        if departures.is_empty() {
            return;
        }

        info!(
            "Cleaning up {} after disconnect ({} rooms)",
            connection_id,
            departures.len()
        );

        for Departure {
            room_id,
            remaining_members,
            remaining_live,
        } in departures
        {
            if let Some(remaining) = remaining_live {
                self.announce_live_departure(room_id.clone(), *connection_id, &remaining);
            }
            if let Some(members) = remaining_members {
                self.broadcast_members(room_id, members);
            }
        }
    }

    fn announce_live_departure(
        &self,
        room_id: RoomId,
        connection_id: ConnectionId,
        remaining: &[ConnectionId],
    ) {
        let msg = ServerMessage::UserLeftLive {
            room_id,
            connection_id,
        };
        self.output.send_all(remaining, &msg);
    }

    fn broadcast_members(&self, room_id: RoomId, members: Vec<PeerInfo>) {
        let targets: Vec<_> = members.iter().map(|m| m.connection_id).collect();
        let msg = ServerMessage::RoomMembers { room_id, members };
        self.output.send_all(&targets, &msg);
    }
}
