use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::{ClientEvent, SessionView};
use crate::manager::PeerConnectionManager;
use crate::media::{LocalMedia, MediaSource};
use crate::reactions::ReactionFeed;
use crate::session::SessionEvent;
use crate::signaling::{SignalingSink, WsSignaling};
use crate::transport::MediaConnectionFactory;
use adieu_core::{ClientMessage, ConnectionId, RoomId, ServerMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

const REACTION_SWEEP_MS: u64 = 100;

enum ClientCommand {
    JoinRoom(RoomId),
    LeaveRoom(RoomId),
    Chat {
        room_id: RoomId,
        text: String,
    },
    Reaction {
        room_id: RoomId,
        emoji: String,
    },
    JoinCall {
        room_id: RoomId,
        is_host: bool,
        media: LocalMedia,
        reply: oneshot::Sender<Result<(), ClientError>>,
    },
    LeaveCall,
    CurrentCall(oneshot::Sender<Option<RoomId>>),
    Sessions(oneshot::Sender<Vec<SessionView>>),
    LocalId(oneshot::Sender<Option<ConnectionId>>),
}

/// Entry point for a room participant.
pub struct RoomClient;

impl RoomClient {
    /// Connects to the relay over WebSocket and starts the client loop.
    pub async fn connect(
        config: ClientConfig,
        factory: Arc<dyn MediaConnectionFactory>,
        media_source: Arc<dyn MediaSource>,
    ) -> Result<(ClientHandle, mpsc::UnboundedReceiver<ClientEvent>), ClientError> {
        let (signaling, inbound) = WsSignaling::connect(&config.relay_url).await?;
        Ok(Self::start(
            config,
            Arc::new(signaling),
            inbound,
            factory,
            media_source,
        ))
    }

    /// Starts the client loop over an existing relay connection.
    pub fn start(
        config: ClientConfig,
        signaling: Arc<dyn SignalingSink>,
        inbound: mpsc::UnboundedReceiver<ServerMessage>,
        factory: Arc<dyn MediaConnectionFactory>,
        media_source: Arc<dyn MediaSource>,
    ) -> (ClientHandle, mpsc::UnboundedReceiver<ClientEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (session_tx, session_rx) = mpsc::unbounded_channel();

        let manager = PeerConnectionManager::new(
            &config,
            factory,
            Arc::clone(&signaling),
            session_tx,
            events_tx.clone(),
        );

        let client_loop = ClientLoop {
            display_name: config.display_name.clone(),
            reactions: ReactionFeed::new(config.reaction_ttl),
            manager,
            signaling,
            inbound,
            command_rx,
            session_rx,
            events: events_tx,
        };
        tokio::spawn(client_loop.run());

        let handle = ClientHandle {
            command_tx,
            media_source,
        };
        (handle, events_rx)
    }
}

/// Cloneable front end of the client loop. The loop stops, leaving any
/// call, once every handle is dropped.
#[derive(Clone)]
pub struct ClientHandle {
    command_tx: mpsc::UnboundedSender<ClientCommand>,
    media_source: Arc<dyn MediaSource>,
}

impl ClientHandle {
    pub fn join_room(&self, room_id: impl Into<RoomId>) -> Result<(), ClientError> {
        self.send(ClientCommand::JoinRoom(room_id.into()))
    }

    pub fn leave_room(&self, room_id: impl Into<RoomId>) -> Result<(), ClientError> {
        self.send(ClientCommand::LeaveRoom(room_id.into()))
    }

    /// Blank messages are not sent.
    pub fn send_chat(
        &self,
        room_id: impl Into<RoomId>,
        text: impl Into<String>,
    ) -> Result<(), ClientError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Ok(());
        }
        self.send(ClientCommand::Chat {
            room_id: room_id.into(),
            text,
        })
    }

    pub fn send_reaction(
        &self,
        room_id: impl Into<RoomId>,
        emoji: impl Into<String>,
    ) -> Result<(), ClientError> {
        self.send(ClientCommand::Reaction {
            room_id: room_id.into(),
            emoji: emoji.into(),
        })
    }

    /// Acquires local media, then joins the call. If media is unavailable
    /// nothing is sent to the relay.
    ///
    /// Media is not touched while another call is active.
    pub async fn join_call(
        &self,
        room_id: impl Into<RoomId>,
        is_host: bool,
    ) -> Result<(), ClientError> {
        if let Some(room) = self.current_call().await? {
            return Err(ClientError::AlreadyInCall(room));
        }
        let media = self.media_source.acquire().await?;

        let (reply, rx) = oneshot::channel();
        self.send(ClientCommand::JoinCall {
            room_id: room_id.into(),
            is_host,
            media,
            reply,
        })?;
        rx.await.map_err(|_| ClientError::ClientStopped)?
    }

    /// Safe to call when not in a call.
    pub fn leave_call(&self) -> Result<(), ClientError> {
        self.send(ClientCommand::LeaveCall)
    }

    /// Room of the call we are streaming in, if any.
    pub async fn current_call(&self) -> Result<Option<RoomId>, ClientError> {
        let (reply, rx) = oneshot::channel();
        self.send(ClientCommand::CurrentCall(reply))?;
        rx.await.map_err(|_| ClientError::ClientStopped)
    }

    pub async fn sessions(&self) -> Result<Vec<SessionView>, ClientError> {
        let (reply, rx) = oneshot::channel();
        self.send(ClientCommand::Sessions(reply))?;
        rx.await.map_err(|_| ClientError::ClientStopped)
    }

    /// Our relay-assigned id, once the welcome frame arrived.
    pub async fn connection_id(&self) -> Result<Option<ConnectionId>, ClientError> {
        let (reply, rx) = oneshot::channel();
        self.send(ClientCommand::LocalId(reply))?;
        rx.await.map_err(|_| ClientError::ClientStopped)
    }

    fn send(&self, cmd: ClientCommand) -> Result<(), ClientError> {
        self.command_tx
            .send(cmd)
            .map_err(|_| ClientError::ClientStopped)
    }
}

struct ClientLoop {
    display_name: String,
    reactions: ReactionFeed,
    manager: PeerConnectionManager,
    signaling: Arc<dyn SignalingSink>,
    inbound: mpsc::UnboundedReceiver<ServerMessage>,
    command_rx: mpsc::UnboundedReceiver<ClientCommand>,
    session_rx: mpsc::UnboundedReceiver<SessionEvent>,
    events: mpsc::UnboundedSender<ClientEvent>,
}

impl ClientLoop {
    async fn run(mut self) {
        info!("Client loop started for {}", self.display_name);

        let mut sweep = tokio::time::interval(Duration::from_millis(REACTION_SWEEP_MS));
        sweep.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                msg = self.inbound.recv() => match msg {
                    Some(msg) => self.handle_server_message(msg),
                    None => {
                        warn!("Lost connection to relay");
                        self.manager.relay_lost();
                        self.emit(ClientEvent::Disconnected);
                        break;
                    }
                },

                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => {
                        self.manager.leave_call();
                        break;
                    }
                },

                Some(event) = self.session_rx.recv() => self.manager.handle_session_event(event),

                _ = sweep.tick() => {
                    for id in self.reactions.prune(Instant::now()) {
                        self.emit(ClientEvent::ReactionExpired { id });
                    }
                }
            }
        }

        info!("Client loop for {} stopped", self.display_name);
    }

    fn handle_server_message(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Welcome {
                connection_id,
                ice_servers,
            } => {
                info!("Relay assigned connection id {}", connection_id);
                self.manager.set_local_identity(connection_id, ice_servers);
                self.emit(ClientEvent::Connected { connection_id });
            }

            ServerMessage::RoomMembers { room_id, members } => {
                self.emit(ClientEvent::Members { room_id, members });
            }

            ServerMessage::Message(message) => self.emit(ClientEvent::Chat(message)),

            ServerMessage::UserJoinedLive {
                room_id,
                connection_id,
                is_host,
                display_name,
            } => {
                self.manager
                    .on_user_joined_live(&room_id, connection_id, &display_name);
                self.emit(ClientEvent::ParticipantJoinedLive {
                    room_id,
                    connection_id,
                    display_name,
                    is_host,
                });
            }

            ServerMessage::UserLeftLive {
                room_id,
                connection_id,
            } => {
                self.manager.on_user_left_live(&room_id, connection_id);
                self.emit(ClientEvent::ParticipantLeftLive {
                    room_id,
                    connection_id,
                });
            }

            ServerMessage::Offer {
                caller_connection_id,
                caller_display_name,
                session_description,
            } => self.manager.on_offer(
                caller_connection_id,
                &caller_display_name,
                session_description,
            ),

            ServerMessage::Answer {
                responder_connection_id,
                session_description,
                ..
            } => self
                .manager
                .on_answer(responder_connection_id, session_description),

            ServerMessage::Candidate {
                from_connection_id,
                candidate,
            } => self.manager.on_candidate(from_connection_id, candidate),

            ServerMessage::Reaction { room_id, emoji, id } => {
                self.reactions
                    .push(id.clone(), emoji.clone(), Instant::now());
                self.emit(ClientEvent::Reaction { room_id, emoji, id });
            }
        }
    }

    fn handle_command(&mut self, cmd: ClientCommand) {
        match cmd {
            ClientCommand::JoinRoom(room_id) => {
                self.relay(ClientMessage::JoinRoom {
                    room_id,
                    display_name: self.display_name.clone(),
                });
            }

            ClientCommand::LeaveRoom(room_id) => self.relay(ClientMessage::LeaveRoom { room_id }),

            ClientCommand::Chat { room_id, text } => {
                self.relay(ClientMessage::ChatMessage {
                    room_id,
                    author: self.display_name.clone(),
                    text,
                });
            }

            ClientCommand::Reaction { room_id, emoji } => {
                self.relay(ClientMessage::Reaction { room_id, emoji });
            }

            ClientCommand::JoinCall {
                room_id,
                is_host,
                media,
                reply,
            } => {
                let _ = reply.send(self.manager.join_call(room_id, is_host, media));
            }

            ClientCommand::LeaveCall => self.manager.leave_call(),

            ClientCommand::CurrentCall(reply) => {
                let _ = reply.send(self.manager.call().map(|call| call.room_id.clone()));
            }

            ClientCommand::Sessions(reply) => {
                let _ = reply.send(self.manager.sessions());
            }

            ClientCommand::LocalId(reply) => {
                let _ = reply.send(self.manager.local_id());
            }
        }
    }

    fn relay(&self, msg: ClientMessage) {
        if !self.signaling.send(msg) {
            debug!("Relay connection closed, message dropped");
        }
    }

    fn emit(&self, event: ClientEvent) {
        let _ = self.events.send(event);
    }
}
