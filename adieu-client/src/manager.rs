use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::{ClientEvent, SessionView};
use crate::media::LocalMedia;
use crate::session::{
    CloseReason, SessionCommand, SessionEvent, SessionEventKind, SessionHandle, SessionParams,
};
use crate::signaling::SignalingSink;
use crate::transport::MediaConnectionFactory;
use adieu_core::utils::default_ice_servers;
use adieu_core::{
    ClientMessage, ConnectionId, IceCandidate, IceServerConfig, RoomId, SessionDescription,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// The call this client is streaming into.
#[derive(Debug, Clone)]
pub struct ActiveCall {
    pub room_id: RoomId,
    pub is_host: bool,
    media: Arc<LocalMedia>,
}

impl ActiveCall {
    pub fn media(&self) -> &LocalMedia {
        &self.media
    }
}

/// Owns every remote session of the local participant.
///
/// At most one session exists per remote connection id and none for our
/// own id. Sessions are only created while a call is active; offers that
/// arrive outside a call are dropped. Each session runs on its own task and
/// reports back through [`PeerConnectionManager::handle_session_event`].
pub struct PeerConnectionManager {
    local_id: Option<ConnectionId>,
    display_name: String,
    ice_servers: Vec<IceServerConfig>,
    ice_servers_pinned: bool,
    negotiation_timeout: Duration,
    call: Option<ActiveCall>,
    sessions: HashMap<ConnectionId, SessionHandle>,
    next_generation: u64,
    factory: Arc<dyn MediaConnectionFactory>,
    signaling: Arc<dyn SignalingSink>,
    session_tx: mpsc::UnboundedSender<SessionEvent>,
    events: mpsc::UnboundedSender<ClientEvent>,
}

impl PeerConnectionManager {
    pub fn new(
        config: &ClientConfig,
        factory: Arc<dyn MediaConnectionFactory>,
        signaling: Arc<dyn SignalingSink>,
        session_tx: mpsc::UnboundedSender<SessionEvent>,
        events: mpsc::UnboundedSender<ClientEvent>,
    ) -> Self {
        Self {
            local_id: None,
            display_name: config.display_name.clone(),
            ice_servers: config
                .ice_servers
                .clone()
                .unwrap_or_else(default_ice_servers),
            ice_servers_pinned: config.ice_servers.is_some(),
            negotiation_timeout: config.negotiation_timeout,
            call: None,
            sessions: HashMap::new(),
            next_generation: 1,
            factory,
            signaling,
            session_tx,
            events,
        }
    }

    /// Records the id the relay assigned us, and its ICE servers unless the
    /// configuration pinned them.
    pub fn set_local_identity(
        &mut self,
        connection_id: ConnectionId,
        ice_servers: Vec<IceServerConfig>,
    ) {
        self.local_id = Some(connection_id);
        if !self.ice_servers_pinned && !ice_servers.is_empty() {
            self.ice_servers = ice_servers;
        }
    }

    pub fn local_id(&self) -> Option<ConnectionId> {
        self.local_id
    }

    pub fn call(&self) -> Option<&ActiveCall> {
        self.call.as_ref()
    }

    pub fn ice_servers(&self) -> &[IceServerConfig] {
        &self.ice_servers
    }

    /// Starts streaming into `room_id` and announces it to the relay.
    ///
    /// Media must already be acquired, so a denied device never reaches the
    /// relay.
    pub fn join_call(
        &mut self,
        room_id: RoomId,
        is_host: bool,
        media: LocalMedia,
    ) -> Result<(), ClientError> {
        if let Some(call) = &self.call {
            return Err(ClientError::AlreadyInCall(call.room_id.clone()));
        }

        info!(
            "Joining call in {} as {} (host: {})",
            room_id, self.display_name, is_host
        );
        self.call = Some(ActiveCall {
            room_id: room_id.clone(),
            is_host,
            media: Arc::new(media),
        });

        self.signaling.send(ClientMessage::JoinLive {
            room_id: room_id.clone(),
            is_host,
            display_name: self.display_name.clone(),
        });
        self.emit(ClientEvent::CallJoined { room_id });
        Ok(())
    }

    /// Closes every session and releases local media. Only the first call
    /// after a join notifies the relay.
    pub fn leave_call(&mut self) {
        self.close_all(CloseReason::Requested);

        let Some(call) = self.call.take() else {
            return;
        };

        info!("Leaving call in {}", call.room_id);
        self.signaling.send(ClientMessage::LeaveLive {
            room_id: call.room_id.clone(),
        });
        self.emit(ClientEvent::CallLeft {
            room_id: call.room_id,
        });
    }

    /// The relay connection dropped: nothing can be signaled any more.
    pub fn relay_lost(&mut self) {
        self.close_all(CloseReason::TransportLost);

        if let Some(call) = self.call.take() {
            self.emit(ClientEvent::CallLeft {
                room_id: call.room_id,
            });
        }
    }

    /// Someone started streaming: we are the side that offers.
    pub fn on_user_joined_live(
        &mut self,
        room_id: &RoomId,
        remote: ConnectionId,
        display_name: &str,
    ) {
        if !self.in_call(room_id) {
            debug!("Ignoring live join of {} in {}: not in that call", remote, room_id);
            return;
        }
        if self.is_self(&remote) {
            return;
        }
        if self.sessions.contains_key(&remote) {
            debug!("Session with {} already exists", remote);
            return;
        }

        if let Some(session) = self.open_session(remote, display_name) {
            session.send(SessionCommand::Initiate);
        }
    }

    pub fn on_user_left_live(&mut self, room_id: &RoomId, remote: ConnectionId) {
        if !self.in_call(room_id) {
            return;
        }
        self.close_session(&remote, CloseReason::Requested);
    }

    pub fn on_offer(
        &mut self,
        caller: ConnectionId,
        caller_display_name: &str,
        offer: SessionDescription,
    ) {
        if self.call.is_none() {
            debug!("Dropping offer from {}: not streaming", caller);
            return;
        }
        if self.is_self(&caller) {
            debug!("Dropping offer from ourselves");
            return;
        }

        if !self.sessions.contains_key(&caller) {
            self.open_session(caller, caller_display_name);
        }
        if let Some(session) = self.sessions.get(&caller) {
            session.send(SessionCommand::RemoteOffer(offer));
        }
    }

    pub fn on_answer(&mut self, responder: ConnectionId, answer: SessionDescription) {
        match self.sessions.get(&responder) {
            Some(session) => {
                session.send(SessionCommand::RemoteAnswer(answer));
            }
            None => debug!("Dropping answer from {}: no session", responder),
        }
    }

    pub fn on_candidate(&mut self, from: ConnectionId, candidate: IceCandidate) {
        match self.sessions.get(&from) {
            Some(session) => {
                session.send(SessionCommand::RemoteCandidate(candidate));
            }
            None => debug!("Dropping candidate from {}: no session", from),
        }
    }

    pub fn handle_session_event(&mut self, event: SessionEvent) {
        let Some(session) = self.sessions.get_mut(&event.connection_id) else {
            debug!("Event for finished session {}", event.connection_id);
            return;
        };
        if session.generation() != event.generation {
            debug!("Stale event from replaced session {}", event.connection_id);
            return;
        }

        let connection_id = event.connection_id;
        match event.kind {
            SessionEventKind::StateChanged(state) => {
                session.set_state(state);
                self.emit(ClientEvent::SessionStateChanged {
                    connection_id,
                    state,
                });
            }
            SessionEventKind::RemoteStream(stream) => {
                session.set_remote_stream(stream.clone());
                self.emit(ClientEvent::StreamAttached {
                    connection_id,
                    stream,
                });
            }
            SessionEventKind::Closed(reason) => {
                self.sessions.remove(&connection_id);
                self.emit(ClientEvent::TileRemoved {
                    connection_id,
                    reason,
                });
            }
        }
    }

    pub fn sessions(&self) -> Vec<SessionView> {
        self.sessions
            .values()
            .map(|s| SessionView {
                connection_id: s.connection_id(),
                display_name: s.display_name().to_owned(),
                state: s.state(),
                remote_stream: s.remote_stream().cloned(),
            })
            .collect()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn open_session(&mut self, remote: ConnectionId, display_name: &str) -> Option<&SessionHandle> {
        let call = self.call.as_ref()?;

        let generation = self.next_generation;
        self.next_generation += 1;

        info!("Opening session with {} ({})", display_name, remote);
        let handle = SessionHandle::spawn(SessionParams {
            remote,
            remote_display_name: display_name.to_owned(),
            generation,
            local_display_name: self.display_name.clone(),
            local_media: Arc::clone(&call.media),
            ice_servers: self.ice_servers.clone(),
            negotiation_timeout: self.negotiation_timeout,
            factory: Arc::clone(&self.factory),
            signaling: Arc::clone(&self.signaling),
            events: self.session_tx.clone(),
        });

        self.emit(ClientEvent::TileAdded {
            connection_id: remote,
            display_name: display_name.to_owned(),
        });
        self.sessions.insert(remote, handle);
        self.sessions.get(&remote)
    }

    fn close_session(&mut self, remote: &ConnectionId, reason: CloseReason) {
        let Some(session) = self.sessions.remove(remote) else {
            return;
        };
        session.close();
        self.emit(ClientEvent::TileRemoved {
            connection_id: *remote,
            reason,
        });
    }

    fn close_all(&mut self, reason: CloseReason) {
        let remotes: Vec<_> = self.sessions.keys().copied().collect();
        for remote in remotes {
            self.close_session(&remote, reason.clone());
        }
    }

    fn in_call(&self, room_id: &RoomId) -> bool {
        self.call.as_ref().is_some_and(|call| &call.room_id == room_id)
    }

    fn is_self(&self, connection_id: &ConnectionId) -> bool {
        self.local_id.as_ref() == Some(connection_id)
    }

    fn emit(&self, event: ClientEvent) {
        let _ = self.events.send(event);
    }
}
