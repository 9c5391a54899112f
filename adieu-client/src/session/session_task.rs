use crate::error::SessionError;
use crate::media::{LocalMedia, RemoteStream};
use crate::session::{NegotiationState, RemoteSession};
use crate::signaling::SignalingSink;
use crate::transport::{MediaConnectionFactory, TransportEvent, TransportState};
use adieu_core::{ClientMessage, ConnectionId, IceCandidate, IceServerConfig, SessionDescription};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Instructions from the manager to one session task.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Send the first offer. Only the side that saw the other join live
    /// does this.
    Initiate,
    RemoteOffer(SessionDescription),
    RemoteAnswer(SessionDescription),
    RemoteCandidate(IceCandidate),
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Local leave or remote `userLeftLive`.
    Requested,
    /// Negotiation did not reach `Connected` in time.
    Timeout,
    /// The transport reported disconnected, failed or closed.
    TransportLost,
    NegotiationFailed(String),
}

#[derive(Debug, Clone)]
pub enum SessionEventKind {
    StateChanged(NegotiationState),
    RemoteStream(RemoteStream),
    Closed(CloseReason),
}

/// Reported by a session task to the manager.
///
/// `generation` tells apart two sessions for the same peer, so a late event
/// from a replaced session never touches its successor.
#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub connection_id: ConnectionId,
    pub generation: u64,
    pub kind: SessionEventKind,
}

/// Everything a session task needs to run.
pub struct SessionParams {
    pub remote: ConnectionId,
    pub remote_display_name: String,
    pub generation: u64,
    pub local_display_name: String,
    pub local_media: Arc<LocalMedia>,
    pub ice_servers: Vec<IceServerConfig>,
    pub negotiation_timeout: Duration,
    pub factory: Arc<dyn MediaConnectionFactory>,
    pub signaling: Arc<dyn SignalingSink>,
    pub events: mpsc::UnboundedSender<SessionEvent>,
}

/// The manager's side of a running session task.
///
/// Dropping the handle closes the session.
#[derive(Debug)]
pub struct SessionHandle {
    connection_id: ConnectionId,
    display_name: String,
    generation: u64,
    state: NegotiationState,
    remote_stream: Option<RemoteStream>,
    command_tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    pub fn spawn(params: SessionParams) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let handle = Self {
            connection_id: params.remote,
            display_name: params.remote_display_name.clone(),
            generation: params.generation,
            state: NegotiationState::Idle,
            remote_stream: None,
            command_tx,
        };

        tokio::spawn(run_session(params, command_rx));
        handle
    }

    /// Returns `false` once the task has finished.
    pub fn send(&self, command: SessionCommand) -> bool {
        self.command_tx.send(command).is_ok()
    }

    pub fn close(&self) {
        let _ = self.command_tx.send(SessionCommand::Close);
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Last state the task reported.
    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn remote_stream(&self) -> Option<&RemoteStream> {
        self.remote_stream.as_ref()
    }

    pub(crate) fn set_state(&mut self, state: NegotiationState) {
        self.state = state;
    }

    pub(crate) fn set_remote_stream(&mut self, stream: RemoteStream) {
        self.remote_stream = Some(stream);
    }
}

async fn run_session(params: SessionParams, command_rx: mpsc::UnboundedReceiver<SessionCommand>) {
    let (transport_tx, transport_rx) = mpsc::unbounded_channel();

    let connection = match params
        .factory
        .create(params.remote, &params.ice_servers, transport_tx)
        .await
    {
        Ok(connection) => connection,
        Err(e) => {
            warn!("Failed to create transport for {}: {}", params.remote, e);
            let _ = params.events.send(SessionEvent {
                connection_id: params.remote,
                generation: params.generation,
                kind: SessionEventKind::Closed(CloseReason::NegotiationFailed(e.to_string())),
            });
            return;
        }
    };

    let task = SessionTask {
        session: RemoteSession::new(params.remote, params.remote_display_name, connection),
        generation: params.generation,
        local_display_name: params.local_display_name,
        local_media: params.local_media,
        signaling: params.signaling,
        events: params.events,
        negotiation_timeout: params.negotiation_timeout,
        deadline: None,
        command_rx,
        transport_rx,
    };
    task.run().await;
}

struct SessionTask {
    session: RemoteSession,
    generation: u64,
    local_display_name: String,
    local_media: Arc<LocalMedia>,
    signaling: Arc<dyn SignalingSink>,
    events: mpsc::UnboundedSender<SessionEvent>,
    negotiation_timeout: Duration,
    /// Set while negotiating.
    deadline: Option<Instant>,
    command_rx: mpsc::UnboundedReceiver<SessionCommand>,
    transport_rx: mpsc::UnboundedReceiver<TransportEvent>,
}

impl SessionTask {
    async fn run(mut self) {
        let remote = self.session.connection_id();
        debug!("Session task for {} started", remote);

        let reason = loop {
            let deadline = self.deadline;

            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(SessionCommand::Close) | None => break CloseReason::Requested,
                    Some(cmd) => {
                        if let Err(reason) = self.bounded_command(cmd).await {
                            break reason;
                        }
                    }
                },

                Some(event) = self.transport_rx.recv() => {
                    if let Err(reason) = self.handle_transport_event(event) {
                        break reason;
                    }
                }

                _ = wait_until(deadline) => {
                    warn!(
                        "Negotiation with {} timed out after {:?}",
                        remote, self.negotiation_timeout
                    );
                    break CloseReason::Timeout;
                }
            }
        };

        info!("Closing session with {}: {:?}", remote, reason);
        self.session.close().await;
        self.emit(SessionEventKind::Closed(reason));
    }

    // Transport calls run under the negotiation deadline, or a fresh one
    // when none is pending, so a call that never returns still ends the
    // session.
    async fn bounded_command(&mut self, cmd: SessionCommand) -> Result<(), CloseReason> {
        let deadline = self
            .deadline
            .unwrap_or_else(|| Instant::now() + self.negotiation_timeout);

        match tokio::time::timeout_at(deadline, self.handle_command(cmd)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Transport call for {} did not finish within {:?}",
                    self.session.connection_id(),
                    self.negotiation_timeout
                );
                Err(CloseReason::Timeout)
            }
        }
    }

    async fn handle_command(&mut self, cmd: SessionCommand) -> Result<(), CloseReason> {
        let remote = self.session.connection_id();

        match cmd {
            SessionCommand::Initiate => match self.session.start_offer(&self.local_media).await {
                Ok(offer) => {
                    debug!("Sending offer to {}", remote);
                    self.signaling.send(ClientMessage::Offer {
                        target_connection_id: remote,
                        session_description: offer,
                        caller_display_name: self.local_display_name.clone(),
                    });
                    self.enter_negotiating();
                    Ok(())
                }
                Err(e) => self.recover(e),
            },

            SessionCommand::RemoteOffer(offer) => {
                let was_idle = self.session.state() == NegotiationState::Idle;

                match self.session.accept_offer(offer, &self.local_media).await {
                    Ok(answer) => {
                        debug!("Sending answer to {}", remote);
                        self.signaling.send(ClientMessage::Answer {
                            target_connection_id: remote,
                            session_description: answer,
                            responder_display_name: self.local_display_name.clone(),
                        });
                        if was_idle {
                            self.enter_negotiating();
                        }
                        Ok(())
                    }
                    Err(e) => self.recover(e),
                }
            }

            SessionCommand::RemoteAnswer(answer) => match self.session.accept_answer(answer).await {
                Ok(()) => Ok(()),
                Err(e) => self.recover(e),
            },

            SessionCommand::RemoteCandidate(candidate) => {
                self.session.add_candidate(candidate).await;
                Ok(())
            }

            SessionCommand::Close => Err(CloseReason::Requested),
        }
    }

    fn handle_transport_event(&mut self, event: TransportEvent) -> Result<(), CloseReason> {
        match event {
            TransportEvent::CandidateGenerated(candidate) => {
                let sent = self.signaling.send(ClientMessage::Candidate {
                    target_connection_id: self.session.connection_id(),
                    candidate,
                });
                if !sent {
                    debug!("Relay gone, dropping local candidate");
                }
            }

            TransportEvent::StateChanged(TransportState::Connected) => {
                if self.session.mark_connected() {
                    self.deadline = None;
                    self.emit(SessionEventKind::StateChanged(NegotiationState::Connected));
                }
            }

            TransportEvent::StateChanged(state) if state.is_terminal() => {
                return Err(CloseReason::TransportLost);
            }

            TransportEvent::StateChanged(_) => {}

            TransportEvent::Track(stream) => {
                self.session.attach_stream(stream.clone());
                self.emit(SessionEventKind::RemoteStream(stream));
            }
        }
        Ok(())
    }

    fn enter_negotiating(&mut self) {
        self.deadline = Some(Instant::now() + self.negotiation_timeout);
        self.emit(SessionEventKind::StateChanged(NegotiationState::Negotiating));
    }

    // Out-of-order signaling is logged and ignored; transport errors end
    // the session.
    fn recover(&self, error: SessionError) -> Result<(), CloseReason> {
        if error.is_fatal() {
            return Err(CloseReason::NegotiationFailed(error.to_string()));
        }
        warn!(
            "Ignoring signaling for {}: {}",
            self.session.connection_id(),
            error
        );
        Ok(())
    }

    fn emit(&self, kind: SessionEventKind) {
        let _ = self.events.send(SessionEvent {
            connection_id: self.session.connection_id(),
            generation: self.generation,
            kind,
        });
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
