use crate::error::SessionError;
use crate::media::{LocalMedia, RemoteStream};
use crate::session::NegotiationState;
use crate::transport::MediaConnection;
use adieu_core::{ConnectionId, IceCandidate, SessionDescription};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Negotiation and media state for one remote participant.
///
/// Remote candidates that arrive before the remote description are queued
/// and applied in arrival order once it is set.
pub struct RemoteSession {
    connection_id: ConnectionId,
    display_name: String,
    state: NegotiationState,
    connection: Box<dyn MediaConnection>,
    remote_stream: Option<RemoteStream>,
    pending_candidates: VecDeque<IceCandidate>,
    has_remote_description: bool,
    local_media_attached: bool,
}

impl RemoteSession {
    pub fn new(
        connection_id: ConnectionId,
        display_name: impl Into<String>,
        connection: Box<dyn MediaConnection>,
    ) -> Self {
        Self {
            connection_id,
            display_name: display_name.into(),
            state: NegotiationState::Idle,
            connection,
            remote_stream: None,
            pending_candidates: VecDeque::new(),
            has_remote_description: false,
            local_media_attached: false,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn remote_stream(&self) -> Option<&RemoteStream> {
        self.remote_stream.as_ref()
    }

    pub fn pending_candidates(&self) -> usize {
        self.pending_candidates.len()
    }

    /// Initiator side: attach local media and produce the offer.
    pub async fn start_offer(
        &mut self,
        media: &LocalMedia,
    ) -> Result<SessionDescription, SessionError> {
        self.ensure(NegotiationState::Negotiating, "create an offer")?;

        self.attach_local_media(media).await?;
        let offer = self.connection.create_offer().await?;
        self.state = NegotiationState::Negotiating;
        Ok(offer)
    }

    /// Responder side: apply the remote offer and produce the answer.
    ///
    /// A renegotiation offer on a live session is answered without leaving
    /// its current state.
    pub async fn accept_offer(
        &mut self,
        offer: SessionDescription,
        media: &LocalMedia,
    ) -> Result<SessionDescription, SessionError> {
        if self.state.is_closed() {
            return Err(self.invalid("answer an offer"));
        }

        self.attach_local_media(media).await?;
        self.apply_remote_description(offer).await?;
        let answer = self.connection.create_answer().await?;

        if self.state == NegotiationState::Idle {
            self.state = NegotiationState::Negotiating;
        }
        Ok(answer)
    }

    /// Initiator side: apply the responder's answer.
    pub async fn accept_answer(&mut self, answer: SessionDescription) -> Result<(), SessionError> {
        if self.state != NegotiationState::Negotiating {
            return Err(self.invalid("apply an answer"));
        }
        self.apply_remote_description(answer).await
    }

    /// Applies a remote candidate now, or queues it until the remote
    /// description is known.
    pub async fn add_candidate(&mut self, candidate: IceCandidate) {
        if self.state.is_closed() {
            return;
        }

        if !self.has_remote_description {
            debug!(
                "Queueing candidate for {} until remote description is set",
                self.connection_id
            );
            self.pending_candidates.push_back(candidate);
            return;
        }

        self.apply_candidate(candidate).await;
    }

    /// Marks the transport as connected. Returns `false` if the session was
    /// not negotiating.
    pub fn mark_connected(&mut self) -> bool {
        if !self.state.can_transition_to(NegotiationState::Connected) {
            return false;
        }
        self.state = NegotiationState::Connected;
        true
    }

    /// Replaces any previously attached remote stream.
    pub fn attach_stream(&mut self, stream: RemoteStream) {
        self.remote_stream = Some(stream);
    }

    /// Releases the transport. Safe to call repeatedly.
    pub async fn close(&mut self) {
        if self.state.is_closed() {
            return;
        }

        self.state = NegotiationState::Closed;
        self.pending_candidates.clear();
        self.remote_stream = None;

        if let Err(e) = self.connection.close().await {
            warn!("Failed to close transport for {}: {}", self.connection_id, e);
        }
    }

    async fn attach_local_media(&mut self, media: &LocalMedia) -> Result<(), SessionError> {
        if self.local_media_attached {
            return Ok(());
        }
        self.connection.add_local_media(media).await?;
        self.local_media_attached = true;
        Ok(())
    }

    async fn apply_remote_description(
        &mut self,
        description: SessionDescription,
    ) -> Result<(), SessionError> {
        self.connection.set_remote_description(description).await?;
        self.has_remote_description = true;

        while let Some(candidate) = self.pending_candidates.pop_front() {
            self.apply_candidate(candidate).await;
        }
        Ok(())
    }

    // A rejected candidate costs one path, not the session.
    async fn apply_candidate(&self, candidate: IceCandidate) {
        if let Err(e) = self.connection.add_ice_candidate(candidate).await {
            warn!("Failed to add candidate from {}: {}", self.connection_id, e);
        }
    }

    fn ensure(&self, next: NegotiationState, action: &'static str) -> Result<(), SessionError> {
        if self.state.can_transition_to(next) {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidState {
            state: self.state,
            action,
        }
    }
}
