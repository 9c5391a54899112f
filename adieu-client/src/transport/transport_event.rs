use crate::media::RemoteStream;
use adieu_core::IceCandidate;

/// Connectivity as reported by the media transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl TransportState {
    /// States after which the session cannot recover.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TransportState::Disconnected | TransportState::Failed | TransportState::Closed
        )
    }
}

/// Events the transport pushes into the owning session task.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A local ICE candidate to trickle to the remote peer.
    CandidateGenerated(IceCandidate),
    StateChanged(TransportState),
    /// The remote peer's media arrived.
    Track(RemoteStream),
}
