use crate::session::NegotiationState;
use adieu_core::RoomId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to reach relay at {url}")]
    Connect {
        url: String,
        #[source]
        source: Box<tokio_tungstenite::tungstenite::Error>,
    },

    #[error("local media unavailable: {0}")]
    MediaUnavailable(String),

    #[error("already in the call of room {0}")]
    AlreadyInCall(RoomId),

    #[error("client loop has stopped")]
    ClientStopped,
}

/// Failure of a single remote session. Never escapes that session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot {action} while {state:?}")]
    InvalidState {
        state: NegotiationState,
        action: &'static str,
    },

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl SessionError {
    /// Out-of-order signaling is tolerated; transport errors are not.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionError::Transport(_))
    }
}
