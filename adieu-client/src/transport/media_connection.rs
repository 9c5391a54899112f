use crate::media::LocalMedia;
use crate::transport::TransportEvent;
use adieu_core::{ConnectionId, IceCandidate, IceServerConfig, SessionDescription};
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// One media transport to one remote peer.
///
/// Implementations report candidates, connectivity and remote tracks through
/// the event channel handed to [`MediaConnectionFactory::create`].
#[async_trait]
pub trait MediaConnection: Send + Sync {
    /// Attaches every local track so the remote peer receives our media.
    async fn add_local_media(&self, media: &LocalMedia) -> Result<()>;

    /// Creates an offer and installs it as the local description.
    async fn create_offer(&self) -> Result<SessionDescription>;

    /// Creates an answer and installs it as the local description.
    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait MediaConnectionFactory: Send + Sync {
    async fn create(
        &self,
        remote: ConnectionId,
        ice_servers: &[IceServerConfig],
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> Result<Box<dyn MediaConnection>>;
}
