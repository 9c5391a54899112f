use crate::signaling::SignalingOutput;
use adieu_core::{ConnectionId, IceServerConfig, ServerMessage};
use axum::extract::ws::Message;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

struct SignalingInner {
    peers: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
    ice_servers: Vec<IceServerConfig>,
}

/// Registry of open sockets, keyed by connection id.
///
/// Each socket gets an unbounded outbox drained by its own writer task, so
/// queuing a frame never waits on the network.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
                ice_servers,
            }),
        }
    }

    pub fn ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    pub fn add_peer(&self, connection_id: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(connection_id, tx);
    }

    pub fn remove_peer(&self, connection_id: &ConnectionId) {
        self.inner.peers.remove(connection_id);
    }

    pub fn is_connected(&self, connection_id: &ConnectionId) -> bool {
        self.inner.peers.contains_key(connection_id)
    }

    pub fn connection_count(&self) -> usize {
        self.inner.peers.len()
    }
}

impl SignalingOutput for SignalingService {
    fn send(&self, connection_id: &ConnectionId, msg: ServerMessage) -> bool {
        let Some(peer) = self.inner.peers.get(connection_id) else {
            debug!("Dropping {} for disconnected peer {}", msg.op(), connection_id);
            return false;
        };

        match serde_json::to_string(&msg) {
            Ok(json) => {
                if let Err(e) = peer.send(Message::Text(json.into())) {
                    error!("Failed to queue WS message to {}: {:?}", connection_id, e);
                    return false;
                }
                true
            }
            Err(e) => {
                error!("Failed to serialize {}: {}", msg.op(), e);
                false
            }
        }
    }
}
