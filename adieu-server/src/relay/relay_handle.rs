use crate::error::RelayError;
use crate::relay::{Relay, RelayCommand, RoomSnapshot};
use crate::signaling::SignalingOutput;
use adieu_core::RoomId;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::info;

/// Cloneable entry point into the relay loop.
#[derive(Clone, Debug)]
pub struct RelayHandle {
    command_tx: mpsc::Sender<RelayCommand>,
}

impl RelayHandle {
    /// Starts a relay task. The task and its registry live until every handle
    /// is dropped.
    pub fn spawn(output: Arc<dyn SignalingOutput>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(capacity);
        let relay = Relay::new(command_rx, output);

        info!("Spawning relay (queue capacity {})", capacity);
        let task = tokio::spawn(relay.run());

        (Self { command_tx }, task)
    }

    pub async fn send(&self, cmd: RelayCommand) -> Result<(), RelayError> {
        self.command_tx
            .send(cmd)
            .await
            .map_err(|_| RelayError::RelayStopped)
    }

    pub async fn inspect(&self, room_id: &RoomId) -> Result<Option<RoomSnapshot>, RelayError> {
        let (reply, rx) = oneshot::channel();
        self.send(RelayCommand::Inspect {
            room_id: room_id.clone(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| RelayError::RelayStopped)
    }
}
