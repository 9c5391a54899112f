use crate::error::ClientError;
use crate::signaling::SignalingSink;
use adieu_core::{ClientMessage, ServerMessage};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// WebSocket connection to the relay.
///
/// Frames are written and read on two background tasks. The inbound
/// receiver returned by [`WsSignaling::connect`] ends when the relay
/// connection is lost. Dropping every `WsSignaling` closes the socket.
#[derive(Debug, Clone)]
pub struct WsSignaling {
    outbound: mpsc::UnboundedSender<ClientMessage>,
}

impl WsSignaling {
    pub async fn connect(
        url: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ServerMessage>), ClientError> {
        let (ws, _) = connect_async(url)
            .await
            .map_err(|e| ClientError::Connect {
                url: url.to_owned(),
                source: Box::new(e),
            })?;
        info!("Connected to relay at {}", url);

        let (mut sink, mut stream) = ws.split();
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<ClientMessage>();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                let json = match serde_json::to_string(&message) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("Failed to encode {:?}: {}", message, e);
                        continue;
                    }
                };
                if sink.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
            debug!("Relay writer stopped");
        });

        tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => match serde_json::from_str::<ServerMessage>(&text) {
                        Ok(message) => {
                            if inbound_tx.send(message).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid ServerMessage from relay: {}", e),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Relay connection error: {}", e);
                        break;
                    }
                }
            }
            info!("Relay connection closed");
        });

        Ok((Self { outbound }, inbound_rx))
    }
}

impl SignalingSink for WsSignaling {
    fn send(&self, message: ClientMessage) -> bool {
        self.outbound.send(message).is_ok()
    }
}
