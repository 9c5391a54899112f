use adieu_core::ClientMessage;
use tokio::sync::mpsc;

/// Outbound half of the relay connection.
///
/// Sending never blocks; `false` means the relay connection is gone.
pub trait SignalingSink: Send + Sync {
    fn send(&self, message: ClientMessage) -> bool;
}

impl SignalingSink for mpsc::UnboundedSender<ClientMessage> {
    fn send(&self, message: ClientMessage) -> bool {
        mpsc::UnboundedSender::send(self, message).is_ok()
    }
}
