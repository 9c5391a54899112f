use adieu_client::{
    LocalMedia, MediaConnection, MediaConnectionFactory, RemoteStream, TransportEvent,
    TransportState,
};
use adieu_core::{ConnectionId, IceCandidate, IceServerConfig, SdpKind, SessionDescription};
use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

/// Calls a session made on its transport, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    AddMedia,
    CreateOffer,
    CreateAnswer,
    SetRemote(SdpKind),
    AddCandidate(String),
    Close,
}

/// Test-side view of one mock transport.
#[derive(Clone)]
pub struct TransportSpy {
    pub remote: ConnectionId,
    calls: Arc<Mutex<Vec<TransportCall>>>,
    events: mpsc::UnboundedSender<TransportEvent>,
}

impl TransportSpy {
    pub async fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().await.clone()
    }

    pub async fn was_closed(&self) -> bool {
        self.calls.lock().await.contains(&TransportCall::Close)
    }

    /// Pretend the transport reported `state`.
    pub fn report(&self, state: TransportState) {
        let _ = self.events.send(TransportEvent::StateChanged(state));
    }

    pub fn deliver_track(&self, stream: RemoteStream) {
        let _ = self.events.send(TransportEvent::Track(stream));
    }

    /// Wait until the transport has seen `call`.
    pub async fn wait_for_call(&self, call: &TransportCall, timeout_ms: u64) -> bool {
        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(timeout_ms);

        loop {
            if self.calls.lock().await.contains(call) {
                return true;
            }
            if start.elapsed() > timeout {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

struct MockConnection {
    spy: TransportSpy,
    auto_connect: bool,
    reject_remote: bool,
    hang_remote: bool,
}

impl MockConnection {
    async fn record(&self, call: TransportCall) {
        self.spy.calls.lock().await.push(call);
    }
}

#[async_trait]
impl MediaConnection for MockConnection {
    async fn add_local_media(&self, _media: &LocalMedia) -> Result<()> {
        self.record(TransportCall::AddMedia).await;
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription> {
        self.record(TransportCall::CreateOffer).await;
        // Gathering starts with the local description.
        let _ = self
            .spy
            .events
            .send(TransportEvent::CandidateGenerated(IceCandidate::new("candidate:offerer")));
        Ok(SessionDescription::offer(format!("v=0 offer-to-{}", self.spy.remote)))
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        self.record(TransportCall::CreateAnswer).await;
        Ok(SessionDescription::answer(format!("v=0 answer-to-{}", self.spy.remote)))
    }

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()> {
        self.record(TransportCall::SetRemote(description.kind)).await;
        if self.hang_remote {
            std::future::pending::<()>().await;
        }
        if self.reject_remote {
            bail!("malformed session description");
        }
        if self.auto_connect {
            self.spy.report(TransportState::Connected);
        }
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        self.record(TransportCall::AddCandidate(candidate.candidate)).await;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.record(TransportCall::Close).await;
        Ok(())
    }
}

/// Hands out mock transports and keeps a spy for each.
///
/// With `auto_connect` a transport reports `Connected` as soon as its
/// remote description is set.
#[derive(Clone)]
pub struct MockConnectionFactory {
    spies: Arc<Mutex<Vec<TransportSpy>>>,
    rejected: Arc<Mutex<HashSet<ConnectionId>>>,
    auto_connect: bool,
    hang_remote: bool,
    fail: bool,
}

impl MockConnectionFactory {
    pub fn new() -> Self {
        Self {
            spies: Arc::new(Mutex::new(Vec::new())),
            rejected: Arc::new(Mutex::new(HashSet::new())),
            auto_connect: true,
            hang_remote: false,
            fail: false,
        }
    }

    /// Transports that never connect on their own.
    pub fn stalled() -> Self {
        Self {
            auto_connect: false,
            ..Self::new()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Transports whose remote description call never returns.
    pub fn hanging() -> Self {
        Self {
            hang_remote: true,
            ..Self::new()
        }
    }

    /// Transports created for `remote` from now on refuse every remote
    /// description.
    pub async fn reject_remote_description(&self, remote: ConnectionId) {
        self.rejected.lock().await.insert(remote);
    }

    pub async fn created(&self) -> usize {
        self.spies.lock().await.len()
    }

    pub async fn transports_for(&self, remote: ConnectionId) -> Vec<TransportSpy> {
        self.spies
            .lock()
            .await
            .iter()
            .filter(|p| p.remote == remote)
            .cloned()
            .collect()
    }

    /// Wait for the first transport created for `remote`.
    pub async fn wait_for_transport(&self, remote: ConnectionId, timeout_ms: u64) -> Option<TransportSpy> {
        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(timeout_ms);

        loop {
            if let Some(spy) = self.transports_for(remote).await.into_iter().next() {
                return Some(spy);
            }
            if start.elapsed() > timeout {
                return None;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

#[async_trait]
impl MediaConnectionFactory for MockConnectionFactory {
    async fn create(
        &self,
        remote: ConnectionId,
        _ice_servers: &[IceServerConfig],
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> Result<Box<dyn MediaConnection>> {
        if self.fail {
            bail!("transport unavailable");
        }

        let spy = TransportSpy {
            remote,
            calls: Arc::new(Mutex::new(Vec::new())),
            events,
        };
        self.spies.lock().await.push(spy.clone());

        let reject_remote = self.rejected.lock().await.contains(&remote);

        Ok(Box::new(MockConnection {
            spy,
            auto_connect: self.auto_connect,
            reject_remote,
            hang_remote: self.hang_remote,
        }))
    }
}
