use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::relay::RelayHandle;
use crate::signaling::{SignalingService, ws_handler};
use adieu_core::IceServerConfig;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub signaling: SignalingService,
    pub relay: RelayHandle,
}

impl AppState {
    /// Creates the socket registry and starts the relay loop behind it.
    pub fn new(config: &RelayConfig) -> Self {
        let signaling = SignalingService::new(config.ice_servers.clone());
        let (relay, _task) = RelayHandle::spawn(Arc::new(signaling.clone()), config.command_capacity);

        Self { signaling, relay }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(banner))
        .route("/ice-servers", get(ice_servers))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(state)
}

async fn banner() -> &'static str {
    "Adieu relay"
}

async fn ice_servers(State(state): State<AppState>) -> Json<Vec<IceServerConfig>> {
    Json(state.signaling.ice_servers())
}

/// A bound, not yet serving relay.
pub struct RelayServer {
    listener: TcpListener,
    state: AppState,
}

impl RelayServer {
    pub async fn bind(config: RelayConfig) -> Result<Self, RelayError> {
        let listener = TcpListener::bind(config.bind)
            .await
            .map_err(|source| RelayError::Bind {
                addr: config.bind,
                source,
            })?;

        Ok(Self {
            listener,
            state: AppState::new(&config),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, RelayError> {
        self.listener.local_addr().map_err(RelayError::Serve)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn serve(self) -> Result<(), RelayError> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<(), RelayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        info!("Signaling relay listening on http://{}", addr);

        axum::serve(self.listener, router(self.state))
            .with_graceful_shutdown(signal)
            .await
            .map_err(RelayError::Serve)?;

        info!("Signaling relay on {} stopped", addr);
        Ok(())
    }
}
