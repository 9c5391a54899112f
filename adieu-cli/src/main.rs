use adieu::model::IceServerConfig;
use adieu::server::{RelayConfig, RelayServer};
use adieu::utils::DEFAULT_STUN_ADDR;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "adieu", version, about = "Signaling relay for small video calls")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay.
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
struct ServeArgs {
    #[arg(long, env = "ADIEU_BIND", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    bind: IpAddr,

    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// STUN server announced to clients.
    #[arg(long, env = "ADIEU_STUN", default_value = DEFAULT_STUN_ADDR)]
    stun: String,

    /// Optional TURN relay announced alongside STUN.
    #[arg(long, env = "TURN_URL")]
    turn_url: Option<String>,

    #[arg(long, env = "TURN_USERNAME", requires = "turn_url")]
    turn_username: Option<String>,

    #[arg(long, env = "TURN_CREDENTIAL", requires = "turn_url")]
    turn_credential: Option<String>,

    /// Relay command queue size.
    #[arg(long, default_value_t = 1024)]
    queue: usize,
}

impl ServeArgs {
    fn relay_config(&self) -> RelayConfig {
        let mut ice_servers = vec![IceServerConfig::stun(self.stun.clone())];
        if let Some(url) = &self.turn_url {
            ice_servers.push(IceServerConfig {
                urls: vec![url.clone()],
                username: self.turn_username.clone(),
                credential: self.turn_credential.clone(),
            });
        }

        RelayConfig {
            bind: SocketAddr::new(self.bind, self.port),
            ice_servers,
            command_capacity: self.queue,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => serve(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let config = args.relay_config();

    println!("{}", "👋 Starting Adieu relay...".green().bold());
    for server in &config.ice_servers {
        println!("   🧊 ICE: {}", server.urls.join(", ").cyan());
    }

    let server = RelayServer::bind(config)
        .await
        .context("Failed to start relay")?;
    let addr = server.local_addr()?;
    println!("   🔌 WebSocket: {}", format!("ws://{}/ws", addr).cyan());

    server
        .serve_with_shutdown(shutdown_signal())
        .await
        .context("Relay stopped unexpectedly")?;

    println!("{}", "✨ Relay shut down cleanly".green().bold());
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Ctrl-C received, draining connections");
    }
}
