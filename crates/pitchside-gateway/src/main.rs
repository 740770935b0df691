use clap::Parser;
use pitchside_core::config::PitchsideConfig;
use pitchside_gateway::app;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::info;

/// Live match-event broadcast gateway.
#[derive(Debug, Parser)]
#[command(name = "pitchside-gateway", version)]
struct Cli {
    /// Path to pitchside.toml (falls back to PITCHSIDE_CONFIG, then ~/.pitchside/pitchside.toml).
    #[arg(long)]
    config: Option<String>,
    /// Override gateway.bind.
    #[arg(long)]
    bind: Option<String>,
    /// Override gateway.port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pitchside_gateway=info,pitchside_hub=info,tower_http=debug".into()
            }),
        )
        .init();

    let cli = Cli::parse();

    // load config: --config > PITCHSIDE_CONFIG env > ~/.pitchside/pitchside.toml
    let config_path = cli.config.or_else(|| std::env::var("PITCHSIDE_CONFIG").ok());
    let mut config = PitchsideConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!(code = e.code(), "Config load failed ({}), using defaults", e);
        PitchsideConfig::default()
    });
    if let Some(bind) = cli.bind {
        config.gateway.bind = bind;
    }
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }

    let addr = listen_addr(&config.gateway.bind, config.gateway.port)?;
    info!(
        outbound_buffer = config.hub.outbound_buffer,
        heartbeat_secs = config.hub.heartbeat_secs,
        "hub configured"
    );

    let state = Arc::new(app::AppState::new(config));
    let router = app::build_router(state);

    info!("Pitchside gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Pitchside gateway stopped");
    Ok(())
}

/// Accepts IPv4 and bare IPv6 bind addresses (`::1`, not `[::1]`).
fn listen_addr(bind: &str, port: u16) -> anyhow::Result<SocketAddr> {
    let ip: IpAddr = bind
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid gateway.bind {:?}: {}", bind, e))?;
    Ok(SocketAddr::new(ip, port))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
