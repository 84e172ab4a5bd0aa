//! Proposal Relay - chat governance bridge
//!
//! Turns `proposal` commands posted in a guild channel into oracle tallies
//! of the message's reactions, and relays the tallied outcome to the DAO's
//! governance queue.
//!
//! LIFECYCLE: every accepted proposal runs in its own task:
//! - wait for the voting deadline
//! - submit a reaction-count request to the oracle network and await the tally
//! - report the tally to the DAO's queue and reply with the transaction
//! - wait out the grace period, then execute and reply with the explorer link

mod chain;
mod clock;
mod config;
mod dao;
mod error;
mod intake;
mod models;
mod oracle;
mod pipeline;
mod routes;
mod state;

use crate::config::Settings;
use crate::routes::create_router;
use crate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("🚀 Starting Proposal Relay...");

    let settings = Settings::load()?;
    info!(
        network = ?settings.network,
        monitors = settings.oracle.reaction_monitors.len(),
        "📋 Configuration loaded successfully"
    );

    let state = Arc::new(AppState::new(&settings)?);
    let app = create_router(state, &settings);

    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📚 API Endpoints:");
    info!("   ─── Setup ───");
    info!("   GET  /api/registry                     - List registered DAOs");
    info!("   POST /api/guilds/:guild_id/dao         - Connect a guild to a DAO");
    info!("   GET  /api/guilds/:guild_id/dao         - Show a guild's DAO");
    info!("");
    info!("   ─── Proposals ───");
    info!("   POST /api/proposals                    - Open a proposal");
    info!("   GET  /api/proposals                    - List proposals");
    info!("   GET  /api/proposals/:id                - Proposal lifecycle");
    info!("   GET  /api/proposals/:id/notifications  - Replies for a proposal");
    info!("");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,proposal_relay=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
