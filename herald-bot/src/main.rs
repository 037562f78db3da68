/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Herald bot.
//!
//! Connects to the gateway, answers every prefixed command with a fixed reply,
//! and closes the session cleanly on Ctrl-C.

mod config;

use anyhow::{Context, Result, bail};
use clap::Parser;
use config::{BotConfig, Cli};
use herald::engine::http::{self, DEFAULT_REQUEST_TIMEOUT};
use herald::engine::{ClientBuilder, ReplyCommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Initializes logging.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}

async fn watch_interrupt(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("interrupt received, closing session");
            shutdown.cancel();
        }
        Err(e) => warn!(error = %e, "failed to listen for interrupt"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = BotConfig::load(&cli)?;
    let session = config
        .session_config()
        .context("invalid session configuration")?;

    let reply = ReplyCommand::new(
        http::client(DEFAULT_REQUEST_TIMEOUT)?,
        config.api_base.clone(),
        session.credentials.clone(),
    )
    .with_reply(config.reply.clone());

    let mut builder = ClientBuilder::new(session)
        .with_api_base(config.api_base.clone())
        .with_gateway_version(config.gateway_version)
        .with_handler(reply);
    if let Some(addr) = &config.address {
        builder = builder.with_address(addr.clone());
    }

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_interrupt(shutdown.clone()));

    let report = builder
        .run(shutdown)
        .await
        .context("failed to start gateway session")?;
    info!(
        outcome = %report.outcome,
        heartbeats = report.heartbeats_sent,
        acks = report.heartbeat_acks,
        last_seq = ?report.session.last_sequence(),
        "bot stopped"
    );

    if report.outcome.is_connection_lost() {
        bail!("gateway session lost: {}", report.outcome);
    }
    Ok(())
}
