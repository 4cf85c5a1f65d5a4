mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use custody::{Custody, CustodyConfig};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::CliError;
use crate::output::Output;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Initialize tracing
    let filter = cli
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::WARN);

    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let _ = dotenvy::dotenv(); // load .env if present

    let mut config = match CustodyConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(2);
        }
    };
    if let Some(dir) = cli.state_dir {
        config.state_dir = dir;
    }

    let ctx = match Custody::new(config) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!(error = %e, "failed to initialise");
            std::process::exit(2);
        }
    };

    let cancel = setup_signal_handlers();
    let out = Output::new(cli.json);

    let result = commands::run(&ctx, cli.command, out, cancel).await;

    let notifications = ctx.ui.active();
    if let Err(e) = output::write_notifications(&mut std::io::stderr().lock(), &notifications) {
        tracing::debug!(error = %e, "failed to write notifications");
    }

    if let Err(e) = result {
        // Page controllers have already notified their own failures.
        if notifications.is_empty() {
            let message = match &e {
                CliError::Custody(err) => err.user_message(),
                other => other.to_string(),
            };
            eprintln!("error: {message}");
        }
        tracing::debug!(error = %e, "command failed");
        std::process::exit(1);
    }
}

/// Register SIGINT and SIGTERM handlers that trigger the returned token.
fn setup_signal_handlers() -> CancellationToken {
    let cancel = CancellationToken::new();

    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("received SIGINT, shutting down");
        cancel_clone.cancel();
    });

    #[cfg(unix)]
    {
        let cancel_clone = cancel.clone();
        tokio::spawn(async move {
            let mut sig = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to register SIGTERM handler");
            sig.recv().await;
            info!("received SIGTERM, shutting down");
            cancel_clone.cancel();
        });
    }

    cancel
}
