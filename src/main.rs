use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use claimbot::cli::Args;
use claimbot::notify::{Notify, WebhookNotifier};
use claimbot::scheduler::CycleScheduler;
use claimbot::site::{Credentials, PacketShare};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("claimbot=info")),
        )
        .init();

    let Args {
        email,
        password,
        notify_url,
        webdriver_url,
        headless,
    } = Args::parse();

    let client = PacketShare::new(Credentials { email, password }, headless, webdriver_url);
    let notifier: Arc<dyn Notify> = Arc::new(WebhookNotifier::new(notify_url));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_shutdown().await;
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    info!("starting claim bot");
    CycleScheduler::new(client, notifier).run(shutdown_rx).await;
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown() {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(_) => {
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}
