use anyhow::Context;
use clap::Parser;
use pbcloud_core::{AuthClient, CloudClient};
use pbcsync::config::{Cli, Command, SyncArgs, SyncConfig};
use pbcsync::daemon::Daemon;
use pbcsync::logging::init_tracing;
use pbcsync::repository::BooksRepository;
use pbcsync::sync::{HttpDownloader, SyncEngine, Synchronizer};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    match cli.command {
        Command::Version => println!("version: {}", env!("CARGO_PKG_VERSION")),
        Command::Sync(args) => {
            init_tracing(args.debug);
            if let Err(err) = run_sync(args).await {
                error!("{err:#}");
                std::process::exit(1);
            }
        }
    }
}

async fn run_sync(args: SyncArgs) -> anyhow::Result<()> {
    let config = args.validate().context("validate")?;
    debug!("debug enabled");

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let synchronizer = build_synchronizer(&config)?;
    info!(dir = %config.dir.display(), "syncing books");
    synchronizer.sync(&cancel).await.context("run")
}

fn build_synchronizer(config: &SyncConfig) -> anyhow::Result<Box<dyn Synchronizer>> {
    let auth = AuthClient::new(config.client_id.as_str(), config.client_secret.as_str())
        .context("failed to build auth client")?;
    let cloud = CloudClient::new().context("failed to build cloud client")?;
    let repository = BooksRepository::new(
        auth,
        cloud,
        config.username.as_str(),
        config.password.as_str(),
    );
    let engine = SyncEngine::new(repository, HttpDownloader::new(), config.dir.clone());

    Ok(match config.daemon {
        Some(daemon) => {
            debug!(interval = ?daemon.interval(), "starting daemon mode");
            Box::new(Daemon::new(daemon, engine))
        }
        None => Box::new(engine),
    })
}

#[cfg(unix)]
async fn cancel_on_signal(cancel: CancellationToken) {
    use tokio::signal::unix::{SignalKind, signal};

    let kinds = [
        SignalKind::interrupt(),
        SignalKind::terminate(),
        SignalKind::hangup(),
        SignalKind::quit(),
    ];
    let mut streams = Vec::with_capacity(kinds.len());
    for kind in kinds {
        match signal(kind) {
            Ok(stream) => streams.push(stream),
            Err(err) => error!(error = %err, "failed to install signal handler"),
        }
    }
    if streams.is_empty() {
        return;
    }
    let waits = streams.iter_mut().map(|stream| Box::pin(stream.recv()));
    futures_util::future::select_all(waits).await;
    debug!("shutdown signal received");
    cancel.cancel();
}

#[cfg(not(unix))]
async fn cancel_on_signal(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        debug!("shutdown signal received");
        cancel.cancel();
    }
}
