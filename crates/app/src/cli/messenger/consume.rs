use std::{sync::Arc, time::Duration};

use clap::Args;
use orderly_app::{
    database::{self, Db},
    domain::orders::PgOrdersService,
    messaging::{MessengerSettings, OrderMessageHandler, PgTransport, Worker},
};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Args)]
pub(crate) struct ConsumeArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Stop after this many messages
    #[arg(long)]
    limit: Option<u64>,

    /// Stop after this many seconds
    #[arg(long, value_name = "SECS")]
    time_limit: Option<u64>,

    #[command(flatten)]
    messenger: MessengerSettings,
}

pub(crate) async fn run(args: ConsumeArgs) -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();

    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let orders = PgOrdersService::new(Db::new(pool.clone()));

    let mut options = args.messenger.worker_options();
    options.limit = args.limit;
    options.time_limit = args.time_limit.map(Duration::from_secs);

    let worker = Worker::new(
        PgTransport::new(pool),
        Arc::new(OrderMessageHandler::new(Arc::new(orders))),
        args.messenger.retry_strategy(),
        options,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "failed to listen for ctrl-c");
            return;
        }

        info!("stopping worker after the current message");
        request_stop(&shutdown_tx);
    });

    let stats = worker.run(shutdown_rx).await;

    println!(
        "handled: {}, retried: {}, failed: {}, rejected: {}",
        stats.handled, stats.retried, stats.failed, stats.rejected
    );

    Ok(())
}

/// Ask the worker to stop; returns whether it was still listening.
fn request_stop(shutdown: &watch::Sender<bool>) -> bool {
    if shutdown.send(true).is_err() {
        debug!("worker already finished, nothing to stop");

        return false;
    }

    true
}
