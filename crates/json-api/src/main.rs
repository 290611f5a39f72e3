//! Orderly JSON API Server

use std::{process, sync::Arc};

use salvo::{
    affix_state::inject, oapi::OpenApi, oapi::swagger_ui::SwaggerUi, prelude::*,
    trailing_slash::remove_slash,
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{error, info};

use orderly_app::{
    context::AppContext,
    database::Db,
    messaging::{OrderMessageHandler, PgTransport, Worker, WorkerStats},
};

use crate::{config::ServerConfig, observability::Observability, state::State};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod config;
mod errors;
mod extensions;
mod healthcheck;
mod observability;
mod orders;
mod router;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;

/// Orderly JSON API Server entry point
#[tokio::main]
pub async fn main() {
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    let observability = Observability::init(&config).unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "the subscriber failed to install, so there is nowhere else to report"
        )]
        {
            eprintln!("Observability error: {e}");
        }

        process::exit(1);
    });

    let db = match Db::init(&config.database.options()).await {
        Ok(db) => db,
        Err(init_error) => {
            error!("failed to initialize database: {init_error}");

            process::exit(1);
        }
    };

    let app = AppContext::from_db(&db, &config.messenger.settings.queue);

    let (stop_worker, worker_stopped) = watch::channel(false);

    let worker = config.messenger.embedded_worker.then(|| {
        spawn_worker(
            &config,
            PgTransport::new(db.pool().clone()),
            &app,
            worker_stopped,
        )
    });

    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(observability::request_logging)
        .hoop(remove_slash())
        .hoop(inject(State::from_app_context(app)))
        .push(router::ops_router())
        .push(router::api_router());

    let doc = OpenApi::new("Orderly API", env!("CARGO_PKG_VERSION")).merge_router(&router);

    let router = router
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    let addr = config.socket_addr();

    info!("Starting server on {addr}");

    let listener = TcpListener::new(addr).bind().await;

    let server = Server::new(listener);

    let handle = server.handle();

    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle, stop_worker).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    server.serve(router).await;

    if let Some(worker) = worker {
        match worker.await {
            Ok(stats) => info!(
                handled = stats.handled,
                retried = stats.retried,
                failed = stats.failed,
                rejected = stats.rejected,
                "embedded worker finished"
            ),
            Err(join_error) => error!("embedded worker panicked: {join_error}"),
        }
    }

    observability.shutdown();
}

fn spawn_worker(
    config: &ServerConfig,
    transport: PgTransport,
    app: &AppContext,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<WorkerStats> {
    let settings = &config.messenger.settings;

    let worker = Worker::new(
        transport,
        Arc::new(OrderMessageHandler::new(app.orders.clone())),
        settings.retry_strategy(),
        settings.worker_options(),
    )
    .with_observer(Arc::new(observability::observe_message));

    tokio::spawn(async move { worker.run(shutdown).await })
}
