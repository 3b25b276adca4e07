use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use garment_api::config::{init_tracing, load_config};
use garment_api::db::{establish_connection, run_migrations};
use garment_api::handlers::AppServices;
use garment_api::{app, events, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("loading configuration")?;
    init_tracing(&config.log_level, config.log_json);
    info!(environment = %config.environment, "starting garment-api");

    let db = Arc::new(
        establish_connection(&config)
            .await
            .context("connecting to database")?,
    );
    if config.auto_migrate {
        run_migrations(&db).await.context("running migrations")?;
    }

    let (event_sender, event_receiver) = events::channel(256);
    tokio::spawn(events::process_events(event_receiver));

    let services = AppServices::new(db.clone(), event_sender);
    let bind_addr = config.bind_addr();
    let state = AppState::new(db, config, services);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    info!(addr = %bind_addr, "listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => tracing::error!(error = %err, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c"),
        _ = terminate => info!("received terminate signal"),
    }
}
