use std::sync::Arc;

use chrono_tz::Tz;
use interclub_app::{
    Application, build_application,
    domain::{
        fixture::FixtureRepository,
        selection::{ScratchNoticeRepository, SelectionRepository},
    },
    memory::MemoryStore,
    ports::{directory::PlayerDirectoryPort, season::SeasonConfigurationPort},
};
use interclub_persistence_sqlite::SqliteStore;
use log::info;

use crate::config::Config;

mod config;
mod logs;

fn application_on<S>(store: Arc<S>, time_zone: Tz) -> Application
where
    S: SeasonConfigurationPort
        + PlayerDirectoryPort
        + FixtureRepository
        + SelectionRepository
        + ScratchNoticeRepository
        + Send
        + Sync
        + 'static,
{
    build_application(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store,
        time_zone,
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received. Preparing graceful exit...");
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = Config::from_env().expect("Invalid configuration");
    logs::init_logger(config.log_file.as_ref());

    let app = match &config.db_path {
        Some(db_path) => {
            let store = SqliteStore::new(db_path);
            store
                .migrate()
                .await
                .expect("Failed to prepare the SQLite schema");
            info!("Using SQLite database at {}", db_path);
            application_on(Arc::new(store), config.time_zone)
        }
        None => {
            log::warn!("INTERCLUB_DB is not set, keeping all data in memory");
            application_on(Arc::new(MemoryStore::new()), config.time_zone)
        }
    };

    info!("Starting application");

    if let Err(e) =
        interclub_http_api::run(Arc::new(app), config.http_port, shutdown_signal()).await
    {
        log::error!("HTTP API failed: {}", e);
    }
}
