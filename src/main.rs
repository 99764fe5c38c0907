// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use asset_ledger_server::{
    api::router,
    config::{AppConfig, LogFormat, DEFAULT_LOG_FILTER},
    ledger::{AssetLedger, InvocationContext},
    state::AppState,
    storage::{MemoryWorldState, RedbWorldState, StateStore},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env();
    init_tracing(config.log_format);

    let store: Arc<dyn StateStore> = match config.world_state_path() {
        Some(path) => {
            info!(path = %path.display(), "Opening redb world state");
            Arc::new(RedbWorldState::open(&path).expect("Failed to open world state database"))
        }
        None => {
            warn!("DATA_DIR not set, world state is kept in memory");
            Arc::new(MemoryWorldState::new())
        }
    };
    let ledger = AssetLedger::new(store);

    if config.seed_ledger {
        let ctx = InvocationContext::system();
        match ledger.is_empty(&ctx) {
            Ok(true) => match ledger.init_ledger(&ctx) {
                Ok(seeded) => info!(seeded, "Seeded empty ledger"),
                Err(err) => warn!(error = %err, "Failed to seed ledger"),
            },
            Ok(false) => info!("Ledger already holds assets, skipping seed"),
            Err(err) => warn!(error = %err, "Failed to inspect ledger before seeding"),
        }
    }

    let app = router(AppState::new(ledger));

    let addr = config.bind_addr().expect("Failed to parse bind address");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    info!(%addr, "Asset ledger server listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
