//! Quotation HTTP server.
//!
//! Serves `GET /cotacao` by proxying the upstream exchange-rate API. Each
//! request goes through three stages, each with its own log line:
//!
//! - fetch — one upstream GET bounded by the fetch deadline (200ms by default).
//!   Failure ends the request with a 5xx status.
//! - persist — one insert into the SQLite store bounded by its own, tighter
//!   deadline (10ms by default). Failure is logged and otherwise ignored.
//! - respond — the upstream body is returned untouched with status 200.
//!
//! Startup creates the database file and schema before the listener is bound,
//! so no request is served against a missing table. Requests are independent:
//! an error in one never reaches another, and the process only exits on
//! startup failure or Ctrl+C.
#![warn(missing_docs)]
use std::sync::Arc;

use clap::Parser;
use log::{error, info};
use quotation_common::net::{QUOTATION_PATH, addr};
use quotation_common::Result;
use tokio::net::TcpListener;

use crate::args::Args;
use crate::provider::UpstreamProvider;
use crate::routes::app_router;
use crate::service::QuotationService;
use crate::store::QuotationStore;

mod args;
mod provider;
mod routes;
mod service;
mod store;
#[cfg(test)]
mod test_support;

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();

    let store = QuotationStore::open(&args.db_path).inspect_err(|e| error!("{}", e))?;
    store.ensure_schema().inspect_err(|e| error!("{}", e))?;
    info!("Database ready at {}", store.path().display());

    let provider = UpstreamProvider::new(&args.upstream_url, args.pair);
    let service = QuotationService::new(provider, store, args.deadlines());

    let listener = TcpListener::bind(addr("0.0.0.0", args.port)).await?;
    info!(
        "Serving {} quotations on http://{}{}",
        args.pair,
        listener.local_addr()?,
        QUOTATION_PATH
    );
    axum::serve(listener, app_router(Arc::new(service)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Ctrl+C received. Shutting down server...");
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
