//! Command-line arguments for the Quotation Server.
//!
//! Every flag defaults to the fixed production value, so the
//! binary runs as-is; flags exist for pointing it at a stub upstream or a
//! scratch database.
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use quotation_common::CurrencyPair;
use quotation_common::net::{
    PERSIST_TIMEOUT, SERVER_PORT, UPSTREAM_BASE_URL, UPSTREAM_FETCH_TIMEOUT,
};

use crate::service::Deadlines;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// HTTP port to listen on.
    #[clap(long, default_value_t = SERVER_PORT)]
    pub port: u16,

    /// SQLite database file; created on first run.
    #[clap(long, default_value = "./quotations.db")]
    pub db_path: PathBuf,

    /// Base URL of the upstream quotation API.
    #[clap(long, default_value = UPSTREAM_BASE_URL)]
    pub upstream_url: String,

    /// Currency pair to quote, as BASE-QUOTE.
    #[clap(long, default_value = "USD-BRL")]
    pub pair: CurrencyPair,

    /// Deadline for the upstream call, in milliseconds.
    #[clap(long, default_value_t = UPSTREAM_FETCH_TIMEOUT.as_millis() as u64)]
    pub fetch_timeout_ms: u64,

    /// Deadline for storing one quotation, in milliseconds.
    #[clap(long, default_value_t = PERSIST_TIMEOUT.as_millis() as u64)]
    pub persist_timeout_ms: u64,
}

impl Args {
    /// Deadlines configured for each request.
    pub fn deadlines(&self) -> Deadlines {
        Deadlines {
            fetch: Duration::from_millis(self.fetch_timeout_ms),
            persist: Duration::from_millis(self.persist_timeout_ms),
        }
    }
}
