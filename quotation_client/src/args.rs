//! Command-line arguments for the Quotation Client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use quotation_common::CurrencyPair;
use quotation_common::net::{CLIENT_TIMEOUT, default_server_url};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Quotation endpoint of the server.
    #[clap(long, default_value_t = default_server_url())]
    pub server_url: String,

    /// File the bid is written to; overwritten on every successful run.
    #[clap(long, default_value = "cotacao.txt")]
    pub output: PathBuf,

    /// Currency pair whose bid is extracted, as BASE-QUOTE.
    #[clap(long, default_value = "USD-BRL")]
    pub pair: CurrencyPair,

    /// Deadline for the whole server call, in milliseconds.
    #[clap(long, default_value_t = CLIENT_TIMEOUT.as_millis() as u64)]
    pub timeout_ms: u64,
}

impl Args {
    /// Configured call deadline.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
