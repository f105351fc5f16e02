//! Quotation Client — asks the quotation server for the current exchange rate
//! and writes the bid to a local text file.
//!
//! Usage example (CLI):
//! ```bash
//! quotation_client --server-url http://localhost:8080/cotacao --output ./cotacao.txt
//! ```
//!
//! The run is one-shot. The artifact is only written after a successful call,
//! so a timeout or a bad response leaves any previous file untouched. Any
//! failure is logged and the process exits with a non-zero status.
#![warn(missing_docs)]
mod args;
mod artifact;
mod fetcher;

use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use quotation_common::Result;

use crate::args::Args;
use crate::artifact::write_artifact;
use crate::fetcher::BidFetcher;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logger();
    let args = Args::parse();

    match run(&args).await {
        Ok(bid) => {
            info!("{} bid {} saved to {}", args.pair, bid, args.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{} failed: {}", e.operation(), e);
            ExitCode::FAILURE
        }
    }
}

/// Fetch the bid and write the artifact. Returns the bid that was written.
async fn run(args: &Args) -> Result<String> {
    info!("Requesting {} quotation from {}", args.pair, args.server_url);
    let fetcher = BidFetcher::new(&args.server_url, args.pair);
    let bid = fetcher.fetch_bid(args.timeout()).await?;
    write_artifact(&args.output, &bid)?;
    Ok(bid)
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
