//! Bounded call to the quotation server.
//!
//! The whole exchange (connect, headers and body) is raced against the client
//! deadline; only the bid of the requested pair is decoded from the body.
use std::time::{Duration, Instant};

use log::debug;
use quotation_common::quotation::extract_bid;
use quotation_common::{CurrencyPair, QuotationError, Result};
use reqwest::Client;

/// Fetches the current bid for a pair from the quotation server.
pub struct BidFetcher {
    client: Client,
    url: String,
    pair: CurrencyPair,
}

impl BidFetcher {
    /// Creates a fetcher for `pair` against the endpoint at `url`.
    pub fn new(url: &str, pair: CurrencyPair) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
            pair,
        }
    }

    /// Ask the server for a quotation and return its bid, giving up after `deadline`.
    pub async fn fetch_bid(&self, deadline: Duration) -> Result<String> {
        let started = Instant::now();
        debug!("GET {} (deadline {:?})", self.url, deadline);

        let body = match tokio::time::timeout(deadline, self.get_body()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(QuotationError::ClientTimeout {
                    url: self.url.clone(),
                    elapsed: started.elapsed(),
                    deadline,
                });
            }
        };

        extract_bid(&body, &self.pair).map_err(|source| QuotationError::ClientMalformedResponse {
            url: self.url.clone(),
            source,
        })
    }

    async fn get_body(&self) -> Result<Vec<u8>> {
        let unavailable = |reason: String| QuotationError::ClientUnavailable {
            url: self.url.clone(),
            reason,
        };

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| unavailable(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let reason = match response.text().await {
                Ok(detail) => format!("server answered {}: {}", status, detail),
                Err(e) => format!("server answered {} (reading body failed: {})", status, e),
            };
            return Err(unavailable(reason));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| unavailable(format!("reading body failed: {}", e)))?;
        Ok(body.to_vec())
    }
}
