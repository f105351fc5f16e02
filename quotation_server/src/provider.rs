//! Upstream quotation provider.
//!
//! `UpstreamProvider` performs one GET against the upstream API per call and
//! races the whole exchange (connect, headers and body) against the fetch
//! deadline. When the deadline fires the in-flight future is dropped, which
//! closes the underlying connection.
use std::time::{Duration, Instant};

use bytes::Bytes;
use log::debug;
use quotation_common::net::upstream_url;
use quotation_common::{CanonicalQuotation, CurrencyPair, QuotationError, Result};
use reqwest::Client;

/// Result of a successful fetch: the untouched body and the record decoded from it.
#[derive(Debug, Clone)]
pub struct FetchedQuotation {
    /// Raw upstream body, passed through to callers as-is.
    pub body: Bytes,
    /// Decoded record.
    pub quotation: CanonicalQuotation,
}

/// HTTP adapter for the upstream quotation API.
#[derive(Debug, Clone)]
pub struct UpstreamProvider {
    client: Client,
    url: String,
    pair: CurrencyPair,
}

impl UpstreamProvider {
    /// Creates a provider for `pair` against the API rooted at `base_url`.
    pub fn new(base_url: &str, pair: CurrencyPair) -> Self {
        Self {
            client: Client::new(),
            url: upstream_url(base_url, &pair),
            pair,
        }
    }

    /// Requested URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and decode one quotation, giving up after `deadline`.
    pub async fn fetch(&self, deadline: Duration) -> Result<FetchedQuotation> {
        let started = Instant::now();
        debug!("GET {} (deadline {:?})", self.url, deadline);

        let body = match tokio::time::timeout(deadline, self.get_body(deadline, started)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(QuotationError::UpstreamTimeout {
                    url: self.url.clone(),
                    elapsed: started.elapsed(),
                    deadline,
                });
            }
        };

        let quotation = CanonicalQuotation::from_upstream(&body, &self.pair).map_err(|source| {
            QuotationError::UpstreamMalformedResponse {
                url: self.url.clone(),
                source,
            }
        })?;

        debug!(
            "Fetched {} bid={} in {:?}",
            self.pair,
            quotation.bid,
            started.elapsed()
        );
        Ok(FetchedQuotation { body, quotation })
    }

    async fn get_body(&self, deadline: Duration, started: Instant) -> Result<Bytes> {
        let unavailable = |reason: String| QuotationError::UpstreamUnavailable {
            url: self.url.clone(),
            elapsed: started.elapsed(),
            deadline,
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
            return Err(unavailable(format!("upstream answered {}", status)));
        }

        response
            .bytes()
            .await
            .map_err(|e| unavailable(format!("reading body failed: {}", e)))
    }
}
