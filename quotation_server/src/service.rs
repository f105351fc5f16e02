//! Per-request orchestration: fetch, then persist, then hand the body back.
//!
//! The two deadlines are siblings. Persistence gets a fresh budget that starts
//! only after the fetch has completed, and its outcome is recorded on the reply
//! instead of deciding it: a failed write is logged and the caller still gets
//! the quotation.
use std::time::Duration;

use bytes::Bytes;
use log::{debug, error, info, warn};
use quotation_common::Result;

use crate::provider::UpstreamProvider;
use crate::store::QuotationStore;

/// Deadlines applied to each request.
#[derive(Debug, Clone, Copy)]
pub struct Deadlines {
    /// Bound on the upstream call.
    pub fetch: Duration,
    /// Bound on the database write.
    pub persist: Duration,
}

/// What one request produced.
#[derive(Debug)]
pub struct QuotationReply {
    /// Raw upstream body to send back.
    pub body: Bytes,
    /// Row id of the stored quotation, or why it was not stored.
    pub persisted: Result<i64>,
}

/// Wires the provider and the store together.
#[derive(Debug, Clone)]
pub struct QuotationService {
    provider: UpstreamProvider,
    store: QuotationStore,
    deadlines: Deadlines,
}

impl QuotationService {
    /// Creates a service over an already initialised store.
    pub fn new(provider: UpstreamProvider, store: QuotationStore, deadlines: Deadlines) -> Self {
        Self {
            provider,
            store,
            deadlines,
        }
    }

    /// Run one request through the fetch and persist stages.
    ///
    /// Only a fetch failure is returned as `Err`; there is nothing to answer with.
    pub async fn quote(&self) -> Result<QuotationReply> {
        debug!("Fetching from {}", self.provider.url());
        let fetched = self.provider.fetch(self.deadlines.fetch).await.inspect_err(|e| {
            error!("{} failed, aborting request: {}", e.operation(), e);
        })?;

        debug!("Persisting into {}", self.store.path().display());
        let persisted = self
            .store
            .persist(&fetched.quotation, self.deadlines.persist)
            .await;
        match &persisted {
            Ok(id) => info!("Stored quotation #{} (bid {})", id, fetched.quotation.bid),
            Err(e) => warn!("Quotation not stored, answering anyway: {}", e),
        }

        debug!("Responding with {} bytes", fetched.body.len());
        Ok(QuotationReply {
            body: fetched.body,
            persisted,
        })
    }
}
