//! Error types shared between client and server.
//!
//! `QuotationError` names every way a bounded operation can fail. Each variant
//! is attributable to exactly one of the three deadlines (upstream fetch,
//! persistence, client call) or to a decode/write step, and carries enough
//! context (url or path, elapsed time, configured deadline) to diagnose it
//! from a single log line.
use std::io;
use std::path::PathBuf;
use std::sync::PoisonError;
use std::time::Duration;

use thiserror::Error;

/// Unified error type shared by client and server.
#[derive(Error, Debug)]
pub enum QuotationError {
    /// The upstream API did not answer within the fetch deadline.
    #[error("upstream fetch deadline of {deadline:?} exceeded after {elapsed:?} (url: {url})")]
    UpstreamTimeout {
        /// Requested URL.
        url: String,
        /// Time spent before the call was abandoned.
        elapsed: Duration,
        /// Configured fetch deadline.
        deadline: Duration,
    },

    /// The upstream API could not be reached or answered with a non-success status.
    #[error(
        "upstream unavailable after {elapsed:?} (url: {url}, deadline: {deadline:?}): {reason}"
    )]
    UpstreamUnavailable {
        /// Requested URL.
        url: String,
        /// Time spent before the failure surfaced.
        elapsed: Duration,
        /// Configured fetch deadline.
        deadline: Duration,
        /// Transport error or HTTP status.
        reason: String,
    },

    /// The upstream body could not be decoded into a quotation.
    #[error("malformed upstream response (url: {url}): {source}")]
    UpstreamMalformedResponse {
        /// Requested URL.
        url: String,
        /// Decoding failure.
        #[source]
        source: DecodeError,
    },

    /// The store did not finish the write within the persistence deadline.
    #[error(
        "persistence deadline of {deadline:?} exceeded after {elapsed:?} (db: {})",
        path.display()
    )]
    PersistTimeout {
        /// Database file.
        path: PathBuf,
        /// Time spent before the write was abandoned.
        elapsed: Duration,
        /// Configured persistence deadline.
        deadline: Duration,
    },

    /// The store rejected the write.
    #[error("persistence failed (db: {}): {reason}", path.display())]
    PersistFailure {
        /// Database file.
        path: PathBuf,
        /// Storage engine message.
        reason: String,
    },

    /// The backing schema could not be created at startup.
    #[error("schema initialisation failed (db: {}): {reason}", path.display())]
    SchemaInit {
        /// Database file.
        path: PathBuf,
        /// Storage engine message.
        reason: String,
    },

    /// The server did not answer the client within the client deadline.
    #[error("client call deadline of {deadline:?} exceeded after {elapsed:?} (url: {url})")]
    ClientTimeout {
        /// Requested URL.
        url: String,
        /// Time spent before the call was abandoned.
        elapsed: Duration,
        /// Configured client deadline.
        deadline: Duration,
    },

    /// The server could not be reached or answered with a non-success status.
    #[error("server unavailable (url: {url}): {reason}")]
    ClientUnavailable {
        /// Requested URL.
        url: String,
        /// Transport error or HTTP status.
        reason: String,
    },

    /// The server body did not contain a usable bid.
    #[error("malformed server response (url: {url}): {source}")]
    ClientMalformedResponse {
        /// Requested URL.
        url: String,
        /// Decoding failure.
        #[source]
        source: DecodeError,
    },

    /// The client artifact could not be written.
    #[error("failed to write artifact {}: {source}", path.display())]
    ArtifactWriteFailure {
        /// Artifact path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A currency pair could not be parsed or is not supported.
    #[error("invalid currency pair: {0}")]
    InvalidPair(String),

    /// I/O error originating from the standard library or sockets/files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),
}

impl QuotationError {
    /// Returns `true` when the error is a deadline expiry rather than a failure.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            QuotationError::UpstreamTimeout { .. }
                | QuotationError::PersistTimeout { .. }
                | QuotationError::ClientTimeout { .. }
        )
    }

    /// Name of the bounded operation this error is attributed to.
    pub fn operation(&self) -> &'static str {
        match self {
            QuotationError::UpstreamTimeout { .. } | QuotationError::UpstreamUnavailable { .. } => {
                "upstream fetch"
            }
            QuotationError::UpstreamMalformedResponse { .. } => "upstream decode",
            QuotationError::PersistTimeout { .. } | QuotationError::PersistFailure { .. } => {
                "persistence"
            }
            QuotationError::SchemaInit { .. } => "schema initialisation",
            QuotationError::ClientTimeout { .. } | QuotationError::ClientUnavailable { .. } => {
                "client call"
            }
            QuotationError::ClientMalformedResponse { .. } => "client decode",
            QuotationError::ArtifactWriteFailure { .. } => "artifact write",
            QuotationError::InvalidPair(_) => "configuration",
            QuotationError::Io(_) | QuotationError::MutexLock(_) => "internal",
        }
    }
}

impl<T> From<PoisonError<T>> for QuotationError {
    fn from(err: PoisonError<T>) -> Self {
        QuotationError::MutexLock(err.to_string())
    }
}

/// Reasons a JSON body could not be turned into a quotation or a bid.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The body is not JSON or does not have the expected field types.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The envelope has no entry for the requested pair.
    #[error("no entry for pair {0}")]
    MissingPair(String),

    /// A field is present but its text is not a valid value.
    #[error("field '{field}' has invalid value '{value}'")]
    InvalidField {
        /// JSON field name.
        field: &'static str,
        /// Offending text.
        value: String,
    },

    /// The record describes a different pair than the one requested.
    #[error("expected pair {expected}, got {actual}")]
    PairMismatch {
        /// Requested pair key.
        expected: String,
        /// Pair key found in the record.
        actual: String,
    },
}
