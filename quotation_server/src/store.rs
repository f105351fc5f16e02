//! SQLite-backed quotation store.
//!
//! Every call opens its own connection and drops it before returning, so no
//! connection outlives the operation that needed it. Writes run on the
//! blocking pool inside a `BEGIN IMMEDIATE` transaction bounded by the
//! persistence deadline:
//!
//! - the busy timeout is set to what is left of the deadline before taking
//!   the write lock and again before committing;
//! - when the deadline fires, the caller marks the write cancelled and aborts
//!   the running statement through the SQLite interrupt handle;
//! - the writer only commits after checking, under the same lock, that the
//!   write was not cancelled. A write that was cancelled is rolled back, so a
//!   `PersistTimeout` never leaves a row behind.
//!
//! Lock contention and interruption both surface as `PersistTimeout`.
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{SecondsFormat, Utc};
use log::{debug, info};
use quotation_common::{CanonicalQuotation, QuotationError, Result};
use rusqlite::{Connection, ErrorCode, InterruptHandle, OpenFlags, TransactionBehavior, params};
use tokio::task::JoinError;

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS quotations (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        code         TEXT NOT NULL,
        codein       TEXT NOT NULL,
        name         TEXT NOT NULL,
        high         TEXT NOT NULL,
        low          TEXT NOT NULL,
        varBid       TEXT NOT NULL,
        pctChange    TEXT NOT NULL,
        bid          TEXT NOT NULL,
        ask          TEXT NOT NULL,
        timestamp    TEXT NOT NULL,
        createDate   TEXT NOT NULL,
        rowCreatedAt TEXT NOT NULL
    )";

const INSERT_QUOTATION: &str = "
    INSERT INTO quotations (
        code, codein, name, high, low, varBid, pctChange,
        bid, ask, timestamp, createDate, rowCreatedAt
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";

/// Handle to the quotation database file.
#[derive(Debug, Clone)]
pub struct QuotationStore {
    path: PathBuf,
}

/// Shared between the async caller and the blocking writer. Whichever side
/// takes the lock first decides between cancel and commit.
#[derive(Default)]
struct WriteCancel {
    cancelled: bool,
    committing: bool,
    handle: Option<InterruptHandle>,
}

type WriteOutcome = std::result::Result<i64, rusqlite::Error>;

impl QuotationStore {
    /// Creates the database file (and missing parent directories) if absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        if !path.exists() {
            OpenOptions::new().create(true).append(true).open(&path)?;
            info!("Created database file {}", path.display());
        }
        Ok(Self { path })
    }

    /// Database file backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the `quotations` table if it does not exist yet. Idempotent.
    pub fn ensure_schema(&self) -> Result<()> {
        let schema_error = |e: rusqlite::Error| QuotationError::SchemaInit {
            path: self.path.clone(),
            reason: e.to_string(),
        };
        let conn = Connection::open(&self.path).map_err(schema_error)?;
        conn.execute_batch(CREATE_TABLE).map_err(schema_error)?;
        debug!("Schema ready in {}", self.path.display());
        Ok(())
    }

    /// Insert one quotation, giving up after `deadline`. Returns the new row id.
    ///
    /// If the deadline fires after the writer has started committing, the
    /// commit is awaited and its real outcome reported instead.
    pub async fn persist(&self, quotation: &CanonicalQuotation, deadline: Duration) -> Result<i64> {
        let started = Instant::now();
        let cancel = Arc::new(Mutex::new(WriteCancel::default()));

        let mut writer = {
            let path = self.path.clone();
            let quotation = quotation.clone();
            let cancel = Arc::clone(&cancel);
            tokio::task::spawn_blocking(move || {
                insert(&path, &quotation, deadline, started, &cancel)
            })
        };

        match tokio::time::timeout(deadline, &mut writer).await {
            Ok(joined) => self.settle(joined, deadline, started),
            Err(_) => {
                let committing = {
                    let mut cancel = cancel.lock()?;
                    if !cancel.committing {
                        cancel.cancelled = true;
                        if let Some(handle) = cancel.handle.take() {
                            handle.interrupt();
                        }
                    }
                    cancel.committing
                };
                if committing {
                    debug!("Deadline fired during commit, waiting for its outcome");
                    self.settle(writer.await, deadline, started)
                } else {
                    Err(self.timeout(deadline, started))
                }
            }
        }
    }

    fn settle(
        &self,
        joined: std::result::Result<WriteOutcome, JoinError>,
        deadline: Duration,
        started: Instant,
    ) -> Result<i64> {
        match joined {
            Ok(Ok(id)) => Ok(id),
            Ok(Err(e)) if is_deadline_error(&e) => Err(self.timeout(deadline, started)),
            Ok(Err(e)) => Err(self.failure(e.to_string())),
            Err(join_err) => Err(self.failure(format!("writer task failed: {}", join_err))),
        }
    }

    fn timeout(&self, deadline: Duration, started: Instant) -> QuotationError {
        QuotationError::PersistTimeout {
            path: self.path.clone(),
            elapsed: started.elapsed(),
            deadline,
        }
    }

    fn failure(&self, reason: String) -> QuotationError {
        QuotationError::PersistFailure {
            path: self.path.clone(),
            reason,
        }
    }
}

/// Blocking half of `persist`. Returns `OperationInterrupted` when the caller
/// gave up before the write could commit; nothing is stored in that case.
fn insert(
    path: &Path,
    quotation: &CanonicalQuotation,
    deadline: Duration,
    started: Instant,
    cancel: &Mutex<WriteCancel>,
) -> WriteOutcome {
    let remaining = || deadline.saturating_sub(started.elapsed());

    let mut conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(remaining())?;
    {
        let mut cancel = cancel.lock().map_err(|_| interrupted())?;
        if cancel.cancelled {
            return Err(interrupted());
        }
        cancel.handle = Some(conn.get_interrupt_handle());
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    tx.execute(
        INSERT_QUOTATION,
        params![
            quotation.code,
            quotation.codein,
            quotation.name,
            quotation.high,
            quotation.low,
            quotation.var_bid,
            quotation.pct_change,
            quotation.bid,
            quotation.ask,
            quotation.timestamp,
            quotation.create_date,
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        ],
    )?;
    let id = tx.last_insert_rowid();

    {
        let mut cancel = cancel.lock().map_err(|_| interrupted())?;
        if cancel.cancelled {
            drop(cancel);
            tx.rollback()?;
            return Err(interrupted());
        }
        cancel.committing = true;
    }
    tx.busy_timeout(remaining())?;
    tx.commit()?;
    Ok(id)
}

fn interrupted() -> rusqlite::Error {
    rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_INTERRUPT),
        Some("write cancelled by deadline".to_string()),
    )
}

fn is_deadline_error(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::OperationInterrupted)
    )
}
