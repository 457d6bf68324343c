//! # Audit Recording
//!
//! Every completed screen leaves exactly one [`AuditRecord`] per distinct
//! answer for its request id.
//!
//! ## Idempotency
//!
//! [`AuditRecorder::record`] consults the sink for the latest outcome
//! digest already stored for the request id:
//!
//! | Stored digest | Action | Status |
//! |---------------|--------|--------|
//! | none | append | [`AuditStatus::Written`] |
//! | equal | nothing | [`AuditStatus::Duplicate`] |
//! | different | append with `rescreen_of` | [`AuditStatus::Rescreen`] |
//!
//! The check and the append happen under a per-request-id lock, so two
//! concurrent retries of the same request cannot both append. Distinct
//! request ids never contend.
//!
//! ## Sinks
//!
//! - [`JsonlAuditLog`]: one JSON object per line, appended and flushed to
//!   stable storage before the write returns. The request id index is
//!   rebuilt by scanning the file at open.
//! - [`MemoryAuditLog`]: in-process, for tests and embedders that persist
//!   records themselves.
//!
//! Sink failures never fail a screen. They surface as
//! [`AuditStatus::Failed`] and an error-level log event.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Deserialize;

use screening_core::{AuditRecord, OutcomeDigest, RequestId};

/// Audit persistence failure.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit log I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("audit record serialization failed: {0}")]
    Serialization(String),
}

/// Append-only destination for audit records.
pub trait AuditSink: Send + Sync + 'static {
    /// Durably append one record.
    fn append(&self, record: &AuditRecord) -> Result<(), AuditError>;

    /// Digest of the most recent record stored for `request_id`.
    fn latest_digest(&self, request_id: &RequestId) -> Option<OutcomeDigest>;
}

/// What happened to one audit write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditStatus {
    Written,
    /// Same request id, same answer. Nothing appended.
    Duplicate,
    /// Same request id, different answer. Appended with a back-reference.
    Rescreen { prior: OutcomeDigest },
    Failed { reason: String },
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Written => "written",
            Self::Duplicate => "duplicate",
            Self::Rescreen { .. } => "rescreen",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

// ── Recorder ────────────────────────────────────────────────────────────

/// Idempotent front end over an [`AuditSink`].
pub struct AuditRecorder {
    sink: Arc<dyn AuditSink>,
    locks: DashMap<RequestId, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditRecorder")
            .field("locked_ids", &self.locks.len())
            .finish_non_exhaustive()
    }
}

impl AuditRecorder {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self {
            sink,
            locks: DashMap::new(),
        }
    }

    /// Record one completed screen. Blocking: file sinks flush to disk.
    pub fn record(&self, record: AuditRecord) -> AuditStatus {
        let request_id = record.request_id.clone();
        let lock = Arc::clone(
            self.locks
                .entry(request_id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );

        let status = {
            let _guard = lock.lock();
            self.record_locked(record)
        };

        drop(lock);
        self.locks
            .remove_if(&request_id, |_, l| Arc::strong_count(l) == 1);

        match &status {
            AuditStatus::Failed { reason } => {
                tracing::error!(request_id = %request_id, %reason, "audit write failed");
            }
            other => {
                tracing::debug!(request_id = %request_id, status = other.as_str(), "audit recorded");
            }
        }
        status
    }

    fn record_locked(&self, record: AuditRecord) -> AuditStatus {
        let (record, status) = match self.sink.latest_digest(&record.request_id) {
            Some(prior) if prior == record.outcome_digest => return AuditStatus::Duplicate,
            Some(prior) => (
                record.as_rescreen_of(prior.clone()),
                AuditStatus::Rescreen { prior },
            ),
            None => (record, AuditStatus::Written),
        };
        match self.sink.append(&record) {
            Ok(()) => status,
            Err(e) => AuditStatus::Failed {
                reason: e.to_string(),
            },
        }
    }
}

// ── JSON Lines sink ─────────────────────────────────────────────────────

/// The fields of a stored line needed to rebuild the index.
#[derive(Deserialize)]
struct IndexEntry {
    request_id: RequestId,
    outcome_digest: OutcomeDigest,
}

struct JsonlInner {
    file: File,
    latest: HashMap<RequestId, OutcomeDigest>,
}

/// Append-only JSON Lines audit file.
pub struct JsonlAuditLog {
    path: PathBuf,
    inner: Mutex<JsonlInner>,
}

impl std::fmt::Debug for JsonlAuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonlAuditLog")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl JsonlAuditLog {
    /// Open (creating if needed) the log at `path` and index its contents.
    ///
    /// Lines that do not parse, such as a line torn by a crash mid-write,
    /// are skipped with a warning. A missing trailing newline is repaired
    /// so the next append starts on its own line.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;

        let mut latest = HashMap::new();
        let mut skipped = 0usize;
        for line in contents
            .split(|b| *b == b'\n')
            .filter(|l| !l.iter().all(u8::is_ascii_whitespace))
        {
            match serde_json::from_slice::<IndexEntry>(line) {
                Ok(entry) => {
                    latest.insert(entry.request_id, entry.outcome_digest);
                }
                Err(_) => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::warn!(path = %path.display(), skipped, "skipped unreadable audit log lines");
        }
        if contents.last().is_some_and(|b| *b != b'\n') {
            file.write_all(b"\n")?;
            file.sync_data()?;
        }

        tracing::info!(
            path = %path.display(),
            request_ids = latest.len(),
            "audit log opened"
        );
        Ok(Self {
            path,
            inner: Mutex::new(JsonlInner { file, latest }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for JsonlAuditLog {
    fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let mut line =
            serde_json::to_vec(record).map_err(|e| AuditError::Serialization(e.to_string()))?;
        line.push(b'\n');

        let mut inner = self.inner.lock();
        inner.file.write_all(&line)?;
        inner.file.sync_data()?;
        inner
            .latest
            .insert(record.request_id.clone(), record.outcome_digest.clone());
        Ok(())
    }

    fn latest_digest(&self, request_id: &RequestId) -> Option<OutcomeDigest> {
        self.inner.lock().latest.get(request_id).cloned()
    }
}

// ── In-memory sink ──────────────────────────────────────────────────────

/// Audit sink holding records in process memory.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record, in append order.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    pub fn records_for(&self, request_id: &RequestId) -> Vec<AuditRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| &r.request_id == request_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl AuditSink for MemoryAuditLog {
    fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        self.records.lock().push(record.clone());
        Ok(())
    }

    fn latest_digest(&self, request_id: &RequestId) -> Option<OutcomeDigest> {
        self.records
            .lock()
            .iter()
            .rev()
            .find(|r| &r.request_id == request_id)
            .map(|r| r.outcome_digest.clone())
    }
}
