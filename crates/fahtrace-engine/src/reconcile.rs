//! File-level composition: read the three client artifacts and aggregate
//! them, downgrading queue and snapshot failures to diagnostics so one bad
//! input never takes the others down with it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use fahtrace_log::{FahLog, LogDialect, SnapshotInfo, read_snapshot_file};
use fahtrace_queue::QueueSnapshot;

use crate::aggregator::aggregate;
use crate::error::AggregateResult;
use crate::model::AggregationResult;

/// Where one client keeps its telemetry files.
///
/// Only the log is mandatory. `dialect` forces a grammar; `None` sniffs it
/// from the log text once up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSources {
    pub log_path: PathBuf,
    pub queue_path: Option<PathBuf>,
    pub snapshot_path: Option<PathBuf>,
    pub dialect: Option<LogDialect>,
}

impl ClientSources {
    /// Sources for a bare log with no companion files.
    pub fn log_only(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            queue_path: None,
            snapshot_path: None,
            dialect: None,
        }
    }

    /// Look for the classic client's files under one data directory.
    ///
    /// `FAHlog.txt` decides whether the directory is a client directory at
    /// all; `queue.dat` and `unitinfo.txt` come along when present.
    pub fn discover(dir: impl AsRef<Path>) -> Option<Self> {
        let dir = dir.as_ref();
        let log_path = dir.join("FAHlog.txt");
        if !log_path.is_file() {
            return None;
        }
        Some(Self {
            log_path,
            queue_path: Some(dir.join("queue.dat")).filter(|path| path.is_file()),
            snapshot_path: Some(dir.join("unitinfo.txt")).filter(|path| path.is_file()),
            dialect: None,
        })
    }

    pub fn with_dialect(mut self, dialect: Option<LogDialect>) -> Self {
        self.dialect = dialect;
        self
    }
}

/// A non-fatal problem encountered while reconciling.
///
/// Structural failures of the optional inputs land here instead of aborting
/// the call; line anomalies are copied up from the parsed log so a caller
/// does not have to walk every line to find them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Diagnostic {
    /// queue.dat was present but unusable; aggregation ran log-only.
    MalformedQueue { detail: String },
    /// unitinfo.txt was present but unusable; its fields stayed unset.
    UnreadableSnapshot { detail: String },
    /// A log line looked like a known event but its payload did not parse.
    LineAnomaly { line_index: u32, message: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::MalformedQueue { detail } => {
                write!(f, "queue.dat ignored: {}", detail)
            }
            Diagnostic::UnreadableSnapshot { detail } => {
                write!(f, "unitinfo.txt ignored: {}", detail)
            }
            Diagnostic::LineAnomaly {
                line_index,
                message,
            } => write!(f, "line {}: {}", line_index, message),
        }
    }
}

/// An aggregation together with everything that went wrong but did not
/// stop it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub result: AggregationResult,
    pub diagnostics: Vec<Diagnostic>,
}

/// Read a client's files and aggregate them.
///
/// Fails only when the log itself cannot be read or holds no client run.
/// A malformed queue or snapshot degrades to a [`Diagnostic`] and the
/// aggregation proceeds without that input.
pub fn reconcile(sources: &ClientSources) -> AggregateResult<Reconciliation> {
    let text = std::fs::read_to_string(&sources.log_path)
        .map_err(fahtrace_log::Error::from)?;
    let dialect = sources.dialect.unwrap_or_else(|| LogDialect::detect(&text));
    let log = FahLog::read(dialect, &text);

    let mut diagnostics: Vec<Diagnostic> = log
        .anomalies()
        .map(|line| Diagnostic::LineAnomaly {
            line_index: line.index,
            message: line
                .anomaly
                .as_ref()
                .map(|anomaly| anomaly.message.clone())
                .unwrap_or_default(),
        })
        .collect();

    let queue = sources.queue_path.as_deref().and_then(|path| {
        match QueueSnapshot::read_file(path) {
            Ok(queue) => Some(queue),
            Err(err) => {
                warn!(path = %path.display(), %err, "queue.dat unusable, proceeding log-only");
                diagnostics.push(Diagnostic::MalformedQueue {
                    detail: err.to_string(),
                });
                None
            }
        }
    });

    let snapshot: Option<SnapshotInfo> = sources.snapshot_path.as_deref().and_then(|path| {
        match read_snapshot_file(path) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(path = %path.display(), %err, "unitinfo.txt unusable, skipping");
                diagnostics.push(Diagnostic::UnreadableSnapshot {
                    detail: err.to_string(),
                });
                None
            }
        }
    });

    let result = aggregate(&log, queue.as_ref(), snapshot.as_ref())?;
    Ok(Reconciliation {
        result,
        diagnostics,
    })
}
