use std::fmt;

use fahtrace_log::SnapshotError;
use fahtrace_queue::QueueError;

/// Result type for aggregation.
pub type AggregateResult<T> = std::result::Result<T, AggregateError>;

/// Why aggregation could not produce a result.
///
/// Each input fails on its own: `reconcile` downgrades queue and snapshot
/// failures to diagnostics and proceeds log-only, so in practice only the
/// log variants abort a call.
#[derive(Debug)]
pub enum AggregateError {
    /// The log contains no client run at all.
    EmptyLog,
    /// The log file itself could not be read.
    Log(fahtrace_log::Error),
    /// queue.dat was present but not decodable.
    MalformedQueue(QueueError),
    /// unitinfo.txt was present but missing or mangling a required field.
    MissingSnapshotField(SnapshotError),
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateError::EmptyLog => write!(f, "log contains no client runs"),
            AggregateError::Log(err) => write!(f, "log could not be read: {}", err),
            AggregateError::MalformedQueue(err) => write!(f, "{}", err),
            AggregateError::MissingSnapshotField(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AggregateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AggregateError::EmptyLog => None,
            AggregateError::Log(err) => Some(err),
            AggregateError::MalformedQueue(err) => Some(err),
            AggregateError::MissingSnapshotField(err) => Some(err),
        }
    }
}

impl From<fahtrace_log::Error> for AggregateError {
    fn from(err: fahtrace_log::Error) -> Self {
        AggregateError::Log(err)
    }
}

impl From<QueueError> for AggregateError {
    fn from(err: QueueError) -> Self {
        AggregateError::MalformedQueue(err)
    }
}

impl From<SnapshotError> for AggregateError {
    fn from(err: SnapshotError) -> Self {
        AggregateError::MissingSnapshotField(err)
    }
}
