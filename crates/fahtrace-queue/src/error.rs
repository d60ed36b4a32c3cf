use std::fmt;

/// Result type for queue decoding.
pub type QueueResult<T> = std::result::Result<T, QueueError>;

/// Why a queue image could not be decoded. Decoding is all-or-nothing:
/// a bad header fails the whole file, there are no partial queues.
#[derive(Debug)]
pub enum QueueError {
    Io(std::io::Error),
    /// The bytes are not a queue image this decoder understands.
    Malformed { detail: String },
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::Io(err) => write!(f, "queue file could not be read: {}", err),
            QueueError::Malformed { detail } => {
                write!(f, "malformed queue image: {}", detail)
            }
        }
    }
}

impl std::error::Error for QueueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueueError::Io(err) => Some(err),
            QueueError::Malformed { .. } => None,
        }
    }
}

impl From<std::io::Error> for QueueError {
    fn from(err: std::io::Error) -> Self {
        QueueError::Io(err)
    }
}
