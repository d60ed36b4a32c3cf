// Queue layer - queue.dat reader
// Decodes the classic client's binary work queue: ten fixed positions plus
// the cursor naming the unit being folded right now

// Decoded model
pub mod entry;

// Byte offsets (compatibility contract)
pub mod layout;

// Error types
pub mod error;

mod decode;

// Decoded model
pub use entry::{EntryStatus, QueueEntry, QueueSnapshot};

// Error types
pub use error::{QueueError, QueueResult};
