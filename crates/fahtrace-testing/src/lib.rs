//! Fixture builders shared by fahtrace integration tests.
//!
//! Synthetic inputs, built line by line (or byte by byte) so each test
//! states exactly the telemetry it is about:
//! - `LegacyLogFixture` / `FahClientLogFixture`: compose FAHlog.txt text
//! - `QueueFixture`: build queue.dat images through the decoder's own layout
//! - `ClientDirFixture`: drop the files into a temporary client directory

pub mod client_dir;
pub mod logs;
pub mod queue;

pub use client_dir::{ClientDirFixture, unitinfo_text};
pub use logs::{FahClientLogFixture, LegacyLogFixture};
pub use queue::{QueueEntryFixture, QueueFixture};
