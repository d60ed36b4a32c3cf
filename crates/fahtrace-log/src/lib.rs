// Log layer - FAHlog.txt and unitinfo.txt readers
// Turns raw client text into the client/slot/unit run tree the engine merges

// Line model and dialect grammars
pub mod line;

// Run tree built from classified lines
pub mod tree;

// unitinfo.txt snapshot
pub mod snapshot;

// Error types
pub mod error;

mod build;
mod core_lines;
mod fahclient;
mod legacy;
mod timestamp;

// Line model
pub use line::{FrameObservation, LineAnomaly, LineData, LineType, LogDialect, LogLine, UnitAddress};

// Run tree
pub use tree::{ClientRun, ClientRunData, FahLog, SlotRun, SlotRunData, UnitRun, UnitRunData};

// Snapshot
pub use snapshot::{
    SnapshotError, SnapshotInfo, SnapshotResult, read_snapshot, read_snapshot_file,
};

// Error types
pub use error::{Error, Result};
