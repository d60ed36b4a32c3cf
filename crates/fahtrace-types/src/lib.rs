//! Shared domain model for the fahtrace workspace.
//!
//! Everything in this crate is plain data: the vocabulary the other crates
//! speak when describing Folding@Home client telemetry (work unit identity,
//! terminal results, slot status, observed frames, line spans). Parsing and
//! reconciliation logic live in the crates that consume these types.

pub mod frame;
pub mod project;
pub mod span;
pub mod status;
pub mod work;

pub use frame::UnitFrame;
pub use project::ProjectInfo;
pub use span::LineSpan;
pub use status::{SlotStatus, SlotType};
pub use work::WorkUnitResult;
