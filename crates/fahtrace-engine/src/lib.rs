// Engine layer - the reconciliation core
// Fuses the parsed log with the decoded queue and the unitinfo snapshot
// into one fixed array of work-unit records plus the current-unit cursor

// Reconciled output model
pub mod model;

// Aggregation over already-loaded inputs
pub mod aggregator;

// File-level composition with degradable inputs
pub mod reconcile;

// Error types
pub mod error;

// Reconciled output model
pub use model::{AggregatedUnitInfo, AggregationResult};

// Aggregation
pub use aggregator::aggregate;

// File-level composition
pub use reconcile::{ClientSources, Diagnostic, Reconciliation, reconcile};

// Error types
pub use error::{AggregateError, AggregateResult};
