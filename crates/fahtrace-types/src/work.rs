use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal outcome reported for a work unit.
///
/// Most variants come straight from the core shutdown literal the client
/// writes to its log (`Folding@home Core Shutdown: FINISHED_UNIT`); the v7
/// daemon reports the same literals through its `FahCore returned:` lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkUnitResult {
    /// No terminal line observed (unit still in progress, or log truncated).
    #[default]
    Unknown,
    /// Unit completed and the result was accepted.
    FinishedUnit,
    /// Core gave up before the unit was done.
    EarlyUnitEnd,
    /// Repeated early failures on this hardware.
    UnstableMachine,
    /// Core was stopped mid-unit; the unit resumes from checkpoint.
    Interrupted,
    /// Unit rejected as unusable.
    BadWorkUnit,
    /// Assigned core version is too old for the unit.
    CoreOutdated,
    /// GPU memory test failure.
    GpuMemtestError,
    /// Reported by the client itself, not the core: communications with the
    /// core broke down.
    ClientCoreError,
}

impl WorkUnitResult {
    /// Map a shutdown literal to a result. Unrecognized literals are
    /// `Unknown`, never an error — the line still parsed.
    pub fn from_literal(literal: &str) -> Self {
        match literal.trim() {
            "FINISHED_UNIT" => Self::FinishedUnit,
            "EARLY_UNIT_END" => Self::EarlyUnitEnd,
            "UNSTABLE_MACHINE" => Self::UnstableMachine,
            "INTERRUPTED" => Self::Interrupted,
            "BAD_WORK_UNIT" => Self::BadWorkUnit,
            "CORE_OUTDATED" => Self::CoreOutdated,
            "GPU_MEMTEST_ERROR" => Self::GpuMemtestError,
            _ => Self::Unknown,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::FinishedUnit)
    }

    /// Results that count as a failed unit. `Interrupted` is neither
    /// completed nor failed: the unit picks up from its checkpoint.
    pub fn is_failed(&self) -> bool {
        matches!(
            self,
            Self::EarlyUnitEnd
                | Self::UnstableMachine
                | Self::BadWorkUnit
                | Self::CoreOutdated
                | Self::GpuMemtestError
                | Self::ClientCoreError
        )
    }
}

impl fmt::Display for WorkUnitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let literal = match self {
            Self::Unknown => "UNKNOWN",
            Self::FinishedUnit => "FINISHED_UNIT",
            Self::EarlyUnitEnd => "EARLY_UNIT_END",
            Self::UnstableMachine => "UNSTABLE_MACHINE",
            Self::Interrupted => "INTERRUPTED",
            Self::BadWorkUnit => "BAD_WORK_UNIT",
            Self::CoreOutdated => "CORE_OUTDATED",
            Self::GpuMemtestError => "GPU_MEMTEST_ERROR",
            Self::ClientCoreError => "CLIENT_CORE_ERROR",
        };
        write!(f, "{}", literal)
    }
}
