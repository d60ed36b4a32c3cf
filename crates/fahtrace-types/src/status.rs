use serde::{Deserialize, Serialize};
use std::fmt;

/// Slot activity derived from the most recent status-bearing log line.
///
/// Last writer wins: the builder updates this as it walks the log, so after
/// a full pass it reflects what the slot was doing when the log ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    #[default]
    Unknown,
    /// User or battery pause.
    Paused,
    /// Pause forced by the EUE (early unit end) limit.
    EuePause,
    /// Client shut down.
    Stopped,
    /// Uploading finished results.
    SendingWorkPacket,
    /// Requesting a new unit from the assignment server.
    GettingWorkPacket,
    /// Folding, but frame timing not yet established.
    RunningNoFrameTimes,
    /// Folding with observed frame progress.
    Running,
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unknown => "Unknown",
            Self::Paused => "Paused",
            Self::EuePause => "EUE Pause",
            Self::Stopped => "Stopped",
            Self::SendingWorkPacket => "Sending Work Packet",
            Self::GettingWorkPacket => "Getting Work Packet",
            Self::RunningNoFrameTimes => "Running (no frame times)",
            Self::Running => "Running",
        };
        write!(f, "{}", label)
    }
}

/// Hardware class a work unit runs on, derived from the assigned core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotType {
    #[default]
    Unknown,
    Cpu,
    Gpu,
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unknown => "Unknown",
            Self::Cpu => "CPU",
            Self::Gpu => "GPU",
        };
        write!(f, "{}", label)
    }
}
