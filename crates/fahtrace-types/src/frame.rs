use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

/// One observed progress frame of a work unit.
///
/// Built from a `Completed N out of M steps (p%)` line (or the GPU
/// percent-only form). Log lines carry only a time of day, so durations are
/// deltas between consecutive frame times of the same unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitFrame {
    /// Frame number, i.e. the percent boundary this line reports.
    pub id: u32,
    pub raw_frames_complete: u32,
    pub raw_frames_total: u32,
    /// Bracket timestamp of the frame line.
    pub time_of_day: NaiveTime,
    /// Seconds since the previous frame of the same unit. Zero for the first
    /// frame; midnight rollover is normalized by adding 24 hours, so this is
    /// never negative.
    pub duration_secs: i64,
}

impl UnitFrame {
    pub fn duration(&self) -> Duration {
        Duration::seconds(self.duration_secs)
    }
}
