use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use fahtrace_types::{LineSpan, ProjectInfo, SlotStatus, UnitFrame, WorkUnitResult};

use crate::error::Result;
use crate::line::{LogDialect, LogLine};

// ==========================================
// 1. Log (every line + the run tree over them)
// ==========================================

/// Fully parsed client log.
///
/// Holds every input line (classified, parsed, anomalies attached) together
/// with the `ClientRun -> SlotRun -> UnitRun` tree built over them in a
/// single forward pass. Line indices in the tree refer into `lines`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FahLog {
    /// Dialect the log was read as.
    pub dialect: LogDialect,
    /// All input lines in file order.
    pub lines: Vec<LogLine>,
    /// Client sessions, oldest first. The last run is the current one.
    pub client_runs: Vec<ClientRun>,
}

impl FahLog {
    /// Read a log from text in one pass.
    pub fn read(dialect: LogDialect, text: &str) -> FahLog {
        crate::build::build(dialect, text)
    }

    /// Read a log file from disk.
    pub fn read_file(path: impl AsRef<Path>, dialect: LogDialect) -> Result<FahLog> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::read(dialect, &text))
    }

    /// The run currently in progress (the last one), if any.
    pub fn current_run(&self) -> Option<&ClientRun> {
        self.client_runs.last()
    }

    /// Lines covered by a span, clamped to the input.
    pub fn lines_in(&self, span: LineSpan) -> &[LogLine] {
        let start = (span.start as usize).min(self.lines.len());
        let end = (span.end as usize).min(self.lines.len());
        &self.lines[start..end]
    }

    /// Lines that carry a parse anomaly.
    pub fn anomalies(&self) -> impl Iterator<Item = &LogLine> {
        self.lines.iter().filter(|line| line.anomaly.is_some())
    }
}

// ==========================================
// 2. ClientRun (one client session)
// ==========================================

/// One client session, bounded by log-open banners.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRun {
    /// Half-open range of global line indices this run covers.
    pub line_span: LineSpan,
    /// Client identity captured during the run.
    pub data: ClientRunData,
    /// Folding slots seen in this run, keyed by slot number.
    /// Legacy logs only ever populate slot 0.
    pub slot_runs: BTreeMap<u32, SlotRun>,
}

impl ClientRun {
    pub fn new(start_line: u32, data: ClientRunData) -> Self {
        Self {
            line_span: LineSpan::single(start_line),
            data,
            slot_runs: BTreeMap::new(),
        }
    }

    pub fn slot(&self, folding_slot: u32) -> Option<&SlotRun> {
        self.slot_runs.get(&folding_slot)
    }

    /// The slot whose most recent unit run starts latest in the file.
    ///
    /// Ties and unit-less runs fall back to the lowest slot number present.
    /// `None` only when the run has no slots at all.
    pub fn latest_active_slot(&self) -> Option<u32> {
        let mut best: Option<(u32, u32)> = None;
        for (slot, run) in &self.slot_runs {
            if let Some(unit) = run.unit_runs.last() {
                let start = unit.line_span.start;
                if best.is_none_or(|(s, _)| start > s) {
                    best = Some((start, *slot));
                }
            }
        }
        best.map(|(_, slot)| slot)
            .or_else(|| self.slot_runs.keys().next().copied())
    }
}

/// Client identity lines accumulated over a run. Latest value wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRunData {
    /// Session start from the log-open banner. Unix epoch when the banner
    /// was missing or unparseable (truncated log heads).
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
    /// Folding user name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folding_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_id: Option<u32>,
}

impl ClientRunData {
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            client_version: None,
            arguments: None,
            folding_id: None,
            team: None,
            user_id: None,
            machine_id: None,
        }
    }
}

// ==========================================
// 3. SlotRun (one folding slot within a run)
// ==========================================

/// One folding slot's activity within a client run.
///
/// Unit runs form a stack: a new claim pushes on top, the previous unit
/// stays below. The last element is the slot's most recent unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotRun {
    pub folding_slot: u32,
    pub data: SlotRunData,
    pub unit_runs: Vec<UnitRun>,
}

impl SlotRun {
    pub fn new(folding_slot: u32) -> Self {
        Self {
            folding_slot,
            data: SlotRunData::default(),
            unit_runs: Vec::new(),
        }
    }

    /// The most recent unit of this slot.
    pub fn current_unit(&self) -> Option<&UnitRun> {
        self.unit_runs.last()
    }

    /// The unit beneath the most recent one, if the stack is deep enough.
    pub fn previous_unit(&self) -> Option<&UnitRun> {
        self.unit_runs.len().checked_sub(2).map(|i| &self.unit_runs[i])
    }
}

/// Per-slot counters and status, updated as the run is read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotRunData {
    /// Units that finished cleanly during this run.
    pub completed_units: u32,
    /// Units that ended in a failure result during this run.
    pub failed_units: u32,
    /// Lifetime completed count reported by the client itself, if printed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_completed_units: Option<u32>,
    /// Last observed slot status. Last writer wins.
    pub status: SlotStatus,
}

// ==========================================
// 4. UnitRun (one work-unit attempt)
// ==========================================

/// One attempt at a work unit on a slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitRun {
    /// Queue position the client claimed for this unit (0..=9).
    pub queue_index: u32,
    /// Half-open line range. The end keeps growing while the unit is the
    /// slot's open top-of-stack; end of input closes nothing.
    pub line_span: LineSpan,
    pub data: UnitRunData,
}

impl UnitRun {
    pub fn new(queue_index: u32, start_line: u32) -> Self {
        Self {
            queue_index,
            line_span: LineSpan::single(start_line),
            data: UnitRunData::default(),
        }
    }
}

/// Everything the log said about one work-unit attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitRunData {
    /// Time-of-day stamp of the line that started the unit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_start_time_stamp: Option<NaiveTime>,
    /// Core version printed by the core. `0.0` until seen.
    pub core_version: f32,
    /// Every project line the unit printed. The last one is its identity.
    pub project_infos: Vec<ProjectInfo>,
    /// Terminal result. `Unknown` while the unit is still running.
    pub work_unit_result: WorkUnitResult,
    /// Number of progress lines observed.
    pub frames_observed: u32,
    /// Most recent progress frame with its duration since the previous one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_frame: Option<UnitFrame>,
}

impl UnitRunData {
    /// The unit's project identity: the last project line it printed.
    pub fn project_info(&self) -> Option<&ProjectInfo> {
        self.project_infos.last()
    }

    pub fn raw_frames_complete(&self) -> Option<u32> {
        self.current_frame.as_ref().map(|f| f.raw_frames_complete)
    }

    pub fn raw_frames_total(&self) -> Option<u32> {
        self.current_frame.as_ref().map(|f| f.raw_frames_total)
    }
}
