//! Reconciled output: the fixed array of unit records plus the envelope
//! describing the current run and slot.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use fahtrace_queue::QueueSnapshot;
use fahtrace_types::{LineSpan, ProjectInfo, SlotStatus, SlotType, UnitFrame, WorkUnitResult};

/// One reconciled work-unit record at a fixed position.
///
/// Every field that any input can leave unknown is optional, and stays
/// `None` rather than being guessed. `core_id` keeps the client's
/// `"Unknown"` literal because it is a display identity, not an absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedUnitInfo {
    /// Queue position this record describes.
    pub queue_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folding_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_info: Option<ProjectInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_time: Option<DateTime<Utc>>,
    /// Set only when the queue reports the unit's outcome as settled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_time: Option<DateTime<Utc>>,
    /// Core id as logs print it, `"Unknown"` when not derivable.
    pub core_id: String,
    pub slot_type: SlotType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_start_time_stamp: Option<NaiveTime>,
    /// `0.0` until a core version line was seen.
    pub core_version: f32,
    pub unit_result: WorkUnitResult,
    pub frames_observed: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_frames_complete: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_frames_total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_frame: Option<UnitFrame>,
    /// The unit's span in the log. `None` for records no log line backs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_lines: Option<LineSpan>,
    /// Snapshot extras; only ever set on the current position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u32>,
    /// Owning-slot identity. This engine never sets these; the outer
    /// monitoring layer that knows which configured client the files came
    /// from fills them in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owning_client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owning_client_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owning_slot_id: Option<u32>,
    /// When the outer layer retrieved the record. Unset here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_retrieval_time: Option<DateTime<Utc>>,
}

impl Default for AggregatedUnitInfo {
    fn default() -> Self {
        AggregatedUnitInfo {
            queue_index: 0,
            folding_id: None,
            team: None,
            project_info: None,
            download_time: None,
            due_time: None,
            finished_time: None,
            core_id: "Unknown".to_string(),
            slot_type: SlotType::Unknown,
            unit_start_time_stamp: None,
            core_version: 0.0,
            unit_result: WorkUnitResult::Unknown,
            frames_observed: 0,
            raw_frames_complete: None,
            raw_frames_total: None,
            current_frame: None,
            log_lines: None,
            protein_name: None,
            protein_tag: None,
            progress: None,
            owning_client_name: None,
            owning_client_path: None,
            owning_slot_id: None,
            unit_retrieval_time: None,
        }
    }
}

/// Everything one aggregation produced.
///
/// `unit_infos` has ten positions when a queue contributed and two when the
/// view was rebuilt from the log alone (previous unit, then current).
/// Positions that could not be resolved hold `None`, never a guess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub unit_infos: Vec<Option<AggregatedUnitInfo>>,
    /// Index of the unit being folded: the queue cursor, or 1 log-only.
    pub current_unit_index: usize,
    /// Current run identity.
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_id: Option<u32>,
    /// Current slot.
    pub status: SlotStatus,
    pub completed_units: u32,
    pub failed_units: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_completed_units: Option<u32>,
    /// Lines backing the current unit, or the whole current run when no
    /// unit span exists. Never empty for a non-empty log.
    pub current_log_lines: LineSpan,
    /// The decoded queue, when one contributed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<QueueSnapshot>,
}

impl AggregationResult {
    /// The record at the current position, when it resolved.
    pub fn current_unit(&self) -> Option<&AggregatedUnitInfo> {
        self.unit_infos.get(self.current_unit_index)?.as_ref()
    }
}
