//! The decoded queue: ten positional entries plus the ring cursor.

use std::fmt;
use std::net::Ipv4Addr;
use std::path::Path;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use fahtrace_types::{ProjectInfo, SlotType};

use crate::decode;
use crate::error::QueueResult;

/// One `queue.dat` image: format version, ring cursor and all ten entries.
///
/// A successful decode always carries exactly ten entries with the cursor
/// inside the ring, so positional lookups never go missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    /// Format version times 100, e.g. `600` for a v6.00 client.
    pub version: u32,
    /// Which ring position the client is working on.
    pub current_index: usize,
    pub entries: Vec<QueueEntry>,
}

impl QueueSnapshot {
    /// Decode a raw `queue.dat` image.
    pub fn decode(bytes: &[u8]) -> QueueResult<QueueSnapshot> {
        decode::decode(bytes)
    }

    /// Read and decode a `queue.dat` file.
    pub fn read_file(path: impl AsRef<Path>) -> QueueResult<QueueSnapshot> {
        let bytes = std::fs::read(path)?;
        QueueSnapshot::decode(&bytes)
    }

    /// The entry under the ring cursor.
    pub fn current_entry(&self) -> Option<&QueueEntry> {
        self.entries.get(self.current_index)
    }

    /// Client series that wrote the image, rendered like `"6.00"`.
    pub fn client_version(&self) -> String {
        format!("{}.{:02}", self.version / 100, self.version % 100)
    }
}

/// One ring position, decoded field for field from its 712-byte record.
///
/// Timestamps count seconds since 2000-01-01 UTC in the file; zero means
/// the clock was never written and decodes to `None`. Local-clock variants
/// are wall readings on the writing machine, so they stay naive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Ring position, 0 through 9.
    pub index: usize,
    /// Raw status word as stored.
    pub raw_status: u32,
    /// Status resolved against the cursor and the project identity.
    pub status: EntryStatus,
    pub number_of_smp_cores: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_time_utc: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_time_local: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time_utc: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time_local: Option<NaiveDateTime>,
    pub upload_status: u32,
    /// Assigned core number; `core_id()` renders it the way logs print it.
    pub core_number: u32,
    pub wu_data_size: u32,
    /// All-zero when the position never held a unit.
    pub project_info: ProjectInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_time: Option<DateTime<Utc>>,
    pub machine_id: u32,
    pub server_ip: Ipv4Addr,
    pub server_port: u32,
    pub work_unit_type: String,
    pub folding_id: String,
    /// Team number, stored as a numeric string.
    pub team: String,
    /// Combined user+machine token; `user_id()` separates the user part.
    pub user_and_machine_id: u64,
    pub benchmark: u32,
    pub cpu_type: u32,
    pub os_type: u32,
    pub cpu_species: u32,
    pub os_species: u32,
    /// Seconds the client has to return the unit, from begin time.
    pub expiration_secs: u32,
    pub assignment_info_present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_time: Option<DateTime<Utc>>,
    pub assignment_checksum: u32,
    pub collection_server_ip: Ipv4Addr,
    pub use_cores: u32,
    pub tag: String,
    pub passkey: String,
    pub flops: u32,
    pub memory_mb: u32,
    pub gpu_memory_mb: u32,
}

impl QueueEntry {
    /// Core number as the client prints it: uppercase hex, no prefix.
    pub fn core_id(&self) -> String {
        format!("{:X}", self.core_number)
    }

    /// Hardware class implied by the assigned core number.
    pub fn slot_type(&self) -> SlotType {
        match self.core_number {
            // GPU core family (GROGPU through the OpenMM cores).
            0x10..=0x18 => SlotType::Gpu,
            // Gromacs/AMBER/QMD uniprocessor and SMP cores, GRO-A series,
            // ProtoMol.
            0x78..=0x7e | 0xa0..=0xa8 | 0xb4 => SlotType::Cpu,
            _ => SlotType::Unknown,
        }
    }

    /// Deadline for returning the unit: begin time plus the expiration
    /// window. `None` while the position has no begin time.
    pub fn due_time_utc(&self) -> Option<DateTime<Utc>> {
        let begin = self.begin_time_utc?;
        Some(begin + Duration::seconds(i64::from(self.expiration_secs)))
    }

    /// Donor id as the client prints it: the stored token minus the
    /// machine id, uppercase hex. A token smaller than the machine id is
    /// garbage and renders as stored.
    pub fn user_id(&self) -> String {
        let id = self
            .user_and_machine_id
            .checked_sub(u64::from(self.machine_id))
            .unwrap_or(self.user_and_machine_id);
        format!("{:X}", id)
    }

    /// Team as a number; a non-numeric field reads as team zero.
    pub fn team_number(&self) -> u32 {
        self.team.parse().unwrap_or(0)
    }

    /// Benchmark flops scaled to megaflops.
    pub fn megaflops(&self) -> f64 {
        f64::from(self.flops) / 1_000_000.0
    }
}

impl Default for QueueEntry {
    fn default() -> Self {
        QueueEntry {
            index: 0,
            raw_status: 0,
            status: EntryStatus::Empty,
            number_of_smp_cores: 0,
            begin_time_utc: None,
            begin_time_local: None,
            end_time_utc: None,
            end_time_local: None,
            upload_status: 0,
            core_number: 0,
            wu_data_size: 0,
            project_info: ProjectInfo::default(),
            issued_time: None,
            machine_id: 0,
            server_ip: Ipv4Addr::UNSPECIFIED,
            server_port: 0,
            work_unit_type: String::new(),
            folding_id: String::new(),
            team: String::new(),
            user_and_machine_id: 0,
            benchmark: 0,
            cpu_type: 0,
            os_type: 0,
            cpu_species: 0,
            os_species: 0,
            expiration_secs: 0,
            assignment_info_present: false,
            assignment_time: None,
            assignment_checksum: 0,
            collection_server_ip: Ipv4Addr::UNSPECIFIED,
            use_cores: 0,
            tag: String::new(),
            passkey: String::new(),
            flops: 0,
            memory_mb: 0,
            gpu_memory_mb: 0,
        }
    }
}

/// Processing state of one ring position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    #[default]
    Unknown,
    Empty,
    Deleted,
    Finished,
    Garbage,
    FoldingNow,
    Queued,
    ReadyForUpload,
    Abandoned,
    FetchingFromServer,
}

impl EntryStatus {
    /// Resolve the raw status word. Raw zero distinguishes a never-used
    /// position from a deleted unit by whether a project was assigned;
    /// raw three marks every queued position, and only the cursor is
    /// folding right now.
    pub fn resolve(raw_status: u32, at_cursor: bool, has_project: bool) -> EntryStatus {
        match raw_status {
            0 if has_project => EntryStatus::Deleted,
            0 => EntryStatus::Empty,
            1 => EntryStatus::Finished,
            2 => EntryStatus::Garbage,
            3 if at_cursor => EntryStatus::FoldingNow,
            3 => EntryStatus::Queued,
            4 => EntryStatus::ReadyForUpload,
            5 => EntryStatus::Abandoned,
            6 => EntryStatus::FetchingFromServer,
            _ => EntryStatus::Unknown,
        }
    }

    /// True once the unit's outcome is settled, making the entry's end
    /// time a finish time rather than a last-touched time.
    pub fn is_terminal(self) -> bool {
        matches!(self, EntryStatus::Finished | EntryStatus::ReadyForUpload)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryStatus::Unknown => "Unknown",
            EntryStatus::Empty => "Empty",
            EntryStatus::Deleted => "Deleted",
            EntryStatus::Finished => "Finished",
            EntryStatus::Garbage => "Garbage",
            EntryStatus::FoldingNow => "Folding Now",
            EntryStatus::Queued => "Queued",
            EntryStatus::ReadyForUpload => "Ready For Upload",
            EntryStatus::Abandoned => "Abandoned",
            EntryStatus::FetchingFromServer => "Fetching From Server",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_resolution() {
        assert_eq!(EntryStatus::resolve(0, false, false), EntryStatus::Empty);
        assert_eq!(EntryStatus::resolve(0, false, true), EntryStatus::Deleted);
        assert_eq!(EntryStatus::resolve(1, false, true), EntryStatus::Finished);
        assert_eq!(EntryStatus::resolve(2, false, true), EntryStatus::Garbage);
        assert_eq!(EntryStatus::resolve(3, true, true), EntryStatus::FoldingNow);
        assert_eq!(EntryStatus::resolve(3, false, true), EntryStatus::Queued);
        assert_eq!(
            EntryStatus::resolve(4, false, true),
            EntryStatus::ReadyForUpload
        );
        assert_eq!(EntryStatus::resolve(5, false, true), EntryStatus::Abandoned);
        assert_eq!(
            EntryStatus::resolve(6, false, true),
            EntryStatus::FetchingFromServer
        );
        assert_eq!(EntryStatus::resolve(7, false, true), EntryStatus::Unknown);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(EntryStatus::Finished.is_terminal());
        assert!(EntryStatus::ReadyForUpload.is_terminal());
        assert!(!EntryStatus::FoldingNow.is_terminal());
        assert!(!EntryStatus::Queued.is_terminal());
        assert!(!EntryStatus::Empty.is_terminal());
    }

    #[test]
    fn test_slot_type_from_core_number() {
        let entry = |core_number| QueueEntry {
            core_number,
            ..QueueEntry::default()
        };
        assert_eq!(entry(0x15).slot_type(), SlotType::Gpu);
        assert_eq!(entry(0x78).slot_type(), SlotType::Cpu);
        assert_eq!(entry(0x7e).slot_type(), SlotType::Cpu);
        assert_eq!(entry(0xa4).slot_type(), SlotType::Cpu);
        assert_eq!(entry(0xb4).slot_type(), SlotType::Cpu);
        assert_eq!(entry(0x42).slot_type(), SlotType::Unknown);
        assert_eq!(entry(0).slot_type(), SlotType::Unknown);
    }

    #[test]
    fn test_core_id_renders_uppercase_hex() {
        let entry = QueueEntry {
            core_number: 0xa4,
            ..QueueEntry::default()
        };
        assert_eq!(entry.core_id(), "A4");
    }

    #[test]
    fn test_due_time_adds_expiration_to_begin() {
        let begin = Utc.with_ymd_and_hms(2010, 3, 20, 12, 0, 0).unwrap();
        let entry = QueueEntry {
            begin_time_utc: Some(begin),
            expiration_secs: 86_400,
            ..QueueEntry::default()
        };
        assert_eq!(
            entry.due_time_utc(),
            Some(Utc.with_ymd_and_hms(2010, 3, 21, 12, 0, 0).unwrap())
        );
        assert_eq!(QueueEntry::default().due_time_utc(), None);
    }

    #[test]
    fn test_user_id_removes_machine_id() {
        let entry = QueueEntry {
            user_and_machine_id: 0x29A0_C85F_44EC_6A0E + 1,
            machine_id: 1,
            ..QueueEntry::default()
        };
        assert_eq!(entry.user_id(), "29A0C85F44EC6A0E");
    }

    #[test]
    fn test_team_number_parses_numeric_string() {
        let entry = QueueEntry {
            team: "32".to_string(),
            ..QueueEntry::default()
        };
        assert_eq!(entry.team_number(), 32);
        assert_eq!(QueueEntry::default().team_number(), 0);
    }

    #[test]
    fn test_client_version_renders_series() {
        let snapshot = QueueSnapshot {
            version: 600,
            current_index: 0,
            entries: Vec::new(),
        };
        assert_eq!(snapshot.client_version(), "6.00");
        let snapshot = QueueSnapshot {
            version: 624,
            ..snapshot
        };
        assert_eq!(snapshot.client_version(), "6.24");
    }

    #[test]
    fn test_entry_status_serializes_snake_case() {
        let rendered = serde_json::to_string(&EntryStatus::ReadyForUpload).unwrap();
        assert_eq!(rendered, "\"ready_for_upload\"");
    }
}
