//! Byte-image builder for synthetic queue.dat files.
//!
//! Writes through the same offset constants the decoder reads, so a test
//! that wants "entry 3 folding project 2683" says exactly that and nothing
//! else. Fields not set stay zero, which the decoder reads as unset.

use std::path::Path;

use chrono::{DateTime, Utc};

use fahtrace_queue::layout;
use fahtrace_types::ProjectInfo;

/// Seconds from the Unix epoch to the client's 2000-01-01 UTC epoch.
const EPOCH_2000_OFFSET_SECS: i64 = 946_684_800;

/// One entry's worth of fields to stamp into the image.
///
/// Defaults describe an empty ring position; set only what the test needs.
#[derive(Debug, Clone)]
pub struct QueueEntryFixture {
    pub raw_status: u32,
    pub project: ProjectInfo,
    pub begin_time_utc: Option<DateTime<Utc>>,
    pub end_time_utc: Option<DateTime<Utc>>,
    pub expiration_secs: u32,
    pub core_number: u32,
    pub folding_id: String,
    pub team: String,
    pub machine_id: u32,
    pub user_and_machine_id: u64,
    pub use_cores: u32,
}

impl Default for QueueEntryFixture {
    fn default() -> Self {
        Self {
            raw_status: 0,
            project: ProjectInfo::default(),
            begin_time_utc: None,
            end_time_utc: None,
            expiration_secs: 0,
            core_number: 0,
            folding_id: String::new(),
            team: String::new(),
            machine_id: 0,
            user_and_machine_id: 0,
            use_cores: 0,
        }
    }
}

impl QueueEntryFixture {
    /// A position the client is folding (or has queued): status 3 with a
    /// project, a begin time and a CPU core assigned.
    pub fn folding(project: ProjectInfo, begin: DateTime<Utc>) -> Self {
        Self {
            raw_status: 3,
            project,
            begin_time_utc: Some(begin),
            expiration_secs: 14 * 86_400,
            core_number: 0xa4,
            ..Self::default()
        }
    }

    /// A finished position awaiting nothing: status 1 with an end time.
    pub fn finished(project: ProjectInfo, begin: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            raw_status: 1,
            project,
            begin_time_utc: Some(begin),
            end_time_utc: Some(end),
            expiration_secs: 14 * 86_400,
            core_number: 0xa4,
            ..Self::default()
        }
    }

    pub fn with_identity(mut self, folding_id: &str, team: u32) -> Self {
        self.folding_id = folding_id.to_string();
        self.team = team.to_string();
        self
    }

    pub fn with_core(mut self, core_number: u32) -> Self {
        self.core_number = core_number;
        self
    }
}

/// Builder for a full little-endian queue image.
#[derive(Debug, Clone)]
pub struct QueueFixture {
    image: Vec<u8>,
}

impl QueueFixture {
    /// A blank image with the given format version (e.g. `600`).
    pub fn new(version: u32) -> Self {
        let mut image = vec![0u8; layout::QUEUE_LENGTH];
        put_u32(&mut image, layout::VERSION, version);
        Self { image }
    }

    /// Point the ring cursor at `index`.
    pub fn cursor(mut self, index: u32) -> Self {
        put_u32(&mut self.image, layout::CURRENT_INDEX, index);
        self
    }

    /// Stamp one entry's fields at ring position `index`.
    pub fn entry(mut self, index: usize, entry: &QueueEntryFixture) -> Self {
        let at = |offset| layout::HEADER_LENGTH + index * layout::ENTRY_LENGTH + offset;
        let image = &mut self.image;

        put_u32(image, at(layout::STATUS), entry.raw_status);
        if let Some(begin) = entry.begin_time_utc {
            put_u32(image, at(layout::TIME_DATA), seconds_since_2000(begin));
        }
        if let Some(end) = entry.end_time_utc {
            put_u32(image, at(layout::TIME_DATA + 16), seconds_since_2000(end));
        }
        put_u32(image, at(layout::CORE_NUMBER), entry.core_number);
        put_u16(image, at(layout::PROJECT_ID), entry.project.project_id as u16);
        put_u16(image, at(layout::PROJECT_RUN), entry.project.run as u16);
        put_u16(image, at(layout::PROJECT_CLONE), entry.project.clone as u16);
        put_u16(image, at(layout::PROJECT_GEN), entry.project.generation as u16);
        put_u32(image, at(layout::MACHINE_ID), entry.machine_id);
        put_str(image, at(layout::WORK_UNIT_TYPE), "Folding@Home");
        put_str(image, at(layout::FOLDING_ID), &entry.folding_id);
        put_str(image, at(layout::TEAM), &entry.team);
        put_u64(
            image,
            at(layout::USER_AND_MACHINE_ID),
            entry.user_and_machine_id,
        );
        put_u32(image, at(layout::EXPIRATION), entry.expiration_secs);
        put_u32(image, at(layout::USE_CORES), entry.use_cores);
        if !entry.project.is_unknown() {
            put_str(image, at(layout::TAG), &entry.project.tag());
        }
        self
    }

    pub fn build(&self) -> Vec<u8> {
        self.image.clone()
    }

    /// The image cut short, for malformed-input tests.
    pub fn truncated(&self, length: usize) -> Vec<u8> {
        self.image[..length.min(self.image.len())].to_vec()
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        std::fs::write(path.as_ref(), &self.image)?;
        Ok(())
    }
}

fn put_u32(image: &mut [u8], offset: usize, value: u32) {
    image[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_u16(image: &mut [u8], offset: usize, value: u16) {
    image[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u64(image: &mut [u8], offset: usize, value: u64) {
    image[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

fn put_str(image: &mut [u8], offset: usize, value: &str) {
    image[offset..offset + value.len()].copy_from_slice(value.as_bytes());
}

fn seconds_since_2000(stamp: DateTime<Utc>) -> u32 {
    (stamp.timestamp() - EPOCH_2000_OFFSET_SECS) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fahtrace_queue::{EntryStatus, QueueSnapshot};

    #[test]
    fn test_built_image_round_trips_through_the_decoder() {
        let begin = Utc.with_ymd_and_hms(2010, 3, 20, 12, 0, 0).unwrap();
        let project = ProjectInfo::new(2683, 2, 8, 24);
        let image = QueueFixture::new(600)
            .cursor(3)
            .entry(
                3,
                &QueueEntryFixture::folding(project, begin).with_identity("harlam357", 32),
            )
            .build();

        let queue = QueueSnapshot::decode(&image).unwrap();
        assert_eq!(queue.current_index, 3);
        let entry = queue.current_entry().unwrap();
        assert_eq!(entry.status, EntryStatus::FoldingNow);
        assert_eq!(entry.project_info, project);
        assert_eq!(entry.begin_time_utc, Some(begin));
        assert_eq!(entry.folding_id, "harlam357");
        assert_eq!(entry.team_number(), 32);
        assert_eq!(entry.tag, "P2683R2C8G24");
    }

    #[test]
    fn test_truncated_image_is_rejected() {
        let short = QueueFixture::new(600).truncated(512);
        assert_eq!(short.len(), 512);
        assert!(QueueSnapshot::decode(&short).is_err());
    }
}
