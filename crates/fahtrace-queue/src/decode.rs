//! Fixed-offset reader that turns a raw image into a [`QueueSnapshot`].

use std::net::Ipv4Addr;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use tracing::debug;

use fahtrace_types::ProjectInfo;

use crate::entry::{EntryStatus, QueueEntry, QueueSnapshot};
use crate::error::{QueueError, QueueResult};
use crate::layout;

pub(crate) fn decode(bytes: &[u8]) -> QueueResult<QueueSnapshot> {
    if bytes.len() < layout::QUEUE_LENGTH {
        return Err(QueueError::Malformed {
            detail: format!(
                "image is {} bytes, a full queue is {}",
                bytes.len(),
                layout::QUEUE_LENGTH
            ),
        });
    }

    // Resolve word order from the version field: a word that only reads as
    // a known version byte-swapped came from a big-endian client.
    let version_le = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let raw = if known_version(version_le) {
        Raw {
            bytes,
            swapped: false,
        }
    } else if known_version(version_le.swap_bytes()) {
        debug!(
            version = version_le.swap_bytes(),
            "queue header reads big-endian, swapping words"
        );
        Raw {
            bytes,
            swapped: true,
        }
    } else {
        return Err(QueueError::Malformed {
            detail: format!("unrecognized queue version {}", version_le),
        });
    };

    let version = raw.u32_at(layout::VERSION);
    let cursor = raw.u32_at(layout::CURRENT_INDEX) as usize;
    if cursor >= layout::ENTRY_COUNT {
        return Err(QueueError::Malformed {
            detail: format!("current index {} is outside the ten-entry ring", cursor),
        });
    }

    let entries = (0..layout::ENTRY_COUNT)
        .map(|index| read_entry(raw.entry(index), index, cursor))
        .collect();
    debug!(version, cursor, "decoded queue image");

    Ok(QueueSnapshot {
        version,
        current_index: cursor,
        entries,
    })
}

/// Queue format versions this decoder knows: the v4 through v7 clients.
fn known_version(version: u32) -> bool {
    matches!(version / 100, 4..=7)
}

fn read_entry(raw: Raw<'_>, index: usize, cursor: usize) -> QueueEntry {
    let raw_status = raw.u32_at(layout::STATUS);
    let project_info = ProjectInfo::new(
        u32::from(raw.u16_le_at(layout::PROJECT_ID)),
        u32::from(raw.u16_le_at(layout::PROJECT_RUN)),
        u32::from(raw.u16_le_at(layout::PROJECT_CLONE)),
        u32::from(raw.u16_le_at(layout::PROJECT_GEN)),
    );
    let status = EntryStatus::resolve(raw_status, index == cursor, project_info.project_id != 0);

    QueueEntry {
        index,
        raw_status,
        status,
        number_of_smp_cores: raw.u32_le_at(layout::NUMBER_OF_SMP_CORES),
        begin_time_utc: epoch_2000_utc(raw.u32_at(layout::TIME_DATA)),
        begin_time_local: epoch_2000_local(raw.u32_at(layout::TIME_DATA + 4)),
        end_time_utc: epoch_2000_utc(raw.u32_at(layout::TIME_DATA + 16)),
        end_time_local: epoch_2000_local(raw.u32_at(layout::TIME_DATA + 20)),
        upload_status: raw.u32_at(layout::UPLOAD_STATUS),
        core_number: raw.u32_at(layout::CORE_NUMBER),
        wu_data_size: raw.u32_at(layout::WU_DATA_SIZE),
        project_info,
        issued_time: epoch_2000_utc(raw.u32_le_at(layout::ISSUED_TIME)),
        machine_id: raw.u32_at(layout::MACHINE_ID),
        server_ip: host_order_ip(raw.u32_at(layout::SERVER_IP)),
        server_port: raw.u32_at(layout::SERVER_PORT),
        work_unit_type: raw.c_string_at(layout::WORK_UNIT_TYPE, 64),
        folding_id: raw.c_string_at(layout::FOLDING_ID, 64),
        team: raw.c_string_at(layout::TEAM, 64),
        user_and_machine_id: raw.u64_at(layout::USER_AND_MACHINE_ID),
        benchmark: raw.u32_le_at(layout::BENCHMARK),
        cpu_type: raw.u32_at(layout::CPU_TYPE),
        os_type: raw.u32_at(layout::OS_TYPE),
        cpu_species: raw.u32_at(layout::CPU_SPECIES),
        os_species: raw.u32_at(layout::OS_SPECIES),
        expiration_secs: raw.u32_at(layout::EXPIRATION),
        assignment_info_present: raw.u32_at(layout::ASSIGNMENT_INFO_PRESENT) != 0,
        assignment_time: epoch_2000_utc(raw.u32_at(layout::ASSIGNMENT_TIME)),
        assignment_checksum: raw.u32_at(layout::ASSIGNMENT_CHECKSUM),
        collection_server_ip: host_order_ip(raw.u32_at(layout::COLLECTION_SERVER_IP)),
        use_cores: raw.u32_le_at(layout::USE_CORES),
        tag: raw.c_string_at(layout::TAG, 16),
        passkey: raw.c_string_at(layout::PASSKEY, 32),
        flops: raw.u32_le_at(layout::FLOPS),
        memory_mb: raw.u32_le_at(layout::MEMORY),
        gpu_memory_mb: raw.u32_le_at(layout::GPU_MEMORY),
    }
}

/// Byte view carrying the image's resolved word order. Field offsets come
/// from [`layout`] and sit inside the slice once the length check passed.
#[derive(Clone, Copy)]
struct Raw<'a> {
    bytes: &'a [u8],
    swapped: bool,
}

impl<'a> Raw<'a> {
    /// Narrow to one 712-byte entry record.
    fn entry(self, index: usize) -> Raw<'a> {
        let start = layout::HEADER_LENGTH + index * layout::ENTRY_LENGTH;
        Raw {
            bytes: &self.bytes[start..start + layout::ENTRY_LENGTH],
            swapped: self.swapped,
        }
    }

    /// Writer-endian word.
    fn u32_at(self, offset: usize) -> u32 {
        let word = self.u32_le_at(offset);
        if self.swapped { word.swap_bytes() } else { word }
    }

    /// Server-stamped word, little-endian on every platform.
    fn u32_le_at(self, offset: usize) -> u32 {
        u32::from_le_bytes([
            self.bytes[offset],
            self.bytes[offset + 1],
            self.bytes[offset + 2],
            self.bytes[offset + 3],
        ])
    }

    /// Server-stamped half word, little-endian on every platform.
    fn u16_le_at(self, offset: usize) -> u16 {
        u16::from_le_bytes([self.bytes[offset], self.bytes[offset + 1]])
    }

    /// Writer-endian eight-byte token.
    fn u64_at(self, offset: usize) -> u64 {
        let mut word = [0u8; 8];
        word.copy_from_slice(&self.bytes[offset..offset + 8]);
        let token = u64::from_le_bytes(word);
        if self.swapped { token.swap_bytes() } else { token }
    }

    /// NUL-padded C string field. Trailing garbage past the first NUL is
    /// part of the padding and never read.
    fn c_string_at(self, offset: usize, length: usize) -> String {
        let field = &self.bytes[offset..offset + length];
        let end = field.iter().position(|&byte| byte == 0).unwrap_or(length);
        String::from_utf8_lossy(&field[..end]).into_owned()
    }
}

/// Addresses are stored as host-order integers, so x86 images carry the
/// octets reversed. Once the word order is resolved the high byte is the
/// first octet.
fn host_order_ip(word: u32) -> Ipv4Addr {
    Ipv4Addr::from(word)
}

/// Seconds from the Unix epoch to the client's 2000-01-01 UTC epoch.
const EPOCH_2000_OFFSET_SECS: i64 = 946_684_800;

/// Queue clocks count seconds since 2000-01-01 UTC; zero means unset.
fn epoch_2000_utc(seconds: u32) -> Option<DateTime<Utc>> {
    if seconds == 0 {
        return None;
    }
    Some(
        DateTime::<Utc>::UNIX_EPOCH
            + Duration::seconds(EPOCH_2000_OFFSET_SECS + i64::from(seconds)),
    )
}

/// Local-clock variant: the same epoch read on the writer's wall clock,
/// kept naive because the writer's zone is unknown.
fn epoch_2000_local(seconds: u32) -> Option<NaiveDateTime> {
    Some(epoch_2000_utc(seconds)?.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_known_versions_span_v4_through_v7() {
        assert!(known_version(400));
        assert!(known_version(500));
        assert!(known_version(600));
        assert!(known_version(624));
        assert!(known_version(799));
        assert!(!known_version(0));
        assert!(!known_version(324));
        assert!(!known_version(800));
    }

    #[test]
    fn test_raw_words_follow_swap_flag() {
        let bytes = [0x58, 0x02, 0x00, 0x00];
        let little = Raw {
            bytes: &bytes,
            swapped: false,
        };
        let big = Raw {
            bytes: &bytes,
            swapped: true,
        };
        assert_eq!(little.u32_at(0), 600);
        assert_eq!(big.u32_at(0), 600u32.swap_bytes());
        // Server-stamped fields ignore the flag.
        assert_eq!(big.u32_le_at(0), 600);
    }

    #[test]
    fn test_c_string_stops_at_first_nul() {
        let mut field = [0u8; 16];
        field[..9].copy_from_slice(b"harlam357");
        field[10] = b'x'; // padding garbage
        let raw = Raw {
            bytes: &field,
            swapped: false,
        };
        assert_eq!(raw.c_string_at(0, 16), "harlam357");
        assert_eq!(raw.c_string_at(0, 9), "harlam357");
    }

    #[test]
    fn test_host_order_ip_reads_high_byte_first() {
        assert_eq!(
            host_order_ip(0xAB43_5964),
            Ipv4Addr::new(171, 67, 89, 100)
        );
        assert_eq!(host_order_ip(0), Ipv4Addr::UNSPECIFIED);
    }

    #[test]
    fn test_epoch_2000_zero_means_unset() {
        assert_eq!(epoch_2000_utc(0), None);
        assert_eq!(epoch_2000_local(0), None);
        let stamp = epoch_2000_utc(86_400).unwrap();
        assert_eq!(stamp, Utc.with_ymd_and_hms(2000, 1, 2, 0, 0, 0).unwrap());
        let local = epoch_2000_local(86_400).unwrap();
        assert_eq!(local, stamp.naive_utc());
    }
}
