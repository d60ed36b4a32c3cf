//! Byte layout of the classic client's `queue.dat`.
//!
//! A queue image is exactly 7168 bytes: an 8-byte header, ten 712-byte
//! positional entries, and a 40-byte reserved tail. These offsets are a
//! compatibility contract with every client version that wrote the file
//! (v4 through v7) and must stay bit-exact.
//!
//! Numeric fields come in two kinds. Plain fields follow the endianness of
//! the machine that wrote the image, resolved once from the header (x86
//! clients wrote little-endian, PowerPC clients big-endian). Fields the
//! work server stamped into the packet itself are identical bytes on every
//! platform and are always little-endian: the project tuple, the issue
//! time, the benchmark, both core counts, flops and the memory sizes.
//! Reserved regions are skipped, never interpreted.

/// Total image size.
pub const QUEUE_LENGTH: usize = 7168;
/// Header bytes ahead of the first entry.
pub const HEADER_LENGTH: usize = 8;
/// Size of one positional entry.
pub const ENTRY_LENGTH: usize = 712;
/// The queue is a fixed ring of ten positions.
pub const ENTRY_COUNT: usize = 10;

// Header offsets.

/// Queue format version times 100, e.g. `600` for a v6.00 client.
pub const VERSION: usize = 0;
/// Ring cursor: which of the ten entries the client is working on.
pub const CURRENT_INDEX: usize = 4;

// Entry-relative offsets, in file order. Writer-endian `u32` unless noted.

/// Raw processing status word.
pub const STATUS: usize = 0;
/// Number of SMP cores (always little-endian; pad bytes before v6.01).
pub const NUMBER_OF_SMP_CORES: usize = 4;
/// Eight time words: begin UTC, begin local, two reserved, end UTC,
/// end local, two reserved. Seconds since 2000-01-01 UTC, zero = unset.
pub const TIME_DATA: usize = 8;
/// Old single server address slot, superseded at 264. Reserved.
pub const OLD_SERVER_IP: usize = 40;
/// Result upload status word.
pub const UPLOAD_STATUS: usize = 44;
/// Core download URL, 128 bytes. Reserved.
pub const CORE_DOWNLOAD_URL: usize = 48;
/// Assigned core number, printed as hex (`0xa4` is core A4).
pub const CORE_NUMBER: usize = 180;
/// Size of the downloaded `wudata_xx.dat` payload.
pub const WU_DATA_SIZE: usize = 188;
/// Project tuple, four little-endian `u16`s in a row.
pub const PROJECT_ID: usize = 208;
pub const PROJECT_RUN: usize = 210;
pub const PROJECT_CLONE: usize = 212;
pub const PROJECT_GEN: usize = 214;
/// When the server issued the unit (always little-endian).
pub const ISSUED_TIME: usize = 216;
/// Client machine id within the donor's account.
pub const MACHINE_ID: usize = 260;
/// Work server address as a host-order integer.
pub const SERVER_IP: usize = 264;
pub const SERVER_PORT: usize = 268;
/// Work unit type, 64-byte NUL-padded C string (`Folding@Home`).
pub const WORK_UNIT_TYPE: usize = 272;
/// Donor name, 64-byte NUL-padded C string.
pub const FOLDING_ID: usize = 336;
/// Team number as a 64-byte NUL-padded numeric C string.
pub const TEAM: usize = 400;
/// Combined user+machine id token, 8 raw bytes in writer endianness.
pub const USER_AND_MACHINE_ID: usize = 464;
/// Benchmark score (always little-endian, v5.00+).
pub const BENCHMARK: usize = 472;
pub const CPU_TYPE: usize = 480;
pub const OS_TYPE: usize = 484;
pub const CPU_SPECIES: usize = 488;
pub const OS_SPECIES: usize = 492;
/// Seconds the client has to return the unit, measured from begin time.
pub const EXPIRATION: usize = 496;
/// Assignment info: present flag, timestamp, checksum.
pub const ASSIGNMENT_INFO_PRESENT: usize = 508;
pub const ASSIGNMENT_TIME: usize = 512;
pub const ASSIGNMENT_CHECKSUM: usize = 516;
/// Collection server address as a host-order integer (v5.00+).
pub const COLLECTION_SERVER_IP: usize = 520;
/// Number of SMP cores to use (always little-endian, v5.91+).
pub const USE_CORES: usize = 532;
/// Work unit tag, 16-byte NUL-padded C string (v5.00+).
pub const TAG: usize = 536;
/// Passkey, 32-byte NUL-padded C string (v6.00+).
pub const PASSKEY: usize = 604;
/// Flops per core (always little-endian, v6.00+).
pub const FLOPS: usize = 636;
/// Available memory in MiB (always little-endian, v6.00+).
pub const MEMORY: usize = 640;
/// Available GPU memory in MiB (always little-endian, v6.20+).
pub const GPU_MEMORY: usize = 644;

// Bytes 648..712 hold the expiration date split into calendar words, the
// packet size limit and the upload failure count. All reserved.
