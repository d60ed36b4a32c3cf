use chrono::{DateTime, NaiveTime, Utc};
use fahtrace_types::{ProjectInfo, WorkUnitResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which client wrote the log.
///
/// The v5/v6 "legacy" client and the v7 daemon share no line syntax, so the
/// reader must be told which grammar to apply. `detect` is for callers that
/// want to sniff a whole file once up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogDialect {
    /// v5/v6 console client (`[hh:mm:ss]` bracket timestamps).
    Legacy,
    /// v7 daemon (`hh:mm:ss:WUnn:FSnn:` prefixes).
    FahClient,
}

impl LogDialect {
    /// Guess the dialect from the first decisive line: legacy logs bracket
    /// their stamps, v7 logs carry bare `hh:mm:ss:` prefixes and the
    /// `Log Started` banner.
    pub fn detect(text: &str) -> LogDialect {
        for raw in text.lines().take(40) {
            if raw.starts_with('[') {
                return LogDialect::Legacy;
            }
            if raw.contains(" Log Started ") || raw.as_bytes().get(8) == Some(&b':') {
                return LogDialect::FahClient;
            }
        }
        LogDialect::Legacy
    }
}

impl fmt::Display for LogDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::FahClient => write!(f, "fahclient"),
        }
    }
}

/// Classification tag for a single log line.
///
/// Classification is total: every line gets a tag, and anything unrecognized
/// is `Note`. A tag only promises that the line *looked like* this kind of
/// event; payload extraction can still fail and leave an anomaly behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    /// Run boundary: the client (re)opened its log.
    LogOpen,
    /// Banner rows around the startup header.
    LogHeader,
    ClientVersion,
    ClientArguments,
    ClientUserNameAndTeam,
    ClientReceivedUserId,
    ClientUserId,
    ClientMachineId,
    ClientAttemptGetWorkPacket,
    ClientSendWorkToServer,
    ClientSendStart,
    ClientSendComplete,
    ClientNumberOfUnitsCompleted,
    ClientCoreCommunicationsError,
    ClientCoreCommunicationsErrorShutdown,
    ClientEuePause,
    ClientShutdown,
    WorkUnitProcessing,
    WorkUnitCoreDownload,
    /// The claim: a unit takes a queue position and starts (or resumes).
    WorkUnitWorking,
    /// The `*---*` banner a core prints as it boots.
    WorkUnitCoreStart,
    WorkUnitCallingCore,
    WorkUnitCoreVersion,
    WorkUnitProject,
    /// A progress frame.
    WorkUnitFrame,
    /// v7 unit-prefixed activity with no more specific tag.
    WorkUnitRunning,
    WorkUnitPaused,
    WorkUnitPausedForBattery,
    WorkUnitResumeFromBattery,
    /// Legacy terminal line (`Folding@home Core Shutdown: LITERAL`).
    WorkUnitCoreShutdown,
    /// v7 terminal line (`FahCore returned: LITERAL (code)`).
    WorkUnitCoreReturn,
    WorkUnitCleaningUp,
    /// Anything else. Never an error.
    Note,
}

/// The `WUnn` / `FSnn` coordinates a v7 line carries, or the queue position a
/// legacy claim names. `folding_slot` is `None` for shapes that predate slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitAddress {
    pub queue_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folding_slot: Option<u32>,
}

impl UnitAddress {
    pub fn new(queue_index: u32, folding_slot: Option<u32>) -> Self {
        Self {
            queue_index,
            folding_slot,
        }
    }
}

/// A raw frame observation before the builder assigns it a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameObservation {
    /// Percent boundary the line reports, explicit or computed from raws.
    pub id: u32,
    pub raw_frames_complete: u32,
    pub raw_frames_total: u32,
    pub time_of_day: NaiveTime,
}

/// Typed payload extracted from a classified line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum LineData {
    LogOpen {
        start_time: DateTime<Utc>,
    },
    ClientVersion {
        version: String,
    },
    Arguments {
        arguments: String,
    },
    /// Legacy prints both on one line; the v7 header prints them separately,
    /// so either half may be absent.
    UserNameAndTeam {
        folding_id: Option<String>,
        team: Option<u32>,
    },
    UserId {
        user_id: String,
    },
    MachineId {
        machine_id: u32,
    },
    UnitsCompleted {
        count: u32,
    },
    /// A claim line: the unit now occupies `address.queue_index`.
    UnitClaim {
        address: UnitAddress,
    },
    /// v7 unit-prefixed activity that isn't otherwise classified.
    UnitActivity {
        address: UnitAddress,
    },
    /// v7 slot-prefixed line with no unit coordinate (pauses and the like).
    SlotActivity {
        folding_slot: u32,
    },
    CoreVersion {
        version: f32,
        #[serde(skip_serializing_if = "Option::is_none")]
        address: Option<UnitAddress>,
    },
    Project {
        project: ProjectInfo,
        #[serde(skip_serializing_if = "Option::is_none")]
        address: Option<UnitAddress>,
    },
    Frame {
        frame: FrameObservation,
        #[serde(skip_serializing_if = "Option::is_none")]
        address: Option<UnitAddress>,
    },
    UnitResult {
        result: WorkUnitResult,
        #[serde(skip_serializing_if = "Option::is_none")]
        address: Option<UnitAddress>,
    },
    CleaningUp {
        address: UnitAddress,
    },
}

/// Non-fatal extraction failure, retained on the line that produced it.
///
/// The raw text stays on the line, so the message only has to say what was
/// expected and did not match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAnomaly {
    pub message: String,
}

impl LineAnomaly {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for LineAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// One classified, parsed log line. The raw text is always kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogLine {
    /// Global zero-based position in the file.
    pub index: u32,
    pub line_type: LineType,
    pub raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<LineData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomaly: Option<LineAnomaly>,
}

impl LogLine {
    /// Classify and parse one raw line. Total: never fails, never drops the
    /// text. Extraction failures land in `anomaly`.
    pub fn read(dialect: LogDialect, index: u32, raw: impl Into<String>) -> Self {
        let raw: String = raw.into();
        let line_type = match dialect {
            LogDialect::Legacy => crate::legacy::classify(&raw),
            LogDialect::FahClient => crate::fahclient::classify(&raw),
        };
        let parsed = match dialect {
            LogDialect::Legacy => crate::legacy::parse(line_type, &raw),
            LogDialect::FahClient => crate::fahclient::parse(line_type, &raw),
        };
        let (data, anomaly) = match parsed {
            Ok(data) => (data, None),
            Err(anomaly) => (None, Some(anomaly)),
        };
        Self {
            index,
            line_type,
            raw,
            data,
            anomaly,
        }
    }

    /// The bracket/prefix time of day, when the line carries one.
    pub fn time_of_day(&self) -> Option<NaiveTime> {
        crate::timestamp::line_time_of_day(&self.raw)
    }
}
