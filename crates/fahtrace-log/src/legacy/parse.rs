//! Payload extraction for legacy client lines.
//!
//! Shapes that changed across client versions get one regex per known form,
//! tried in order. A failed extraction is an anomaly on the line, never
//! fatal. Core-printed shapes (project, frames, shutdown, core version) are
//! shared with the v7 dialect through `core_lines`.

use regex::Regex;
use std::sync::LazyLock;

use fahtrace_types::WorkUnitResult;

use crate::core_lines;
use crate::line::{LineAnomaly, LineData, LineType, UnitAddress};
use crate::timestamp;

static LOG_OPEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--- Opening Log file \[(?<Timestamp>[^\]]+)\]").unwrap());
static CLIENT_VERSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Folding@Home Client Version\s+(?<Version>\S+)").unwrap());
static ARGUMENTS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Arguments:\s*(?<Arguments>.*)").unwrap());
static USER_TEAM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"User name: (?<Username>\S+) \(Team (?<Team>\d+)\)").unwrap());
static USER_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"User ID\s*[:=]\s*(?<UserId>\S+)").unwrap());
static MACHINE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Machine ID:\s*(?<MachineId>\d+)").unwrap());
// Claim grammars: v6 queue-slot form, then the older unit form.
static QUEUE_SLOT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Working on queue slot (?<Index>\d{2})").unwrap());
static UNIT_INDEX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Working on Unit (?<Index>\d{2})").unwrap());
static UNITS_COMPLETED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Number of Units Completed:\s*(?<Count>\d+)").unwrap());

pub(crate) fn parse(line_type: LineType, raw: &str) -> Result<Option<LineData>, LineAnomaly> {
    match line_type {
        LineType::LogOpen => parse_log_open(raw).map(Some),
        LineType::ClientVersion => parse_client_version(raw).map(Some),
        LineType::ClientArguments => parse_arguments(raw).map(Some),
        LineType::ClientUserNameAndTeam => parse_user_and_team(raw).map(Some),
        LineType::ClientUserId | LineType::ClientReceivedUserId => parse_user_id(raw).map(Some),
        LineType::ClientMachineId => parse_machine_id(raw).map(Some),
        LineType::ClientNumberOfUnitsCompleted => parse_units_completed(raw).map(Some),
        LineType::WorkUnitWorking => parse_claim(raw).map(Some),
        LineType::WorkUnitCoreVersion => {
            let version = core_lines::capture_core_version(raw)?;
            Ok(Some(LineData::CoreVersion {
                version,
                address: None,
            }))
        }
        LineType::WorkUnitProject => {
            let project = core_lines::capture_project(raw)?;
            Ok(Some(LineData::Project {
                project,
                address: None,
            }))
        }
        LineType::WorkUnitFrame => {
            let frame = core_lines::capture_frame(raw)?;
            Ok(Some(LineData::Frame {
                frame,
                address: None,
            }))
        }
        LineType::WorkUnitCoreShutdown => {
            let result = core_lines::capture_core_shutdown(raw)?;
            Ok(Some(LineData::UnitResult {
                result,
                address: None,
            }))
        }
        LineType::ClientCoreCommunicationsError => Ok(Some(LineData::UnitResult {
            result: WorkUnitResult::ClientCoreError,
            address: None,
        })),
        _ => Ok(None),
    }
}

fn parse_log_open(raw: &str) -> Result<LineData, LineAnomaly> {
    let caps = LOG_OPEN_REGEX
        .captures(raw)
        .ok_or_else(|| LineAnomaly::new("log open line has no bracketed timestamp"))?;
    let start_time = timestamp::parse_yearless_utc(&caps["Timestamp"])
        .ok_or_else(|| LineAnomaly::new("log open timestamp is not a yearless month-day time"))?;
    Ok(LineData::LogOpen { start_time })
}

fn parse_client_version(raw: &str) -> Result<LineData, LineAnomaly> {
    let caps = CLIENT_VERSION_REGEX
        .captures(raw)
        .ok_or_else(|| LineAnomaly::new("client version line has no version token"))?;
    Ok(LineData::ClientVersion {
        version: caps["Version"].to_string(),
    })
}

fn parse_arguments(raw: &str) -> Result<LineData, LineAnomaly> {
    let caps = ARGUMENTS_REGEX
        .captures(raw)
        .ok_or_else(|| LineAnomaly::new("arguments line did not match"))?;
    Ok(LineData::Arguments {
        arguments: caps["Arguments"].trim().to_string(),
    })
}

fn parse_user_and_team(raw: &str) -> Result<LineData, LineAnomaly> {
    let caps = USER_TEAM_REGEX
        .captures(raw)
        .ok_or_else(|| LineAnomaly::new("user name line is not `name (Team n)`"))?;
    let team: u32 = caps["Team"]
        .parse()
        .map_err(|_| LineAnomaly::new("team number does not fit u32"))?;
    Ok(LineData::UserNameAndTeam {
        folding_id: Some(caps["Username"].to_string()),
        team: Some(team),
    })
}

fn parse_user_id(raw: &str) -> Result<LineData, LineAnomaly> {
    let caps = USER_ID_REGEX
        .captures(raw)
        .ok_or_else(|| LineAnomaly::new("user id line has no id token"))?;
    Ok(LineData::UserId {
        user_id: caps["UserId"].to_string(),
    })
}

fn parse_machine_id(raw: &str) -> Result<LineData, LineAnomaly> {
    let caps = MACHINE_ID_REGEX
        .captures(raw)
        .ok_or_else(|| LineAnomaly::new("machine id line has no number"))?;
    let machine_id: u32 = caps["MachineId"]
        .parse()
        .map_err(|_| LineAnomaly::new("machine id does not fit u32"))?;
    Ok(LineData::MachineId { machine_id })
}

fn parse_units_completed(raw: &str) -> Result<LineData, LineAnomaly> {
    let caps = UNITS_COMPLETED_REGEX
        .captures(raw)
        .ok_or_else(|| LineAnomaly::new("units completed line has no count"))?;
    let count: u32 = caps["Count"]
        .parse()
        .map_err(|_| LineAnomaly::new("units completed count does not fit u32"))?;
    Ok(LineData::UnitsCompleted { count })
}

fn parse_claim(raw: &str) -> Result<LineData, LineAnomaly> {
    for regex in [&QUEUE_SLOT_REGEX, &UNIT_INDEX_REGEX] {
        if let Some(caps) = regex.captures(raw) {
            let queue_index: u32 = caps["Index"]
                .parse()
                .map_err(|_| LineAnomaly::new("claimed queue index does not fit u32"))?;
            return Ok(LineData::UnitClaim {
                address: UnitAddress::new(queue_index, None),
            });
        }
    }
    Err(LineAnomaly::new(
        "claim line matched neither the queue-slot nor the unit grammar",
    ))
}
