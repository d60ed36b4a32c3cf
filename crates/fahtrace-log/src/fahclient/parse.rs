//! Payload extraction for v7 daemon lines.
//!
//! Unit-scoped lines exist in two prefix grammars: the `WUnn:FSnn:` chain
//! and the pre-7.1.38 inline forms (`Unit nn:`, `Starting Unit nn`,
//! `FahCore, running Unit nn, returned:`). Both are always tried. Core
//! output after the prefix goes through the shared `core_lines` captures.

use regex::Regex;
use std::sync::LazyLock;

use fahtrace_types::WorkUnitResult;

use crate::core_lines;
use crate::line::{LineAnomaly, LineData, LineType, UnitAddress};
use crate::timestamp;

static LOG_STARTED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*+ Log Started (?<Timestamp>.+?) \*+").unwrap());
static UNIT_PREFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{2}:\d{2}:\d{2}:WU(?<Unit>\d{2}):FS(?<Slot>\d{2}):(?<Rest>.*)$").unwrap()
});
static UNIT_PREFIX_OLD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}:\d{2}:Unit (?<Unit>\d{2}):(?<Rest>.*)$").unwrap());
static SLOT_PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}:\d{2}:FS(?<Slot>\d{2}):(?<Rest>.*)$").unwrap());
static CLIENT_PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}:\d{2}:(?<Rest>.*)$").unwrap());
static CORE_PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]{1,2}:(?<Rest>.*)$").unwrap());
static STARTING_UNIT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Starting Unit (?<Unit>\d{2})").unwrap());
static CORE_RETURN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^FahCore returned: (?<Result>\w+) \((?<Code>\d+)").unwrap());
static CORE_RETURN_OLD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^FahCore, running Unit (?<Unit>\d{2}), returned: (?<Result>\w+) \((?<Code>\d+)")
        .unwrap()
});
static CLEANING_UP_UNIT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Cleaning up Unit (?<Unit>\d{2})").unwrap());
static HEADER_VERSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Version:\s*(?<Version>\S+)").unwrap());
static HEADER_ARGS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Args:\s*(?<Args>.*)").unwrap());
static HEADER_USER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"User:\s*(?<User>\S+)").unwrap());
static HEADER_TEAM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Team:\s*(?<Team>\d+)").unwrap());

/// A v7 line split into its addressing prefix and the text after it.
pub(crate) enum Scoped<'a> {
    Unit { address: UnitAddress, rest: &'a str },
    Slot { folding_slot: u32, rest: &'a str },
    Client { rest: &'a str },
    Bare,
}

fn capture_u32(caps: &regex::Captures<'_>, name: &str) -> Option<u32> {
    caps.name(name).and_then(|m| m.as_str().parse().ok())
}

fn capture_rest<'t>(caps: &regex::Captures<'t>) -> &'t str {
    caps.name("Rest").map_or("", |m| m.as_str())
}

pub(crate) fn scope(raw: &str) -> Scoped<'_> {
    if let Some(caps) = UNIT_PREFIX_REGEX.captures(raw)
        && let (Some(unit), Some(slot)) = (capture_u32(&caps, "Unit"), capture_u32(&caps, "Slot"))
    {
        return Scoped::Unit {
            address: UnitAddress::new(unit, Some(slot)),
            rest: capture_rest(&caps),
        };
    }
    if let Some(caps) = UNIT_PREFIX_OLD_REGEX.captures(raw)
        && let Some(unit) = capture_u32(&caps, "Unit")
    {
        return Scoped::Unit {
            address: UnitAddress::new(unit, None),
            rest: capture_rest(&caps),
        };
    }
    if let Some(caps) = SLOT_PREFIX_REGEX.captures(raw)
        && let Some(folding_slot) = capture_u32(&caps, "Slot")
    {
        return Scoped::Slot {
            folding_slot,
            rest: capture_rest(&caps),
        };
    }
    if let Some(caps) = CLIENT_PREFIX_REGEX.captures(raw) {
        return Scoped::Client {
            rest: capture_rest(&caps),
        };
    }
    Scoped::Bare
}

/// Drop the `0xNN:` chain a core inserts before its own output.
pub(crate) fn strip_core_prefix(rest: &str) -> &str {
    match CORE_PREFIX_REGEX.captures(rest) {
        Some(caps) => capture_rest(&caps),
        None => rest,
    }
}

fn unit_address(raw: &str) -> Option<UnitAddress> {
    match scope(raw) {
        Scoped::Unit { address, .. } => Some(address),
        _ => None,
    }
}

pub(crate) fn parse(line_type: LineType, raw: &str) -> Result<Option<LineData>, LineAnomaly> {
    match line_type {
        LineType::LogOpen => parse_log_open(raw).map(Some),
        LineType::ClientVersion => parse_header_version(raw).map(Some),
        LineType::ClientArguments => parse_header_args(raw).map(Some),
        LineType::ClientUserNameAndTeam => parse_header_user_or_team(raw).map(Some),
        LineType::WorkUnitWorking => parse_claim(raw).map(Some),
        LineType::WorkUnitCoreReturn => parse_core_return(raw).map(Some),
        LineType::WorkUnitCleaningUp => parse_cleaning_up(raw).map(Some),
        LineType::WorkUnitRunning => parse_activity(raw).map(Some),
        LineType::WorkUnitPaused => Ok(parse_slot_activity(raw)),
        LineType::ClientSendStart | LineType::ClientSendComplete => {
            Ok(unit_address(raw).map(|address| LineData::UnitActivity { address }))
        }
        LineType::WorkUnitProject => {
            let project = core_lines::capture_project(raw)?;
            Ok(Some(LineData::Project {
                project,
                address: unit_address(raw),
            }))
        }
        LineType::WorkUnitCoreVersion => {
            let version = core_lines::capture_core_version(raw)?;
            Ok(Some(LineData::CoreVersion {
                version,
                address: unit_address(raw),
            }))
        }
        LineType::WorkUnitFrame => {
            let frame = core_lines::capture_frame(raw)?;
            Ok(Some(LineData::Frame {
                frame,
                address: unit_address(raw),
            }))
        }
        LineType::WorkUnitCoreShutdown => {
            let result = core_lines::capture_core_shutdown(raw)?;
            Ok(Some(LineData::UnitResult {
                result,
                address: unit_address(raw),
            }))
        }
        _ => Ok(None),
    }
}

fn parse_log_open(raw: &str) -> Result<LineData, LineAnomaly> {
    let caps = LOG_STARTED_REGEX
        .captures(raw)
        .ok_or_else(|| LineAnomaly::new("log started banner has no timestamp"))?;
    let start_time = timestamp::parse_log_started_utc(&caps["Timestamp"]).ok_or_else(|| {
        LineAnomaly::new("log started timestamp is neither ISO 8601 nor dd/MMM/yyyy-HH:mm:ss")
    })?;
    Ok(LineData::LogOpen { start_time })
}

fn parse_header_version(raw: &str) -> Result<LineData, LineAnomaly> {
    let caps = HEADER_VERSION_REGEX
        .captures(raw)
        .ok_or_else(|| LineAnomaly::new("version header line has no version token"))?;
    Ok(LineData::ClientVersion {
        version: caps["Version"].to_string(),
    })
}

fn parse_header_args(raw: &str) -> Result<LineData, LineAnomaly> {
    let caps = HEADER_ARGS_REGEX
        .captures(raw)
        .ok_or_else(|| LineAnomaly::new("args header line did not match"))?;
    Ok(LineData::Arguments {
        arguments: caps["Args"].trim().to_string(),
    })
}

fn parse_header_user_or_team(raw: &str) -> Result<LineData, LineAnomaly> {
    if let Some(caps) = HEADER_USER_REGEX.captures(raw) {
        return Ok(LineData::UserNameAndTeam {
            folding_id: Some(caps["User"].to_string()),
            team: None,
        });
    }
    if let Some(caps) = HEADER_TEAM_REGEX.captures(raw)
        && let Some(team) = capture_u32(&caps, "Team")
    {
        return Ok(LineData::UserNameAndTeam {
            folding_id: None,
            team: Some(team),
        });
    }
    Err(LineAnomaly::new("user/team header line did not match"))
}

fn parse_claim(raw: &str) -> Result<LineData, LineAnomaly> {
    match scope(raw) {
        Scoped::Unit { address, rest } if rest.trim() == "Starting" => {
            Ok(LineData::UnitClaim { address })
        }
        Scoped::Client { rest } => {
            let caps = STARTING_UNIT_REGEX.captures(rest.trim_start()).ok_or_else(|| {
                LineAnomaly::new("claim line matched neither the WU:FS nor the Starting Unit grammar")
            })?;
            let unit = capture_u32(&caps, "Unit")
                .ok_or_else(|| LineAnomaly::new("claimed unit index does not fit u32"))?;
            Ok(LineData::UnitClaim {
                address: UnitAddress::new(unit, None),
            })
        }
        _ => Err(LineAnomaly::new(
            "claim line matched neither the WU:FS nor the Starting Unit grammar",
        )),
    }
}

fn parse_core_return(raw: &str) -> Result<LineData, LineAnomaly> {
    match scope(raw) {
        Scoped::Unit { address, rest } => {
            let caps = CORE_RETURN_REGEX
                .captures(rest)
                .ok_or_else(|| LineAnomaly::new("core return line has no result literal"))?;
            Ok(LineData::UnitResult {
                result: WorkUnitResult::from_literal(&caps["Result"]),
                address: Some(address),
            })
        }
        Scoped::Client { rest } => {
            let caps = CORE_RETURN_OLD_REGEX
                .captures(rest.trim_start())
                .ok_or_else(|| LineAnomaly::new("core return line has no result literal"))?;
            let unit = capture_u32(&caps, "Unit")
                .ok_or_else(|| LineAnomaly::new("core return unit index does not fit u32"))?;
            Ok(LineData::UnitResult {
                result: WorkUnitResult::from_literal(&caps["Result"]),
                address: Some(UnitAddress::new(unit, None)),
            })
        }
        _ => Err(LineAnomaly::new(
            "core return line matched neither known grammar",
        )),
    }
}

fn parse_cleaning_up(raw: &str) -> Result<LineData, LineAnomaly> {
    match scope(raw) {
        Scoped::Unit { address, rest } if rest.trim() == "Cleaning up" => {
            Ok(LineData::CleaningUp { address })
        }
        Scoped::Client { rest } => {
            let caps = CLEANING_UP_UNIT_REGEX
                .captures(rest.trim_start())
                .ok_or_else(|| LineAnomaly::new("cleanup line matched neither known grammar"))?;
            let unit = capture_u32(&caps, "Unit")
                .ok_or_else(|| LineAnomaly::new("cleanup unit index does not fit u32"))?;
            Ok(LineData::CleaningUp {
                address: UnitAddress::new(unit, None),
            })
        }
        _ => Err(LineAnomaly::new("cleanup line matched neither known grammar")),
    }
}

fn parse_activity(raw: &str) -> Result<LineData, LineAnomaly> {
    match scope(raw) {
        Scoped::Unit { address, .. } => Ok(LineData::UnitActivity { address }),
        _ => Err(LineAnomaly::new("unit activity line has no unit prefix")),
    }
}

fn parse_slot_activity(raw: &str) -> Option<LineData> {
    match scope(raw) {
        Scoped::Slot { folding_slot, .. } => Some(LineData::SlotActivity { folding_slot }),
        _ => None,
    }
}
