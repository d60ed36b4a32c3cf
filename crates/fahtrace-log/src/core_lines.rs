//! Grammars for lines the folding cores print themselves.
//!
//! The client prefix differs by dialect (`[hh:mm:ss]` brackets vs the v7
//! `hh:mm:ss:WUnn:FSnn:0xNN:` chain), but the core output after it is
//! identical, so both dialect parsers extract through these captures.

use regex::Regex;
use std::sync::LazyLock;

use fahtrace_types::{ProjectInfo, WorkUnitResult};

use crate::line::{FrameObservation, LineAnomaly};
use crate::timestamp;

static PROJECT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Project: (?<Project>\d+) \(Run (?<Run>\d+), Clone (?<Clone>\d+), Gen (?<Gen>\d+)\)")
        .unwrap()
});
// Frame grammars: step counts with an optional percent, and the GPU
// percent-only form.
static FRAME_STEPS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Completed (?<Complete>\d+) out of (?<Total>\d+) steps\s*(?:\((?<Percent>\d+)%\))?")
        .unwrap()
});
static FRAME_PERCENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Completed (?<Percent>\d+)%").unwrap());
static CORE_SHUTDOWN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Folding@home Core Shutdown:\s*(?<Result>\S+)").unwrap());
static CORE_VERSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Version:?\s+(?<Version>\d+(?:\.\d+)?)").unwrap());

pub(crate) fn capture_project(raw: &str) -> Result<ProjectInfo, LineAnomaly> {
    let caps = PROJECT_REGEX.captures(raw).ok_or_else(|| {
        LineAnomaly::new("project line does not match `Project: N (Run R, Clone C, Gen G)`")
    })?;
    let field = |name: &str| -> Result<u32, LineAnomaly> {
        caps[name].parse().map_err(|_| {
            LineAnomaly::new(format!("project {} does not fit u32", name.to_lowercase()))
        })
    };
    Ok(ProjectInfo::new(
        field("Project")?,
        field("Run")?,
        field("Clone")?,
        field("Gen")?,
    ))
}

pub(crate) fn capture_frame(raw: &str) -> Result<FrameObservation, LineAnomaly> {
    let time_of_day = timestamp::line_time_of_day(raw)
        .ok_or_else(|| LineAnomaly::new("frame line is missing its timestamp prefix"))?;
    if let Some(caps) = FRAME_STEPS_REGEX.captures(raw) {
        let complete: u32 = caps["Complete"]
            .parse()
            .map_err(|_| LineAnomaly::new("frame step count does not fit u32"))?;
        let total: u32 = caps["Total"]
            .parse()
            .map_err(|_| LineAnomaly::new("frame step total does not fit u32"))?;
        if total == 0 {
            return Err(LineAnomaly::new("frame reports zero total steps"));
        }
        let id = match caps.name("Percent") {
            Some(percent) => percent
                .as_str()
                .parse()
                .map_err(|_| LineAnomaly::new("frame percent does not fit u32"))?,
            // Cores that omit the percent (ProtoMol) leave it to the reader.
            None => (u64::from(complete) * 100 / u64::from(total)) as u32,
        };
        return Ok(FrameObservation {
            id,
            raw_frames_complete: complete,
            raw_frames_total: total,
            time_of_day,
        });
    }
    if let Some(caps) = FRAME_PERCENT_REGEX.captures(raw) {
        let percent: u32 = caps["Percent"]
            .parse()
            .map_err(|_| LineAnomaly::new("frame percent does not fit u32"))?;
        return Ok(FrameObservation {
            id: percent,
            raw_frames_complete: percent,
            raw_frames_total: 100,
            time_of_day,
        });
    }
    Err(LineAnomaly::new(
        "frame line matched neither the steps nor the percent grammar",
    ))
}

pub(crate) fn capture_core_shutdown(raw: &str) -> Result<WorkUnitResult, LineAnomaly> {
    let caps = CORE_SHUTDOWN_REGEX
        .captures(raw)
        .ok_or_else(|| LineAnomaly::new("core shutdown line has no result literal"))?;
    Ok(WorkUnitResult::from_literal(&caps["Result"]))
}

pub(crate) fn capture_core_version(raw: &str) -> Result<f32, LineAnomaly> {
    let caps = CORE_VERSION_REGEX
        .captures(raw)
        .ok_or_else(|| LineAnomaly::new("core version line has no numeric version"))?;
    timestamp::parse_core_version(&caps["Version"])
        .ok_or_else(|| LineAnomaly::new("core version is not numeric"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_capture_under_both_prefixes() {
        let legacy = capture_project("[23:11:40] Project: 2669 (Run 13, Clone 159, Gen 153)");
        let v7 = capture_project("03:25:33:WU00:FS01:0xa4:Project: 2669 (Run 13, Clone 159, Gen 153)");
        assert_eq!(legacy.unwrap(), ProjectInfo::new(2669, 13, 159, 153));
        assert_eq!(v7.unwrap(), ProjectInfo::new(2669, 13, 159, 153));
    }

    #[test]
    fn test_core_version_colon_and_bare_forms() {
        assert_eq!(
            capture_core_version("[23:11:33] Version 2.10 (Sun Aug 30 03:43:28 CEST 2009)").unwrap(),
            2.10
        );
        assert_eq!(
            capture_core_version("03:25:33:WU00:FS01:0xa4:Version: 2.27 (Dec. 15, 2010)").unwrap(),
            2.27
        );
        assert_eq!(capture_core_version("[10:01:40] Version 23").unwrap(), 23.0);
    }

    #[test]
    fn test_shutdown_literal_capture() {
        let result =
            capture_core_shutdown("18:21:37:WU00:FS01:0xa4:Folding@home Core Shutdown: FINISHED_UNIT");
        assert_eq!(result.unwrap(), WorkUnitResult::FinishedUnit);
    }
}
