//! Reader for `unitinfo.txt`, the small label/value file the legacy client
//! drops next to its log to describe the unit it is folding right now.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use fahtrace_types::ProjectInfo;

use crate::timestamp;

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?<Project>\d+)R(?<Run>\d+)C(?<Clone>\d+)G(?<Gen>\d+)$").unwrap()
});
static PROGRESS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?<Percent>\d+)%").unwrap());

/// Parsed `unitinfo.txt` snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub protein_name: String,
    pub protein_tag: String,
    /// Identity decoded from the tag. `None` when the tag is not `PnRnCnGn`
    /// (the client writes `-` while no unit is assigned).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_info: Option<ProjectInfo>,
    pub download_time: DateTime<Utc>,
    pub due_time: DateTime<Utc>,
    /// Percent complete. Zero when the file does not say.
    pub progress: u32,
}

pub type SnapshotResult<T> = std::result::Result<T, SnapshotError>;

/// Why a snapshot could not be read. No partial records: one bad field
/// fails the file.
#[derive(Debug)]
pub enum SnapshotError {
    Io(std::io::Error),
    /// A required label is absent.
    MissingField { field: &'static str },
    /// A label is present but its value does not parse.
    InvalidField { field: &'static str, value: String },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Io(err) => write!(f, "snapshot could not be read: {}", err),
            SnapshotError::MissingField { field } => {
                write!(f, "snapshot is missing the `{}` field", field)
            }
            SnapshotError::InvalidField { field, value } => {
                write!(f, "snapshot field `{}` has unparseable value `{}`", field, value)
            }
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SnapshotError {
    fn from(err: std::io::Error) -> Self {
        SnapshotError::Io(err)
    }
}

/// Read a snapshot from text. `Name`, `Tag`, `Download time` and `Due time`
/// are required; `Progress` is optional. Lines without a colon are layout
/// (the heading and its underline) and are skipped.
pub fn read_snapshot(text: &str) -> SnapshotResult<SnapshotInfo> {
    let mut name = None;
    let mut tag = None;
    let mut download = None;
    let mut due = None;
    let mut progress = 0;

    for line in text.lines() {
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match label.trim() {
            "Name" => name = Some(value.to_string()),
            "Tag" => tag = Some(value.to_string()),
            "Download time" => download = Some(parse_time("Download time", value)?),
            "Due time" => due = Some(parse_time("Due time", value)?),
            "Progress" => progress = parse_progress(value)?,
            _ => {}
        }
    }

    let protein_name = name.ok_or(SnapshotError::MissingField { field: "Name" })?;
    let protein_tag = tag.ok_or(SnapshotError::MissingField { field: "Tag" })?;
    let download_time = download.ok_or(SnapshotError::MissingField {
        field: "Download time",
    })?;
    let due_time = due.ok_or(SnapshotError::MissingField { field: "Due time" })?;
    let project_info = parse_tag(&protein_tag);

    Ok(SnapshotInfo {
        protein_name,
        protein_tag,
        project_info,
        download_time,
        due_time,
        progress,
    })
}

pub fn read_snapshot_file(path: impl AsRef<Path>) -> SnapshotResult<SnapshotInfo> {
    let text = std::fs::read_to_string(path.as_ref())?;
    read_snapshot(&text)
}

fn parse_time(field: &'static str, value: &str) -> SnapshotResult<DateTime<Utc>> {
    timestamp::parse_yearless_utc(value).ok_or_else(|| SnapshotError::InvalidField {
        field,
        value: value.to_string(),
    })
}

fn parse_progress(value: &str) -> SnapshotResult<u32> {
    let caps = PROGRESS_REGEX
        .captures(value)
        .ok_or_else(|| SnapshotError::InvalidField {
            field: "Progress",
            value: value.to_string(),
        })?;
    caps["Percent"]
        .parse()
        .map_err(|_| SnapshotError::InvalidField {
            field: "Progress",
            value: value.to_string(),
        })
}

fn parse_tag(tag: &str) -> Option<ProjectInfo> {
    let caps = TAG_REGEX.captures(tag.trim())?;
    Some(ProjectInfo::new(
        caps["Project"].parse().ok()?,
        caps["Run"].parse().ok()?,
        caps["Clone"].parse().ok()?,
        caps["Gen"].parse().ok()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const SAMPLE: &str = "\
Current Work Unit
-----------------
Name: p2683_IBX in water
Tag: P2683R2C8G24
Download time: November 24 21:53:46
Due time: November 30 21:53:46
Progress: 41%  [____________________]
";

    #[test]
    fn test_full_snapshot() {
        let info = read_snapshot(SAMPLE).unwrap();
        assert_eq!(info.protein_name, "p2683_IBX in water");
        assert_eq!(info.protein_tag, "P2683R2C8G24");
        assert_eq!(info.project_info, Some(ProjectInfo::new(2683, 2, 8, 24)));
        assert_eq!((info.download_time.month(), info.download_time.day()), (11, 24));
        assert_eq!(info.download_time.hour(), 21);
        assert_eq!(info.due_time.day(), 30);
        assert_eq!(info.progress, 41);
    }

    #[test]
    fn test_missing_required_field_is_named() {
        let text = SAMPLE
            .lines()
            .filter(|line| !line.starts_with("Due time"))
            .collect::<Vec<_>>()
            .join("\n");
        let err = read_snapshot(&text).unwrap_err();
        assert!(matches!(err, SnapshotError::MissingField { field: "Due time" }));
    }

    #[test]
    fn test_dash_tag_leaves_project_unset() {
        let text = SAMPLE.replace("Tag: P2683R2C8G24", "Tag: -");
        let info = read_snapshot(&text).unwrap();
        assert_eq!(info.protein_tag, "-");
        assert_eq!(info.project_info, None);
    }

    #[test]
    fn test_progress_defaults_to_zero() {
        let text = SAMPLE
            .lines()
            .filter(|line| !line.starts_with("Progress"))
            .collect::<Vec<_>>()
            .join("\n");
        let info = read_snapshot(&text).unwrap();
        assert_eq!(info.progress, 0);
    }

    #[test]
    fn test_bad_time_names_the_field() {
        let text = SAMPLE.replace("Download time: November 24 21:53:46", "Download time: soon");
        let err = read_snapshot(&text).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::InvalidField {
                field: "Download time",
                ..
            }
        ));
    }
}
