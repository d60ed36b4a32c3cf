//! Time helpers shared by the dialect parsers and the snapshot reader.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Legacy artifacts print yearless dates (`September 7 23:11:31`). The
/// client never wrote a year, so readers substitute the current UTC year —
/// the only environmental input in the pipeline.
pub(crate) fn current_utc_year() -> i32 {
    Utc::now().year()
}

pub(crate) fn month_number(name: &str) -> Option<u32> {
    let month = match name {
        "January" => 1,
        "February" => 2,
        "March" => 3,
        "April" => 4,
        "May" => 5,
        "June" => 6,
        "July" => 7,
        "August" => 8,
        "September" => 9,
        "October" => 10,
        "November" => 11,
        "December" => 12,
        _ => return None,
    };
    Some(month)
}

/// Parse `<month-name> <day> <hh:mm:ss>` (optionally suffixed ` UTC`) into a
/// UTC datetime in the current year.
pub(crate) fn parse_yearless_utc(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim().trim_end_matches(" UTC").trim();
    let mut parts = text.split_whitespace();
    let month = month_number(parts.next()?)?;
    let day: u32 = parts.next()?.parse().ok()?;
    let time = NaiveTime::parse_from_str(parts.next()?, "%H:%M:%S").ok()?;
    if parts.next().is_some() {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(current_utc_year(), month, day)?;
    Some(Utc.from_utc_datetime(&date.and_time(time)))
}

/// Parse the v7 `Log Started` stamp: ISO 8601, or the older
/// `dd/MMM/yyyy-HH:mm:ss` form. Both are wall-clock UTC.
pub(crate) fn parse_log_started_utc(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Some(stamp.with_timezone(&Utc));
    }
    if let Ok(stamp) = NaiveDateTime::parse_from_str(text, "%d/%b/%Y-%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&stamp));
    }
    None
}

/// The time of day a line carries in its prefix: `[hh:mm:ss]` for legacy
/// lines, a bare leading `hh:mm:ss:` for v7 lines.
pub(crate) fn line_time_of_day(raw: &str) -> Option<NaiveTime> {
    if raw.starts_with('[') {
        let stamp = raw.get(1..9)?;
        return NaiveTime::parse_from_str(stamp, "%H:%M:%S").ok();
    }
    if raw.as_bytes().get(8) == Some(&b':') {
        let stamp = raw.get(..8)?;
        return NaiveTime::parse_from_str(stamp, "%H:%M:%S").ok();
    }
    None
}

/// Delta between consecutive frame stamps of one unit. Lines carry only a
/// time of day, so a smaller `next` means the clock rolled past midnight.
pub(crate) fn frame_delta(prev: NaiveTime, next: NaiveTime) -> Duration {
    let delta = next.signed_duration_since(prev);
    if delta < Duration::zero() {
        delta + Duration::hours(24)
    } else {
        delta
    }
}

/// Core versions are usually `major.minor` but some cores print a bare
/// integer.
pub(crate) fn parse_core_version(text: &str) -> Option<f32> {
    text.trim().parse::<f32>().ok()
}
