//! Display formatting shared by every frontend.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("invalid tag regex"));

/// Shown when a start time cannot be parsed.
pub const INVALID_DATE: &str = "Invalid Date";

/// Render an ISO-8601 timestamp in the local timezone, e.g. `Jan 1, 2024, 10:00 AM`.
pub fn format_start_time(raw: &str) -> String {
    format_start_time_in(raw, &Local)
}

/// Render an ISO-8601 timestamp in the given timezone.
///
/// Besides RFC 3339 this accepts basic offsets (`+0530`), offset-less times,
/// which are read as wall-clock time in `tz`, and bare dates, which are read
/// as UTC midnight.
pub fn format_start_time_in<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match parse_timestamp(raw.trim(), tz) {
        Some(parsed) => parsed.format("%b %-d, %Y, %I:%M %p").to_string(),
        None => INVALID_DATE.to_string(),
    }
}

fn parse_timestamp<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(tz));
    }
    if let Ok(parsed) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(parsed.with_timezone(tz));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return tz.from_local_datetime(&naive).earliest();
        }
    }
    let midnight = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight).with_timezone(tz))
}

/// Remove anything that looks like an HTML tag.
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").into_owned()
}

/// Display name for a platform token; unknown platforms are echoed back.
pub fn platform_label(raw: &str) -> String {
    match raw.to_lowercase().as_str() {
        "all" => "All Platforms".to_string(),
        "leetcode" => "LeetCode".to_string(),
        "codeforces" => "Codeforces".to_string(),
        "codechef" => "CodeChef".to_string(),
        _ => raw.to_string(),
    }
}

/// Uppercase the first character.
pub fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
