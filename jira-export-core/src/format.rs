//! Display formatting shared by every export format.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Normalize a Jira timestamp to `YYYY-MM-DD HH:MM`.
///
/// Seconds and the zone offset are dropped; the wall-clock time is kept as
/// written, not converted. Unparseable input is truncated instead of rejected.
pub fn format_timestamp(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return dt.naive_local().format(TIMESTAMP_FORMAT).to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.naive_local().format(TIMESTAMP_FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(TIMESTAMP_FORMAT).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%Y-%m-%d 00:00").to_string();
    }
    // Best effort: "2024-01-15T10:30..." → "2024-01-15 10:30".
    raw.chars()
        .take(16)
        .map(|c| if c == 'T' { ' ' } else { c })
        .collect()
}

pub fn format_optional_timestamp(raw: Option<&str>) -> String {
    raw.map(format_timestamp).unwrap_or_else(|| "N/A".to_owned())
}

/// Human readable size: KB below 1024 KB, MB above, one decimal.
pub fn format_size(bytes: u64) -> String {
    let kb = bytes as f64 / 1024.0;
    // Decide on the printed value so "1024.0 KB" never appears.
    if (kb * 10.0).round() < 10240.0 {
        format!("{kb:.1} KB")
    } else {
        format!("{:.1} MB", kb / 1024.0)
    }
}

/// Story points print without a trailing `.0` when integral.
pub fn format_points(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{}", points as i64)
    } else {
        format!("{points}")
    }
}

/// Cut `text` to at most `max_chars` characters. Returns whether it was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => (text[..idx].to_owned(), true),
        None => (text.to_owned(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jira_timestamps_keep_wall_clock() {
        assert_eq!(format_timestamp("2024-01-15T10:30:45.123+0100"), "2024-01-15 10:30");
        assert_eq!(format_timestamp("2024-01-15T23:59:59Z"), "2024-01-15 23:59");
        assert_eq!(format_timestamp("2024-01-15"), "2024-01-15 00:00");
        assert_eq!(format_timestamp("2024-01-15T08:05garbage"), "2024-01-15 08:05");
    }

    #[test]
    fn sizes_switch_unit_at_one_megabyte() {
        assert_eq!(format_size(0), "0.0 KB");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(1024 * 1023), "1023.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_size(1024 * 1024 - 1), "1.0 MB");
        assert_eq!(format_size(1024 * 1024 - 52), "1023.9 KB");
        assert_eq!(format_size(5 * 1024 * 1024 + 512 * 1024), "5.5 MB");
    }

    #[test]
    fn truncation_is_char_based() {
        assert_eq!(truncate_chars("åäöxyz", 3), ("åäö".to_owned(), true));
        assert_eq!(truncate_chars("abc", 3), ("abc".to_owned(), false));
    }
}
