//! Display formatting for raw backend timestamps.
//!
//! The backend sends timestamps in ISO 8601 form. The UI shows them as
//! `YYYY-MM-DD HH:MM:SS` in China Standard Time (UTC+8), the timezone of the
//! ZenTao deployments this client targets.

use chrono::{DateTime, FixedOffset, Utc};

/// Offset of the display timezone from UTC, in seconds.
const DISPLAY_OFFSET_SECONDS: i32 = 8 * 3600;

/// Pattern used for every display-formatted timestamp.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Text shown for an empty raw timestamp.
pub const UNKNOWN_TIME: &str = "unknown";

/// Formats a raw backend timestamp for display.
///
/// - RFC 3339 input (any offset) is converted to UTC+8
/// - Other input `chrono` can read as a UTC datetime is converted the same way
/// - Empty input yields [`UNKNOWN_TIME`]
/// - Anything else is returned unchanged
///
/// # Examples
///
/// ```
/// use zentao_desk::domain::time::format_display;
///
/// assert_eq!(format_display("2024-05-01T02:03:04Z"), "2024-05-01 10:03:04");
/// assert_eq!(format_display(""), "unknown");
/// ```
#[must_use]
pub fn format_display(raw: &str) -> String {
    if raw.is_empty() {
        return UNKNOWN_TIME.to_string();
    }

    let Some(offset) = FixedOffset::east_opt(DISPLAY_OFFSET_SECONDS) else {
        return raw.to_string();
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&offset).format(DISPLAY_FORMAT).to_string();
    }

    match raw.parse::<DateTime<Utc>>() {
        Ok(parsed) => parsed.with_timezone(&offset).format(DISPLAY_FORMAT).to_string(),
        Err(e) => {
            tracing::debug!(raw = %raw, error = %e, "timestamp not parseable, showing raw value");
            raw.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_utc_to_display_zone() {
        assert_eq!(format_display("2024-05-01T02:03:04Z"), "2024-05-01 10:03:04");
    }

    #[test]
    fn rolls_over_midnight() {
        assert_eq!(format_display("2023-12-31T20:30:00Z"), "2024-01-01 04:30:00");
    }

    #[test]
    fn keeps_wall_time_already_in_display_zone() {
        assert_eq!(
            format_display("2024-05-01T10:03:04+08:00"),
            "2024-05-01 10:03:04"
        );
    }

    #[test]
    fn empty_is_unknown() {
        assert_eq!(format_display(""), UNKNOWN_TIME);
    }

    #[test]
    fn unparseable_is_passed_through() {
        assert_eq!(format_display("yesterday"), "yesterday");
    }
}
