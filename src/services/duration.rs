//! Work duration from start/end clock times
//!
//! An end time earlier than the start time is a shift crossing midnight.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::{LogbookError, Result};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// `HH:MM`, with an optional `:SS` (00-59) that is ignored. ASCII digits only.
static CLOCK_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{2}):([0-9]{2})(?::[0-5][0-9])?$").expect("valid regex"));

/// A wall-clock time of day, minute precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockTime {
    hour: u32,
    minute: u32,
}

impl ClockTime {
    /// Parse an `HH:MM` string. Hour must be 0-23, minute 0-59.
    pub fn parse(s: &str) -> Result<Self> {
        let caps = CLOCK_TIME_RE
            .captures(s.trim())
            .ok_or_else(|| LogbookError::validation(format!("invalid time {:?}, expected HH:MM", s)))?;

        let hour: u32 = caps[1]
            .parse()
            .map_err(|_| LogbookError::validation(format!("invalid hour in {:?}", s)))?;
        let minute: u32 = caps[2]
            .parse()
            .map_err(|_| LogbookError::validation(format!("invalid minute in {:?}", s)))?;

        if hour > 23 {
            return Err(LogbookError::validation(format!(
                "hour out of range in {:?}",
                s
            )));
        }
        if minute > 59 {
            return Err(LogbookError::validation(format!(
                "minute out of range in {:?}",
                s
            )));
        }

        Ok(Self { hour, minute })
    }

    pub fn minutes_since_midnight(self) -> u32 {
        self.hour * 60 + self.minute
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Elapsed minutes between two clock times, wrapping past midnight
pub fn minutes_between(start: ClockTime, end: ClockTime) -> u32 {
    let (s, e) = (start.minutes_since_midnight(), end.minutes_since_midnight());
    if e >= s {
        e - s
    } else {
        e + MINUTES_PER_DAY - s
    }
}

/// Work minutes for optional `HH:MM` strings.
///
/// `Ok(None)` when either side is absent (not computable);
/// `Err(Validation)` when a present side is malformed.
pub fn work_minutes(start: Option<&str>, end: Option<&str>) -> Result<Option<u32>> {
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) if !s.trim().is_empty() && !e.trim().is_empty() => (s, e),
        _ => return Ok(None),
    };
    let start = ClockTime::parse(start)?;
    let end = ClockTime::parse(end)?;
    Ok(Some(minutes_between(start, end)))
}

/// "8時間30分" / "8時間0分"
pub fn format_hours_minutes(minutes: u32) -> String {
    format!("{}時間{}分", minutes / 60, minutes % 60)
}

/// "8時間30分", or "8時間" when the minute part is zero
pub fn format_hours_minutes_compact(minutes: u32) -> String {
    let (h, m) = (minutes / 60, minutes % 60);
    if m == 0 {
        format!("{}時間", h)
    } else {
        format!("{}時間{}分", h, m)
    }
}

/// Decimal hours with one decimal place: 510 → "8.5"
pub fn format_decimal_hours(minutes: u32) -> String {
    format!("{:.1}", f64::from(minutes) / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_shift() {
        assert_eq!(work_minutes(Some("09:00"), Some("17:30")).unwrap(), Some(510));
    }

    #[test]
    fn test_midnight_rollover() {
        assert_eq!(work_minutes(Some("23:00"), Some("01:00")).unwrap(), Some(120));
    }

    #[test]
    fn test_same_time_is_zero() {
        assert_eq!(work_minutes(Some("09:00"), Some("09:00")).unwrap(), Some(0));
    }

    #[test]
    fn test_absent_not_computable() {
        assert_eq!(work_minutes(None, Some("17:30")).unwrap(), None);
        assert_eq!(work_minutes(Some("09:00"), None).unwrap(), None);
        assert_eq!(work_minutes(Some(""), Some("17:30")).unwrap(), None);
    }

    #[test]
    fn test_malformed_time_is_validation_error() {
        let err = work_minutes(Some("9"), Some("17:30")).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_out_of_range_components_rejected() {
        assert!(ClockTime::parse("24:00").is_err());
        assert!(ClockTime::parse("12:60").is_err());
        assert!(ClockTime::parse("ab:cd").is_err());
        assert!(ClockTime::parse("9:00").is_err());
    }

    #[test]
    fn test_seconds_component_ignored() {
        let t = ClockTime::parse("08:15:00").unwrap();
        assert_eq!(t.minutes_since_midnight(), 8 * 60 + 15);
        assert_eq!(t.to_string(), "08:15");
    }

    #[test]
    fn test_seconds_and_digits_checked() {
        assert!(ClockTime::parse("08:15:59").is_ok());
        assert!(ClockTime::parse("08:15:99").unwrap_err().is_validation());
        assert!(ClockTime::parse("08:15:6").is_err());
        // Full-width and Arabic-Indic digits
        assert!(ClockTime::parse("０８:１５").unwrap_err().is_validation());
        assert!(ClockTime::parse("٠٨:١٥").unwrap_err().is_validation());
    }

    #[test]
    fn test_format_hours_minutes() {
        assert_eq!(format_hours_minutes(510), "8時間30分");
        assert_eq!(format_hours_minutes(480), "8時間0分");
        assert_eq!(format_hours_minutes(0), "0時間0分");
    }

    #[test]
    fn test_format_hours_minutes_compact() {
        assert_eq!(format_hours_minutes_compact(480), "8時間");
        assert_eq!(format_hours_minutes_compact(125), "2時間5分");
    }

    #[test]
    fn test_format_decimal_hours() {
        assert_eq!(format_decimal_hours(510), "8.5");
        assert_eq!(format_decimal_hours(480), "8.0");
        assert_eq!(format_decimal_hours(500), "8.3");
    }
}
