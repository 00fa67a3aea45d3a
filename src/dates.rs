//! Deadline parsing and formatting.
//!
//! Deadlines are entered as text, either in the `datetime-local` style
//! (`2024-05-10T14:30`) or with relative words (`tomorrow 9:00`, `in 3d`,
//! `next friday`). Everything resolves to local time.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use crate::error::{Result, TodoError};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Attach the local time zone to a wall-clock time.
///
/// A time skipped by a DST jump is moved forward by an hour.
pub fn to_local(naive: NaiveDateTime) -> Option<DateTime<Local>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            let shifted = naive.checked_add_signed(Duration::hours(1))?;
            Local.from_local_datetime(&shifted).earliest()
        })
}

/// Parse deadline text. Empty input means "no deadline".
pub fn parse_deadline_input(s: &str, today: NaiveDate) -> Result<Option<DateTime<Local>>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Some(dt.with_timezone(&Local)));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return to_local(naive)
                .map(Some)
                .ok_or_else(|| TodoError::InvalidDeadline(s.to_string()));
        }
    }

    let (day_part, time) = split_trailing_time(s);
    let day = parse_day_words(day_part, today)
        .ok_or_else(|| TodoError::InvalidDeadline(s.to_string()))?;
    let time = time.unwrap_or(NaiveTime::MIN);
    to_local(day.and_time(time))
        .map(Some)
        .ok_or_else(|| TodoError::InvalidDeadline(s.to_string()))
}

/// Parse a calendar day for the daily view: `YYYY-MM-DD` or a relative word.
pub fn parse_day_input(s: &str, today: NaiveDate) -> Result<NaiveDate> {
    parse_day_words(s, today).ok_or_else(|| TodoError::InvalidDate(s.trim().to_string()))
}

fn split_trailing_time(s: &str) -> (&str, Option<NaiveTime>) {
    if let Some((head, tail)) = s.rsplit_once(char::is_whitespace) {
        let time = NaiveTime::parse_from_str(tail, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(tail, "%H:%M:%S"))
            .ok();
        if time.is_some() {
            return (head.trim_end(), time);
        }
    }
    (s, None)
}

/// `day` moved by `days`, or `None` when the result leaves chrono's date range.
fn add_days(day: NaiveDate, days: i64) -> Option<NaiveDate> {
    day.checked_add_signed(Duration::try_days(days)?)
}

/// Resolve human day input.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "monday" .. "sunday" (and three-letter forms), "this <day>", "next <day>"
/// - "in 3d", "in 2w"
/// - "YYYY-MM-DD"
fn parse_day_words(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return add_days(today, 1),
        "yesterday" => return add_days(today, -1),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return add_days(today, days);
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return add_days(today, weeks.checked_mul(7)?);
            }
        }
    }

    let weekdays = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
        ("mon", 0), ("tue", 1), ("wed", 2), ("thu", 3),
        ("fri", 4), ("sat", 5), ("sun", 6),
    ];
    let current = today.weekday().num_days_from_monday() as i64;
    for (name, target) in weekdays {
        let days_ahead = (target + 7 - current) % 7;
        if s == name || s == format!("this {name}") {
            return add_days(today, days_ahead);
        }
        if s == format!("next {name}") {
            let add = if days_ahead == 0 { 7 } else { days_ahead + 7 };
            return add_days(today, add);
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Format a day relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_day_relative(day: NaiveDate, today: NaiveDate) -> String {
    let delta = (day - today).num_days();
    match delta {
        0 => "today".into(),
        1 => "tomorrow".into(),
        d if d > 1 => format!("in {d}d"),
        d => format!("{}d late", -d),
    }
}

/// Absolute deadline plus a relative hint, or "-" when absent.
pub fn format_deadline(deadline: Option<DateTime<Local>>, today: NaiveDate) -> String {
    match deadline {
        None => "-".into(),
        Some(d) => format!(
            "{} ({})",
            d.format("%Y-%m-%d %H:%M"),
            format_day_relative(d.date_naive(), today)
        ),
    }
}

/// Deadline in the editable `YYYY-MM-DD HH:MM` form used by the add form.
pub fn format_deadline_input(deadline: DateTime<Local>) -> String {
    deadline.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2024-05-08 is a Wednesday.
    const TODAY: (i32, u32, u32) = (2024, 5, 8);

    fn today() -> NaiveDate {
        day(TODAY.0, TODAY.1, TODAY.2)
    }

    #[test]
    fn test_empty_means_no_deadline() {
        assert_eq!(parse_deadline_input("", today()).unwrap(), None);
        assert_eq!(parse_deadline_input("   ", today()).unwrap(), None);
    }

    #[test]
    fn test_datetime_local_forms() {
        for s in ["2024-05-10T14:30", "2024-05-10 14:30", "2024-05-10T14:30:00"] {
            let d = parse_deadline_input(s, today()).unwrap().unwrap();
            assert_eq!(d.date_naive(), day(2024, 5, 10));
            assert_eq!((d.hour(), d.minute()), (14, 30));
        }
    }

    #[test]
    fn test_date_only_is_midnight() {
        let d = parse_deadline_input("2024-05-10", today()).unwrap().unwrap();
        assert_eq!(d.date_naive(), day(2024, 5, 10));
        assert_eq!(d.time(), NaiveTime::MIN);
    }

    #[test]
    fn test_relative_words_with_time() {
        let d = parse_deadline_input("tomorrow 09:15", today()).unwrap().unwrap();
        assert_eq!(d.date_naive(), day(2024, 5, 9));
        assert_eq!((d.hour(), d.minute()), (9, 15));

        let d = parse_deadline_input("in 3d", today()).unwrap().unwrap();
        assert_eq!(d.date_naive(), day(2024, 5, 11));
    }

    #[test]
    fn test_weekdays() {
        assert_eq!(parse_day_input("friday", today()).unwrap(), day(2024, 5, 10));
        assert_eq!(parse_day_input("wed", today()).unwrap(), today());
        assert_eq!(parse_day_input("next wednesday", today()).unwrap(), day(2024, 5, 15));
        assert_eq!(parse_day_input("next friday", today()).unwrap(), day(2024, 5, 17));
        assert_eq!(parse_day_input("in 2w", today()).unwrap(), day(2024, 5, 22));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(
            parse_deadline_input("someday", today()),
            Err(TodoError::InvalidDeadline(_))
        ));
        assert!(matches!(
            parse_day_input("2024-13-01", today()),
            Err(TodoError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_huge_offsets_are_rejected() {
        assert!(matches!(
            parse_deadline_input("in 100000000d", today()),
            Err(TodoError::InvalidDeadline(_))
        ));
        assert!(matches!(
            parse_day_input("in 999999999999999d", today()),
            Err(TodoError::InvalidDate(_))
        ));
        assert!(matches!(
            parse_day_input("in 9999999999999999w", today()),
            Err(TodoError::InvalidDate(_))
        ));
        assert!(parse_day_input(&format!("in {}d", i64::MIN), today()).is_err());
    }

    #[test]
    fn test_format_relative() {
        assert_eq!(format_day_relative(today(), today()), "today");
        assert_eq!(format_day_relative(day(2024, 5, 9), today()), "tomorrow");
        assert_eq!(format_day_relative(day(2024, 5, 11), today()), "in 3d");
        assert_eq!(format_day_relative(day(2024, 5, 6), today()), "2d late");
        assert_eq!(format_deadline(None, today()), "-");
    }
}
