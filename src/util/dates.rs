//! Thin, best-effort parsing of the date phrases people type at a prompt.
//!
//! Accepted forms (case-insensitive):
//! - `today`, `tomorrow`, a weekday name, `this <weekday>`, `next <weekday>`
//! - any of the above followed by a time: `tomorrow 9am`, `friday at 17:30`
//! - a bare time (`17:00`, `5pm`), meaning today
//! - `in N minutes|hours|days|weeks`
//! - `this week` / `next week` (the coming Sunday, or the one after)
//! - ISO dates `YYYY-MM-DD`, optionally with ` HH:MM` or `THH:MM`
//!
//! Calendar words resolve in the local time zone. Forms without a time take
//! the caller's `default_time`.

use std::sync::LazyLock;

use chrono::{
    DateTime, Datelike, Days, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
    Weekday,
};
use regex::Regex;

use crate::model::view::local_date;

static RELATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^in (\d+) (minutes?|mins?|hours?|hrs?|days?|weeks?)$").expect("valid regex")
});

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})(?::(\d{2}))?\s*(am|pm)?$").expect("valid regex")
});

/// End-of-day time used for due dates given without a time
pub const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 0) {
    Some(t) => t,
    None => panic!("23:59 is a valid time"),
};

/// Error type for date phrase parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateParseError {
    #[error("could not understand date '{0}'")]
    Unrecognized(String),
    #[error("invalid time '{0}' (use HH:MM or 9am)")]
    InvalidTime(String),
    #[error("{0} does not exist in the local time zone")]
    Nonexistent(NaiveDateTime),
}

/// Parse a date phrase relative to `now`.
pub fn parse_when(
    input: &str,
    default_time: NaiveTime,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, DateParseError> {
    let lower = input.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    if lower.is_empty() {
        return Err(DateParseError::Unrecognized(input.to_string()));
    }
    let today = local_date(now);

    if let Some(caps) = RELATIVE_RE.captures(&lower) {
        let n: u32 = caps[1]
            .parse()
            .map_err(|_| DateParseError::Unrecognized(input.to_string()))?;
        let unit = &caps[2];
        return match unit.chars().next() {
            Some('m') => Ok(now + Duration::minutes(i64::from(n))),
            Some('h') => Ok(now + Duration::hours(i64::from(n))),
            Some('w') => at_local(add_days(today, n * 7, input)?, default_time),
            _ => at_local(add_days(today, n, input)?, default_time),
        };
    }

    match lower.as_str() {
        "this week" => return at_local(coming_sunday(today, 0, input)?, default_time),
        "next week" => return at_local(coming_sunday(today, 7, input)?, default_time),
        _ => {}
    }

    if let Ok(time) = parse_time(&lower) {
        return at_local(today, time);
    }

    let (day, rest) = split_day(&lower, today, input)?;
    let rest = rest.strip_prefix("at ").unwrap_or(rest).trim();
    let time = if rest.is_empty() {
        default_time
    } else {
        parse_time(rest)?
    };
    at_local(day, time)
}

/// Resolve the leading day phrase, returning the date and the unparsed tail
fn split_day<'a>(
    lower: &'a str,
    today: NaiveDate,
    input: &str,
) -> Result<(NaiveDate, &'a str), DateParseError> {
    let (first, rest) = lower.split_once(' ').unwrap_or((lower, ""));

    match first {
        "today" => return Ok((today, rest)),
        "tomorrow" => return Ok((add_days(today, 1, input)?, rest)),
        "this" | "next" => {
            let (name, tail) = rest.split_once(' ').unwrap_or((rest, ""));
            let weekday = name
                .parse::<Weekday>()
                .map_err(|_| DateParseError::Unrecognized(input.to_string()))?;
            let mut day = next_weekday(today, weekday, input)?;
            if first == "next" {
                day = add_days(day, 7, input)?;
            }
            return Ok((day, tail));
        }
        _ => {}
    }

    if let Ok(weekday) = first.parse::<Weekday>() {
        return Ok((next_weekday(today, weekday, input)?, rest));
    }

    // 2024-01-10, 2024-01-10 17:00, 2024-01-10t17:00
    let (date_part, inline_time) = match first.split_once('t') {
        Some((d, t)) => (d, Some(t)),
        None => (first, None),
    };
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| DateParseError::Unrecognized(input.to_string()))?;
    match inline_time {
        Some(t) if rest.is_empty() => Ok((date, t)),
        Some(_) => Err(DateParseError::Unrecognized(input.to_string())),
        None => Ok((date, rest)),
    }
}

/// Parse `HH:MM` (24-hour) or `H[:MM]am|pm`. A bare number is rejected.
fn parse_time(s: &str) -> Result<NaiveTime, DateParseError> {
    let invalid = || DateParseError::InvalidTime(s.to_string());
    let caps = TIME_RE.captures(s.trim()).ok_or_else(invalid)?;
    let hour: u32 = caps[1].parse().map_err(|_| invalid())?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().map_err(|_| invalid())?,
        None => 0,
    };
    let hour = match caps.get(3).map(|m| m.as_str()) {
        Some(meridiem) => {
            if !(1..=12).contains(&hour) {
                return Err(invalid());
            }
            match (meridiem, hour) {
                ("am", 12) => 0,
                ("am", h) => h,
                ("pm", 12) => 12,
                (_, h) => h + 12,
            }
        }
        None if caps.get(2).is_some() => hour,
        None => return Err(invalid()),
    };
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Next occurrence of `weekday` strictly after `today` (1..=7 days ahead)
fn next_weekday(today: NaiveDate, weekday: Weekday, input: &str) -> Result<NaiveDate, DateParseError> {
    let current = today.weekday().num_days_from_sunday();
    let target = weekday.num_days_from_sunday();
    let mut ahead = (target + 7 - current) % 7;
    if ahead == 0 {
        ahead = 7;
    }
    add_days(today, ahead, input)
}

/// The Sunday closing the current week, plus `extra` days
fn coming_sunday(today: NaiveDate, extra: u32, input: &str) -> Result<NaiveDate, DateParseError> {
    let ahead = 7 - today.weekday().num_days_from_sunday();
    add_days(today, ahead + extra, input)
}

fn add_days(date: NaiveDate, n: u32, input: &str) -> Result<NaiveDate, DateParseError> {
    date.checked_add_days(Days::new(u64::from(n)))
        .ok_or_else(|| DateParseError::Unrecognized(input.to_string()))
}

fn at_local(date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>, DateParseError> {
    let naive = date.and_time(time);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or(DateParseError::Nonexistent(naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_helpers::local;

    fn nine() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    }

    // Wednesday morning
    fn now() -> DateTime<Utc> {
        local(2024, 1, 10, 8, 0)
    }

    fn parse(s: &str) -> Result<DateTime<Utc>, DateParseError> {
        parse_when(s, END_OF_DAY, now())
    }

    #[test]
    fn day_words() {
        assert_eq!(parse("today").unwrap(), local(2024, 1, 10, 23, 59));
        assert_eq!(parse("Tomorrow").unwrap(), local(2024, 1, 11, 23, 59));
        assert_eq!(parse_when("tomorrow", nine(), now()).unwrap(), local(2024, 1, 11, 9, 0));
    }

    #[test]
    fn weekdays_are_strictly_ahead() {
        assert_eq!(parse("friday").unwrap(), local(2024, 1, 12, 23, 59));
        assert_eq!(parse("wednesday").unwrap(), local(2024, 1, 17, 23, 59));
        assert_eq!(parse("this friday").unwrap(), local(2024, 1, 12, 23, 59));
        assert_eq!(parse("next friday").unwrap(), local(2024, 1, 19, 23, 59));
    }

    #[test]
    fn day_with_time() {
        assert_eq!(parse("tomorrow 9am").unwrap(), local(2024, 1, 11, 9, 0));
        assert_eq!(parse("friday at 17:30").unwrap(), local(2024, 1, 12, 17, 30));
        assert_eq!(parse("today 12pm").unwrap(), local(2024, 1, 10, 12, 0));
        assert_eq!(parse("today 12am").unwrap(), local(2024, 1, 10, 0, 0));
    }

    #[test]
    fn bare_time_means_today() {
        assert_eq!(parse("17:00").unwrap(), local(2024, 1, 10, 17, 0));
        assert_eq!(parse("5pm").unwrap(), local(2024, 1, 10, 17, 0));
    }

    #[test]
    fn relative_offsets() {
        assert_eq!(parse("in 30 minutes").unwrap(), now() + Duration::minutes(30));
        assert_eq!(parse("in 1 hour").unwrap(), now() + Duration::hours(1));
        assert_eq!(parse("in 2 days").unwrap(), local(2024, 1, 12, 23, 59));
        assert_eq!(parse("in 1 week").unwrap(), local(2024, 1, 17, 23, 59));
    }

    #[test]
    fn week_shortcuts_end_on_sunday() {
        assert_eq!(parse("this week").unwrap(), local(2024, 1, 14, 23, 59));
        assert_eq!(parse("next week").unwrap(), local(2024, 1, 21, 23, 59));
    }

    #[test]
    fn iso_dates() {
        assert_eq!(parse("2024-02-01").unwrap(), local(2024, 2, 1, 23, 59));
        assert_eq!(parse("2024-02-01 14:30").unwrap(), local(2024, 2, 1, 14, 30));
        assert_eq!(parse("2024-02-01T14:30").unwrap(), local(2024, 2, 1, 14, 30));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(parse("someday"), Err(DateParseError::Unrecognized(_))));
        assert!(matches!(parse(""), Err(DateParseError::Unrecognized(_))));
        assert!(matches!(parse("tomorrow 25:00"), Err(DateParseError::InvalidTime(_))));
        assert!(matches!(parse("tomorrow 13pm"), Err(DateParseError::InvalidTime(_))));
        assert!(matches!(parse("tomorrow 9"), Err(DateParseError::InvalidTime(_))));
    }
}
