//! Parsing of currency, number, timestamp and email values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern must compile"));

static SEPARATED_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{1,2})[./-](\d{1,2})[./-](\d{4}|\d{2})(?:[T ,]+(\d{1,2}):(\d{2})(?::(\d{2}))?\s*([AaPp][Mm])?)?$",
    )
    .expect("date pattern must compile")
});

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y"];

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥'];

/// Whether a value looks like an email address.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value.trim())
}

/// Parse a monetary or plain number.
///
/// Currency symbols, thousands separators and whitespace are ignored.
/// Anything that does not reduce to a finite number is `None`, never zero.
pub fn parse_currency(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a date or timestamp, interpreting zone-less values as UTC.
///
/// Standard formats are tried first. Day/month/year values separated by
/// `/`, `.` or `-` are read month-first, unless the first part cannot be
/// a month.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt.with_timezone(&Utc));
    }

    let value = value
        .strip_suffix(" UTC")
        .or_else(|| value.strip_suffix(" GMT"))
        .unwrap_or(value);

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date.and_time(NaiveTime::MIN).and_utc());
        }
    }

    parse_separated_date(value)
}

fn parse_separated_date(value: &str) -> Option<DateTime<Utc>> {
    let caps = SEPARATED_DATE.captures(value)?;
    let first: u32 = caps[1].parse().ok()?;
    let second: u32 = caps[2].parse().ok()?;
    let mut year: i32 = caps[3].parse().ok()?;
    if caps[3].len() == 2 {
        year += 2000;
    }

    let (month, day) = if first > 12 && second <= 12 {
        (second, first)
    } else {
        (first, second)
    };
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let time = match caps.get(4) {
        Some(hour) => {
            let mut hour: u32 = hour.as_str().parse().ok()?;
            let minute: u32 = caps[5].parse().ok()?;
            let second: u32 = caps.get(6).map_or(Some(0), |s| s.as_str().parse().ok())?;
            if let Some(meridiem) = caps.get(7) {
                if hour == 0 || hour > 12 {
                    return None;
                }
                let pm = meridiem.as_str().eq_ignore_ascii_case("pm");
                hour = match (hour, pm) {
                    (12, false) => 0,
                    (12, true) => 12,
                    (h, true) => h + 12,
                    (h, false) => h,
                };
            }
            NaiveTime::from_hms_opt(hour, minute, second)?
        }
        None => NaiveTime::MIN,
    };

    Some(date.and_time(time).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency("$1,234.56"), Some(1234.56));
        assert_eq!(parse_currency(" 42 "), Some(42.0));
        assert_eq!(parse_currency("-$5.00"), Some(-5.0));
        assert_eq!(parse_currency("€ 1 000"), Some(1000.0));
        assert_eq!(parse_currency("abc"), None);
        assert_eq!(parse_currency("$"), None);
        assert_eq!(parse_currency("inf"), None);
        assert_eq!(parse_currency("NaN"), None);
    }

    #[test]
    fn test_email() {
        assert!(is_valid_email("jane.doe+tag@example.co.uk"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane doe@example.com"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn test_parse_iso_forms() {
        let dt = parse_timestamp("2024-03-05T14:30:00Z").unwrap();
        assert_eq!((dt.month(), dt.day(), dt.hour()), (3, 5, 14));

        let dt = parse_timestamp("2024-03-05T14:30:00+02:00").unwrap();
        assert_eq!(dt.hour(), 12);

        let dt = parse_timestamp("2024-03-05 14:30:00 UTC").unwrap();
        assert_eq!(dt.minute(), 30);

        let dt = parse_timestamp("2024-03-05").unwrap();
        assert_eq!((dt.year(), dt.hour()), (2024, 0));

        assert!(parse_timestamp("March 5, 2024").is_some());
    }

    #[test]
    fn test_ambiguous_dates_are_month_first() {
        let dt = parse_timestamp("03/05/2024").unwrap();
        assert_eq!((dt.month(), dt.day()), (3, 5));

        let dt = parse_timestamp("3.5.24").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 3, 5));
    }

    #[test]
    fn test_unambiguous_day_first() {
        let dt = parse_timestamp("25/12/2023").unwrap();
        assert_eq!((dt.month(), dt.day()), (12, 25));
    }

    #[test]
    fn test_separated_date_with_time() {
        let dt = parse_timestamp("12/31/2023 9:15 PM").unwrap();
        assert_eq!((dt.month(), dt.day(), dt.hour(), dt.minute()), (12, 31, 21, 15));

        let dt = parse_timestamp("1/2/2024 12:00 am").unwrap();
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn test_invalid_dates() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("13/13/2024").is_none());
        assert!(parse_timestamp("02/30/2024").is_none());
        assert!(parse_timestamp("1/2/2024 13:00 pm").is_none());
    }
}
