//! Stateless record checks. Everything here is a pure function that
//! reports validity through its return value; the store turns the
//! outcomes into typed errors before any mutation happens.

use crate::post::PostDraft;
use regex::Regex;

/// Shape of a serialized calendar date. Components must be zero padded;
/// `2023-6-7` is rejected even though the range checks would pass.
const DATE_PATTERN: &str = r"^(?<year>\d{4})-(?<month>\d{2})-(?<day>\d{2})$";

/// Names of the draft fields that are absent or empty, in canonical
/// field order. An empty result means the draft is complete.
pub fn validate_required(draft: &PostDraft) -> Vec<&'static str> {
    draft
        .fields()
        .into_iter()
        .filter(|(_, value)| value.map_or(true, str::is_empty))
        .map(|(name, _)| name)
        .collect()
}

/// True iff `value` is a real `YYYY-MM-DD` calendar date.
pub fn validate_date(value: &str) -> bool {
    parse_date(value).is_some()
}

/// Split a serialized date into `(year, month, day)`, checking that the
/// components name a date that actually exists. Shared with the date
/// sort, which needs the parsed tuple for comparisons.
pub fn parse_date(value: &str) -> Option<(u16, u8, u8)> {
    let Ok(pattern) = Regex::new(DATE_PATTERN) else {
        return None;
    };
    let captures = pattern.captures(value)?;
    let year: u16 = captures.name("year")?.as_str().parse().ok()?;
    let month: u8 = captures.name("month")?.as_str().parse().ok()?;
    let day: u8 = captures.name("day")?.as_str().parse().ok()?;

    if !(1..=12).contains(&month) {
        return None;
    }
    if day < 1 || day > days_in_month(year, month) {
        return None;
    }
    Some((year, month, day))
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_draft_passes() {
        let draft = PostDraft {
            title: Some("First Post".into()),
            content: Some("This is my first post.".into()),
            author: Some("John Doe".into()),
            date: Some("2023-03-22".into()),
        };
        assert!(validate_required(&draft).is_empty());
    }

    #[test]
    fn absent_and_empty_count_as_missing() {
        let draft = PostDraft {
            title: None,
            content: Some("".into()),
            author: Some("John Doe".into()),
            date: Some("2023-03-22".into()),
        };
        assert_eq!(validate_required(&draft), vec!["title", "content"]);
    }

    #[test]
    fn accepts_real_dates() {
        for date in ["2023-06-07", "2013-06-23", "2024-02-29", "1999-12-31"] {
            assert!(validate_date(date), "{date} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_dates() {
        for date in [
            "",
            "yesterday",
            "2023-13-01",
            "2023-00-10",
            "2023-04-31",
            "2023-02-30",
            "2023-02-29", // not a leap year
            "23-04-01",
            "2023/04/01",
            "2023-04-011",
        ] {
            assert!(!validate_date(date), "{date} should be rejected");
        }
    }

    #[test]
    fn rejects_unpadded_components() {
        assert!(!validate_date("2023-6-7"));
        assert!(!validate_date("2023-06-7"));
    }

    #[test]
    fn parse_date_returns_components() {
        assert_eq!(parse_date("2023-06-07"), Some((2023, 6, 7)));
        assert_eq!(parse_date("2400-02-29"), Some((2400, 2, 29)));
        assert_eq!(parse_date("2100-02-29"), None);
    }
}
