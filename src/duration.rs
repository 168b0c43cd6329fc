//! Free-text duration parsing and canonical formatting for recipe
//! prep/cook times.
//!
//! Input like `"1h 30m"` or `"2w 3d"` is matched against an ordered,
//! all-optional sequence of weeks/days/hours/minutes/seconds components
//! and normalized to elapsed seconds. A string that does not fully match
//! the grammar yields `None`, which callers must surface as a validation
//! failure; the empty string matches trivially and yields the zero
//! duration.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

const WEEKS: &str = r"(?P<weeks>[\d.]+)\s*(?:w|wks?|weeks?)";
const DAYS: &str = r"(?P<days>[\d.]+)\s*(?:d|dys?|days?)";
const HOURS: &str = r"(?P<hours>[\d.]+)\s*(?:h|hrs?|hours?)";
const MINS: &str = r"(?P<minutes>[\d.]+)\s*(?:m|mins?|minutes?)";
const SECS: &str = r"(?P<seconds>[\d.]+)\s*(?:s|secs?|seconds?)";

static TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?i)^(?:{WEEKS})?\s*(?:{DAYS})?\s*(?:{HOURS})?\s*(?:{MINS})?\s*(?:{SECS})?$"
    );
    Regex::new(&pattern).unwrap()
});

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * 60;
const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
const SECONDS_PER_WEEK: i64 = 7 * 24 * 60 * 60;

/// A non-negative elapsed time span, normalized to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Duration {
    secs: i64,
}

impl Duration {
    /// Component counts large enough to overflow the second count
    /// saturate at the maximum representable duration.
    pub fn new(weeks: i64, days: i64, hours: i64, minutes: i64, seconds: i64) -> Duration {
        let secs = weeks
            .saturating_mul(SECONDS_PER_WEEK)
            .saturating_add(days.saturating_mul(SECONDS_PER_DAY))
            .saturating_add(hours.saturating_mul(SECONDS_PER_HOUR))
            .saturating_add(minutes.saturating_mul(SECONDS_PER_MINUTE))
            .saturating_add(seconds);
        Duration::from_seconds(secs)
    }

    /// Negative inputs (which the grammar cannot produce, but a raw
    /// database column could) are clamped to zero.
    pub fn from_seconds(secs: i64) -> Duration {
        Duration { secs: secs.max(0) }
    }

    pub fn as_seconds(self) -> i64 {
        self.secs
    }
}

/// Parses a free-text duration like `"1h 30m"` into a [`Duration`].
///
/// Components must appear in weeks, days, hours, minutes, seconds order,
/// each one optional, units matched case-insensitively against a fixed
/// synonym set. The whole input must be consumed, otherwise the result
/// is `None` (absence, not zero). Numeric literals may carry a decimal
/// part, which is truncated.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let caps = TIME_REGEX.captures(input)?;
    let mut total = 0i64;
    for (name, unit_secs) in [
        ("weeks", SECONDS_PER_WEEK),
        ("days", SECONDS_PER_DAY),
        ("hours", SECONDS_PER_HOUR),
        ("minutes", SECONDS_PER_MINUTE),
        ("seconds", 1),
    ] {
        if let Some(quantity) = caps.name(name) {
            // `[\d.]+` admits things like "1.2.3" that are not numbers;
            // those fail here and the whole parse reports no value.
            let quantity = quantity.as_str().parse::<f64>().ok()? as i64;
            // Quantities big enough to overflow the second count are
            // treated like any other unparseable input.
            total = quantity
                .checked_mul(unit_secs)
                .and_then(|secs| total.checked_add(secs))?;
        }
    }
    Some(Duration::from_seconds(total))
}

/// Formats an optional duration, treating absence as the zero duration.
pub fn format_duration(duration: Option<Duration>) -> String {
    duration.unwrap_or_default().to_string()
}

impl fmt::Display for Duration {
    /// Canonical form `"{days}d {hours}h {minutes}m {seconds}s"`. Weeks
    /// are folded into the day count and never re-emitted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = self.secs / SECONDS_PER_DAY;
        let remainder = self.secs % SECONDS_PER_DAY;
        let hours = remainder / SECONDS_PER_HOUR;
        let remainder = remainder % SECONDS_PER_HOUR;
        let minutes = remainder / SECONDS_PER_MINUTE;
        let seconds = remainder % SECONDS_PER_MINUTE;
        write!(f, "{days}d {hours}h {minutes}m {seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_zero_not_absent() {
        assert_eq!(parse_duration(""), Some(Duration::default()));
    }

    #[test]
    fn hours_and_minutes() {
        let parsed = parse_duration("1h 30m").unwrap();
        assert_eq!(parsed, Duration::new(0, 0, 1, 30, 0));
        assert_eq!(parsed.to_string(), "0d 1h 30m 0s");
    }

    #[test]
    fn weeks_fold_into_days_on_format() {
        let parsed = parse_duration("2w 3d").unwrap();
        assert_eq!(parsed.as_seconds(), 17 * 24 * 60 * 60);
        assert_eq!(parsed.to_string(), "17d 0h 0m 0s");
    }

    #[test]
    fn garbage_is_absent() {
        assert_eq!(parse_duration("banana"), None);
        assert_eq!(parse_duration("1h banana"), None);
    }

    #[test]
    fn out_of_order_components_are_absent() {
        assert_eq!(parse_duration("3h 2w"), None);
        assert_eq!(parse_duration("30m 1h"), None);
    }

    #[test]
    fn unit_synonyms_and_case() {
        assert_eq!(parse_duration("2 weeks"), parse_duration("2w"));
        assert_eq!(parse_duration("5 MINS"), Some(Duration::new(0, 0, 0, 5, 0)));
        assert_eq!(parse_duration("90 Sec"), Some(Duration::new(0, 0, 0, 0, 90)));
        assert_eq!(parse_duration("1dy 2hrs"), Some(Duration::new(0, 1, 2, 0, 0)));
    }

    #[test]
    fn decimal_quantities_truncate() {
        assert_eq!(parse_duration("1.9h"), Some(Duration::new(0, 0, 1, 0, 0)));
        // `[\d.]+` can capture non-numbers; those are a failed parse, not zero
        assert_eq!(parse_duration("1.2.3h"), None);
    }

    #[test]
    fn sub_unit_counts_are_not_renormalized_on_parse() {
        // 90 minutes stays 90 minutes of elapsed time
        assert_eq!(
            parse_duration("90m").unwrap().as_seconds(),
            90 * SECONDS_PER_MINUTE
        );
        assert_eq!(parse_duration("90m").unwrap().to_string(), "0d 1h 30m 0s");
    }

    #[test]
    fn absurd_quantities_are_absent_not_a_panic() {
        assert_eq!(parse_duration("99999999999999999999w"), None);
        assert_eq!(parse_duration("1w 9223372036854775807s"), None);
        // the struct constructor saturates instead
        assert_eq!(
            Duration::new(i64::MAX, 0, 0, 0, 1),
            Duration::from_seconds(i64::MAX)
        );
    }

    #[test]
    fn format_of_absent_is_zero() {
        assert_eq!(format_duration(None), "0d 0h 0m 0s");
    }

    #[test]
    fn format_parse_round_trip_is_exact() {
        for secs in [0, 59, 60, 3599, 3600, 86399, 86400, 17 * 86400 + 3723] {
            let duration = Duration::from_seconds(secs);
            let reparsed = parse_duration(&duration.to_string()).unwrap();
            assert_eq!(reparsed, duration, "round-trip failed for {secs}s");
        }
    }
}
