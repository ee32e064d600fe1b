//! UTC date helpers
//!
//! Scheduled dates are stored at noon UTC so that day-boundary comparisons
//! do not shift across client timezones.

use jiff::{Timestamp, civil::Date, tz::TimeZone};

/// Timestamp at 12:00:00 UTC on the given civil date.
///
/// # Errors
///
/// Fails only for dates outside the representable timestamp range.
pub fn date_at_noon_utc(date: Date) -> Result<Timestamp, jiff::Error> {
    date.at(12, 0, 0, 0)
        .to_zoned(TimeZone::UTC)
        .map(|zoned| zoned.timestamp())
}

/// The civil date of a timestamp, in UTC.
#[must_use]
pub fn utc_date(timestamp: Timestamp) -> Date {
    timestamp.to_zoned(TimeZone::UTC).date()
}

/// Start of the given civil date (00:00:00 UTC).
///
/// # Errors
///
/// Fails only for dates outside the representable timestamp range.
pub fn start_of_date_utc(date: Date) -> Result<Timestamp, jiff::Error> {
    date.to_zoned(TimeZone::UTC).map(|zoned| zoned.timestamp())
}

/// Whether `timestamp` falls on `now`'s UTC day or a later one.
#[must_use]
pub fn is_today_or_future(timestamp: Timestamp, now: Timestamp) -> bool {
    utc_date(timestamp) >= utc_date(now)
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn noon_utc_is_exactly_midday() {
        let ts = date_at_noon_utc(date(2025, 3, 15)).unwrap();

        assert_eq!(ts.to_string(), "2025-03-15T12:00:00Z");
    }

    #[test]
    fn utc_date_round_trips() {
        let ts = date_at_noon_utc(date(2025, 12, 31)).unwrap();

        assert_eq!(utc_date(ts), date(2025, 12, 31));
    }

    #[test]
    fn today_counts_as_today_or_future() {
        let now = date_at_noon_utc(date(2025, 6, 1)).unwrap();
        let morning = start_of_date_utc(date(2025, 6, 1)).unwrap();
        let yesterday = date_at_noon_utc(date(2025, 5, 31)).unwrap();
        let tomorrow = date_at_noon_utc(date(2025, 6, 2)).unwrap();

        assert!(is_today_or_future(morning, now));
        assert!(is_today_or_future(tomorrow, now));
        assert!(!is_today_or_future(yesterday, now));
    }
}
