//! Human-facing formatting helpers shared by templates and CSV exports.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Utc, Weekday};

/// Philippine Standard Time, UTC+8, used for every displayed timestamp.
const PHT_OFFSET_SECS: i32 = 8 * 3600;

fn local(at: DateTime<Utc>) -> NaiveDateTime {
    FixedOffset::east_opt(PHT_OFFSET_SECS)
        .map_or_else(|| at.naive_utc(), |tz| at.with_timezone(&tz).naive_local())
}

/// `06/01/2024`.
#[must_use]
pub fn short_date(at: DateTime<Utc>) -> String {
    local(at).format("%m/%d/%Y").to_string()
}

/// `10:30 AM`.
#[must_use]
pub fn short_time(at: DateTime<Utc>) -> String {
    local(at).format("%I:%M %p").to_string()
}

/// `Jun 1, 2024`.
#[must_use]
pub fn long_date(at: DateTime<Utc>) -> String {
    local(at).format("%b %-d, %Y").to_string()
}

/// Calendar date in Philippine time.
#[must_use]
pub fn local_date(at: DateTime<Utc>) -> NaiveDate {
    local(at).date()
}

/// Day of the week in Philippine time.
#[must_use]
pub fn weekday(at: DateTime<Utc>) -> Weekday {
    local(at).weekday()
}

/// Relative age of `then` as seen at `now`.
///
/// "Just now" under a minute, then minutes, hours under a day, and days.
#[must_use]
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    let (value, unit) = match secs {
        0..60 => return "Just now".to_owned(),
        60..3600 => (secs / 60, "minute"),
        3600..86_400 => (secs / 3600, "hour"),
        _ => (secs / 86_400, "day"),
    };
    let plural = if value == 1 { "" } else { "s" };
    format!("{value} {unit}{plural} ago")
}

/// Uppercase the first character, lowercase the rest.
#[must_use]
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_time_ago_buckets() {
        let now = at(12, 0);
        assert_eq!(time_ago(now - Duration::seconds(59), now), "Just now");
        assert_eq!(time_ago(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(time_ago(now - Duration::minutes(59), now), "59 minutes ago");
        assert_eq!(time_ago(now - Duration::hours(2), now), "2 hours ago");
        assert_eq!(time_ago(now - Duration::hours(23), now), "23 hours ago");
        assert_eq!(time_ago(now - Duration::days(3), now), "3 days ago");
    }

    #[test]
    fn test_time_ago_future_is_just_now() {
        let now = at(12, 0);
        assert_eq!(time_ago(now + Duration::minutes(5), now), "Just now");
    }

    #[test]
    fn test_dates_are_in_philippine_time() {
        let evening_utc = Utc.with_ymd_and_hms(2024, 6, 1, 18, 30, 0).unwrap();
        assert_eq!(short_date(evening_utc), "06/02/2024");
        assert_eq!(short_time(evening_utc), "02:30 AM");
        assert_eq!(long_date(evening_utc), "Jun 2, 2024");
        // 2024-06-01 was a Saturday in UTC, Sunday in Manila by then.
        assert_eq!(weekday(evening_utc), Weekday::Sun);
        assert_eq!(local_date(evening_utc), NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("superadmin"), "Superadmin");
        assert_eq!(capitalize("STAFF"), "Staff");
        assert_eq!(capitalize(""), "");
    }
}
