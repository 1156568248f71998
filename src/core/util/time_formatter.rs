use chrono::{DateTime, Utc};
use tracing::warn;

const MINUTES_IN_DAY: i64 = 1440;
const MINUTES_IN_MONTH: i64 = 43200;
const MINUTES_IN_TWO_MONTHS: i64 = 86400;

/// "Last update was 5 minutes ago" / "Last update is in about 1 hour".
///
/// Returns `None` when `raw` is not an RFC 3339 timestamp.
pub fn describe_last_modified(raw: &str, now: DateTime<Utc>) -> Option<String> {
    let modified = match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
            warn!(value = %raw, error = %e, "Could not parse last modified string");
            return None;
        }
    };

    let distance = distance_in_words(modified, now);
    Some(if modified > now {
        format!("Last update is in {}", distance)
    } else {
        format!("Last update was {} ago", distance)
    })
}

/// Approximate distance between two instants, worded like "about 2 hours".
pub fn distance_in_words(a: DateTime<Utc>, b: DateTime<Utc>) -> String {
    let seconds = (b - a).num_seconds().abs();
    let minutes = (seconds as f64 / 60.0).round() as i64;

    if minutes < 2 {
        return if minutes == 0 {
            "less than a minute".to_string()
        } else {
            "1 minute".to_string()
        };
    }
    if minutes < 45 {
        return format!("{} minutes", minutes);
    }
    if minutes < 90 {
        return "about 1 hour".to_string();
    }
    if minutes < MINUTES_IN_DAY {
        let hours = (minutes as f64 / 60.0).round() as i64;
        return format!("about {} hours", hours);
    }
    if minutes < 2520 {
        return "1 day".to_string();
    }
    if minutes < MINUTES_IN_MONTH {
        let days = (minutes as f64 / MINUTES_IN_DAY as f64).round() as i64;
        return format!("{} days", days);
    }

    let months = (minutes as f64 / MINUTES_IN_MONTH as f64).round() as i64;
    if minutes < MINUTES_IN_TWO_MONTHS {
        return plural(months, "about 1 month", "about {} months");
    }
    if months < 12 {
        return format!("{} months", months);
    }

    let years = months / 12;
    let remainder = months % 12;
    if remainder < 3 {
        plural(years, "about 1 year", "about {} years")
    } else if remainder < 9 {
        plural(years, "over 1 year", "over {} years")
    } else {
        format!("almost {} years", years + 1)
    }
}

fn plural(n: i64, one: &str, many: &str) -> String {
    if n == 1 {
        one.to_string()
    } else {
        many.replace("{}", &n.to_string())
    }
}
