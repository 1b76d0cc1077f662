//! Hour-bucket handling for cache freshness.
//!
//! Cache keys embed the wall-clock hour rather than an explicit TTL: two
//! requests within the same hour collide on the same key, and the key
//! changes when the hour rolls over.

use chrono::{DateTime, NaiveDateTime, TimeZone, Timelike, Utc};

use crate::error::OverlayError;

/// Truncate a timestamp to the top of its hour.
pub fn hour_bucket(now: DateTime<Utc>) -> DateTime<Utc> {
    now.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

/// Render an hour bucket as the key fragment `YYYY-MM-DDTHH:00`.
pub fn hour_key(bucket: DateTime<Utc>) -> String {
    bucket.format("%Y-%m-%dT%H:00").to_string()
}

/// Parse a provider time label (`YYYY-MM-DDTHH:MM`, optionally with seconds
/// or a trailing `Z`) into a UTC timestamp.
pub fn parse_time_label(s: &str) -> Result<DateTime<Utc>, OverlayError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }
    Err(OverlayError::InvalidTime(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_hour_bucket_truncates() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 14, 37, 52).unwrap();
        let bucket = hour_bucket(now);
        assert_eq!(bucket, Utc.with_ymd_and_hms(2024, 3, 7, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_hour_key_format() {
        let bucket = Utc.with_ymd_and_hms(2024, 3, 7, 9, 0, 0).unwrap();
        assert_eq!(hour_key(bucket), "2024-03-07T09:00");
    }

    #[test]
    fn test_same_hour_same_key() {
        let a = Utc.with_ymd_and_hms(2024, 3, 7, 14, 1, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 3, 7, 14, 59, 59).unwrap();
        assert_eq!(hour_key(hour_bucket(a)), hour_key(hour_bucket(b)));
    }

    #[test]
    fn test_parse_time_label() {
        let dt = parse_time_label("2024-03-07T14:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 7, 14, 0, 0).unwrap());

        let dt = parse_time_label("2024-03-07T14:00:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 7, 14, 0, 0).unwrap());

        assert!(parse_time_label("not-a-time").is_err());
    }
}
