//! Timestamp and duration values.
//!
//! Both types mirror the protobuf `(seconds, nanos)` encoding. Constructors
//! named `normalized` accept out-of-range nanosecond components and carry
//! them into seconds instead of failing.

use chrono::{DateTime, Utc};

/// Nanoseconds in one second.
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Seconds of 0001-01-01T00:00:00Z, the earliest JSON timestamp.
pub const MIN_JSON_TIMESTAMP_SECONDS: i64 = -62_135_596_800;
/// Seconds of 9999-12-31T23:59:59Z, the latest JSON timestamp.
pub const MAX_JSON_TIMESTAMP_SECONDS: i64 = 253_402_300_799;
/// Largest JSON duration magnitude in seconds, roughly 10,000 years.
pub const MAX_JSON_DURATION_SECONDS: i64 = 315_576_000_000;

/// A CEL timestamp value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    /// Seconds since Unix epoch.
    pub seconds: i64,
    /// Nanoseconds (0..999_999_999).
    pub nanos: i32,
}

impl Timestamp {
    /// Create a new timestamp.
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    /// Create a timestamp, carrying any nanosecond overflow into seconds.
    pub fn normalized(seconds: i64, nanos: i64) -> Self {
        let total = i128::from(seconds) * i128::from(NANOS_PER_SECOND) + i128::from(nanos);
        let per_second = i128::from(NANOS_PER_SECOND);
        Self {
            seconds: saturate(total.div_euclid(per_second)),
            nanos: total.rem_euclid(per_second) as i32,
        }
    }

    /// Create a timestamp from seconds since Unix epoch.
    pub fn from_seconds(seconds: i64) -> Self {
        Self { seconds, nanos: 0 }
    }

    /// Returns true for the Unix epoch.
    pub fn is_epoch(&self) -> bool {
        self.seconds == 0 && self.nanos == 0
    }

    /// Returns true if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        (self.seconds, self.nanos) < (other.seconds, other.nanos)
    }

    /// Returns true if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        (self.seconds, self.nanos) > (other.seconds, other.nanos)
    }

    /// Convert to a chrono UTC datetime, if representable.
    pub fn to_datetime_utc(&self) -> Option<DateTime<Utc>> {
        let nanos = u32::try_from(self.nanos).ok()?;
        DateTime::from_timestamp(self.seconds, nanos)
    }
}

/// A CEL duration value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration {
    /// Seconds component.
    pub seconds: i64,
    /// Nanoseconds component (0..999_999_999 for positive durations,
    /// -999_999_999..0 for negative durations).
    pub nanos: i32,
}

impl Duration {
    /// Create a new duration.
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    /// Create a duration, carrying nanosecond overflow into seconds so that
    /// both components share a sign.
    pub fn normalized(seconds: i64, nanos: i64) -> Self {
        let total = i128::from(seconds) * i128::from(NANOS_PER_SECOND) + i128::from(nanos);
        let per_second = i128::from(NANOS_PER_SECOND);
        Self {
            seconds: saturate(total / per_second),
            nanos: (total % per_second) as i32,
        }
    }

    /// Create a duration from seconds.
    pub fn from_seconds(seconds: i64) -> Self {
        Self { seconds, nanos: 0 }
    }

    /// Create a duration from nanoseconds.
    pub fn from_nanos(nanos: i64) -> Self {
        Self::normalized(0, nanos)
    }

    /// Convert to total nanoseconds.
    pub fn to_nanos(&self) -> i64 {
        self.seconds
            .saturating_mul(NANOS_PER_SECOND)
            .saturating_add(i64::from(self.nanos))
    }

    /// Returns true if this duration is negative.
    pub fn is_negative(&self) -> bool {
        self.seconds < 0 || (self.seconds == 0 && self.nanos < 0)
    }

    /// Returns true for the zero duration.
    pub fn is_zero(&self) -> bool {
        self.seconds == 0 && self.nanos == 0
    }
}

fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

/// Format a timestamp as an RFC 3339 string with nanosecond precision.
///
/// Examples:
/// - "2009-02-13T23:31:30Z" (no fractional seconds)
/// - "2009-02-13T23:31:30.123456789Z" (with nanoseconds)
pub fn format_timestamp(ts: &Timestamp) -> String {
    let Some(dt) = ts.to_datetime_utc() else {
        // Outside chrono's range
        return format!("{}s", ts.seconds);
    };
    let nanos_str = format!("{:09}", ts.nanos);
    let trimmed = nanos_str.trim_end_matches('0');
    if trimmed.is_empty() {
        dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    } else {
        format!("{}.{}Z", dt.format("%Y-%m-%dT%H:%M:%S"), trimmed)
    }
}

/// Format a duration as a string.
///
/// CEL format: "Xs" or "X.XXXXXXXXXs" for durations with fractional seconds.
pub fn format_duration(d: &Duration) -> String {
    let total_nanos = i128::from(d.seconds) * i128::from(NANOS_PER_SECOND) + i128::from(d.nanos);
    let sign = if total_nanos < 0 { "-" } else { "" };
    let abs_nanos = total_nanos.abs();
    let secs = abs_nanos / i128::from(NANOS_PER_SECOND);
    let frac = abs_nanos % i128::from(NANOS_PER_SECOND);

    if frac == 0 {
        format!("{sign}{secs}s")
    } else {
        let frac_str = format!("{frac:09}");
        let trimmed = frac_str.trim_end_matches('0');
        format!("{sign}{secs}.{trimmed}s")
    }
}

/// Format a timestamp the way protobuf JSON does: RFC 3339 in UTC with a
/// fraction of 0, 3, 6 or 9 digits. `None` outside years 0001 to 9999.
pub fn timestamp_to_json(ts: &Timestamp) -> Option<String> {
    if !(MIN_JSON_TIMESTAMP_SECONDS..=MAX_JSON_TIMESTAMP_SECONDS).contains(&ts.seconds) {
        return None;
    }
    let dt = ts.to_datetime_utc()?;
    Some(format!(
        "{}{}Z",
        dt.format("%Y-%m-%dT%H:%M:%S"),
        json_fraction(i64::from(ts.nanos))
    ))
}

/// Format a duration the way protobuf JSON does: seconds with a fraction of
/// 0, 3, 6 or 9 digits and an `s` suffix. `None` past about 10,000 years.
pub fn duration_to_json(d: &Duration) -> Option<String> {
    let total_nanos = i128::from(d.seconds) * i128::from(NANOS_PER_SECOND) + i128::from(d.nanos);
    let secs = total_nanos.abs() / i128::from(NANOS_PER_SECOND);
    if secs > i128::from(MAX_JSON_DURATION_SECONDS) {
        return None;
    }
    let frac = (total_nanos.abs() % i128::from(NANOS_PER_SECOND)) as i64;
    let sign = if total_nanos < 0 { "-" } else { "" };
    Some(format!("{sign}{secs}{}s", json_fraction(frac)))
}

fn json_fraction(nanos: i64) -> String {
    if nanos == 0 {
        String::new()
    } else if nanos % 1_000_000 == 0 {
        format!(".{:03}", nanos / 1_000_000)
    } else if nanos % 1_000 == 0 {
        format!(".{:06}", nanos / 1_000)
    } else {
        format!(".{nanos:09}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_normalization() {
        assert_eq!(Timestamp::normalized(10, 1_500_000_000), Timestamp::new(11, 500_000_000));
        assert_eq!(Timestamp::normalized(10, -1), Timestamp::new(9, 999_999_999));
        assert_eq!(Timestamp::normalized(0, 0), Timestamp::default());
    }

    #[test]
    fn duration_normalization() {
        assert_eq!(Duration::normalized(1, 1_500_000_000), Duration::new(2, 500_000_000));
        assert_eq!(Duration::normalized(1, -1_500_000_000), Duration::new(0, -500_000_000));
        assert_eq!(Duration::normalized(-1, 2_000_000_000), Duration::new(1, 0));
        assert!(Duration::normalized(0, -1).is_negative());
    }

    #[test]
    fn duration_nanos() {
        let d = Duration::from_nanos(1_500_000_000);
        assert_eq!(d.seconds, 1);
        assert_eq!(d.nanos, 500_000_000);
        assert_eq!(d.to_nanos(), 1_500_000_000);
    }

    #[test]
    fn timestamp_comparison() {
        let t1 = Timestamp::new(100, 0);
        let t2 = Timestamp::new(200, 0);
        let t3 = Timestamp::new(100, 500);

        assert!(t1.is_before(&t2));
        assert!(t2.is_after(&t1));
        assert!(t1.is_before(&t3));
    }

    #[test]
    fn timestamp_format() {
        assert_eq!(format_timestamp(&Timestamp::new(1234567890, 0)), "2009-02-13T23:31:30Z");
        assert_eq!(
            format_timestamp(&Timestamp::new(1234567890, 123_000_000)),
            "2009-02-13T23:31:30.123Z"
        );
        assert_eq!(format_timestamp(&Timestamp::default()), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn duration_format() {
        assert_eq!(format_duration(&Duration::new(100, 0)), "100s");
        assert_eq!(format_duration(&Duration::new(1, 500_000_000)), "1.5s");
        assert_eq!(format_duration(&Duration::new(0, -1_000)), "-0.000001s");
        assert_eq!(format_duration(&Duration::new(-3, 0)), "-3s");
    }

    #[test]
    fn json_timestamps_use_fixed_fraction_widths() {
        assert_eq!(
            timestamp_to_json(&Timestamp::new(0, 123_400_000)).unwrap(),
            "1970-01-01T00:00:00.123400Z"
        );
        assert_eq!(
            timestamp_to_json(&Timestamp::new(1234567890, 0)).unwrap(),
            "2009-02-13T23:31:30Z"
        );
        assert_eq!(
            timestamp_to_json(&Timestamp::new(0, 5)).unwrap(),
            "1970-01-01T00:00:00.000000005Z"
        );
        assert_eq!(
            timestamp_to_json(&Timestamp::new(MIN_JSON_TIMESTAMP_SECONDS, 0)).unwrap(),
            "0001-01-01T00:00:00Z"
        );
        assert_eq!(timestamp_to_json(&Timestamp::new(MAX_JSON_TIMESTAMP_SECONDS + 1, 0)), None);
        assert_eq!(timestamp_to_json(&Timestamp::new(MIN_JSON_TIMESTAMP_SECONDS - 1, 0)), None);
    }

    #[test]
    fn json_durations_use_fixed_fraction_widths() {
        assert_eq!(duration_to_json(&Duration::new(1, 500_000_000)).unwrap(), "1.500s");
        assert_eq!(duration_to_json(&Duration::new(3, 0)).unwrap(), "3s");
        assert_eq!(duration_to_json(&Duration::new(0, -1_000)).unwrap(), "-0.000001s");
        assert_eq!(
            duration_to_json(&Duration::new(MAX_JSON_DURATION_SECONDS, 0)).unwrap(),
            "315576000000s"
        );
        assert_eq!(duration_to_json(&Duration::new(MAX_JSON_DURATION_SECONDS + 1, 0)), None);
        assert_eq!(duration_to_json(&Duration::new(-MAX_JSON_DURATION_SECONDS - 1, 0)), None);
    }
}
