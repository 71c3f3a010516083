//! Time primitives.
//!
//! `Time` is seconds since the Unix epoch (UTC) stored as `f64`, which keeps
//! sub-second precision for any realistic catalog date while staying cheap
//! to compare and copy.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::math::precision::stable_total_cmp_f64;

const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
];

#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64); // seconds

impl Time {
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Time(dt.timestamp_micros() as f64 / 1_000_000.0)
    }

    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        if !self.0.is_finite() {
            return None;
        }
        DateTime::<Utc>::from_timestamp_micros((self.0 * 1_000_000.0).round() as i64)
    }

    /// Parse an ISO8601 instant.
    ///
    /// Accepts RFC3339 (with offset), a naive date-time (read as UTC), a
    /// calendar date, a year-month, or a bare four-digit year. Partial forms
    /// resolve to the first instant they name.
    pub fn parse_iso8601(raw: &str) -> Option<Self> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(Self::from_datetime(dt.with_timezone(&Utc)));
        }

        let naive = s.strip_suffix('Z').unwrap_or(s);
        for fmt in NAIVE_DATE_TIME_FORMATS {
            if let Ok(ndt) = NaiveDateTime::parse_from_str(naive, fmt) {
                return Some(Self::from_datetime(ndt.and_utc()));
            }
        }

        let date = if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            Some(d)
        } else if s.len() == 7 {
            NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").ok()
        } else if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
            s.parse::<i32>()
                .ok()
                .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
        } else {
            None
        };

        date.and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|ndt| Self::from_datetime(ndt.and_utc()))
    }

    /// RFC3339 rendering, `None` for non-finite or out-of-range times.
    pub fn to_iso8601(self) -> Option<String> {
        self.to_datetime()
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

/// Why an ISO8601 `start/stop` range failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanParseError {
    MissingSeparator,
    InvalidStart(String),
    InvalidStop(String),
    Reversed,
}

impl std::fmt::Display for SpanParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpanParseError::MissingSeparator => write!(f, "expected `<start>/<stop>`"),
            SpanParseError::InvalidStart(s) => write!(f, "unparsable start `{s}`"),
            SpanParseError::InvalidStop(s) => write!(f, "unparsable stop `{s}`"),
            SpanParseError::Reversed => write!(f, "start is after stop"),
        }
    }
}

impl std::error::Error for SpanParseError {}

/// A half-open time range `[start, stop)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimeSpan {
    pub start: Time,
    pub stop: Time,
}

impl TimeSpan {
    pub fn new(start: Time, stop: Time) -> Self {
        Self { start, stop }
    }

    pub fn contains(&self, t: Time) -> bool {
        t.0 >= self.start.0 && t.0 < self.stop.0
    }

    /// Snap `t` into `[start, stop]`. Times inside the span are returned as-is.
    pub fn clamp(&self, t: Time) -> Time {
        if stable_total_cmp_f64(t.0, self.start.0).is_lt() {
            self.start
        } else if stable_total_cmp_f64(t.0, self.stop.0).is_gt() {
            self.stop
        } else {
            t
        }
    }

    /// Parse `"<start>/<stop>"`. Equal bounds are accepted (an empty span).
    pub fn parse_iso8601_range(raw: &str) -> Result<Self, SpanParseError> {
        let (a, b) = raw
            .split_once('/')
            .ok_or(SpanParseError::MissingSeparator)?;
        let start =
            Time::parse_iso8601(a).ok_or_else(|| SpanParseError::InvalidStart(a.to_string()))?;
        let stop =
            Time::parse_iso8601(b).ok_or_else(|| SpanParseError::InvalidStop(b.to_string()))?;
        if start.0 > stop.0 {
            return Err(SpanParseError::Reversed);
        }
        Ok(Self { start, stop })
    }
}

#[cfg(test)]
mod tests {
    use super::{SpanParseError, Time, TimeSpan};
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_common_iso8601_forms() {
        let midnight = Time(1_577_836_800.0); // 2020-01-01T00:00:00Z
        assert_eq!(Time::parse_iso8601("2020-01-01T00:00:00Z"), Some(midnight));
        assert_eq!(Time::parse_iso8601("2020-01-01T00:00:00"), Some(midnight));
        assert_eq!(Time::parse_iso8601("2020-01-01"), Some(midnight));
        assert_eq!(Time::parse_iso8601("2020-01"), Some(midnight));
        assert_eq!(Time::parse_iso8601("2020"), Some(midnight));
        assert_eq!(
            Time::parse_iso8601("2020-01-01T01:00:00+01:00"),
            Some(midnight)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(Time::parse_iso8601("not-a-date"), None);
        assert_eq!(Time::parse_iso8601(""), None);
        assert_eq!(Time::parse_iso8601("20201"), None);
    }

    #[test]
    fn iso8601_rendering_is_utc() {
        assert_eq!(
            Time(1_577_836_800.0).to_iso8601().as_deref(),
            Some("2020-01-01T00:00:00Z")
        );
        assert_eq!(Time(f64::NAN).to_iso8601(), None);
    }

    #[test]
    fn span_is_half_open() {
        let s = TimeSpan::new(Time(0.0), Time(10.0));
        assert!(s.contains(Time(0.0)));
        assert!(s.contains(Time(9.999)));
        assert!(!s.contains(Time(10.0)));
        assert!(!s.contains(Time(-0.1)));
        assert!(!TimeSpan::new(Time(5.0), Time(5.0)).contains(Time(5.0)));
    }

    #[test]
    fn clamp_snaps_to_bounds() {
        let s = TimeSpan::new(Time(0.0), Time(100.0));
        assert_eq!(s.clamp(Time(-5.0)), Time(0.0));
        assert_eq!(s.clamp(Time(150.0)), Time(100.0));
        assert_eq!(s.clamp(Time(42.0)), Time(42.0));
        assert_eq!(s.clamp(Time(100.0)), Time(100.0));
    }

    #[test]
    fn range_parsing_reports_the_failing_side() {
        assert_eq!(
            TimeSpan::parse_iso8601_range("not-a-date/2020"),
            Err(SpanParseError::InvalidStart("not-a-date".to_string()))
        );
        assert_eq!(
            TimeSpan::parse_iso8601_range("2020/nope"),
            Err(SpanParseError::InvalidStop("nope".to_string()))
        );
        assert_eq!(
            TimeSpan::parse_iso8601_range("2020-01-01"),
            Err(SpanParseError::MissingSeparator)
        );
        assert_eq!(
            TimeSpan::parse_iso8601_range("2021/2020"),
            Err(SpanParseError::Reversed)
        );
        let s = TimeSpan::parse_iso8601_range("2020-01-01/2020-01-02").unwrap();
        assert_eq!(s.stop.0 - s.start.0, 86_400.0);
    }
}
