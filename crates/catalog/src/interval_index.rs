use foundation::math::precision::stable_total_cmp_f64;
use foundation::time::{Time, TimeSpan};
use tracing::warn;

use crate::config::IntervalEntry;
use crate::error::ConfigurationError;

/// A half-open time range carrying the data that identifies what to show
/// during it.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval<T> {
    pub span: TimeSpan,
    pub data: T,
}

impl<T> Interval<T> {
    pub fn new(start: Time, stop: Time, data: T) -> Self {
        Self {
            span: TimeSpan::new(start, stop),
            data,
        }
    }

    pub fn contains(&self, time: Time) -> bool {
        self.span.contains(time)
    }
}

/// Chronologically ordered, non-overlapping intervals.
///
/// Ordering contract:
/// - intervals are kept in insertion order, which callers guarantee is
///   chronological with `intervals[i].stop <= intervals[i + 1].start`;
/// - the index is immutable once built, so interval positions are stable ids
///   for the lifetime of the index.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalIndex<T> {
    intervals: Vec<Interval<T>>,
}

impl<T> IntervalIndex<T> {
    pub fn new(intervals: Vec<Interval<T>>) -> Self {
        let index = Self { intervals };
        if !index.is_disjoint_sorted() {
            warn!(
                len = index.len(),
                "time intervals overlap or are out of order; lookups may miss"
            );
        }
        index
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Interval<T>> {
        self.intervals.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interval<T>> {
        self.intervals.iter()
    }

    /// `[first.start, last.stop]`, or `None` for an empty index.
    pub fn bounds(&self) -> Option<TimeSpan> {
        let first = self.intervals.first()?;
        let last = self.intervals.last()?;
        Some(TimeSpan::new(first.span.start, last.span.stop))
    }

    /// Binary search for the interval containing `time`.
    ///
    /// Returns `Ok(i)` when `intervals[i].start <= time < intervals[i].stop`.
    /// Otherwise returns `Err(p)` where `p` is the position an interval
    /// starting at `time` would be inserted, so `p - 1` is the nearest
    /// interval before `time` and `p` the nearest after it.
    pub fn index_of_containing(&self, time: Time) -> Result<usize, usize> {
        let p = self
            .intervals
            .partition_point(|iv| stable_total_cmp_f64(iv.span.stop.0, time.0).is_le());
        match self.intervals.get(p) {
            Some(iv) if iv.contains(time) => Ok(p),
            _ => Err(p),
        }
    }

    /// Checks the ordering contract.
    pub fn is_disjoint_sorted(&self) -> bool {
        self.intervals
            .windows(2)
            .all(|w| stable_total_cmp_f64(w[0].span.stop.0, w[1].span.start.0).is_le())
    }
}

impl<T: Clone> IntervalIndex<T> {
    /// Build from `{interval: "<start>/<stop>", data}` configuration entries.
    ///
    /// Fails on the first entry whose bounds do not parse or are reversed.
    /// Overlap is not rejected here.
    pub fn from_configuration(entries: &[IntervalEntry<T>]) -> Result<Self, ConfigurationError> {
        let mut intervals = Vec::with_capacity(entries.len());
        for entry in entries {
            let span = TimeSpan::parse_iso8601_range(&entry.interval).map_err(|reason| {
                ConfigurationError::InvalidInterval {
                    value: entry.interval.clone(),
                    reason,
                }
            })?;
            intervals.push(Interval {
                span,
                data: entry.data.clone(),
            });
        }
        Ok(Self::new(intervals))
    }
}
