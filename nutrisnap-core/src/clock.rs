//! Time sources used for date bucketing.
//!
//! Every date computed by the aggregator goes through a [`Clock`], so tests
//! can pin both "now" and the local timezone instead of depending on the
//! host.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone, Utc};

/// Current time plus conversion of timestamps to local calendar dates.
pub trait Clock: Send + Sync {
    /// Current wall-clock time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;

    /// Local calendar date of a millisecond timestamp.
    ///
    /// Returns `None` for timestamps chrono cannot represent.
    fn local_date(&self, timestamp_ms: i64) -> Option<NaiveDate>;

    /// Today's local date. Read fresh on every call.
    fn today(&self) -> NaiveDate {
        self.local_date(self.now_millis())
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// The host clock in the host's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn local_date(&self, timestamp_ms: i64) -> Option<NaiveDate> {
        Local
            .timestamp_millis_opt(timestamp_ms)
            .single()
            .map(|dt| dt.date_naive())
    }
}

/// A clock frozen at a given instant in a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now_ms: i64,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn new(now_ms: i64, offset: FixedOffset) -> Self {
        Self { now_ms, offset }
    }

    /// Frozen at `now`, bucketing dates in `now`'s own offset.
    pub fn at(now: DateTime<FixedOffset>) -> Self {
        Self::new(now.timestamp_millis(), *now.offset())
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.now_ms
    }

    fn local_date(&self, timestamp_ms: i64) -> Option<NaiveDate> {
        self.offset
            .timestamp_millis_opt(timestamp_ms)
            .single()
            .map(|dt| dt.date_naive())
    }
}
