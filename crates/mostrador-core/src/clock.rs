//! # Business Clock
//!
//! Converts between UTC storage and the store's local wall-clock time.
//!
//! The store runs on Dominican Republic time: a fixed UTC−4 offset with no
//! daylight-saving changes. Every "today" in the system (which sales can be
//! rescued into a shift, which year an invoice belongs to) is a local
//! calendar day, while every stored timestamp is UTC.
//!
//! ```text
//!   local  2026-10-19 00:00 (UTC-4)
//!     │  - offset
//!     ▼
//!   UTC    2026-10-19 04:00   ← start_of_local_day(any instant on Oct 19 local)
//! ```

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Offset, TimeDelta, TimeZone, Utc};

/// Dominican Republic offset from UTC, in seconds.
pub const DOMINICAN_UTC_OFFSET_SECS: i32 = -4 * 3600;

/// A fixed-offset clock used for day boundaries.
///
/// Holds no notion of "now": callers pass the instant in, which keeps every
/// rule that depends on it deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessClock {
    offset: FixedOffset,
}

impl BusinessClock {
    /// Creates a clock for the given offset.
    pub const fn new(offset: FixedOffset) -> Self {
        BusinessClock { offset }
    }

    /// Creates a clock from a whole-hour offset (e.g. `-4`).
    ///
    /// Returns `None` for offsets outside ±23 hours.
    pub fn from_hours(hours: i32) -> Option<Self> {
        FixedOffset::east_opt(hours.checked_mul(3600)?).map(BusinessClock::new)
    }

    /// Returns the configured offset.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The UTC instant of local midnight on the local day containing `instant`.
    ///
    /// Idempotent, and never later than its input.
    pub fn start_of_local_day(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        self.local_midnight(self.local_date(instant))
    }

    /// The local calendar date containing `instant`.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// The local calendar year containing `instant`.
    pub fn local_year(&self, instant: DateTime<Utc>) -> i32 {
        self.local_date(instant).year()
    }

    /// The UTC instant of local midnight at the start of `date`.
    pub fn local_midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        let local_midnight = date.and_time(NaiveTime::MIN);
        let offset = TimeDelta::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&(local_midnight - offset))
    }

    /// UTC bounds `[start, end)` of the local day `date`.
    pub fn day_bounds(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.local_midnight(date);
        (start, start + TimeDelta::days(1))
    }
}

impl Default for BusinessClock {
    fn default() -> Self {
        // ±23h is always a valid FixedOffset, so this cannot fall back in practice
        let offset = FixedOffset::east_opt(DOMINICAN_UTC_OFFSET_SECS)
            .unwrap_or_else(|| Utc.fix());
        BusinessClock { offset }
    }
}

/// [`BusinessClock::start_of_local_day`] on the default UTC−4 clock.
pub fn start_of_local_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    BusinessClock::default().start_of_local_day(instant)
}

// =============================================================================
// Unit Tests
// =============================================================================
