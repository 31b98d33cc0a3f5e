//! # Shift Reconciliation
//!
//! Decides which sales belong to "this shift" and how the drawer is counted.
//!
//! ## Effective Start
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Effective-Start Rule                                 │
//! │                                                                         │
//! │  anchor = open session's opened_at, or "now" when nothing is open      │
//! │                                                                         │
//! │  anchor before today's local midnight?                                 │
//! │    └── yes ─► start = opened_at (no rescue across days)                │
//! │                                                                         │
//! │  otherwise look for the latest close in [midnight, anchor]:            │
//! │    ├── found ─► candidate = closed_at    (resume after last close)     │
//! │    └── none  ─► candidate = midnight     (rescue early sales)          │
//! │                                                                         │
//! │  session anchor: use candidate only if strictly before opened_at       │
//! │  "now" anchor:   always use candidate                                  │
//! │                                                                         │
//! │  00:00      07:00 close     09:00 open            now                  │
//! │    │───────────│──────────────│────────────────────│                   │
//! │                ▲ start (resumes after the close)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Windows are half-open `[start, end)`. A close at `T` ends one window and
//! the next open resumes at exactly `T`, so every sale lands in one window.
//!
//! The rule itself is pure. The database layer asks [`ShiftAnchor::rescue_range`]
//! where to look for the last close, runs that one query, and hands the
//! answer to [`ShiftAnchor::resolve`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::clock::BusinessClock;
use crate::money::Money;
use crate::types::{CashRegisterSession, PaymentBucket, PaymentMethod};

// =============================================================================
// Anchor & Window
// =============================================================================

/// What the shift window is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftAnchor {
    /// An open register session.
    Session { opened_at: DateTime<Utc> },
    /// No session is open; summarize up to this instant.
    Now(DateTime<Utc>),
}

/// Where a window's start came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum WindowSource {
    /// The open session's `opened_at`.
    SessionOpened,
    /// The `closed_at` of the latest session closed earlier today.
    LastClose,
    /// Today's local midnight.
    LocalMidnight,
}

/// The half-open interval `[start, end)` of sales counted for a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShiftWindow {
    #[ts(as = "String")]
    pub start: DateTime<Utc>,
    #[ts(as = "String")]
    pub end: DateTime<Utc>,
    pub source: WindowSource,
}

impl ShiftWindow {
    /// Whether `instant` falls inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

impl ShiftAnchor {
    /// Anchors on `session` when it is open, otherwise on `now`.
    pub fn for_session(session: Option<&CashRegisterSession>, now: DateTime<Utc>) -> Self {
        match session {
            Some(session) if session.is_open() => ShiftAnchor::Session {
                opened_at: session.opened_at,
            },
            _ => ShiftAnchor::Now(now),
        }
    }

    /// The instant the anchor stands on.
    pub fn instant(&self) -> DateTime<Utc> {
        match *self {
            ShiftAnchor::Session { opened_at } => opened_at,
            ShiftAnchor::Now(now) => now,
        }
    }

    /// Inclusive `[midnight, anchor]` range to search for the latest close.
    ///
    /// `None` when the anchor predates today's local midnight: a session
    /// left open overnight keeps its own `opened_at` and nothing is rescued.
    pub fn rescue_range(
        &self,
        clock: &BusinessClock,
        now: DateTime<Utc>,
    ) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let midnight = clock.start_of_local_day(now);
        let anchor = self.instant();
        if anchor < midnight {
            return None;
        }
        Some((midnight, anchor))
    }

    /// Resolves the window ending at `now`.
    ///
    /// `last_close` is the latest `closed_at` found in [`Self::rescue_range`].
    /// Values outside that range are ignored, so the result only depends on
    /// the rule, never on a sloppy query.
    pub fn resolve(
        &self,
        clock: &BusinessClock,
        now: DateTime<Utc>,
        last_close: Option<DateTime<Utc>>,
    ) -> ShiftWindow {
        let (start, source) = match self.rescue_range(clock, now) {
            None => (self.instant(), WindowSource::SessionOpened),
            Some((midnight, upper)) => {
                let (candidate, candidate_source) = match last_close {
                    Some(closed_at) if midnight <= closed_at && closed_at <= upper => {
                        (closed_at, WindowSource::LastClose)
                    }
                    _ => (midnight, WindowSource::LocalMidnight),
                };

                match *self {
                    ShiftAnchor::Session { opened_at } if candidate >= opened_at => {
                        (opened_at, WindowSource::SessionOpened)
                    }
                    _ => (candidate, candidate_source),
                }
            }
        };

        ShiftWindow {
            start,
            // A session opened "in the future" relative to now yields an empty window
            end: now.max(start),
            source,
        }
    }
}

// =============================================================================
// Payment Breakdown
// =============================================================================

/// Paid-sale totals split into the four reconciliation buckets.
///
/// `total_cents` always equals the sum of the four buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentBreakdown {
    pub cash_cents: i64,
    pub card_cents: i64,
    pub transfer_cents: i64,
    pub other_cents: i64,
    pub total_cents: i64,
    pub sale_count: i64,
}

impl PaymentBreakdown {
    /// Empty breakdown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` sales totalling `amount` paid with `method`.
    pub fn add(&mut self, method: &PaymentMethod, amount: Money, count: i64) {
        let cents = amount.cents();
        let slot = match method.bucket() {
            PaymentBucket::Cash => &mut self.cash_cents,
            PaymentBucket::Card => &mut self.card_cents,
            PaymentBucket::Transfer => &mut self.transfer_cents,
            PaymentBucket::Other => &mut self.other_cents,
        };
        *slot = slot.saturating_add(cents);
        self.total_cents = self.total_cents.saturating_add(cents);
        self.sale_count = self.sale_count.saturating_add(count);
    }

    /// Builds a breakdown from `(method, total_cents, count)` rows.
    ///
    /// Any number of raw method names may map to the same bucket.
    pub fn from_rows<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (S, i64, i64)>,
        S: Into<PaymentMethod>,
    {
        let mut breakdown = Self::new();
        for (method, cents, count) in rows {
            breakdown.add(&method.into(), Money::from_cents(cents), count);
        }
        breakdown
    }

    /// Amount in one bucket.
    pub fn bucket(&self, bucket: PaymentBucket) -> Money {
        Money::from_cents(match bucket {
            PaymentBucket::Cash => self.cash_cents,
            PaymentBucket::Card => self.card_cents,
            PaymentBucket::Transfer => self.transfer_cents,
            PaymentBucket::Other => self.other_cents,
        })
    }

    #[inline]
    pub fn cash(&self) -> Money {
        Money::from_cents(self.cash_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Drawer Count
// =============================================================================

/// The drawer arithmetic done at close.
///
/// Only the cash bucket is countable; card and transfer never touch the drawer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CashReconciliation {
    pub initial_cash_cents: i64,
    pub cash_sales_cents: i64,
    pub expected_cash_cents: i64,
    pub counted_cash_cents: i64,
    /// counted − expected; negative means the drawer is short.
    pub discrepancy_cents: i64,
}

impl CashReconciliation {
    /// `expected = initial + cash sales`, `discrepancy = counted − expected`.
    pub fn compute(initial: Money, cash_sales: Money, counted: Money) -> Self {
        let expected = expected_cash(initial, cash_sales);
        CashReconciliation {
            initial_cash_cents: initial.cents(),
            cash_sales_cents: cash_sales.cents(),
            expected_cash_cents: expected.cents(),
            counted_cash_cents: counted.cents(),
            discrepancy_cents: counted.saturating_sub(expected).cents(),
        }
    }

    #[inline]
    pub fn discrepancy(&self) -> Money {
        Money::from_cents(self.discrepancy_cents)
    }

    /// True when the count matches to the centavo.
    pub fn is_balanced(&self) -> bool {
        self.discrepancy_cents == 0
    }
}

/// Cash that should be in the drawer: the float plus cash sales.
#[inline]
pub fn expected_cash(initial: Money, cash_sales: Money) -> Money {
    initial.saturating_add(cash_sales)
}

// =============================================================================
// Reports
// =============================================================================

/// A window with the paid-sale totals inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShiftSummary {
    pub window: ShiftWindow,
    pub breakdown: PaymentBreakdown,
}

/// What the register screen shows.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RegisterState {
    /// The open session, if any.
    pub session: Option<CashRegisterSession>,
    pub summary: ShiftSummary,
    /// Float plus cash sales so far; only present while a session is open.
    pub expected_cash_cents: Option<i64>,
}

/// Result of a successful close.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CloseReport {
    pub session: CashRegisterSession,
    pub summary: ShiftSummary,
    pub reconciliation: CashReconciliation,
}

// =============================================================================
// Unit Tests
// =============================================================================
