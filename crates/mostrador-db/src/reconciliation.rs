//! # Shift Reconciliation
//!
//! Turns register sessions and paid sales into shift windows, payment
//! breakdowns and drawer counts. Every register endpoint goes through the
//! one [`ShiftReconciler`].
//!
//! ## Effective Start
//! ```text
//!   local midnight          last close        opened_at            now
//!        │                      │                 │                  │
//!  ──────┼──────────────────────┼─────────────────┼──────────────────┼──►
//!        │                      └── window start ─┴──── counted ─────┘
//!        │
//!        └── fallback when nothing closed today
//! ```
//!
//! Sales rung between the previous close and a later open would otherwise
//! belong to no shift, so they are rescued into the next one. A session
//! left open past midnight keeps its own `opened_at`.
//!
//! All reads for one answer run on one connection. The close runs in one
//! transaction whose first statement writes the open row, so the totals it
//! stores cannot be computed from a stale snapshot.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::{debug, info, warn};

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::register::{self, SessionClose};
use crate::repository::sale;
use mostrador_core::shift::expected_cash;
use mostrador_core::validation::{validate_close_register, validate_open_register};
use mostrador_core::{
    BusinessClock, CashReconciliation, CashRegisterSession, CloseRegister, CloseReport, CoreError,
    Money, OpenRegister, RegisterState, Sale, ShiftAnchor, ShiftSummary, ShiftWindow,
    ValidationError,
};

/// The shift reconciliation engine.
#[derive(Debug, Clone)]
pub struct ShiftReconciler {
    db: Database,
    clock: BusinessClock,
}

impl ShiftReconciler {
    /// Creates a reconciler over `db` using `clock` for local days.
    pub fn new(db: Database, clock: BusinessClock) -> Self {
        ShiftReconciler { db, clock }
    }

    pub fn clock(&self) -> BusinessClock {
        self.clock
    }

    /// The open session (if any) with the totals of its window so far.
    pub async fn current_status(&self, now: DateTime<Utc>) -> DbResult<RegisterState> {
        let mut conn = self.db.pool().acquire().await?;

        let session = register::find_open(&mut conn).await?;
        let anchor = ShiftAnchor::for_session(session.as_ref(), now);
        let summary = self.summarize(&mut conn, anchor, now).await?;

        let expected_cash_cents = session
            .as_ref()
            .map(|s| expected_cash(s.initial_cash(), summary.breakdown.cash()).cents());

        Ok(RegisterState {
            session,
            summary,
            expected_cash_cents,
        })
    }

    /// Opens the register with a counted float.
    pub async fn open_register(
        &self,
        req: &OpenRegister,
        now: DateTime<Utc>,
    ) -> DbResult<CashRegisterSession> {
        let initial_cash_cents = validate_open_register(req)?;

        self.db
            .registers()
            .open_session(&req.opened_by, initial_cash_cents, req.notes.as_deref(), now)
            .await
    }

    /// Closes the open session and stores its drawer count.
    ///
    /// ## Errors
    /// - [`CoreError::NoOpenRegister`] when nothing is open
    /// - Validation when the counted cash is missing or negative, or when
    ///   `now` is not after the session's `opened_at`
    pub async fn close_register(
        &self,
        req: &CloseRegister,
        now: DateTime<Utc>,
    ) -> DbResult<CloseReport> {
        let counted = Money::from_cents(validate_close_register(req)?);

        let mut tx = self.db.begin().await?;

        let Some(open) = register::lock_open(&mut tx, now).await? else {
            warn!(closed_by = %req.closed_by, "Close declined: no open register");
            return Err(CoreError::NoOpenRegister.into());
        };

        if now <= open.opened_at {
            return Err(ValidationError::InvalidFormat {
                field: "closedAt".to_string(),
                reason: format!("must be after the session opened at {}", open.opened_at),
            }
            .into());
        }

        let summary = self
            .summarize(&mut tx, ShiftAnchor::for_session(Some(&open), now), now)
            .await?;
        let reconciliation =
            CashReconciliation::compute(open.initial_cash(), summary.breakdown.cash(), counted);

        let close = SessionClose {
            closed_by: &req.closed_by,
            notes: req.notes.as_deref(),
            window: summary.window,
            reconciliation,
        };
        let session = register::mark_closed(&mut tx, &open.id, &close, now).await?;

        tx.commit().await?;

        info!(
            session_id = %session.id,
            closed_by = %req.closed_by,
            window_start = %summary.window.start,
            expected_cash_cents = reconciliation.expected_cash_cents,
            counted_cash_cents = reconciliation.counted_cash_cents,
            discrepancy_cents = reconciliation.discrepancy_cents,
            "Register closed"
        );

        if !reconciliation.is_balanced() {
            warn!(
                session_id = %session.id,
                discrepancy_cents = reconciliation.discrepancy_cents,
                "Drawer count does not match"
            );
        }

        Ok(CloseReport {
            session,
            summary,
            reconciliation,
        })
    }

    /// Paid totals of the current window.
    pub async fn daily_summary(&self, now: DateTime<Utc>) -> DbResult<ShiftSummary> {
        let mut conn = self.db.pool().acquire().await?;

        let session = register::find_open(&mut conn).await?;
        let anchor = ShiftAnchor::for_session(session.as_ref(), now);
        self.summarize(&mut conn, anchor, now).await
    }

    /// Paid sales inside the current window, newest first.
    pub async fn shift_sales(&self, now: DateTime<Utc>, limit: i64) -> DbResult<Vec<Sale>> {
        let mut conn = self.db.pool().acquire().await?;

        let session = register::find_open(&mut conn).await?;
        let anchor = ShiftAnchor::for_session(session.as_ref(), now);
        let window = self.window(&mut conn, anchor, now).await?;

        sale::paid_sales_between(&mut conn, window.start, window.end, limit).await
    }

    /// Sessions newest first.
    pub async fn session_history(&self, limit: i64) -> DbResult<Vec<CashRegisterSession>> {
        self.db.registers().history(limit).await
    }

    /// One session by ID.
    pub async fn session(&self, id: &str) -> DbResult<CashRegisterSession> {
        self.db
            .registers()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::SessionNotFound(id.to_string()).into())
    }

    async fn window(
        &self,
        conn: &mut SqliteConnection,
        anchor: ShiftAnchor,
        now: DateTime<Utc>,
    ) -> DbResult<ShiftWindow> {
        let last_close = match anchor.rescue_range(&self.clock, now) {
            Some((from, to)) => register::latest_close_between(conn, from, to).await?,
            None => None,
        };

        let window = anchor.resolve(&self.clock, now, last_close);
        debug!(
            start = %window.start,
            end = %window.end,
            source = ?window.source,
            "Resolved shift window"
        );
        Ok(window)
    }

    async fn summarize(
        &self,
        conn: &mut SqliteConnection,
        anchor: ShiftAnchor,
        now: DateTime<Utc>,
    ) -> DbResult<ShiftSummary> {
        let window = self.window(conn, anchor, now).await?;
        let breakdown = sale::payment_totals(conn, window.start, window.end).await?;
        Ok(ShiftSummary { window, breakdown })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbConfig;
    use chrono::{NaiveDate, TimeDelta};
    use mostrador_core::{
        NewSale, NewSaleLine, PaymentMethod, RegisterStatus, SaleStatus, WindowSource,
        FREE_SALE_PRODUCT_ID,
    };

    async fn setup() -> ShiftReconciler {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        ShiftReconciler::new(db, BusinessClock::default())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    /// Local wall-clock time today (UTC−4).
    fn local(h: i64, m: i64) -> DateTime<Utc> {
        BusinessClock::default().local_midnight(today()) + TimeDelta::hours(h) + TimeDelta::minutes(m)
    }

    fn open_req(initial: i64) -> OpenRegister {
        OpenRegister {
            opened_by: "maria".to_string(),
            initial_cash_cents: Some(initial),
            notes: None,
        }
    }

    fn close_req(counted: i64) -> CloseRegister {
        CloseRegister {
            closed_by: "maria".to_string(),
            counted_cash_cents: Some(counted),
            notes: None,
        }
    }

    async fn ring(
        reconciler: &ShiftReconciler,
        method: &str,
        cents: i64,
        at: DateTime<Utc>,
    ) -> Sale {
        ring_with_status(reconciler, method, cents, at, None).await
    }

    async fn ring_with_status(
        reconciler: &ShiftReconciler,
        method: &str,
        cents: i64,
        at: DateTime<Utc>,
        status: Option<SaleStatus>,
    ) -> Sale {
        let req = NewSale {
            seller_id: "maria".to_string(),
            payment_method: PaymentMethod::from(method.to_string()),
            status,
            discount_cents: 0,
            customer_info: None,
            notes: None,
            lines: vec![NewSaleLine {
                product_id: FREE_SALE_PRODUCT_ID.to_string(),
                quantity: 1,
                unit_price_cents: Some(cents),
            }],
        };
        reconciler
            .db
            .sales()
            .create(&req, &reconciler.clock, at)
            .await
            .unwrap()
            .sale
    }

    #[tokio::test]
    async fn test_open_after_close_rescues_gap_sales() {
        let reconciler = setup().await;

        reconciler.open_register(&open_req(0), local(6, 0)).await.unwrap();
        ring(&reconciler, "cash", 1_000, local(6, 30)).await;
        reconciler.close_register(&close_req(1_000), local(7, 0)).await.unwrap();

        // Rung while the register was closed
        ring(&reconciler, "cash", 2_000, local(8, 0)).await;

        reconciler.open_register(&open_req(0), local(9, 0)).await.unwrap();
        ring(&reconciler, "card", 3_000, local(10, 0)).await;

        let state = reconciler.current_status(local(11, 0)).await.unwrap();
        assert_eq!(state.summary.window.start, local(7, 0));
        assert_eq!(state.summary.window.end, local(11, 0));
        assert_eq!(state.summary.window.source, WindowSource::LastClose);
        assert_eq!(state.summary.breakdown.cash_cents, 2_000);
        assert_eq!(state.summary.breakdown.card_cents, 3_000);
        assert_eq!(state.summary.breakdown.total_cents, 5_000);
        assert_eq!(state.summary.breakdown.sale_count, 2);
    }

    #[tokio::test]
    async fn test_first_open_of_day_starts_at_midnight() {
        let reconciler = setup().await;

        ring(&reconciler, "cash", 9_999, local(0, 0) - TimeDelta::hours(1)).await;
        ring(&reconciler, "cash", 1_500, local(1, 0)).await;
        reconciler.open_register(&open_req(5_000), local(9, 0)).await.unwrap();

        let state = reconciler.current_status(local(11, 0)).await.unwrap();
        assert_eq!(state.summary.window.start, local(0, 0));
        assert_eq!(state.summary.window.source, WindowSource::LocalMidnight);
        assert_eq!(state.summary.breakdown.cash_cents, 1_500);
        assert_eq!(state.expected_cash_cents, Some(6_500));
    }

    #[tokio::test]
    async fn test_session_open_since_yesterday_keeps_opened_at() {
        let reconciler = setup().await;

        let opened_at = local(0, 0) - TimeDelta::hours(4);
        ring(&reconciler, "cash", 700, opened_at - TimeDelta::minutes(30)).await;
        reconciler.open_register(&open_req(0), opened_at).await.unwrap();
        ring(&reconciler, "cash", 1_200, opened_at + TimeDelta::hours(1)).await;
        ring(&reconciler, "transfer", 800, local(10, 0)).await;

        let state = reconciler.current_status(local(11, 0)).await.unwrap();
        assert_eq!(state.summary.window.start, opened_at);
        assert_eq!(state.summary.window.source, WindowSource::SessionOpened);
        assert_eq!(state.summary.breakdown.cash_cents, 1_200);
        assert_eq!(state.summary.breakdown.transfer_cents, 800);
    }

    #[tokio::test]
    async fn test_no_open_session_counts_since_last_close() {
        let reconciler = setup().await;

        reconciler.open_register(&open_req(0), local(12, 0)).await.unwrap();
        ring(&reconciler, "cash", 4_000, local(13, 0)).await;
        reconciler.close_register(&close_req(4_000), local(14, 0)).await.unwrap();
        ring(&reconciler, "cash", 2_500, local(15, 0)).await;

        let summary = reconciler.daily_summary(local(16, 0)).await.unwrap();
        assert_eq!(summary.window.start, local(14, 0));
        assert_eq!(summary.window.end, local(16, 0));
        assert_eq!(summary.window.source, WindowSource::LastClose);
        assert_eq!(summary.breakdown.cash_cents, 2_500);

        let state = reconciler.current_status(local(16, 0)).await.unwrap();
        assert!(state.session.is_none());
        assert!(state.expected_cash_cents.is_none());

        let sales = reconciler.shift_sales(local(16, 0), 50).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].total_cents, 2_500);
    }

    #[tokio::test]
    async fn test_close_reconciles_drawer() {
        let reconciler = setup().await;

        let opened = reconciler.open_register(&open_req(10_000), local(9, 0)).await.unwrap();
        ring(&reconciler, "cash", 15_000, local(9, 30)).await;
        ring(&reconciler, "cash", 10_000, local(10, 0)).await;
        ring(&reconciler, "card", 5_000, local(10, 30)).await;

        let state = reconciler.current_status(local(11, 0)).await.unwrap();
        assert_eq!(state.expected_cash_cents, Some(35_000));

        let report = reconciler.close_register(&close_req(34_000), local(12, 0)).await.unwrap();
        assert_eq!(report.reconciliation.initial_cash_cents, 10_000);
        assert_eq!(report.reconciliation.cash_sales_cents, 25_000);
        assert_eq!(report.reconciliation.expected_cash_cents, 35_000);
        assert_eq!(report.reconciliation.discrepancy_cents, -1_000);
        assert_eq!(report.summary.breakdown.card_cents, 5_000);

        let session = reconciler.session(&opened.id).await.unwrap();
        assert_eq!(session.status, RegisterStatus::Closed);
        assert_eq!(session.closed_at, Some(local(12, 0)));
        assert_eq!(session.closed_by.as_deref(), Some("maria"));
        assert_eq!(session.counted_cash_cents, Some(34_000));
        assert_eq!(session.expected_cash_cents, Some(35_000));
        assert_eq!(session.discrepancy_cents, Some(-1_000));
        assert_eq!(session.cash_sales_cents, Some(25_000));
        assert_eq!(session.window_start, Some(local(0, 0)));
    }

    #[tokio::test]
    async fn test_unrecognized_method_counts_as_other() {
        let reconciler = setup().await;

        reconciler.open_register(&open_req(0), local(9, 0)).await.unwrap();
        ring(&reconciler, "paypal", 4_200, local(9, 30)).await;
        ring(&reconciler, "mixed", 800, local(9, 45)).await;

        let report = reconciler.close_register(&close_req(0), local(10, 0)).await.unwrap();
        assert_eq!(report.summary.breakdown.other_cents, 5_000);
        assert_eq!(report.summary.breakdown.cash_cents, 0);
        assert_eq!(report.reconciliation.expected_cash_cents, 0);
        assert!(report.reconciliation.is_balanced());
    }

    #[tokio::test]
    async fn test_unpaid_sales_are_not_counted() {
        let reconciler = setup().await;

        reconciler.open_register(&open_req(0), local(9, 0)).await.unwrap();
        ring(&reconciler, "cash", 1_000, local(9, 10)).await;
        ring_with_status(&reconciler, "cash", 2_000, local(9, 20), Some(SaleStatus::Pending)).await;
        let refunded = ring(&reconciler, "cash", 4_000, local(9, 30)).await;
        reconciler
            .db
            .sales()
            .change_status(&refunded.id, SaleStatus::Refunded, local(9, 40))
            .await
            .unwrap();

        let summary = reconciler.daily_summary(local(10, 0)).await.unwrap();
        assert_eq!(summary.breakdown.cash_cents, 1_000);
        assert_eq!(summary.breakdown.sale_count, 1);
    }

    #[tokio::test]
    async fn test_close_then_reopen_does_not_double_count() {
        let reconciler = setup().await;

        reconciler.open_register(&open_req(2_000), local(8, 0)).await.unwrap();
        ring(&reconciler, "cash", 5_000, local(9, 0)).await;
        let first = reconciler.close_register(&close_req(7_000), local(10, 0)).await.unwrap();
        assert_eq!(first.reconciliation.cash_sales_cents, 5_000);

        reconciler.open_register(&open_req(2_000), local(10, 30)).await.unwrap();
        ring(&reconciler, "cash", 2_000, local(11, 0)).await;
        let second = reconciler.close_register(&close_req(4_000), local(12, 0)).await.unwrap();

        assert_eq!(second.summary.window.start, local(10, 0));
        assert_eq!(second.reconciliation.cash_sales_cents, 2_000);
        assert_eq!(second.reconciliation.expected_cash_cents, 4_000);
        assert!(second.reconciliation.is_balanced());

        let history = reconciler.session_history(10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|s| s.status == RegisterStatus::Closed));
    }

    #[tokio::test]
    async fn test_sale_committed_after_close_moves_to_next_shift() {
        let reconciler = setup().await;

        reconciler.open_register(&open_req(0), local(8, 0)).await.unwrap();
        let closed = reconciler.close_register(&close_req(0), local(10, 0)).await.unwrap();
        assert_eq!(closed.reconciliation.cash_sales_cents, 0);

        // Request read its clock before the close but committed after it
        let late = ring(&reconciler, "cash", 5_000, local(10, 0) - TimeDelta::seconds(1)).await;
        assert_eq!(late.created_at, local(10, 0));

        let idle = reconciler.daily_summary(local(10, 30)).await.unwrap();
        assert_eq!(idle.breakdown.cash_cents, 5_000);

        reconciler.open_register(&open_req(0), local(11, 0)).await.unwrap();
        let state = reconciler.current_status(local(11, 30)).await.unwrap();
        assert_eq!(state.summary.window.start, local(10, 0));
        assert_eq!(state.summary.breakdown.cash_cents, 5_000);
        assert_eq!(state.expected_cash_cents, Some(5_000));

        // Sales rung on time keep their own stamp
        let on_time = ring(&reconciler, "card", 1_000, local(11, 15)).await;
        assert_eq!(on_time.created_at, local(11, 15));
    }

    #[tokio::test]
    async fn test_declined_transitions() {
        let reconciler = setup().await;

        let err = reconciler.close_register(&close_req(0), local(9, 0)).await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::NoOpenRegister)));
        assert!(err.is_conflict());

        reconciler.open_register(&open_req(0), local(9, 0)).await.unwrap();
        let err = reconciler.open_register(&open_req(0), local(9, 5)).await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::RegisterAlreadyOpen { .. })));
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_invalid_close_leaves_session_open() {
        let reconciler = setup().await;
        reconciler.open_register(&open_req(0), local(9, 0)).await.unwrap();

        let missing = CloseRegister {
            counted_cash_cents: None,
            ..close_req(0)
        };
        let err = reconciler.close_register(&missing, local(10, 0)).await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::Validation(_))));

        let err = reconciler.close_register(&close_req(-1), local(10, 0)).await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::Validation(_))));

        let err = reconciler.close_register(&close_req(0), local(9, 0)).await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::Validation(_))));

        let state = reconciler.current_status(local(10, 0)).await.unwrap();
        assert_eq!(state.session.map(|s| s.status), Some(RegisterStatus::Open));
    }

    #[tokio::test]
    async fn test_open_requires_initial_cash() {
        let reconciler = setup().await;

        let req = OpenRegister {
            initial_cash_cents: None,
            ..open_req(0)
        };
        let err = reconciler.open_register(&req, local(9, 0)).await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::Validation(_))));
        assert!(reconciler.session_history(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let reconciler = setup().await;
        let err = reconciler.session("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
