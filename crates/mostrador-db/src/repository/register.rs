//! # Register Session Repository
//!
//! Persisted open/close events of the shared cash drawer.
//!
//! ```text
//!   open_session ──► status = open ──► (close in ShiftReconciler) ──► closed
//!                        │
//!                        └── idx_register_single_open: a second open row
//!                            fails the partial UNIQUE index, so concurrent
//!                            opens cannot both succeed
//! ```
//!
//! Sessions are never deleted or reopened.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use mostrador_core::{CashRegisterSession, CashReconciliation, CoreError, ShiftWindow};

const SESSION_COLUMNS: &str = r#"
    id, opened_at, opened_by, closed_at, closed_by,
    initial_cash_cents, counted_cash_cents, expected_cash_cents, discrepancy_cents,
    status, notes, window_start, cash_sales_cents, updated_at
"#;

/// Fields written when a session closes.
#[derive(Debug, Clone)]
pub struct SessionClose<'a> {
    pub closed_by: &'a str,
    pub notes: Option<&'a str>,
    pub window: ShiftWindow,
    pub reconciliation: CashReconciliation,
}

/// Repository for cash register sessions.
#[derive(Debug, Clone)]
pub struct RegisterRepository {
    pool: SqlitePool,
}

impl RegisterRepository {
    /// Creates a new RegisterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RegisterRepository { pool }
    }

    /// The currently open session, if any.
    pub async fn find_open(&self) -> DbResult<Option<CashRegisterSession>> {
        let mut conn = self.pool.acquire().await?;
        find_open(&mut conn).await
    }

    /// Gets a session by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CashRegisterSession>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM cash_register_sessions WHERE id = ?1");

        let session = sqlx::query_as::<_, CashRegisterSession>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(session)
    }

    /// Sessions newest first.
    pub async fn history(&self, limit: i64) -> DbResult<Vec<CashRegisterSession>> {
        let sql = format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM cash_register_sessions
            ORDER BY opened_at DESC
            LIMIT ?1
            "#
        );

        let sessions = sqlx::query_as::<_, CashRegisterSession>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(sessions)
    }

    /// Latest `closed_at` in the inclusive range `[from, to]`.
    pub async fn latest_close_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Option<DateTime<Utc>>> {
        let mut conn = self.pool.acquire().await?;
        latest_close_between(&mut conn, from, to).await
    }

    /// Inserts a new open session.
    ///
    /// One INSERT; the partial unique index decides between concurrent
    /// callers and the loser gets [`CoreError::RegisterAlreadyOpen`].
    pub async fn open_session(
        &self,
        opened_by: &str,
        initial_cash_cents: i64,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> DbResult<CashRegisterSession> {
        let sql = format!(
            r#"
            INSERT INTO cash_register_sessions (
                id, opened_at, opened_by, initial_cash_cents, status, notes, updated_at
            ) VALUES (?1, ?2, ?3, ?4, 'open', ?5, ?2)
            RETURNING {SESSION_COLUMNS}
            "#
        );

        let inserted = sqlx::query_as::<_, CashRegisterSession>(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(now)
            .bind(opened_by.trim())
            .bind(initial_cash_cents)
            .bind(notes)
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from);

        match inserted {
            Ok(session) => {
                info!(
                    session_id = %session.id,
                    opened_by = %session.opened_by,
                    initial_cash_cents,
                    "Register opened"
                );
                Ok(session)
            }
            Err(DbError::UniqueViolation { .. }) => {
                let session_id = self
                    .find_open()
                    .await?
                    .map(|s| s.id)
                    .unwrap_or_else(|| "unknown".to_string());
                warn!(session_id = %session_id, "Open declined: register already open");
                Err(CoreError::RegisterAlreadyOpen { session_id }.into())
            }
            Err(err) => Err(err),
        }
    }
}

// =============================================================================
// Transaction Steps
// =============================================================================

pub(crate) async fn find_open(conn: &mut SqliteConnection) -> DbResult<Option<CashRegisterSession>> {
    let sql = format!("SELECT {SESSION_COLUMNS} FROM cash_register_sessions WHERE status = 'open'");

    let session = sqlx::query_as::<_, CashRegisterSession>(&sql)
        .fetch_optional(conn)
        .await?;

    Ok(session)
}

/// Latest close in `[from, to]` on an existing connection.
pub(crate) async fn latest_close_between(
    conn: &mut SqliteConnection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> DbResult<Option<DateTime<Utc>>> {
    let closed_at: Option<DateTime<Utc>> = sqlx::query_scalar(
        r#"
        SELECT closed_at
        FROM cash_register_sessions
        WHERE status = 'closed'
          AND closed_at >= ?1
          AND closed_at <= ?2
        ORDER BY closed_at DESC
        LIMIT 1
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_optional(conn)
    .await?;

    Ok(closed_at)
}

/// The most recent close of any session.
pub(crate) async fn latest_close(conn: &mut SqliteConnection) -> DbResult<Option<DateTime<Utc>>> {
    let closed_at: Option<DateTime<Utc>> = sqlx::query_scalar(
        r#"
        SELECT closed_at
        FROM cash_register_sessions
        WHERE status = 'closed'
        ORDER BY closed_at DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(conn)
    .await?;

    Ok(closed_at)
}

/// Touches the open session and returns it.
///
/// Run as the first statement of the close transaction so the write lock
/// is held before anything is summed.
pub(crate) async fn lock_open(
    conn: &mut SqliteConnection,
    now: DateTime<Utc>,
) -> DbResult<Option<CashRegisterSession>> {
    let sql = format!(
        r#"
        UPDATE cash_register_sessions SET updated_at = ?1
        WHERE status = 'open'
        RETURNING {SESSION_COLUMNS}
        "#
    );

    let session = sqlx::query_as::<_, CashRegisterSession>(&sql)
        .bind(now)
        .fetch_optional(conn)
        .await?;

    Ok(session)
}

/// Marks an open session closed with its reconciliation.
pub(crate) async fn mark_closed(
    conn: &mut SqliteConnection,
    id: &str,
    close: &SessionClose<'_>,
    now: DateTime<Utc>,
) -> DbResult<CashRegisterSession> {
    let sql = format!(
        r#"
        UPDATE cash_register_sessions SET
            status = 'closed',
            closed_at = ?1,
            closed_by = ?2,
            counted_cash_cents = ?3,
            expected_cash_cents = ?4,
            discrepancy_cents = ?5,
            window_start = ?6,
            cash_sales_cents = ?7,
            notes = COALESCE(?8, notes),
            updated_at = ?1
        WHERE id = ?9 AND status = 'open'
        RETURNING {SESSION_COLUMNS}
        "#
    );

    sqlx::query_as::<_, CashRegisterSession>(&sql)
        .bind(now)
        .bind(close.closed_by.trim())
        .bind(close.reconciliation.counted_cash_cents)
        .bind(close.reconciliation.expected_cash_cents)
        .bind(close.reconciliation.discrepancy_cents)
        .bind(close.window.start)
        .bind(close.reconciliation.cash_sales_cents)
        .bind(close.notes)
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| CoreError::NoOpenRegister.into())
}

// =============================================================================
// Unit Tests
// =============================================================================
