//! # Sale Repository
//!
//! The sale ledger: creation with line items, status changes, the details
//! patch, and the paid-sale totals that shift reconciliation reads.
//!
//! ## Sale Creation (one transaction)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   1. bump invoice_counters[year]  ← first statement takes the write    │
//! │                                     lock, so numbers are serialized    │
//! │   2. stamp = max(now, last close)  (never lands in a closed window)    │
//! │   3. load + price every line       (placeholder takes request price)   │
//! │   4. decrement tracked stock       (refused → whole sale rolls back)   │
//! │   5. INSERT sales, INSERT sale_items                                   │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Financial fields are written once. Afterwards only `status`,
//! `customer_info` and `notes` change.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::product::{apply_stock_delta, fetch_product};
use crate::repository::register;
use mostrador_core::invoice::InvoiceNumber;
use mostrador_core::validation::{validate_details_patch, validate_new_sale};
use mostrador_core::{
    BusinessClock, CoreError, NewSale, PaymentBreakdown, PricedLine, Sale, SaleDetailsPatch,
    SaleItem, SaleStatus, SaleTotals, SaleWithItems, ValidationError,
};

const SALE_COLUMNS: &str = r#"
    id, invoice_number, status, payment_method,
    subtotal_cents, tax_cents, discount_cents, total_cents,
    seller_id, customer_info, notes, created_at, updated_at
"#;

const ITEM_COLUMNS: &str = r#"
    id, sale_id, product_id, name_snapshot, unit_price_cents,
    quantity, line_subtotal_cents, tax_cents
"#;

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a sale with its items, stock moves and invoice number.
    ///
    /// The invoice year is the local calendar year of `now` on `clock`.
    ///
    /// `created_at` is `now` unless a register close committed at a later
    /// instant while this request waited for the write lock; the sale is
    /// then stamped at that close, the first instant of the next window.
    pub async fn create(
        &self,
        req: &NewSale,
        clock: &BusinessClock,
        now: DateTime<Utc>,
    ) -> DbResult<SaleWithItems> {
        validate_new_sale(req)?;
        let status = req.status.unwrap_or_default();
        if !matches!(status, SaleStatus::Paid | SaleStatus::Pending) {
            return Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: vec!["paid".to_string(), "pending".to_string()],
            }
            .into());
        }

        let mut tx = self.pool.begin().await?;

        let year = clock.local_year(now);
        let sequence = next_invoice_sequence(&mut tx, year).await?;
        let invoice_number = InvoiceNumber::new(year, sequence)?.to_string();

        let created_at = match register::latest_close(&mut tx).await? {
            Some(closed_at) if closed_at > now => {
                debug!(%now, %closed_at, "Sale raced a register close, stamping into the next shift");
                closed_at
            }
            _ => now,
        };

        let mut lines = Vec::with_capacity(req.lines.len());
        for line in &req.lines {
            let product = fetch_product(&mut tx, &line.product_id)
                .await?
                .filter(|p| p.is_active)
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            let priced = PricedLine::for_product(&product, line.quantity, line.unit_price_cents)?;

            if priced.affects_stock
                && !apply_stock_delta(&mut tx, &product.id, -line.quantity, created_at).await?
            {
                // Re-read: an earlier line of this sale may already have moved it
                let available = fetch_product(&mut tx, &product.id)
                    .await?
                    .and_then(|p| p.current_stock)
                    .unwrap_or(0);
                warn!(sku = %product.sku, available, requested = line.quantity, "Insufficient stock");
                return Err(CoreError::InsufficientStock {
                    sku: product.sku,
                    available,
                    requested: line.quantity,
                }
                .into());
            }

            lines.push(priced);
        }

        let totals = SaleTotals::compute(&lines, req.discount_cents)?;
        let sale_id = Uuid::new_v4().to_string();

        let sql = format!(
            r#"
            INSERT INTO sales (
                id, invoice_number, status, payment_method,
                subtotal_cents, tax_cents, discount_cents, total_cents,
                seller_id, customer_info, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
            RETURNING {SALE_COLUMNS}
            "#
        );

        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(&sale_id)
            .bind(&invoice_number)
            .bind(status)
            .bind(req.payment_method.as_str())
            .bind(totals.subtotal.cents())
            .bind(totals.tax.cents())
            .bind(totals.discount.cents())
            .bind(totals.total.cents())
            .bind(req.seller_id.trim())
            .bind(req.customer_info.as_deref())
            .bind(req.notes.as_deref())
            .bind(created_at)
            .fetch_one(&mut *tx)
            .await?;

        let mut items = Vec::with_capacity(lines.len());
        for (line_no, line) in lines.iter().enumerate() {
            items.push(insert_item(&mut tx, &sale_id, line_no as i64 + 1, line).await?);
        }

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            invoice = %sale.invoice_number,
            method = %sale.payment_method,
            total_cents = sale.total_cents,
            "Sale recorded"
        );

        Ok(SaleWithItems { sale, items })
    }

    /// Moves a sale to `next` if the transition is allowed.
    ///
    /// Cancelling or refunding returns tracked items to stock in the same
    /// transaction.
    pub async fn change_status(
        &self,
        id: &str,
        next: SaleStatus,
        now: DateTime<Utc>,
    ) -> DbResult<Sale> {
        let mut tx = self.pool.begin().await?;

        // Touch first so the transaction holds the write lock before it reads
        let current: SaleStatus =
            sqlx::query_scalar("UPDATE sales SET updated_at = ?1 WHERE id = ?2 RETURNING status")
                .bind(now)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| CoreError::SaleNotFound(id.to_string()))?;

        if !current.can_transition_to(next) {
            warn!(sale_id = %id, from = %current, to = %next, "Status change declined");
            return Err(CoreError::InvalidStatusTransition {
                sale_id: id.to_string(),
                from: current.to_string(),
                to: next.to_string(),
            }
            .into());
        }

        sqlx::query("UPDATE sales SET status = ?1 WHERE id = ?2")
            .bind(next)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if next.restocks() && !current.restocks() {
            let restocked = restock_items(&mut tx, id, now).await?;
            debug!(sale_id = %id, products = restocked, "Items returned to stock");
        }

        let sale = fetch_sale(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        tx.commit().await?;
        info!(sale_id = %id, from = %current, to = %next, "Sale status changed");
        Ok(sale)
    }

    /// Updates customer info and notes. Absent fields are left as they are.
    pub async fn update_details(
        &self,
        id: &str,
        patch: &SaleDetailsPatch,
        now: DateTime<Utc>,
    ) -> DbResult<Sale> {
        validate_details_patch(patch)?;

        let sql = format!(
            r#"
            UPDATE sales SET
                customer_info = COALESCE(?1, customer_info),
                notes = COALESCE(?2, notes),
                updated_at = ?3
            WHERE id = ?4
            RETURNING {SALE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Sale>(&sql)
            .bind(patch.customer_info.as_deref())
            .bind(patch.notes.as_deref())
            .bind(now)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(id.to_string()).into())
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let mut conn = self.pool.acquire().await?;
        fetch_sale(&mut conn, id).await
    }

    /// Gets a sale with its line items.
    pub async fn get_with_items(&self, id: &str) -> DbResult<Option<SaleWithItems>> {
        let Some(sale) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let items = self.get_items(id).await?;
        Ok(Some(SaleWithItems { sale, items }))
    }

    /// Gets the line items of a sale in entry order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY line_no"
        );

        let items = sqlx::query_as::<_, SaleItem>(&sql)
            .bind(sale_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Lists sales created in `[from, to)`, newest first.
    pub async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        status: Option<SaleStatus>,
        limit: i64,
    ) -> DbResult<Vec<Sale>> {
        debug!(%from, %to, ?status, limit, "Listing sales");

        let sql = format!(
            r#"
            SELECT {SALE_COLUMNS}
            FROM sales
            WHERE created_at >= ?1
              AND created_at < ?2
              AND (?3 IS NULL OR status = ?3)
            ORDER BY created_at DESC
            LIMIT ?4
            "#
        );

        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(from)
            .bind(to)
            .bind(status)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Paid-sale totals in `[from, to)` by payment method.
    pub async fn payment_totals(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<PaymentBreakdown> {
        let mut conn = self.pool.acquire().await?;
        payment_totals(&mut conn, from, to).await
    }
}

// =============================================================================
// Transaction Steps
// =============================================================================

/// Returns the next invoice sequence for `year`.
///
/// A single upsert, so two concurrent sales can never read the same value.
pub(crate) async fn next_invoice_sequence(conn: &mut SqliteConnection, year: i32) -> DbResult<u32> {
    let sequence: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO invoice_counters (year, last_sequence) VALUES (?1, 1)
        ON CONFLICT (year) DO UPDATE SET last_sequence = last_sequence + 1
        RETURNING last_sequence
        "#,
    )
    .bind(year)
    .fetch_one(conn)
    .await?;

    u32::try_from(sequence).map_err(|_| DbError::Internal(format!("invoice sequence {sequence} out of range")))
}

/// Paid-sale totals in `[from, to)` on an existing connection.
pub(crate) async fn payment_totals(
    conn: &mut SqliteConnection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> DbResult<PaymentBreakdown> {
    let rows: Vec<(String, i64, i64)> = sqlx::query_as(
        r#"
        SELECT payment_method, COALESCE(SUM(total_cents), 0), COUNT(*)
        FROM sales
        WHERE status = 'paid'
          AND created_at >= ?1
          AND created_at < ?2
        GROUP BY payment_method
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(conn)
    .await?;

    Ok(PaymentBreakdown::from_rows(rows))
}

/// Paid sales in `[from, to)`, newest first.
pub(crate) async fn paid_sales_between(
    conn: &mut SqliteConnection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    limit: i64,
) -> DbResult<Vec<Sale>> {
    let sql = format!(
        r#"
        SELECT {SALE_COLUMNS}
        FROM sales
        WHERE status = 'paid' AND created_at >= ?1 AND created_at < ?2
        ORDER BY created_at DESC
        LIMIT ?3
        "#
    );

    let sales = sqlx::query_as::<_, Sale>(&sql)
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(conn)
        .await?;

    Ok(sales)
}

async fn fetch_sale(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Sale>> {
    let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");

    let sale = sqlx::query_as::<_, Sale>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(sale)
}

async fn insert_item(
    conn: &mut SqliteConnection,
    sale_id: &str,
    line_no: i64,
    line: &PricedLine,
) -> DbResult<SaleItem> {
    let sql = format!(
        r#"
        INSERT INTO sale_items (
            id, sale_id, product_id, line_no, name_snapshot,
            unit_price_cents, quantity, line_subtotal_cents, tax_cents
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        RETURNING {ITEM_COLUMNS}
        "#
    );

    let item = sqlx::query_as::<_, SaleItem>(&sql)
        .bind(Uuid::new_v4().to_string())
        .bind(sale_id)
        .bind(&line.product_id)
        .bind(line_no)
        .bind(&line.name_snapshot)
        .bind(line.unit_price.cents())
        .bind(line.quantity)
        .bind(line.subtotal().cents())
        .bind(line.tax().cents())
        .fetch_one(conn)
        .await?;

    Ok(item)
}

/// Adds a sale's quantities back to its tracked products.
async fn restock_items(conn: &mut SqliteConnection, sale_id: &str, now: DateTime<Utc>) -> DbResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE products SET
            current_stock = COALESCE(current_stock, 0) + (
                SELECT SUM(quantity) FROM sale_items
                WHERE sale_id = ?1 AND product_id = products.id
            ),
            updated_at = ?2
        WHERE track_inventory = 1
          AND is_free_sale = 0
          AND id IN (SELECT product_id FROM sale_items WHERE sale_id = ?1)
        "#,
    )
    .bind(sale_id)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::{TimeDelta, TimeZone};
    use mostrador_core::{NewProduct, NewSaleLine, PaymentMethod, Product, FREE_SALE_PRODUCT_ID};

    async fn setup() -> (Database, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .insert(
                &NewProduct {
                    sku: "CAFE-500".into(),
                    barcode: None,
                    name: "Café Santo Domingo 500g".into(),
                    price_cents: 10_000,
                    tax_rate_bps: 1800,
                    track_inventory: true,
                    allow_negative_stock: false,
                    initial_stock: Some(5),
                },
                Utc::now(),
            )
            .await
            .unwrap();
        (db, product)
    }

    fn sale_of(product_id: &str, quantity: i64, method: &str) -> NewSale {
        NewSale {
            seller_id: "maria".into(),
            payment_method: PaymentMethod::from(method),
            status: None,
            discount_cents: 0,
            customer_info: None,
            notes: None,
            lines: vec![NewSaleLine {
                product_id: product_id.into(),
                quantity,
                unit_price_cents: None,
            }],
        }
    }

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, h, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_create_sale_computes_totals_and_moves_stock() {
        let (db, product) = setup().await;
        let clock = BusinessClock::default();

        let created = db
            .sales()
            .create(&sale_of(&product.id, 2, "cash"), &clock, at(15))
            .await
            .unwrap();

        assert_eq!(created.sale.invoice_number, "FACT-2026-000001");
        assert_eq!(created.sale.status, SaleStatus::Paid);
        assert_eq!(created.sale.subtotal_cents, 20_000);
        assert_eq!(created.sale.tax_cents, 3_600);
        assert_eq!(created.sale.total_cents, 23_600);
        assert_eq!(created.items.len(), 1);
        assert_eq!(created.items[0].name_snapshot, "Café Santo Domingo 500g");

        let stock = db.products().get_by_id(&product.id).await.unwrap().unwrap().current_stock;
        assert_eq!(stock, Some(3));

        let fetched = db.sales().get_with_items(&created.sale.id).await.unwrap().unwrap();
        assert_eq!(fetched.items.len(), 1);
        assert_eq!(fetched.sale.payment_method, PaymentMethod::Cash);
    }

    #[tokio::test]
    async fn test_invoice_numbers_are_sequential_and_reset_per_local_year() {
        let (db, product) = setup().await;
        let clock = BusinessClock::default();
        let sales = db.sales();

        let first = sales.create(&sale_of(&product.id, 1, "cash"), &clock, at(15)).await.unwrap();
        let second = sales.create(&sale_of(&product.id, 1, "card"), &clock, at(16)).await.unwrap();
        assert_eq!(first.sale.invoice_number, "FACT-2026-000001");
        assert_eq!(second.sale.invoice_number, "FACT-2026-000002");

        // 03:00 UTC on Jan 1 is still Dec 31 locally
        let new_years_eve = Utc.with_ymd_and_hms(2027, 1, 1, 3, 0, 0).unwrap();
        let third = sales.create(&sale_of(&product.id, 1, "cash"), &clock, new_years_eve).await.unwrap();
        assert_eq!(third.sale.invoice_number, "FACT-2026-000003");

        let new_year = new_years_eve + TimeDelta::hours(2);
        let fourth = sales.create(&sale_of(&product.id, 1, "cash"), &clock, new_year).await.unwrap();
        assert_eq!(fourth.sale.invoice_number, "FACT-2027-000001");
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let (db, product) = setup().await;
        let clock = BusinessClock::default();

        let mut req = sale_of(&product.id, 3, "cash");
        // Same product twice: 3 + 3 > 5
        req.lines.push(req.lines[0].clone());

        let err = db.sales().create(&req, &clock, at(15)).await.unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::InsufficientStock { available: 2, requested: 3, .. })
        ));

        let stock = db.products().get_by_id(&product.id).await.unwrap().unwrap().current_stock;
        assert_eq!(stock, Some(5));

        // The invoice counter was rolled back too
        let next = db.sales().create(&sale_of(&product.id, 1, "cash"), &clock, at(16)).await.unwrap();
        assert_eq!(next.sale.invoice_number, "FACT-2026-000001");
    }

    #[tokio::test]
    async fn test_free_sale_takes_request_price_and_skips_stock() {
        let (db, _) = setup().await;
        let mut req = sale_of(FREE_SALE_PRODUCT_ID, 1, "transfer");
        req.lines[0].unit_price_cents = Some(75_000);

        let created = db.sales().create(&req, &BusinessClock::default(), at(15)).await.unwrap();
        assert_eq!(created.sale.total_cents, 75_000);
        assert_eq!(created.items[0].name_snapshot, "Venta libre");

        let placeholder = db.products().free_sale_product().await.unwrap();
        assert_eq!(placeholder.current_stock, None);
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let (db, _) = setup().await;
        let req = sale_of("550e8400-e29b-41d4-a716-446655440000", 1, "cash");
        let err = db.sales().create(&req, &BusinessClock::default(), at(15)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_discount_above_gross_is_rejected() {
        let (db, product) = setup().await;
        let mut req = sale_of(&product.id, 1, "cash");
        req.discount_cents = 11_801;
        let err = db.sales().create(&req, &BusinessClock::default(), at(15)).await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::Validation(_))));

        req.discount_cents = 1_800;
        let sale = db.sales().create(&req, &BusinessClock::default(), at(15)).await.unwrap().sale;
        assert_eq!(sale.total_cents, 10_000);
    }

    #[tokio::test]
    async fn test_refund_restocks_and_blocks_further_changes() {
        let (db, product) = setup().await;
        let sales = db.sales();
        let created = sales
            .create(&sale_of(&product.id, 2, "cash"), &BusinessClock::default(), at(15))
            .await
            .unwrap();

        let refunded = sales
            .change_status(&created.sale.id, SaleStatus::Refunded, at(16))
            .await
            .unwrap();
        assert_eq!(refunded.status, SaleStatus::Refunded);
        assert_eq!(refunded.total_cents, created.sale.total_cents);

        let stock = db.products().get_by_id(&product.id).await.unwrap().unwrap().current_stock;
        assert_eq!(stock, Some(5));

        let err = sales
            .change_status(&created.sale.id, SaleStatus::Paid, at(17))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        // The declined change left nothing behind
        let unchanged = sales.get_by_id(&created.sale.id).await.unwrap().unwrap();
        assert_eq!(unchanged.updated_at, at(16));
    }

    #[tokio::test]
    async fn test_pending_sale_can_be_paid() {
        let (db, product) = setup().await;
        let mut req = sale_of(&product.id, 1, "card");
        req.status = Some(SaleStatus::Pending);
        let sale = db.sales().create(&req, &BusinessClock::default(), at(15)).await.unwrap().sale;
        assert_eq!(sale.status, SaleStatus::Pending);

        let paid = db.sales().change_status(&sale.id, SaleStatus::Paid, at(16)).await.unwrap();
        assert_eq!(paid.status, SaleStatus::Paid);

        let err = db.sales().change_status("missing", SaleStatus::Paid, at(16)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_details_patch_leaves_money_alone() {
        let (db, product) = setup().await;
        let created = db
            .sales()
            .create(&sale_of(&product.id, 1, "cash"), &BusinessClock::default(), at(15))
            .await
            .unwrap();

        let patched = db
            .sales()
            .update_details(
                &created.sale.id,
                &SaleDetailsPatch {
                    customer_info: Some("Juan Pérez, RNC 131-12345-6".into()),
                    notes: None,
                },
                at(16),
            )
            .await
            .unwrap();

        assert_eq!(patched.customer_info.as_deref(), Some("Juan Pérez, RNC 131-12345-6"));
        assert_eq!(patched.total_cents, created.sale.total_cents);
        assert_eq!(patched.invoice_number, created.sale.invoice_number);
    }

    #[tokio::test]
    async fn test_payment_totals_and_listing() {
        let (db, product) = setup().await;
        let clock = BusinessClock::default();
        let sales = db.sales();

        sales.create(&sale_of(&product.id, 1, "cash"), &clock, at(14)).await.unwrap();
        sales.create(&sale_of(&product.id, 1, "paypal"), &clock, at(15)).await.unwrap();
        let mut pending = sale_of(&product.id, 1, "card");
        pending.status = Some(SaleStatus::Pending);
        sales.create(&pending, &clock, at(15)).await.unwrap();

        let totals = sales.payment_totals(at(14), at(16)).await.unwrap();
        assert_eq!(totals.cash_cents, 11_800);
        assert_eq!(totals.other_cents, 11_800);
        assert_eq!(totals.card_cents, 0);
        assert_eq!(totals.sale_count, 2);

        // Upper bound is exclusive
        let totals = sales.payment_totals(at(14), at(15)).await.unwrap();
        assert_eq!(totals.sale_count, 1);

        let all = sales.list_between(at(0), at(23), None, 50).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all[0].created_at >= all[2].created_at);

        let only_pending = sales
            .list_between(at(0), at(23), Some(SaleStatus::Pending), 50)
            .await
            .unwrap();
        assert_eq!(only_pending.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_sales_get_distinct_consecutive_invoices() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("pos.db")).max_connections(8))
            .await
            .unwrap();
        let clock = BusinessClock::default();

        let tasks: Vec<_> = (0..12)
            .map(|i| {
                let sales = db.sales();
                tokio::spawn(async move {
                    let mut req = sale_of(FREE_SALE_PRODUCT_ID, 1, "cash");
                    req.lines[0].unit_price_cents = Some(1_000 + i);
                    sales.create(&req, &clock, at(15)).await
                })
            })
            .collect();

        let mut numbers = Vec::new();
        for task in tasks {
            numbers.push(task.await.unwrap().unwrap().sale.invoice_number);
        }
        numbers.sort();

        let expected: Vec<String> = (1..=12).map(|n| format!("FACT-2026-{n:06}")).collect();
        assert_eq!(numbers, expected);
    }
}
