//! # Product Repository
//!
//! The catalog the sale ledger prices against.
//!
//! ## Stock Moves
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create sale      ──► current_stock -= qty   (tracked products only)    │
//! │  cancel / refund  ──► current_stock += qty   (same set of products)     │
//! │  adjust_stock     ──► current_stock += delta (manual count)             │
//! │                                                                         │
//! │  VENTA-LIBRE placeholder: never moves, never listed                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use crate::repository::like_pattern;
use mostrador_core::validation::{validate_new_product, validate_search_query};
use mostrador_core::{CoreError, NewProduct, Product, ValidationError, FREE_SALE_SKU};

const PRODUCT_COLUMNS: &str = r#"
    id, sku, barcode, name, price_cents, tax_rate_bps,
    track_inventory, allow_negative_stock, current_stock,
    is_active, is_free_sale, created_at, updated_at
"#;

/// Repository for product database operations.
///
/// ```rust,ignore
/// let results = db.products().search("cafe", 20).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Searches active catalog products by SKU, name or barcode.
    ///
    /// An empty query lists active products by name. The free-sale
    /// placeholder is never returned.
    pub async fn search(&self, query: &str, limit: i64) -> DbResult<Vec<Product>> {
        let query = validate_search_query(query)?;
        debug!(query = %query, limit, "Searching products");

        if query.is_empty() {
            return self.list_active(limit).await;
        }

        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE is_active = 1
              AND is_free_sale = 0
              AND (sku LIKE ?1 ESCAPE '\' OR name LIKE ?1 ESCAPE '\' OR barcode LIKE ?1 ESCAPE '\')
            ORDER BY name
            LIMIT ?2
            "#
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(like_pattern(&query))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists active catalog products, placeholder excluded.
    pub async fn list_active(&self, limit: i64) -> DbResult<Vec<Product>> {
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE is_active = 1 AND is_free_sale = 0
            ORDER BY name
            LIMIT ?1
            "#
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Gets a product by ID, placeholder included.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_product(&mut conn, id).await
    }

    /// Gets a product by SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(sku.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// The stock-exempt placeholder used for ad-hoc amounts.
    pub async fn free_sale_product(&self) -> DbResult<Product> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE is_free_sale = 1");

        sqlx::query_as::<_, Product>(&sql)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(FREE_SALE_SKU.to_string()).into())
    }

    /// Adds a product to the catalog.
    ///
    /// Duplicate SKUs are rejected as [`crate::DbError::UniqueViolation`].
    pub async fn insert(&self, req: &NewProduct, now: DateTime<Utc>) -> DbResult<Product> {
        validate_new_product(req)?;

        let id = Uuid::new_v4().to_string();
        debug!(id = %id, sku = %req.sku, "Inserting product");

        // Untracked products carry no stock figure at all
        let stock = req
            .track_inventory
            .then(|| req.initial_stock.unwrap_or(0));

        let sql = format!(
            r#"
            INSERT INTO products (
                id, sku, barcode, name, price_cents, tax_rate_bps,
                track_inventory, allow_negative_stock, current_stock,
                is_active, is_free_sale, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, 0, ?10, ?10)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(&id)
            .bind(req.sku.trim())
            .bind(req.barcode.as_deref().map(str::trim))
            .bind(req.name.trim())
            .bind(req.price_cents)
            .bind(req.tax_rate_bps)
            .bind(req.track_inventory)
            .bind(req.allow_negative_stock)
            .bind(stock)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(product)
    }

    /// Applies a manual stock correction to a tracked product.
    pub async fn adjust_stock(&self, id: &str, delta: i64, now: DateTime<Utc>) -> DbResult<Product> {
        let mut tx = self.pool.begin().await?;

        let moved = apply_stock_delta(&mut tx, id, delta, now).await?;
        let product = fetch_product(&mut tx, id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

        if !moved {
            if !product.affects_stock() {
                return Err(ValidationError::NotAllowed {
                    field: "productId".to_string(),
                    allowed: vec!["products with tracked inventory".to_string()],
                }
                .into());
            }
            return Err(CoreError::InsufficientStock {
                sku: product.sku,
                available: product.current_stock.unwrap_or(0),
                requested: -delta,
            }
            .into());
        }

        tx.commit().await?;
        debug!(id = %id, delta, stock = ?product.current_stock, "Stock adjusted");
        Ok(product)
    }

    /// Counts catalog products (placeholder excluded).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_free_sale = 0")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Transaction Steps
// =============================================================================

/// Loads a product on an existing connection.
pub(crate) async fn fetch_product(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(product)
}

/// Moves stock on a tracked, non-placeholder product.
///
/// Decrements are refused (returns `false`) when they would take stock
/// below zero on a product that doesn't allow it. Untracked products and
/// the placeholder also return `false`.
pub(crate) async fn apply_stock_delta(
    conn: &mut SqliteConnection,
    id: &str,
    delta: i64,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE products SET
            current_stock = COALESCE(current_stock, 0) + ?1,
            updated_at = ?2
        WHERE id = ?3
          AND track_inventory = 1
          AND is_free_sale = 0
          AND (?1 >= 0 OR allow_negative_stock = 1 OR COALESCE(current_stock, 0) + ?1 >= 0)
        "#,
    )
    .bind(delta)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

// =============================================================================
// Unit Tests
// =============================================================================
