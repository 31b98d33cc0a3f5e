//! # Validation Module
//!
//! Input validation for Mostrador POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: SPA form checks (empty, length)                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: axum extractors (JSON shape, types)                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: THIS MODULE, called before any write                         │
//! │  ├── open/close amounts present and ≥ 0                                │
//! │  ├── sale lines, quantities, discount                                  │
//! │  └── catalog fields                                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: SQLite CHECK / UNIQUE constraints                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mostrador_core::validation::{validate_quantity, validate_sku};
//!
//! validate_sku("CAFE-500").unwrap();
//! validate_quantity(5).unwrap();
//! assert!(validate_quantity(1000).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{CloseRegister, NewProduct, NewSale, OpenRegister, SaleDetailsPatch};
use crate::{MAX_ITEM_QUANTITY, MAX_SALE_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted free-text note.
pub const MAX_NOTES_LEN: usize = 500;

/// Longest accepted customer info string.
pub const MAX_CUSTOMER_INFO_LEN: usize = 200;

/// Longest accepted user reference.
pub const MAX_USER_REF_LEN: usize = 100;

/// Largest page size for list endpoints.
pub const MAX_LIST_LIMIT: i64 = 500;

/// Largest accepted price or drawer amount: RD$1,000,000,000.00.
///
/// At this ceiling a full sale (`MAX_SALE_LINES` × `MAX_ITEM_QUANTITY`
/// units, 100% tax) still sums far below `i64::MAX`.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, digits, hyphens and underscores only
///
/// ```rust
/// use mostrador_core::validation::validate_sku;
///
/// assert!(validate_sku("VENTA-LIBRE").is_ok());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::required("sku"));
    }

    if sku.chars().count() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name (1 to 200 characters after trimming).
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, 200)?;
    if name.trim().is_empty() {
        return Err(ValidationError::required("name"));
    }
    Ok(())
}

/// Validates a search query and returns it trimmed.
///
/// Empty is fine and means "everything".
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();
    validate_text("query", query, 100)?;
    Ok(query.to_string())
}

/// Validates a user reference (opener, closer, seller).
///
/// Users live in an external directory; all we require is a non-blank id.
pub fn validate_user_ref(field: &str, user: &str) -> ValidationResult<()> {
    if user.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    validate_text(field, user, MAX_USER_REF_LEN)
}

/// Rejects text longer than `max` characters.
pub fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

fn validate_optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(value) => validate_text(field, value, max),
        None => Ok(()),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed, up to `MAX_AMOUNT_CENTS`.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }
    validate_amount_ceiling("price", cents)
}

fn validate_amount_ceiling(field: &str, cents: i64) -> ValidationResult<()> {
    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }
    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "taxRate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

/// Validates a required drawer amount and returns it.
///
/// ## Rules
/// - Must be present: a missing float or count is a validation error,
///   never an implicit zero
/// - Must not be negative
/// - Must not exceed `MAX_AMOUNT_CENTS`
///
/// ```rust
/// use mostrador_core::validation::validate_cash_amount;
///
/// assert_eq!(validate_cash_amount("initialCashCents", Some(10_000)).unwrap(), 10_000);
/// assert!(validate_cash_amount("initialCashCents", None).is_err());
/// assert!(validate_cash_amount("initialCashCents", Some(-1)).is_err());
/// assert!(validate_cash_amount("initialCashCents", Some(i64::MAX)).is_err());
/// ```
pub fn validate_cash_amount(field: &str, cents: Option<i64>) -> ValidationResult<i64> {
    let cents = cents.ok_or_else(|| ValidationError::required(field))?;
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    validate_amount_ceiling(field, cents)?;
    Ok(cents)
}

/// Validates a sale discount against the pre-discount amount.
///
/// `0 ≤ discount ≤ subtotal + tax`, so a total can reach zero but never go
/// negative.
pub fn validate_discount(discount_cents: i64, gross_cents: i64) -> ValidationResult<()> {
    if discount_cents < 0 || discount_cents > gross_cents {
        return Err(ValidationError::OutOfRange {
            field: "discountCents".to_string(),
            min: 0,
            max: gross_cents.max(0),
        });
    }
    Ok(())
}

/// Clamps an optional page size to `1..=MAX_LIST_LIMIT`.
pub fn validate_limit(limit: Option<i64>, default: i64) -> ValidationResult<i64> {
    match limit {
        None => Ok(default),
        Some(limit) if (1..=MAX_LIST_LIMIT).contains(&limit) => Ok(limit),
        Some(_) => Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: MAX_LIST_LIMIT,
        }),
    }
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates an open-register request; returns the initial float in cents.
pub fn validate_open_register(req: &OpenRegister) -> ValidationResult<i64> {
    validate_user_ref("openedBy", &req.opened_by)?;
    validate_optional_text("notes", req.notes.as_deref(), MAX_NOTES_LEN)?;
    validate_cash_amount("initialCashCents", req.initial_cash_cents)
}

/// Validates a close-register request; returns the counted cash in cents.
pub fn validate_close_register(req: &CloseRegister) -> ValidationResult<i64> {
    validate_user_ref("closedBy", &req.closed_by)?;
    validate_optional_text("notes", req.notes.as_deref(), MAX_NOTES_LEN)?;
    validate_cash_amount("countedCashCents", req.counted_cash_cents)
}

/// Validates the shape of a new sale.
///
/// Product existence, stock and the discount ceiling need the catalog and
/// are checked by the ledger once prices are known.
pub fn validate_new_sale(req: &NewSale) -> ValidationResult<()> {
    validate_user_ref("sellerId", &req.seller_id)?;

    if req.payment_method.as_str().trim().is_empty() {
        return Err(ValidationError::required("paymentMethod"));
    }
    validate_text("paymentMethod", req.payment_method.as_str(), 30)?;

    if req.lines.is_empty() {
        return Err(ValidationError::required("lines"));
    }
    if req.lines.len() > MAX_SALE_LINES {
        return Err(ValidationError::OutOfRange {
            field: "lines".to_string(),
            min: 1,
            max: MAX_SALE_LINES as i64,
        });
    }

    for line in &req.lines {
        validate_uuid(&line.product_id)?;
        validate_quantity(line.quantity)?;
        if let Some(price) = line.unit_price_cents {
            validate_price_cents(price)?;
        }
    }

    if req.discount_cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "discountCents".to_string(),
        });
    }

    validate_optional_text("customerInfo", req.customer_info.as_deref(), MAX_CUSTOMER_INFO_LEN)?;
    validate_optional_text("notes", req.notes.as_deref(), MAX_NOTES_LEN)
}

/// Validates a details patch.
pub fn validate_details_patch(patch: &SaleDetailsPatch) -> ValidationResult<()> {
    validate_optional_text("customerInfo", patch.customer_info.as_deref(), MAX_CUSTOMER_INFO_LEN)?;
    validate_optional_text("notes", patch.notes.as_deref(), MAX_NOTES_LEN)
}

/// Validates a new catalog product.
pub fn validate_new_product(req: &NewProduct) -> ValidationResult<()> {
    validate_sku(&req.sku)?;
    validate_product_name(&req.name)?;
    validate_optional_text("barcode", req.barcode.as_deref(), 50)?;
    validate_price_cents(req.price_cents)?;
    validate_tax_rate_bps(req.tax_rate_bps)?;
    if let Some(stock) = req.initial_stock {
        if stock < 0 && !req.allow_negative_stock {
            return Err(ValidationError::MustNotBeNegative {
                field: "initialStock".to_string(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
///
/// ```rust
/// use mostrador_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required("id"));
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
