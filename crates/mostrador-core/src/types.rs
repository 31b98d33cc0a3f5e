//! # Domain Types
//!
//! Core domain types used throughout Mostrador POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────────┐  │
//! │  │    Product      │   │      Sale       │   │ CashRegisterSession  │  │
//! │  │  ─────────────  │   │  ─────────────  │   │  ──────────────────  │  │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)           │  │
//! │  │  sku (business) │   │  invoice_number │   │  opened_at / by      │  │
//! │  │  price_cents    │   │  payment_method │   │  closed_at / by      │  │
//! │  │  is_free_sale   │   │  status         │   │  initial / counted   │  │
//! │  └─────────────────┘   │  total_cents    │   │  expected / discrep. │  │
//! │                        └─────────────────┘   └──────────────────────┘  │
//! │                                                                         │
//! │  Sales belong to a session only through their timestamp: there is no   │
//! │  foreign key from sales to cash_register_sessions.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate in basis points (1800 = 18% ITBIS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Standard Dominican ITBIS rate.
    pub const ITBIS: TaxRate = TaxRate(1800);

    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub sku: String,
    pub barcode: Option<String>,
    pub name: String,
    pub price_cents: i64,
    pub tax_rate_bps: u32,
    pub track_inventory: bool,
    pub allow_negative_stock: bool,
    pub current_stock: Option<i64>,
    pub is_active: bool,
    /// Stock-exempt placeholder for ad-hoc amounts, hidden from listings.
    pub is_free_sale: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the tax rate.
    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// Whether selling this product moves stock at all.
    #[inline]
    pub fn affects_stock(&self) -> bool {
        self.track_inventory && !self.is_free_sale
    }

    /// Checks if `quantity` units can be sold right now.
    pub fn can_sell(&self, quantity: i64) -> bool {
        if !self.affects_stock() {
            return true;
        }

        self.current_stock.unwrap_or(0) >= quantity || self.allow_negative_stock
    }
}

/// Request to add a product to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewProduct {
    pub sku: String,
    #[serde(default)]
    pub barcode: Option<String>,
    pub name: String,
    pub price_cents: i64,
    /// Defaults to ITBIS (18%).
    #[serde(default = "default_tax_rate_bps")]
    pub tax_rate_bps: u32,
    #[serde(default = "default_true")]
    pub track_inventory: bool,
    #[serde(default)]
    pub allow_negative_stock: bool,
    #[serde(default)]
    pub initial_stock: Option<i64>,
}

fn default_tax_rate_bps() -> u32 {
    TaxRate::ITBIS.bps()
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SaleStatus {
    /// Settled; the only status counted by shift reconciliation.
    Paid,
    /// Recorded but not yet settled (e.g. store credit).
    Pending,
    /// Voided before or after payment.
    Cancelled,
    /// Money returned to the customer.
    Refunded,
}

impl SaleStatus {
    /// Returns the stored lowercase name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Paid => "paid",
            SaleStatus::Pending => "pending",
            SaleStatus::Cancelled => "cancelled",
            SaleStatus::Refunded => "refunded",
        }
    }

    /// Allowed status changes after creation.
    ///
    /// ```text
    /// pending ──► paid ──► refunded
    ///    │          │
    ///    └──────────┴──► cancelled
    /// ```
    pub fn can_transition_to(&self, next: SaleStatus) -> bool {
        matches!(
            (self, next),
            (SaleStatus::Pending, SaleStatus::Paid)
                | (SaleStatus::Pending, SaleStatus::Cancelled)
                | (SaleStatus::Paid, SaleStatus::Refunded)
                | (SaleStatus::Paid, SaleStatus::Cancelled)
        )
    }

    /// Whether reaching this status returns the sold items to stock.
    pub const fn restocks(&self) -> bool {
        matches!(self, SaleStatus::Cancelled | SaleStatus::Refunded)
    }
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Paid
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid.
///
/// The stored value is free text: anything the SPA sends that is not one
/// of the known names is kept verbatim as [`PaymentMethod::Other`] so it can
/// still be counted in the `other` bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    /// Physical cash; the only method counted in the drawer.
    Cash,
    Card,
    Transfer,
    /// Split tender.
    Mixed,
    Other(String),
}

impl PaymentMethod {
    /// Returns the stored name.
    pub fn as_str(&self) -> &str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Mixed => "mixed",
            PaymentMethod::Other(name) => name,
        }
    }

    /// The reconciliation bucket this method is counted in.
    pub fn bucket(&self) -> PaymentBucket {
        match self {
            PaymentMethod::Cash => PaymentBucket::Cash,
            PaymentMethod::Card => PaymentBucket::Card,
            PaymentMethod::Transfer => PaymentBucket::Transfer,
            PaymentMethod::Mixed | PaymentMethod::Other(_) => PaymentBucket::Other,
        }
    }
}

impl From<String> for PaymentMethod {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "cash" => PaymentMethod::Cash,
            "card" => PaymentMethod::Card,
            "transfer" => PaymentMethod::Transfer,
            "mixed" => PaymentMethod::Mixed,
            _ => PaymentMethod::Other(value),
        }
    }
}

impl From<&str> for PaymentMethod {
    fn from(value: &str) -> Self {
        PaymentMethod::from(value.to_string())
    }
}

impl From<PaymentMethod> for String {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four observable reconciliation buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PaymentBucket {
    Cash,
    Card,
    Transfer,
    Other,
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    pub id: String,
    /// `FACT-<year>-<6-digit sequence>`.
    pub invoice_number: String,
    pub status: SaleStatus,
    #[cfg_attr(feature = "sqlx", sqlx(try_from = "String"))]
    #[ts(as = "String")]
    pub payment_method: PaymentMethod,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub seller_id: String,
    /// Freeform customer name / RNC / phone.
    pub customer_info: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line item in a sale.
/// Product name and price are frozen at the time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub name_snapshot: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// unit_price × quantity, before tax.
    pub line_subtotal_cents: i64,
    pub tax_cents: i64,
}

/// A sale together with its line items.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Sale Inputs
// =============================================================================

/// Request to record a new sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewSale {
    pub seller_id: String,
    #[ts(as = "String")]
    pub payment_method: PaymentMethod,
    /// Defaults to `paid`.
    #[serde(default)]
    pub status: Option<SaleStatus>,
    #[serde(default)]
    pub discount_cents: i64,
    #[serde(default)]
    pub customer_info: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub lines: Vec<NewSaleLine>,
}

/// One requested line of a new sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewSaleLine {
    pub product_id: String,
    pub quantity: i64,
    /// Required for the free-sale placeholder, ignored for catalog products.
    #[serde(default)]
    pub unit_price_cents: Option<i64>,
}

/// The non-financial fields a sale may still change after creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleDetailsPatch {
    #[serde(default)]
    pub customer_info: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Cash Register Session
// =============================================================================

/// Lifecycle state of a register session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum RegisterStatus {
    Open,
    Closed,
}

/// One open→close cycle of the (single, shared) cash drawer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CashRegisterSession {
    pub id: String,
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    pub opened_by: String,
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
    pub closed_by: Option<String>,
    pub initial_cash_cents: i64,
    pub counted_cash_cents: Option<i64>,
    pub expected_cash_cents: Option<i64>,
    /// counted − expected; negative means the drawer is short.
    pub discrepancy_cents: Option<i64>,
    pub status: RegisterStatus,
    pub notes: Option<String>,
    /// Effective start of the window counted at close.
    #[ts(as = "Option<String>")]
    pub window_start: Option<DateTime<Utc>>,
    /// Cash bucket counted at close.
    pub cash_sales_cents: Option<i64>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl CashRegisterSession {
    /// Returns the initial float as Money.
    #[inline]
    pub fn initial_cash(&self) -> Money {
        Money::from_cents(self.initial_cash_cents)
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == RegisterStatus::Open
    }
}

/// Request to open the register.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OpenRegister {
    pub opened_by: String,
    /// Required; `None` is rejected before anything is written.
    #[serde(default)]
    pub initial_cash_cents: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request to close the register.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CloseRegister {
    pub closed_by: String,
    /// Required; `None` is rejected before anything is written.
    #[serde(default)]
    pub counted_cash_cents: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_status_default() {
        assert_eq!(SaleStatus::default(), SaleStatus::Paid);
    }

    #[test]
    fn test_sale_status_transitions() {
        assert!(SaleStatus::Pending.can_transition_to(SaleStatus::Paid));
        assert!(SaleStatus::Paid.can_transition_to(SaleStatus::Refunded));
        assert!(SaleStatus::Paid.can_transition_to(SaleStatus::Cancelled));
        assert!(!SaleStatus::Refunded.can_transition_to(SaleStatus::Paid));
        assert!(!SaleStatus::Cancelled.can_transition_to(SaleStatus::Refunded));
        assert!(!SaleStatus::Pending.can_transition_to(SaleStatus::Refunded));
        assert!(!SaleStatus::Paid.can_transition_to(SaleStatus::Paid));
    }

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!(PaymentMethod::from("cash"), PaymentMethod::Cash);
        assert_eq!(PaymentMethod::from(" Card "), PaymentMethod::Card);
        assert_eq!(PaymentMethod::from("transfer"), PaymentMethod::Transfer);
        assert_eq!(
            PaymentMethod::from("paypal"),
            PaymentMethod::Other("paypal".to_string())
        );
        assert_eq!(PaymentMethod::from("paypal").bucket(), PaymentBucket::Other);
        assert_eq!(PaymentMethod::Mixed.bucket(), PaymentBucket::Other);
    }

    #[test]
    fn test_payment_method_serde_keeps_unknown_names() {
        let json = serde_json::to_string(&PaymentMethod::Other("paypal".into())).unwrap();
        assert_eq!(json, "\"paypal\"");

        let method: PaymentMethod = serde_json::from_str("\"cash\"").unwrap();
        assert_eq!(method, PaymentMethod::Cash);
    }

    #[test]
    fn test_free_sale_product_never_blocks_on_stock() {
        let now = Utc::now();
        let mut product = Product {
            id: "p1".into(),
            sku: "CAFE-500".into(),
            barcode: None,
            name: "Café Santo Domingo 500g".into(),
            price_cents: 32_500,
            tax_rate_bps: 1800,
            track_inventory: true,
            allow_negative_stock: false,
            current_stock: Some(2),
            is_active: true,
            is_free_sale: false,
            created_at: now,
            updated_at: now,
        };
        assert!(product.can_sell(2));
        assert!(!product.can_sell(3));

        product.is_free_sale = true;
        assert!(!product.affects_stock());
        assert!(product.can_sell(3));
    }
}
