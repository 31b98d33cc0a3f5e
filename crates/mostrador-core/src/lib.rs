//! # mostrador-core: Pure Business Logic for Mostrador POS
//!
//! This crate holds every business rule of the point-of-sale backend as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Mostrador POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (React SPA)                         │   │
//! │  │     Catalog ──► Sale ──► Register open/close ──► Summary       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum routes)                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ mostrador-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │  clock  │ │  shift  │ │ invoice │  │   │
//! │  │   │  Sale   │ │  Money  │ │ UTC-4   │ │ window  │ │ FACT-…  │  │   │
//! │  │   │ Session │ │ TaxRate │ │midnight │ │ buckets │ │         │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO SYSTEM CLOCK • PURE FUNCTIONS      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  mostrador-db (Database Layer)                  │   │
//! │  │        SQLite queries, migrations, repositories, reconciler     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, CashRegisterSession, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`clock`] - Fixed-offset business clock (local midnight in UTC)
//! - [`shift`] - Effective-start rule and payment-method aggregation
//! - [`invoice`] - `FACT-<year>-<seq>` invoice numbers
//! - [`sale`] - Line pricing and sale totals
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use mostrador_core::clock::BusinessClock;
//!
//! let clock = BusinessClock::default(); // UTC-4
//! // 02:30 UTC on Oct 20 is still Oct 19 in local time.
//! let instant = Utc.with_ymd_and_hms(2026, 10, 20, 2, 30, 0).unwrap();
//! let midnight = clock.start_of_local_day(instant);
//! assert_eq!(midnight, Utc.with_ymd_and_hms(2026, 10, 19, 4, 0, 0).unwrap());
//! ```

pub mod clock;
pub mod error;
pub mod invoice;
pub mod money;
pub mod sale;
pub mod shift;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use clock::BusinessClock;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use sale::{PricedLine, SaleTotals};
pub use shift::{
    CashReconciliation, CloseReport, PaymentBreakdown, RegisterState, ShiftAnchor, ShiftSummary,
    ShiftWindow, WindowSource,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single sale.
pub const MAX_SALE_LINES: usize = 100;

/// Maximum quantity of a single line item.
///
/// Catches typing 1000 instead of 10 at the counter.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// SKU of the stock-exempt placeholder product used for ad-hoc amounts.
pub const FREE_SALE_SKU: &str = "VENTA-LIBRE";

/// Fixed id of the placeholder product, seeded by migration.
pub const FREE_SALE_PRODUCT_ID: &str = "00000000-0000-4000-8000-000000000001";
