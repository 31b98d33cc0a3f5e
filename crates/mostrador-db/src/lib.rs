//! # mostrador-db: Database Layer for Mostrador POS
//!
//! SQLite storage for the sale ledger, the catalog and register sessions,
//! plus the shift reconciliation engine that reads them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Mostrador POS Data Flow                            │
//! │                                                                         │
//! │  HTTP handler (POST /api/register/close)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   mostrador-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐   ┌───────────────┐   ┌──────────────┐   │   │
//! │  │   │ ShiftReconciler│──►│ Repositories  │   │  Migrations  │   │   │
//! │  │   │ (windows, cash │   │ ProductRepo   │   │  (embedded)  │   │   │
//! │  │   │  counts)       │   │ SaleRepo      │   │ 001_init.sql │   │   │
//! │  │   └────────────────┘   │ RegisterRepo  │   │ 002_free...  │   │   │
//! │  │            │           └───────────────┘   └──────────────┘   │   │
//! │  │            ▼                   │                               │   │
//! │  │   ┌──────────────────────────────────┐                         │   │
//! │  │   │ Database (pool.rs): SqlitePool   │                         │   │
//! │  │   └──────────────────────────────────┘                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL)                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Product, sale and register repositories
//! - [`reconciliation`] - Shift windows, payment breakdowns, drawer counts
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mostrador_core::BusinessClock;
//! use mostrador_db::{Database, DbConfig, ShiftReconciler};
//!
//! let db = Database::new(DbConfig::new("./mostrador.db")).await?;
//! let reconciler = ShiftReconciler::new(db.clone(), BusinessClock::default());
//!
//! let state = reconciler.current_status(chrono::Utc::now()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod reconciliation;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use reconciliation::ShiftReconciler;

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::register::RegisterRepository;
pub use repository::sale::SaleRepository;
