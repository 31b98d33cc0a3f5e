//! # Repository Module
//!
//! SQL lives here and nowhere else.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Handler / ShiftReconciler                                             │
//! │       │   db.registers().find_open()                                   │
//! │       ▼                                                                 │
//! │  ProductRepository    catalog, stock moves, free-sale placeholder      │
//! │  SaleRepository       sale ledger, invoice counter, payment totals     │
//! │  RegisterRepository   cash register sessions                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each repository owns a pool clone for standalone calls. Steps that must
//! share a transaction are crate-level functions taking a
//! `&mut SqliteConnection`, so a caller can run several of them inside one
//! `pool.begin()`.

pub mod product;
pub mod register;
pub mod sale;

/// Escapes `%`, `_` and `\` for a `LIKE … ESCAPE '\'` pattern.
pub(crate) fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
