//! # Application State
//!
//! Shared by every handler through axum's `State` extractor. Cloning is
//! cheap: the pool and the reconciler are handles over the same
//! `SqlitePool`, and nothing here is mutable.

use mostrador_core::BusinessClock;
use mostrador_db::{Database, ShiftReconciler};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub reconciler: ShiftReconciler,
}

impl AppState {
    pub fn new(db: Database, clock: BusinessClock) -> Self {
        let reconciler = ShiftReconciler::new(db.clone(), clock);
        AppState { db, reconciler }
    }

    /// The business clock used for local days and invoice years.
    pub fn clock(&self) -> BusinessClock {
        self.reconciler.clock()
    }
}
