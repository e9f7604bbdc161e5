//! HTTP surface over the ledger.
//!
//! Handlers authorize through the extractors in [`extractors`] and then call
//! straight into [`crate::core`]. The database handle and the [`Ledger`] are
//! built once in `main` and shared through [`AppState`].

pub mod error;
pub mod extractors;
pub mod routes;

use crate::core::ledger::Ledger;
use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Payment ledger; clones share the per-enrollment locks
    pub ledger: Ledger,
}

impl AppState {
    /// Builds the state around one database handle.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        let ledger = Ledger::new(db.clone());
        Self { db, ledger }
    }
}

/// Creates the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .nest("/admin", routes::admin_routes())
        .nest("/student", routes::student::routes())
        .nest("/teacher", routes::teacher::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
