//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod health;
pub mod invoices;
pub mod roles;
pub mod workflow;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(roles::routes())
        .merge(workflow::routes())
        .merge(invoices::routes())
}
