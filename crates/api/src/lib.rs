//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for roles, the approval chain, and the audit queue
//! - The in-memory application state behind single-writer locks
//!
//! Durable persistence is an external collaborator; the state here is the
//! working set the routing engine operates on.

pub mod routes;

use axum::Router;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use waybill_core::invoice::Invoice;
use waybill_core::roles::RoleRegistry;
use waybill_core::routing::RoutingDecision;
use waybill_core::workflow::WorkflowChain;

/// One invoice in the audit queue, with its routing decision once routed.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    /// The invoice under audit.
    pub invoice: Invoice,
    /// The routing decision, once `route` has been called.
    pub decision: Option<RoutingDecision>,
}

/// Application state shared across handlers.
///
/// Configuration edits (roles, chain) take the write lock, which serializes
/// them; the chain re-validates its invariant on every mutation.
#[derive(Clone, Default)]
pub struct AppState {
    /// Role table.
    pub registry: Arc<RwLock<RoleRegistry>>,
    /// The approval chain.
    pub chain: Arc<RwLock<WorkflowChain>>,
    /// The invoice audit queue.
    pub invoices: Arc<RwLock<Vec<AuditEntry>>>,
}

impl AppState {
    /// Creates state from seeded configuration.
    #[must_use]
    pub fn new(registry: RoleRegistry, chain: WorkflowChain) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
            chain: Arc::new(RwLock::new(chain)),
            invoices: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
