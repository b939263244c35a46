//! Waybill API Server
//!
//! Main entry point for the Waybill invoice approval routing service.

use rust_decimal::Decimal;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use waybill_api::{AppState, create_router};
use waybill_core::roles::{PermissionSet, RoleRegistry};
use waybill_core::workflow::{NewStepSpec, StepCondition, WorkflowChain};
use waybill_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waybill=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Seed the default roles and approval chain
    let (registry, chain) = seed_configuration()?;
    info!(
        roles = registry.roles().len(),
        steps = chain.len(),
        "Configuration seeded"
    );

    // Create application state
    let state = AppState::new(registry, chain);

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the default role table and approval chain.
///
/// The chain routes everything through first-line review and escalates
/// high-variance invoices to the manager before settlement.
fn seed_configuration() -> anyhow::Result<(RoleRegistry, WorkflowChain)> {
    let mut registry = RoleRegistry::new();

    let auditor = PermissionSet {
        can_view_invoices: true,
        can_approve_l1: true,
        ..PermissionSet::default()
    };
    let manager = PermissionSet {
        can_view_invoices: true,
        can_approve_l1: true,
        can_approve_l2: true,
        ..PermissionSet::default()
    };

    let auditor_id = registry
        .add_with_permissions("Auditor", "First-line invoice review", "#2563eb", auditor)
        .id;
    let manager_id = registry
        .add_with_permissions("Audit Manager", "Escalation review", "#7c3aed", manager)
        .id;
    registry.add_with_permissions(
        "Administrator",
        "Full system access",
        "#dc2626",
        PermissionSet::all(),
    );

    let mut chain = WorkflowChain::with_settlement("Settlement");
    chain.add_step(
        NewStepSpec {
            name: "L1 Review".to_string(),
            role_id: Some(auditor_id),
            condition: StepCondition::Always,
        },
        &registry,
    )?;
    chain.add_step(
        NewStepSpec {
            name: "Manager Review".to_string(),
            role_id: Some(manager_id),
            condition: StepCondition::VarianceGt(Decimal::from(250)),
        },
        &registry,
    )?;

    Ok((registry, chain))
}
