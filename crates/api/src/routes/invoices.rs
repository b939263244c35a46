//! Invoice audit queue and routing routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, AuditEntry};
use waybill_core::invoice::Invoice;
use waybill_core::routing::{OverrideKind, RoutingEngine, RoutingError};
use waybill_core::variance::VarianceClassifier;

/// Creates the invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices))
        .route("/invoices", post(create_invoice))
        .route("/invoices/{invoice_id}/route", post(route_invoice))
        .route(
            "/invoices/{invoice_id}/steps/{step_id}/approve",
            post(approve_step),
        )
        .route(
            "/invoices/{invoice_id}/steps/{step_id}/reject",
            post(reject_step),
        )
        .route("/invoices/{invoice_id}/override", post(override_invoice))
}

/// Request body for submitting an invoice to the queue.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    /// Carrier that submitted the invoice.
    pub carrier: String,
    /// Amount claimed by the carrier.
    pub billed_amount: Decimal,
    /// System-computed correct amount.
    pub audit_amount: Decimal,
    /// Pre-shipment estimate; absent for ghost shipments.
    pub tms_estimated_amount: Option<Decimal>,
    /// Invoice this one duplicates, when known.
    pub duplicate_of: Option<Uuid>,
    /// Manually flagged for review.
    #[serde(default)]
    pub flagged: bool,
}

/// Request body for a step decision.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    /// Role signing off on the step.
    pub acting_role: Uuid,
    /// Approval note, optional.
    pub note: Option<String>,
    /// Rejection reason, required when rejecting.
    pub reason: Option<String>,
}

/// Request body for an administrator override.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRequest {
    /// `quickApprove` or `flagForReview`.
    pub kind: OverrideKind,
    /// Role applying the override.
    pub acting_role: Uuid,
}

/// GET `/invoices` - The audit queue with live classification.
///
/// Classification is computed on the fly so list entries reflect the
/// current invoice fields even before routing.
async fn list_invoices(State(state): State<AppState>) -> impl IntoResponse {
    let invoices = state.invoices.read().await;
    let data: Vec<_> = invoices
        .iter()
        .map(|entry| {
            let classification = VarianceClassifier::classify(&entry.invoice);
            json!({
                "invoice": entry.invoice,
                "classification": classification,
                "decision": entry.decision,
            })
        })
        .collect();
    (StatusCode::OK, Json(json!({ "data": data }))).into_response()
}

/// POST `/invoices` - Submit an invoice to the audit queue.
async fn create_invoice(
    State(state): State<AppState>,
    Json(payload): Json<CreateInvoiceRequest>,
) -> impl IntoResponse {
    if payload.carrier.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "carrier_required",
                "message": "Carrier is required"
            })),
        )
            .into_response();
    }

    let invoice = Invoice {
        id: Uuid::new_v4(),
        carrier: payload.carrier,
        billed_amount: payload.billed_amount,
        audit_amount: payload.audit_amount,
        tms_estimated_amount: payload.tms_estimated_amount,
        duplicate_of: payload.duplicate_of,
        flagged: payload.flagged,
    };
    info!(invoice_id = %invoice.id, carrier = %invoice.carrier, "Invoice submitted");

    let mut invoices = state.invoices.write().await;
    invoices.push(AuditEntry {
        invoice: invoice.clone(),
        decision: None,
    });

    (StatusCode::CREATED, Json(invoice)).into_response()
}

/// POST `/invoices/{invoice_id}/route` - Route an invoice through the chain.
///
/// Routing snapshots the chain and registry; later configuration edits do
/// not alter an existing decision.
async fn route_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    let chain = state.chain.read().await;
    let registry = state.registry.read().await;
    let mut invoices = state.invoices.write().await;

    let Some(entry) = invoices.iter_mut().find(|e| e.invoice.id == invoice_id) else {
        return invoice_not_found(invoice_id);
    };

    let decision = RoutingEngine::route(&entry.invoice, &chain, &registry);
    info!(
        invoice_id = %invoice_id,
        status = %decision.status,
        steps = decision.steps.len(),
        "Invoice routed"
    );
    entry.decision = Some(decision.clone());

    (StatusCode::OK, Json(decision)).into_response()
}

/// POST `/invoices/{invoice_id}/steps/{step_id}/approve` - Sign off a step.
async fn approve_step(
    State(state): State<AppState>,
    Path((invoice_id, step_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<DecisionRequest>,
) -> impl IntoResponse {
    let registry = state.registry.read().await;
    let actor = match registry.get(payload.acting_role) {
        Ok(role) => role.clone(),
        Err(e) => return super::roles::role_error_response(&e),
    };
    drop(registry);

    let mut invoices = state.invoices.write().await;
    let Some(entry) = invoices.iter_mut().find(|e| e.invoice.id == invoice_id) else {
        return invoice_not_found(invoice_id);
    };
    let Some(decision) = entry.decision.as_mut() else {
        return not_routed(invoice_id);
    };

    match decision.approve_step(step_id, &actor, payload.note) {
        Ok(()) => {
            info!(
                invoice_id = %invoice_id,
                step_id = %step_id,
                acting_role = %actor.id,
                status = %decision.status,
                "Step approved"
            );
            (StatusCode::OK, Json(decision.clone())).into_response()
        }
        Err(e) => routing_error_response(&e),
    }
}

/// POST `/invoices/{invoice_id}/steps/{step_id}/reject` - Reject a step.
async fn reject_step(
    State(state): State<AppState>,
    Path((invoice_id, step_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<DecisionRequest>,
) -> impl IntoResponse {
    let registry = state.registry.read().await;
    let actor = match registry.get(payload.acting_role) {
        Ok(role) => role.clone(),
        Err(e) => return super::roles::role_error_response(&e),
    };
    drop(registry);

    let mut invoices = state.invoices.write().await;
    let Some(entry) = invoices.iter_mut().find(|e| e.invoice.id == invoice_id) else {
        return invoice_not_found(invoice_id);
    };
    let Some(decision) = entry.decision.as_mut() else {
        return not_routed(invoice_id);
    };

    let reason = payload.reason.unwrap_or_default();
    match decision.reject_step(step_id, &actor, reason) {
        Ok(()) => {
            info!(
                invoice_id = %invoice_id,
                step_id = %step_id,
                acting_role = %actor.id,
                "Step rejected"
            );
            (StatusCode::OK, Json(decision.clone())).into_response()
        }
        Err(e) => routing_error_response(&e),
    }
}

/// POST `/invoices/{invoice_id}/override` - Administrator chain bypass.
async fn override_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<OverrideRequest>,
) -> impl IntoResponse {
    let registry = state.registry.read().await;
    let actor = match registry.get(payload.acting_role) {
        Ok(role) => role.clone(),
        Err(e) => return super::roles::role_error_response(&e),
    };
    drop(registry);

    let mut invoices = state.invoices.write().await;
    let Some(entry) = invoices.iter_mut().find(|e| e.invoice.id == invoice_id) else {
        return invoice_not_found(invoice_id);
    };
    let Some(decision) = entry.decision.as_mut() else {
        return not_routed(invoice_id);
    };

    match decision.apply_override(payload.kind, &actor) {
        Ok(()) => {
            info!(
                invoice_id = %invoice_id,
                acting_role = %actor.id,
                status = %decision.status,
                "Override applied"
            );
            (StatusCode::OK, Json(decision.clone())).into_response()
        }
        Err(e) => routing_error_response(&e),
    }
}

fn invoice_not_found(invoice_id: Uuid) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "invoice_not_found",
            "message": format!("Invoice {invoice_id} not found")
        })),
    )
        .into_response()
}

fn not_routed(invoice_id: Uuid) -> axum::response::Response {
    (
        StatusCode::CONFLICT,
        Json(json!({
            "error": "not_routed",
            "message": format!("Invoice {invoice_id} has not been routed yet")
        })),
    )
        .into_response()
}

pub(crate) fn routing_error_response(e: &RoutingError) -> axum::response::Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": e.error_code(),
            "message": e.to_string()
        })),
    )
        .into_response()
}
