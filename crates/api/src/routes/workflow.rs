//! Approval chain management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use waybill_core::workflow::{
    ChainError, MoveDirection, NewStepSpec, StepCondition, StepUpdate,
};

/// Creates the approval chain routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/workflow/steps", get(list_steps))
        .route("/workflow/steps", post(add_step))
        .route("/workflow/steps/{step_id}", patch(update_step))
        .route("/workflow/steps/{step_id}", delete(remove_step))
        .route("/workflow/steps/{index}/move", post(move_step))
}

/// Request body for adding a step.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStepRequest {
    /// Step name.
    pub step_name: String,
    /// Role to bind; defaults to the first registered role.
    pub role_id: Option<Uuid>,
    /// Trigger condition type: `ALWAYS`, `AMOUNT_GT`, or `VARIANCE_GT`.
    pub condition_type: String,
    /// Threshold, required for the conditional types.
    pub condition_value: Option<Decimal>,
}

/// Request body for updating a step, one field at a time.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStepRequest {
    /// New step name.
    pub step_name: Option<String>,
    /// New role id (the `"system"` literal is not a valid rebind target).
    pub role_id: Option<String>,
    /// New condition type, combined with `conditionValue`.
    pub condition_type: Option<String>,
    /// New condition threshold.
    pub condition_value: Option<Decimal>,
}

/// Request body for moving a step.
#[derive(Debug, Deserialize)]
pub struct MoveStepRequest {
    /// `up` or `down`.
    pub direction: MoveDirection,
}

/// GET `/workflow/steps` - The chain, in order.
async fn list_steps(State(state): State<AppState>) -> impl IntoResponse {
    let chain = state.chain.read().await;
    (StatusCode::OK, Json(json!({ "data": chain.steps() }))).into_response()
}

/// POST `/workflow/steps` - Add a step.
///
/// Inserted immediately before the system step when one exists.
async fn add_step(
    State(state): State<AppState>,
    Json(payload): Json<AddStepRequest>,
) -> impl IntoResponse {
    let condition = match StepCondition::from_parts(&payload.condition_type, payload.condition_value)
    {
        Ok(c) => c,
        Err(e) => return chain_error_response(&e),
    };

    let chain = &mut *state.chain.write().await;
    let registry = state.registry.read().await;

    let spec = NewStepSpec {
        name: payload.step_name,
        role_id: payload.role_id,
        condition,
    };
    match chain.add_step(spec, &registry) {
        Ok(step) => {
            info!(step_id = %step.id, "Workflow step added");
            (StatusCode::CREATED, Json(step)).into_response()
        }
        Err(e) => chain_error_response(&e),
    }
}

/// PATCH `/workflow/steps/{step_id}` - Update step fields.
async fn update_step(
    State(state): State<AppState>,
    Path(step_id): Path<Uuid>,
    Json(payload): Json<UpdateStepRequest>,
) -> impl IntoResponse {
    let chain = &mut *state.chain.write().await;
    let registry = state.registry.read().await;

    // Resolve the target first: immutability of the system step takes
    // precedence over whatever the payload carries
    let is_system = match chain.get(step_id) {
        Some(step) => step.is_system,
        None => return chain_error_response(&ChainError::StepNotFound(step_id)),
    };
    if is_system {
        return chain_error_response(&ChainError::SystemStepImmutable(step_id));
    }

    let mut updates = Vec::new();

    if let Some(name) = payload.step_name {
        updates.push(StepUpdate::Name(name));
    }
    if let Some(role_id) = payload.role_id {
        // Any non-uuid value, including the "system" literal, cannot name
        // a registered role
        match Uuid::parse_str(&role_id) {
            Ok(id) => updates.push(StepUpdate::Approver(id)),
            Err(_) => {
                return (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({
                        "error": "UNKNOWN_ROLE",
                        "message": format!("Role {role_id} is not defined in the role registry")
                    })),
                )
                    .into_response();
            }
        }
    }
    if let Some(condition_type) = payload.condition_type {
        match StepCondition::from_parts(&condition_type, payload.condition_value) {
            Ok(condition) => updates.push(StepUpdate::Condition(condition)),
            Err(e) => return chain_error_response(&e),
        }
    }

    if updates.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "empty_update",
                "message": "No updatable field provided"
            })),
        )
            .into_response();
    }

    for update in updates {
        if let Err(e) = chain.update_step(step_id, update, &registry) {
            return chain_error_response(&e);
        }
    }

    info!(step_id = %step_id, "Workflow step updated");
    match chain.get(step_id) {
        Some(step) => (StatusCode::OK, Json(step)).into_response(),
        None => chain_error_response(&ChainError::StepNotFound(step_id)),
    }
}

/// DELETE `/workflow/steps/{step_id}` - Remove a non-system step.
async fn remove_step(
    State(state): State<AppState>,
    Path(step_id): Path<Uuid>,
) -> impl IntoResponse {
    let mut chain = state.chain.write().await;
    match chain.remove_step(step_id) {
        Ok(step) => {
            info!(step_id = %step.id, "Workflow step removed");
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Err(e) => chain_error_response(&e),
    }
}

/// POST `/workflow/steps/{index}/move` - Swap a step with its neighbor.
///
/// Out-of-bounds or invariant-violating moves are no-ops, not errors: the
/// response reports `moved: false`.
async fn move_step(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(payload): Json<MoveStepRequest>,
) -> impl IntoResponse {
    let mut chain = state.chain.write().await;
    let moved = chain.move_step(index, payload.direction);
    if moved {
        info!(index, direction = ?payload.direction, "Workflow step moved");
    }
    (StatusCode::OK, Json(json!({ "moved": moved }))).into_response()
}

pub(crate) fn chain_error_response(e: &ChainError) -> axum::response::Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %e, "Workflow chain invariant failure");
    }
    (
        status,
        Json(json!({
            "error": e.error_code(),
            "message": e.to_string()
        })),
    )
        .into_response()
}
